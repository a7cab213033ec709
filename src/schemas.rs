use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

pub type MemberName = String;

/// Amount owed by each participant of one expense, in participant order.
pub type Splits = IndexMap<MemberName, Money>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Money,
    pub payer: MemberName,
    pub participants: Vec<MemberName>,
    pub splits: Splits,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn total_split(&self) -> Money {
        self.splits.values().sum()
    }
}

/// Form input for a new expense, before validation. The amount is kept as
/// the raw text the user typed.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: String,
    pub payer: MemberName,
    pub participants: Vec<MemberName>,
}
