use indexmap::IndexMap;

use crate::money::Money;
use crate::schemas::{Expense, MemberName};

pub type Balance = IndexMap<MemberName, Money>;

/// Net position of every member across `expenses`.
///
/// Payers are credited the full amount and every participant is debited their
/// split. Names that are not in `members` are skipped.
pub fn compute_balances(members: &[MemberName], expenses: &[Expense]) -> Balance {
    let mut balance: Balance = members
        .iter()
        .map(|member| (member.clone(), Money::ZERO))
        .collect();
    for expense in expenses {
        if let Some(paid) = balance.get_mut(&expense.payer) {
            *paid += expense.amount;
        }
        for (participant, split) in &expense.splits {
            if let Some(owed) = balance.get_mut(participant) {
                *owed -= *split;
            }
        }
    }
    balance
}
