use thiserror::Error;

use crate::money::Money;
use crate::schemas::{ExpenseId, MemberName};

/// Problems the user can fix by changing their input. The ledger is left
/// untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("member name must not be blank")]
    BlankMemberName,
    #[error("member {0} already exists")]
    DuplicateMember(MemberName),
    #[error("expense is incomplete: {0}")]
    IncompleteExpense(&'static str),
    #[error("an expense needs at least one participant")]
    NoParticipants,
    #[error("expense amount must be a positive number")]
    NonPositiveAmount,
    #[error("splits do not sum to total ({remaining} remaining)")]
    SplitsDoNotSumToTotal { remaining: Money },
    #[error("member {member} still owes a share of {} expense(s)", expenses.len())]
    MemberHasSplits {
        member: MemberName,
        expenses: Vec<ExpenseId>,
    },
}

/// A name or id that does not exist in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("unknown member {0}")]
    UnknownMember(MemberName),
    #[error("unknown expense {0}")]
    UnknownExpense(ExpenseId),
    #[error("{member} is not a participant of expense {expense}")]
    NotAParticipant {
        expense: ExpenseId,
        member: MemberName,
    },
    #[error("expense {0} is not being edited")]
    NoEditInProgress(ExpenseId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}
