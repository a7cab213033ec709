//! Expense splitting for small groups: members, shared expenses with
//! adjustable per-member splits, and the balances and settlement text
//! derived from them.
//!
//! [`Ledger`] owns the state of one group. Everything else is a pure
//! function over members and expenses.

pub mod balance;
pub mod error;
pub mod exchange;
pub mod ledger;
pub mod money;
pub mod schemas;
pub mod split;
pub mod summary;

pub use balance::{compute_balances, Balance};
pub use error::{LedgerError, ReferenceError, ValidationError};
pub use exchange::{suggest_transfers, Transfer};
pub use ledger::Ledger;
pub use money::{Money, MAX_AMOUNT, SPLIT_TOLERANCE};
pub use schemas::{Expense, ExpenseId, MemberName, NewExpense, Splits};
pub use split::{initialize_equal_split, remaining_amount, set_participant_split, SplitEdit};
pub use summary::format_summary;
