use crate::error::{ReferenceError, ValidationError};
use crate::money::Money;
use crate::schemas::{Expense, ExpenseId, MemberName, Splits};

/// Gives every participant the same share of `amount`.
///
/// No remainder correction is applied, so the shares may miss the total by a
/// sub-cent amount (e.g. 10 split three ways).
pub fn initialize_equal_split(
    amount: Money,
    participants: &[MemberName],
) -> Result<Splits, ValidationError> {
    if participants.is_empty() {
        return Err(ValidationError::NoParticipants);
    }
    if !amount.is_positive() {
        return Err(ValidationError::NonPositiveAmount);
    }
    let share = amount.div_by(participants.len());
    Ok(participants
        .iter()
        .map(|participant| (participant.clone(), share))
        .collect())
}

/// What is left of the total once all splits are taken out. Negative when
/// the splits overshoot.
pub fn remaining_amount(expense: &Expense) -> Money {
    expense.amount - expense.total_split()
}

/// Returns a copy of `expense` with `member`'s split replaced. The total is
/// not checked here.
pub fn set_participant_split(
    expense: &Expense,
    member: &str,
    amount: Money,
) -> Result<Expense, ReferenceError> {
    let mut updated = expense.clone();
    match updated.splits.get_mut(member) {
        Some(split) => *split = amount,
        None => {
            return Err(ReferenceError::NotAParticipant {
                expense: expense.id,
                member: member.to_owned(),
            })
        }
    }
    Ok(updated)
}

/// The sole integrity gate on custom splits.
pub fn check_splits(expense: &Expense) -> Result<(), ValidationError> {
    let remaining = remaining_amount(expense);
    if remaining.abs() > crate::money::SPLIT_TOLERANCE {
        return Err(ValidationError::SplitsDoNotSumToTotal { remaining });
    }
    Ok(())
}

/// An open editing session on one expense's splits.
///
/// Edits land on a draft; the stored expense only changes when the draft
/// passes [`check_splits`].
#[derive(Clone, Debug, PartialEq)]
pub struct SplitEdit {
    draft: Expense,
}

impl SplitEdit {
    pub fn new(expense: &Expense) -> Self {
        Self {
            draft: expense.clone(),
        }
    }

    pub fn expense_id(&self) -> ExpenseId {
        self.draft.id
    }

    pub fn draft(&self) -> &Expense {
        &self.draft
    }

    /// `raw_amount` comes straight from a text field: anything that is not a
    /// number counts as zero.
    pub fn set_participant_split(
        &mut self,
        member: &str,
        raw_amount: &str,
    ) -> Result<&Expense, ReferenceError> {
        self.draft = set_participant_split(&self.draft, member, Money::parse_or_zero(raw_amount))?;
        Ok(&self.draft)
    }

    pub fn remaining_amount(&self) -> Money {
        remaining_amount(&self.draft)
    }

    /// Consumes the session if the draft balances, handing back the expense
    /// to store. Otherwise the session is returned intact with the error.
    pub fn commit(self) -> Result<Expense, (Self, ValidationError)> {
        match check_splits(&self.draft) {
            Ok(()) => Ok(self.draft),
            Err(err) => Err((self, err)),
        }
    }
}
