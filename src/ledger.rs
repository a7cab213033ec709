use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::balance::{compute_balances, Balance};
use crate::error::{LedgerError, ReferenceError, ValidationError};
use crate::exchange::{suggest_transfers, Transfer};
use crate::money::Money;
use crate::schemas::{Expense, ExpenseId, MemberName, NewExpense};
use crate::split::{self, initialize_equal_split, SplitEdit};
use crate::summary::format_summary;

/// Members and expenses of one group, plus any split edits in progress.
///
/// Every mutation goes through a method on this type. Balances are derived
/// on each call and never stored.
#[derive(Debug, Default)]
pub struct Ledger {
    members: Vec<MemberName>,
    expenses: Vec<Expense>,
    edits: HashMap<ExpenseId, SplitEdit>,
    last_expense_id: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[MemberName] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn expense(&self, id: ExpenseId) -> Result<&Expense, ReferenceError> {
        self.expenses
            .iter()
            .find(|expense| expense.id == id)
            .ok_or(ReferenceError::UnknownExpense(id))
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    pub fn add_member(&mut self, name: &str) -> Result<&MemberName, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankMemberName);
        }
        if self.has_member(name) {
            return Err(ValidationError::DuplicateMember(name.to_owned()));
        }
        info!(member = name, "adding member");
        self.members.push(name.to_owned());
        Ok(&self.members[self.members.len() - 1])
    }

    /// Removes a member along with every expense they paid for.
    ///
    /// Refused while the member still holds a share of an expense somebody
    /// else paid, since dropping them would leave that expense's splits short.
    pub fn remove_member(&mut self, name: &str) -> Result<Vec<Expense>, LedgerError> {
        let position = self
            .members
            .iter()
            .position(|member| member == name)
            .ok_or_else(|| ReferenceError::UnknownMember(name.to_owned()))?;

        let shared: Vec<ExpenseId> = self
            .expenses
            .iter()
            .filter(|expense| expense.payer != name && expense.splits.contains_key(name))
            .map(|expense| expense.id)
            .collect();
        if !shared.is_empty() {
            return Err(ValidationError::MemberHasSplits {
                member: name.to_owned(),
                expenses: shared,
            }
            .into());
        }

        self.members.remove(position);
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.expenses)
            .into_iter()
            .partition(|expense| expense.payer == name);
        self.expenses = kept;
        for expense in &removed {
            self.edits.remove(&expense.id);
        }
        info!(
            member = name,
            removed_expenses = removed.len(),
            "removed member"
        );
        Ok(removed)
    }

    pub fn add_expense(&mut self, new_expense: NewExpense) -> Result<&Expense, LedgerError> {
        let description = new_expense.description.trim();
        if description.is_empty() {
            return Err(ValidationError::IncompleteExpense("description is blank").into());
        }
        let amount = Money::parse_positive(&new_expense.amount)
            .ok_or(ValidationError::NonPositiveAmount)?;
        // Names are matched the same way add_member stores them
        let payer = new_expense.payer.trim();
        if payer.is_empty() {
            return Err(ValidationError::IncompleteExpense("payer is missing").into());
        }
        if !self.has_member(payer) {
            return Err(ReferenceError::UnknownMember(payer.to_owned()).into());
        }

        let mut participants: Vec<MemberName> = Vec::with_capacity(new_expense.participants.len());
        for participant in &new_expense.participants {
            let participant = participant.trim();
            if !self.has_member(participant) {
                return Err(ReferenceError::UnknownMember(participant.to_owned()).into());
            }
            if !participants.iter().any(|known| known == participant) {
                participants.push(participant.to_owned());
            }
        }
        let splits = initialize_equal_split(amount, &participants)?;

        self.last_expense_id += 1;
        let expense = Expense {
            id: ExpenseId(self.last_expense_id),
            description: description.to_owned(),
            amount,
            payer: payer.to_owned(),
            participants,
            splits,
            created_at: Utc::now(),
        };
        info!(
            id = %expense.id,
            amount = %expense.amount,
            payer = %expense.payer,
            participants = expense.participants.len(),
            "added expense"
        );
        self.expenses.push(expense);
        Ok(&self.expenses[self.expenses.len() - 1])
    }

    /// Opens a split edit on an expense, or returns the one already open.
    pub fn begin_split_edit(&mut self, id: ExpenseId) -> Result<&SplitEdit, ReferenceError> {
        if !self.edits.contains_key(&id) {
            let edit = SplitEdit::new(self.expense(id)?);
            debug!(%id, "opened split edit");
            self.edits.insert(id, edit);
        }
        self.edits
            .get(&id)
            .ok_or(ReferenceError::NoEditInProgress(id))
    }

    pub fn editing(&self, id: ExpenseId) -> Option<&SplitEdit> {
        self.edits.get(&id)
    }

    /// Updates one participant's share in the open edit of `id`.
    pub fn set_participant_split(
        &mut self,
        id: ExpenseId,
        member: &str,
        raw_amount: &str,
    ) -> Result<&SplitEdit, ReferenceError> {
        self.expense(id)?;
        let edit = self
            .edits
            .get_mut(&id)
            .ok_or(ReferenceError::NoEditInProgress(id))?;
        edit.set_participant_split(member, raw_amount)?;
        Ok(&*edit)
    }

    /// Amount still unassigned, read from the open edit when there is one.
    pub fn remaining_amount(&self, id: ExpenseId) -> Result<Money, ReferenceError> {
        match self.edits.get(&id) {
            Some(edit) => Ok(edit.remaining_amount()),
            None => self.expense(id).map(split::remaining_amount),
        }
    }

    /// Stores the edited splits if they add up to the total. On failure the
    /// stored expense is untouched and the edit stays open.
    pub fn commit_split_edit(&mut self, id: ExpenseId) -> Result<&Expense, LedgerError> {
        let edit = self
            .edits
            .remove(&id)
            .ok_or(ReferenceError::NoEditInProgress(id))?;
        let committed = match edit.commit() {
            Ok(committed) => committed,
            Err((edit, err)) => {
                debug!(%id, error = %err, "rejected split edit");
                self.edits.insert(id, edit);
                return Err(err.into());
            }
        };
        let expense = self
            .expenses
            .iter_mut()
            .find(|expense| expense.id == id)
            .ok_or(ReferenceError::UnknownExpense(id))?;
        *expense = committed;
        info!(%id, "committed split edit");
        Ok(&*expense)
    }

    pub fn cancel_split_edit(&mut self, id: ExpenseId) -> Result<(), ReferenceError> {
        self.edits
            .remove(&id)
            .ok_or(ReferenceError::NoEditInProgress(id))?;
        debug!(%id, "cancelled split edit");
        Ok(())
    }

    pub fn balances(&self) -> Balance {
        compute_balances(&self.members, &self.expenses)
    }

    pub fn summary(&self) -> String {
        format_summary(&self.balances())
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        suggest_transfers(&self.balances(), &self.expenses)
    }
}
