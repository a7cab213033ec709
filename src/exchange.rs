use indexmap::IndexMap;
use serde::Serialize;
use std::mem::swap;

use crate::balance::Balance;
use crate::money::Money;
use crate::schemas::{Expense, MemberName};

#[derive(Clone, Debug)]
struct PersonalBalance {
    id: MemberName,
    balance: Money,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
struct MemberPair {
    member1: MemberName,
    member2: MemberName,
}

/// One payment that moves money from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transfer {
    pub payer: MemberName,
    pub receiver: MemberName,
    pub amount: Money,
}

// One transfer per pair of members, straight from the splits
fn get_direct_transfers(balances: &Balance, expenses: &[Expense]) -> Vec<Transfer> {
    let mut balances_between_people: IndexMap<MemberPair, Money> = IndexMap::new();

    for expense in expenses {
        if !balances.contains_key(&expense.payer) {
            continue;
        }
        for (participant, split) in &expense.splits {
            if *participant == expense.payer || !balances.contains_key(participant) {
                continue;
            }
            let mut pair = MemberPair {
                member1: expense.payer.clone(),
                member2: participant.clone(),
            };
            let mut amount = *split;

            // Alphabetical order keeps both directions of a pair under one key
            if pair.member1 > pair.member2 {
                swap(&mut pair.member1, &mut pair.member2);
                amount = -amount;
            }

            *balances_between_people.entry(pair).or_insert(Money::ZERO) += amount;
        }
    }

    // member1 is owed by member2 when the pair balance is positive
    let mut transfers = Vec::new();

    for (pair, balance) in balances_between_people {
        let balance = balance.round_to_cents();
        if balance.is_zero() {
            continue;
        }
        let mut payer = pair.member2;
        let mut receiver = pair.member1;
        if balance.is_negative() {
            swap(&mut payer, &mut receiver);
        }

        transfers.push(Transfer {
            payer,
            receiver,
            amount: balance.abs(),
        });
    }

    transfers
}

// Greedily pairs the largest debtor with the largest creditor
fn get_simplified_transfers(
    mut payers: Vec<PersonalBalance>,
    mut receivers: Vec<PersonalBalance>,
) -> Vec<Transfer> {
    payers.sort_by(|a, b| a.balance.cmp(&b.balance));
    receivers.sort_by(|a, b| a.balance.cmp(&b.balance));

    let mut transfers: Vec<Transfer> = Vec::new();

    while let (Some(payer), Some(receiver)) = (payers.last_mut(), receivers.last_mut()) {
        let mut transfer = Transfer {
            payer: payer.id.clone(),
            receiver: receiver.id.clone(),
            amount: Money::ZERO,
        };
        if receiver.balance == payer.balance {
            transfer.amount = payer.balance;
            payers.pop();
            receivers.pop();
        } else if receiver.balance > payer.balance {
            transfer.amount = payer.balance;
            receiver.balance = (receiver.balance - payer.balance).round_to_cents();
            payers.pop();
        } else {
            transfer.amount = receiver.balance;
            payer.balance = (payer.balance - receiver.balance).round_to_cents();
            receivers.pop();
        }
        transfers.push(transfer);
    }
    transfers
}

/// Suggests who should pay whom so that everybody ends up settled.
///
/// Both the direct per-pair transfers and a simplified set are computed; the
/// shorter list wins. Amounts are in whole cents.
pub fn suggest_transfers(balances: &Balance, expenses: &[Expense]) -> Vec<Transfer> {
    // Divide people into payers and receivers
    let mut payers = Vec::new();
    let mut receivers = Vec::new();

    for (id, balance) in balances {
        let balance = balance.round_to_cents();
        if balance.is_zero() {
            continue;
        }
        let person = PersonalBalance {
            id: id.clone(),
            balance: balance.abs(),
        };
        if balance.is_negative() {
            payers.push(person);
        } else {
            receivers.push(person);
        }
    }

    let direct_transfers = get_direct_transfers(balances, expenses);
    let simplified_transfers = get_simplified_transfers(payers, receivers);

    // The simplification must not end up more complicated than paying back
    // each expense directly
    if simplified_transfers.len() < direct_transfers.len() {
        simplified_transfers
    } else {
        direct_transfers
    }
}
