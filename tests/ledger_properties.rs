use proptest::prelude::*;
use splitbook::{Ledger, Money, NewExpense};

const NAMES: [&str; 6] = ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"];

fn ledger_with_members(member_count: usize) -> Ledger {
    let mut ledger = Ledger::new();
    for name in &NAMES[..member_count] {
        ledger.add_member(name).expect("fresh member");
    }
    ledger
}

fn new_expense(cents: u32, payer: usize, mask: usize, member_count: usize) -> NewExpense {
    let mut participants: Vec<String> = (0..member_count)
        .filter(|idx| mask & (1 << idx) != 0)
        .map(|idx| NAMES[idx].to_string())
        .collect();
    if participants.is_empty() {
        participants.push(NAMES[0].to_string());
    }
    NewExpense {
        description: format!("expense of {cents} cents"),
        amount: Money::from_cents(cents as i64).value().to_string(),
        payer: NAMES[payer % member_count].to_string(),
        participants,
    }
}

proptest! {
    #[test]
    fn new_expenses_split_to_their_total(
        member_count in 1usize..=6,
        cents in 1u32..=1_000_000,
        payer in 0usize..6,
        mask in 0usize..64,
    ) {
        let mut ledger = ledger_with_members(member_count);
        let expense = ledger
            .add_expense(new_expense(cents, payer, mask, member_count))
            .expect("valid expense");
        prop_assert!(expense.amount.within_tolerance(expense.total_split()));
        prop_assert_eq!(
            expense.splits.keys().collect::<Vec<_>>(),
            expense.participants.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=6,
        expenses in prop::collection::vec((1u32..=100_000, 0usize..6, 0usize..64), 0..=30),
    ) {
        let mut ledger = ledger_with_members(member_count);
        for (cents, payer, mask) in expenses {
            ledger
                .add_expense(new_expense(cents, payer, mask, member_count))
                .expect("valid expense");
        }
        let total: Money = ledger.balances().values().sum();
        prop_assert!(total.within_tolerance(Money::ZERO), "total = {}", total);
    }

    #[test]
    fn balances_sum_to_zero_with_custom_splits(
        member_count in 2usize..=6,
        expenses in prop::collection::vec(
            (1u32..=100_000, 0usize..6, prop::collection::vec(0u32..=50_000, 5), -1i64..=1),
            1..=15,
        ),
    ) {
        let mut ledger = ledger_with_members(member_count);
        let mut leftover = Money::ZERO;
        for (cents, payer, shares, jitter) in expenses {
            let id = ledger
                .add_expense(new_expense(cents, payer, usize::MAX, member_count))
                .expect("valid expense")
                .id;
            ledger.begin_split_edit(id).expect("open edit");

            // Everyone but the last participant takes an arbitrary share and
            // the last one covers the rest, give or take a cent
            let mut assigned = Money::ZERO;
            for (idx, name) in NAMES[..member_count - 1].iter().enumerate() {
                let share = Money::from_cents(shares[idx] as i64);
                assigned += share;
                ledger
                    .set_participant_split(id, name, &share.value().to_string())
                    .expect("participant");
            }
            let last = Money::from_cents(cents as i64) - assigned + Money::from_cents(jitter);
            let edit = ledger
                .set_participant_split(id, NAMES[member_count - 1], &last.value().to_string())
                .expect("participant");
            let remaining = edit.remaining_amount();
            prop_assert_eq!(remaining, Money::from_cents(-jitter));

            ledger.commit_split_edit(id).expect("within tolerance");
            leftover += remaining;
        }
        let total: Money = ledger.balances().values().sum();
        prop_assert_eq!(total, leftover);
    }

    #[test]
    fn rejected_commit_leaves_expense_untouched(
        cents in 2u32..=100_000,
        override_cents in 0u32..=200_000,
    ) {
        let mut ledger = ledger_with_members(2);
        let id = ledger
            .add_expense(new_expense(cents, 0, 0b11, 2))
            .expect("valid expense")
            .id;
        let before = ledger.expense(id).expect("stored").clone();

        ledger.begin_split_edit(id).expect("open edit");
        let raw = Money::from_cents(override_cents as i64).value().to_string();
        let remaining = ledger
            .set_participant_split(id, "Bob", &raw)
            .expect("Bob participates")
            .remaining_amount();

        let committed = ledger.commit_split_edit(id).is_ok();
        prop_assert_eq!(committed, remaining.within_tolerance(Money::ZERO));
        if committed {
            prop_assert!(ledger.editing(id).is_none());
            prop_assert_eq!(ledger.expense(id).expect("stored").splits["Bob"], Money::from_cents(override_cents as i64));
        } else {
            prop_assert!(ledger.editing(id).is_some());
            prop_assert_eq!(ledger.expense(id).expect("stored"), &before);
        }
    }

    #[test]
    fn removing_a_member_drops_only_their_payments(
        expenses in prop::collection::vec((1u32..=100_000, 0usize..3), 1..=20),
        removed in 0usize..3,
    ) {
        // Everybody only pays for themselves, so any member can be removed
        let mut ledger = ledger_with_members(3);
        for (cents, payer) in &expenses {
            ledger
                .add_expense(new_expense(*cents, *payer, 1 << *payer, 3))
                .expect("valid expense");
        }
        let name = NAMES[removed];
        let expected_kept = expenses.iter().filter(|(_, payer)| *payer != removed).count();

        let dropped = ledger.remove_member(name).expect("removable");
        prop_assert!(dropped.iter().all(|expense| expense.payer == name));
        prop_assert_eq!(dropped.len(), expenses.len() - expected_kept);
        prop_assert_eq!(ledger.expenses().len(), expected_kept);
        prop_assert!(ledger.expenses().iter().all(|expense| expense.payer != name));
    }
}
