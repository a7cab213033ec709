use std::fmt::Write;

use crate::balance::Balance;

pub const SUMMARY_TITLE: &str = "Expense Split Summary";

/// Renders balances as plain text suitable for pasting into a chat.
pub fn format_summary(balances: &Balance) -> String {
    let mut summary = format!("{SUMMARY_TITLE}\n\n");
    for (member, amount) in balances {
        // Writing into a String cannot fail.
        let _ = if amount.is_positive() {
            writeln!(summary, "{member} is owed ${amount}")
        } else if amount.is_negative() {
            writeln!(summary, "{member} owes ${}", amount.abs())
        } else {
            writeln!(summary, "{member} is settled up")
        };
    }
    summary
}
