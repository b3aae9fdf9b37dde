//! Context assembler for AI prompts
//!
//! Serializes a bounded summary of the current state into a compact text
//! block that rides along as the system instruction. The transaction
//! tail is hard-capped so request size stays bounded no matter how much
//! history accumulates.

use std::fmt::Write;

use crate::models::{AppState, InstallmentStatus};

/// Most recent transactions included in the context block
pub const RECENT_TRANSACTION_CAP: usize = 40;

/// Build the financial context block for the assistant's system prompt
///
/// Includes the profile, tier, balance, group structure, active
/// installments, and the most recent transactions newest-first.
pub fn build_financial_context(state: &AppState) -> String {
    let groups_summary = state
        .groups
        .iter()
        .map(|g| format!("Group: {}", g.name))
        .collect::<Vec<_>>()
        .join(" | ");

    let installments_summary = state
        .installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Active)
        .map(|i| format!("{} ({}/{} paid)", i.title, i.paid_count, i.installment_count))
        .collect::<Vec<_>>()
        .join(" | ");

    let mut recent: Vec<_> = state.transactions.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_TRANSACTION_CAP);

    let mut history = String::new();
    for tx in recent {
        let counterparty = tx
            .client_id
            .as_deref()
            .map(|id| state.client_name(id))
            .unwrap_or_else(|| state.group_name(&tx.group_id));
        let _ = writeln!(
            history,
            "{}: {} {} {} ({}) - {}",
            tx.date,
            tx.kind,
            tx.amount,
            tx.currency,
            counterparty,
            tx.note.as_deref().unwrap_or("")
        );
    }

    format!(
        "--- FINANCIAL CONTEXT ---\n\
         User Profile: {}\n\
         Subscription: {}\n\
         Base Currency: {}\n\
         Total Balance: {}\n\
         \n\
         STRUCTURE:\n\
         Groups: {}\n\
         Active Debts/Installments: {}\n\
         \n\
         RECENT HISTORY:\n\
         {}-------------------------",
        state.user_profile.name,
        if state.is_pro { "PRO" } else { "Standard" },
        state.base_currency,
        state.wallet_balance,
        groups_summary,
        installments_summary,
        history,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTransaction, TransactionType};
    use crate::store::{apply, Action};
    use crate::models::AppState;
    use chrono::NaiveDate;

    fn seeded_state(tx_count: u32) -> AppState {
        let mut state = apply(
            AppState::default(),
            Action::AddGroup {
                name: "Home".into(),
                icon: None,
                monthly_budget: None,
            },
        );
        let gid = state.groups.last().unwrap().id.clone();
        for i in 0..tx_count {
            state = apply(
                state,
                Action::AddTransaction(NewTransaction {
                    amount: 10.0 + i as f64,
                    currency: None,
                    kind: TransactionType::Expense,
                    date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    group_id: gid.clone(),
                    client_id: None,
                    note: Some(format!("purchase {}", i)),
                }),
            );
        }
        state
    }

    #[test]
    fn test_context_includes_profile_and_structure() {
        let state = seeded_state(2);
        let ctx = build_financial_context(&state);
        assert!(ctx.contains("User Profile: Guest"));
        assert!(ctx.contains("Subscription: Standard"));
        assert!(ctx.contains("Group: Home"));
        assert!(ctx.contains("purchase 1"));
    }

    #[test]
    fn test_context_caps_transaction_tail() {
        let state = seeded_state(60);
        let ctx = build_financial_context(&state);
        let lines = ctx.lines().filter(|l| l.contains("expense")).count();
        assert_eq!(lines, RECENT_TRANSACTION_CAP);
        // Newest first: the most recent purchase must be present,
        // the oldest must have been trimmed.
        assert!(ctx.contains("purchase 59"));
        assert!(!ctx.contains("purchase 0\n"));
    }

    #[test]
    fn test_context_is_deterministic() {
        let state = seeded_state(5);
        assert_eq!(build_financial_context(&state), build_financial_context(&state));
    }
}
