//! Transaction export
//!
//! CSV export of the transaction log with optional date-range and group
//! filters. Full-state JSON backup lives in the snapshot module.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::AppState;

/// Options for transaction export
#[derive(Debug, Clone, Default)]
pub struct TransactionExportOptions {
    /// Start date filter (inclusive)
    pub from: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub to: Option<NaiveDate>,
    /// Restrict to one group
    pub group_id: Option<String>,
}

/// Render the (filtered) transaction log as CSV
///
/// Group and client references are resolved to names, with "Unknown"
/// for dangling ids.
pub fn export_transactions_csv(state: &AppState, opts: &TransactionExportOptions) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "date", "type", "amount", "currency", "group", "client", "note"])?;

    for tx in &state.transactions {
        if let Some(from) = opts.from {
            if tx.date < from {
                continue;
            }
        }
        if let Some(to) = opts.to {
            if tx.date > to {
                continue;
            }
        }
        if let Some(ref group_id) = opts.group_id {
            if tx.group_id != *group_id {
                continue;
            }
        }
        writer.write_record([
            tx.id.clone(),
            tx.date.to_string(),
            tx.kind.to_string(),
            format!("{:.2}", tx.amount),
            tx.currency.clone(),
            state.group_name(&tx.group_id).to_string(),
            tx.client_id
                .as_deref()
                .map(|id| state.client_name(id))
                .unwrap_or("")
                .to_string(),
            tx.note.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::Error::InvalidData(format!("CSV writer error: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppState, NewTransaction, TransactionType};
    use crate::store::{apply, Action};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> (AppState, String) {
        let state = apply(
            AppState::default(),
            Action::AddGroup {
                name: "Home".into(),
                icon: None,
                monthly_budget: None,
            },
        );
        let gid = state.groups.last().unwrap().id.clone();
        let mut state = state;
        for (amount, date) in [(10.0, day(2025, 1, 5)), (20.0, day(2025, 2, 5))] {
            state = apply(
                state,
                Action::AddTransaction(NewTransaction {
                    amount,
                    currency: None,
                    kind: TransactionType::Expense,
                    date,
                    group_id: gid.clone(),
                    client_id: None,
                    note: None,
                }),
            );
        }
        (state, gid)
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let (state, _) = seeded();
        let csv = export_transactions_csv(&state, &TransactionExportOptions::default()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,date,type,amount,currency,group,client,note"
        );
        assert_eq!(lines.count(), 2);
        assert!(csv.contains("Home"));
        assert!(csv.contains("10.00"));
    }

    #[test]
    fn test_csv_date_filter_inclusive() {
        let (state, _) = seeded();
        let csv = export_transactions_csv(
            &state,
            &TransactionExportOptions {
                from: Some(day(2025, 2, 5)),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!csv.contains("2025-01-05"));
        assert!(csv.contains("2025-02-05"));
    }

    #[test]
    fn test_csv_group_filter() {
        let (state, gid) = seeded();
        let csv = export_transactions_csv(
            &state,
            &TransactionExportOptions {
                group_id: Some("g-other".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(csv.lines().count(), 1); // header only

        let csv = export_transactions_csv(
            &state,
            &TransactionExportOptions {
                group_id: Some(gid),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
