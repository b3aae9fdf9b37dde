//! Export, import, and notification history commands

use std::path::Path;

use anyhow::{Context, Result};
use purse_core::export::{export_transactions_csv, TransactionExportOptions};
use purse_core::models::NoticeLevel;
use purse_core::snapshot::{export_state, parse_snapshot};
use purse_core::store::Action;

use super::{confirm, open_store, parse_date_opt};

pub fn cmd_export_full(data_file: Option<&Path>, output: &Path) -> Result<()> {
    let store = open_store(data_file)?;
    let json = export_state(store.state())?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("✅ Exported full state to {}", output.display());
    Ok(())
}

pub fn cmd_export_transactions(
    data_file: Option<&Path>,
    output: Option<&Path>,
    from: Option<&str>,
    to: Option<&str>,
    group: Option<&str>,
) -> Result<()> {
    let opts = TransactionExportOptions {
        from: parse_date_opt(from)?,
        to: parse_date_opt(to)?,
        group_id: group.map(String::from),
    };
    let store = open_store(data_file)?;
    let csv = export_transactions_csv(store.state(), &opts)?;
    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "✅ Exported {} transactions to {}",
                csv.lines().count().saturating_sub(1),
                path.display()
            );
        }
        None => print!("{}", csv),
    }
    Ok(())
}

pub fn cmd_import(data_file: Option<&Path>, file: &Path, yes: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    // Validate before touching anything.
    let snapshot = parse_snapshot(&raw).context("Snapshot failed validation")?;

    if !yes
        && !confirm(&format!(
            "Replace all current data with {} ({} transactions)?",
            file.display(),
            snapshot.transactions.len()
        ))?
    {
        println!("Aborted");
        return Ok(());
    }

    let mut store = open_store(data_file)?;
    store.dispatch(Action::ImportState(Box::new(snapshot)))?;
    println!(
        "✅ Imported: {} transactions, balance {:.2}",
        store.state().transactions.len(),
        store.state().wallet_balance
    );
    Ok(())
}

pub fn cmd_notifications_list(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let history = &store.state().notification_history;
    if history.is_empty() {
        println!("No notifications");
        return Ok(());
    }
    for entry in history.iter().rev() {
        let icon = match entry.level {
            NoticeLevel::Info => "ℹ️ ",
            NoticeLevel::Success => "✅",
            NoticeLevel::Error => "⚠️ ",
        };
        let read = if entry.read { " " } else { "*" };
        println!("{}{} {}  {}", read, icon, entry.id, entry.message);
    }
    Ok(())
}

pub fn cmd_notifications_mark_read(data_file: Option<&Path>) -> Result<()> {
    let mut store = open_store(data_file)?;
    store.dispatch(Action::MarkNotificationsRead)?;
    println!("Marked all notifications as read");
    Ok(())
}

pub fn cmd_notifications_clear(data_file: Option<&Path>) -> Result<()> {
    let mut store = open_store(data_file)?;
    store.dispatch(Action::ClearNotificationHistory)?;
    println!("Cleared notification history");
    Ok(())
}
