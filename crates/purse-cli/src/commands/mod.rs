//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `chat` - Assistant conversation command
//! - `core` - Core commands (init, status, login, config, reset) and shared utilities
//! - `data` - Export/import and notification history commands
//! - `groups` - Group and client management commands
//! - `installments` - Installment plan commands
//! - `report` - Report generation and widget commands
//! - `transactions` - Transaction commands (add, list, update, delete)

pub mod chat;
pub mod core;
pub mod data;
pub mod groups;
pub mod installments;
pub mod report;
pub mod transactions;

// Re-export command functions for main.rs
pub use chat::*;
pub use core::*;
pub use data::*;
pub use groups::*;
pub use installments::*;
pub use report::*;
pub use transactions::*;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use purse_core::models::NoticeLevel;
use purse_core::snapshot::SnapshotStore;
use purse_core::store::{Action, Store};

/// Open the store, backed by the given snapshot file or the platform default
pub fn open_store(data_file: Option<&Path>) -> Result<Store> {
    let snapshots = match data_file {
        Some(path) => SnapshotStore::new(path.to_path_buf()),
        None => SnapshotStore::default_location().context("No data directory available")?,
    };
    Ok(Store::open(snapshots))
}

/// Today's UTC calendar day; stamped at the dispatch boundary so the
/// reducer itself stays deterministic
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", raw))
}

pub fn parse_date_opt(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(parse_date).transpose()
}

/// Ask a yes/no question on stdin, defaulting to no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Dispatch one action and echo the transient notification it raised
pub fn dispatch_and_report(store: &mut Store, action: Action) -> Result<()> {
    store.dispatch(Action::SetNotification(None))?;
    store.dispatch(action)?;
    if let Some(notice) = &store.state().notification {
        let icon = match notice.level {
            NoticeLevel::Info => "ℹ️ ",
            NoticeLevel::Success => "✅",
            NoticeLevel::Error => "⚠️ ",
        };
        println!("{} {}", icon, notice.message);
    }
    Ok(())
}
