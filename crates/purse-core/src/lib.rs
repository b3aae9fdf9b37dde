//! Purse Core Library
//!
//! Shared functionality for the Purse personal finance tracker:
//! - Domain model (transactions, groups, clients, installment plans)
//! - Reducer-driven state store with a single dispatch point
//! - Derived-value engine (balances, budgets, chart aggregates)
//! - AI mediation layer (context assembly, tool-call validation)
//! - Snapshot persistence and export

pub mod ai;
pub mod analytics;
pub mod assistant;
pub mod context;
pub mod error;
pub mod export;
pub mod models;
pub mod snapshot;
pub mod store;
pub mod tools;

pub use ai::{AiBackend, AiClient, ChatMode, GeminiBackend, InlineImage, MockBackend};
pub use analytics::{
    BudgetLevel, BudgetStatus, ChartPoint, GroupBalance, InstallmentSummary, TimeWindow,
};
pub use assistant::{accept_proposal, Assistant, ChatReply};
pub use error::{Error, Result};
pub use export::{export_transactions_csv, TransactionExportOptions};
pub use models::AppState;
pub use snapshot::{export_state, parse_snapshot, SnapshotStore};
pub use store::{apply, Action, Store};
pub use tools::{InstallmentProposal, ToolInvocation};
