//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Purse - Track income, expenses, and installment plans
#[derive(Parser)]
#[command(name = "purse")]
#[command(about = "Personal finance tracker with an AI assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// State snapshot file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the snapshot file with default state
    Init,

    /// Show balance and record counts
    Status,

    /// Record a transaction
    Add {
        /// Amount (positive)
        #[arg(long)]
        amount: f64,

        /// income or expense
        #[arg(long, default_value = "expense")]
        kind: String,

        /// Group id
        #[arg(long)]
        group: String,

        /// Client id
        #[arg(long)]
        client: Option<String>,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Free-form note
        #[arg(long)]
        note: Option<String>,

        /// Currency override
        #[arg(long)]
        currency: Option<String>,

        /// Ask the assistant to suggest a note when none is given
        #[arg(long)]
        suggest_note: bool,
    },

    /// Manage transactions (list, update, delete)
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },

    /// Manage groups (list, add, set-budget, delete)
    Groups {
        #[command(subcommand)]
        action: Option<GroupsAction>,
    },

    /// Manage clients (list, add, update, delete)
    Clients {
        #[command(subcommand)]
        action: Option<ClientsAction>,
    },

    /// Manage installment plans (list, add, pay, delete)
    Installments {
        #[command(subcommand)]
        action: Option<InstallmentsAction>,
    },

    /// Analytics reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Manage analytics widgets
    Widgets {
        #[command(subcommand)]
        action: Option<WidgetsAction>,
    },

    /// Chat with the AI assistant
    Chat {
        /// The message to send
        message: String,

        /// Use the pro architect chat (elevated capabilities)
        #[arg(long)]
        architect: bool,

        /// Attach an image file
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Show or manage the notification history
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationsAction>,
    },

    /// Export data
    Export {
        #[command(subcommand)]
        export_type: ExportType,
    },

    /// Import a full state snapshot, replacing current data
    Import {
        /// Snapshot JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Reset all data to defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Sign in (mocked, local only)
    Login {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out (keeps financial data)
    Logout,

    /// Preferences and tier flags
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum TxAction {
    /// List transactions
    List {
        /// Time window: 7d, 30d, 365d, all
        #[arg(long, default_value = "30d")]
        window: String,

        /// Restrict to one group id
        #[arg(long)]
        group: Option<String>,

        /// Maximum rows
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Update fields of a transaction
    Update {
        id: String,

        #[arg(long)]
        amount: Option<f64>,

        /// income or expense
        #[arg(long)]
        kind: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Delete a transaction (reverses its balance effect)
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum GroupsAction {
    /// List groups with their budgets
    List,

    /// Add a group
    Add {
        name: String,

        #[arg(long)]
        icon: Option<String>,

        /// Monthly budget
        #[arg(long)]
        budget: Option<f64>,
    },

    /// Set or clear a group's monthly budget
    SetBudget {
        id: String,

        /// New budget; omit to clear
        #[arg(long)]
        amount: Option<f64>,
    },

    /// Delete a group
    Delete {
        id: String,

        /// Also delete the group's clients and transactions
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(Subcommand)]
pub enum ClientsAction {
    /// List clients
    List {
        /// Restrict to one group id
        #[arg(long)]
        group: Option<String>,
    },

    /// Add a client
    Add {
        name: String,

        /// Owning group id
        #[arg(long)]
        group: String,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long)]
        contact: Option<String>,
    },

    /// Delete a client
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum InstallmentsAction {
    /// List installment plans
    List {
        /// Include completed plans
        #[arg(long)]
        all: bool,
    },

    /// Add an installment plan
    Add {
        #[arg(long)]
        title: String,

        /// Principal amount
        #[arg(long)]
        total: f64,

        /// Number of monthly payments
        #[arg(long)]
        count: u32,

        /// Interest percentage
        #[arg(long, default_value = "0")]
        rate: f64,

        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<String>,

        /// loan, purchase or jamiyah
        #[arg(long, default_value = "purchase")]
        kind: String,

        /// Group payments are tagged to
        #[arg(long)]
        group: Option<String>,
    },

    /// Record one monthly payment
    Pay {
        id: String,

        /// Late penalty added to this payment
        #[arg(long, default_value = "0")]
        penalty: f64,

        /// Payment date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a plan (past payments remain)
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Wallet totals and per-group balances
    Summary,

    /// Monthly budget consumption per group
    Budget,

    /// Aggregated chart data
    Chart {
        /// income, expense or net
        #[arg(long, default_value = "expense")]
        source: String,

        /// group, client or date
        #[arg(long, default_value = "group")]
        group_by: String,

        /// Time window: 7d, 30d, 365d, all
        #[arg(long, default_value = "30d")]
        window: String,

        /// Keep only the top N buckets
        #[arg(long)]
        top: Option<usize>,
    },

    /// Installment plan rollups
    Installments,
}

#[derive(Subcommand)]
pub enum WidgetsAction {
    /// List active and custom widgets
    List,

    /// Add a custom chart widget
    Add {
        #[arg(long)]
        title: String,

        /// bar, pie, area or line
        #[arg(long, default_value = "bar")]
        chart_type: String,

        /// income, expense or net
        #[arg(long, default_value = "expense")]
        source: String,

        /// group, client or date
        #[arg(long, default_value = "group")]
        group_by: String,

        /// blue, emerald, rose, amber or purple
        #[arg(long, default_value = "blue")]
        theme: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a widget by id
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List the notification history
    List,

    /// Mark all notifications as read
    MarkRead,

    /// Clear the notification history
    Clear,
}

#[derive(Subcommand)]
pub enum ExportType {
    /// Full state snapshot as JSON
    Full {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transactions as CSV
    Transactions {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Restrict to one group id
        #[arg(long)]
        group: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current preferences
    Show,

    /// Toggle the pro tier flag
    Pro {
        /// on or off
        value: String,
    },

    /// Switch between Arabic and English
    ToggleLanguage,

    /// Toggle dark mode
    ToggleDarkMode,

    /// Toggle snapshot auto-sync
    ToggleAutoSync,
}
