//! Purse CLI - Personal finance tracker
//!
//! Usage:
//!   purse init                       Create the state snapshot
//!   purse add --amount 40 --group g-1   Record an expense
//!   purse report summary             Show balances
//!   purse chat "what did I spend?"   Ask the assistant

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data_file = cli.data_file.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(data_file),
        Commands::Status => commands::cmd_status(data_file),
        Commands::Add {
            amount,
            kind,
            group,
            client,
            date,
            note,
            currency,
            suggest_note,
        } => {
            commands::cmd_add(
                data_file,
                amount,
                &kind,
                &group,
                client.as_deref(),
                date.as_deref(),
                note.as_deref(),
                currency.as_deref(),
                suggest_note,
            )
            .await
        }
        Commands::Tx { action } => match action {
            TxAction::List {
                window,
                group,
                limit,
            } => commands::cmd_tx_list(data_file, &window, group.as_deref(), limit),
            TxAction::Update {
                id,
                amount,
                kind,
                date,
                note,
            } => commands::cmd_tx_update(
                data_file,
                &id,
                amount,
                kind.as_deref(),
                date.as_deref(),
                note.as_deref(),
            ),
            TxAction::Delete { id } => commands::cmd_tx_delete(data_file, &id),
        },
        Commands::Groups { action } => match action {
            None | Some(GroupsAction::List) => commands::cmd_groups_list(data_file),
            Some(GroupsAction::Add { name, icon, budget }) => {
                commands::cmd_groups_add(data_file, &name, icon.as_deref(), budget)
            }
            Some(GroupsAction::SetBudget { id, amount }) => {
                commands::cmd_groups_set_budget(data_file, &id, amount)
            }
            Some(GroupsAction::Delete { id, cascade }) => {
                commands::cmd_groups_delete(data_file, &id, cascade)
            }
        },
        Commands::Clients { action } => match action {
            None | Some(ClientsAction::List { group: None }) => {
                commands::cmd_clients_list(data_file, None)
            }
            Some(ClientsAction::List { group }) => {
                commands::cmd_clients_list(data_file, group.as_deref())
            }
            Some(ClientsAction::Add {
                name,
                group,
                icon,
                contact,
            }) => commands::cmd_clients_add(
                data_file,
                &name,
                &group,
                icon.as_deref(),
                contact.as_deref(),
            ),
            Some(ClientsAction::Delete { id }) => commands::cmd_clients_delete(data_file, &id),
        },
        Commands::Installments { action } => match action {
            None | Some(InstallmentsAction::List { all: false }) => {
                commands::cmd_installments_list(data_file, false)
            }
            Some(InstallmentsAction::List { all }) => {
                commands::cmd_installments_list(data_file, all)
            }
            Some(InstallmentsAction::Add {
                title,
                total,
                count,
                rate,
                start,
                kind,
                group,
            }) => commands::cmd_installments_add(
                data_file,
                &title,
                total,
                count,
                rate,
                start.as_deref(),
                &kind,
                group.as_deref(),
            ),
            Some(InstallmentsAction::Pay { id, penalty, date }) => {
                commands::cmd_installments_pay(data_file, &id, penalty, date.as_deref())
            }
            Some(InstallmentsAction::Delete { id }) => {
                commands::cmd_installments_delete(data_file, &id)
            }
        },
        Commands::Report { report_type } => match report_type {
            ReportType::Summary => commands::cmd_report_summary(data_file),
            ReportType::Budget => commands::cmd_report_budget(data_file),
            ReportType::Chart {
                source,
                group_by,
                window,
                top,
            } => commands::cmd_report_chart(data_file, &source, &group_by, &window, top),
            ReportType::Installments => commands::cmd_report_installments(data_file),
        },
        Commands::Widgets { action } => match action {
            None | Some(WidgetsAction::List) => commands::cmd_widgets_list(data_file),
            Some(WidgetsAction::Add {
                title,
                chart_type,
                source,
                group_by,
                theme,
                description,
            }) => commands::cmd_widgets_add(
                data_file,
                &title,
                &chart_type,
                &source,
                &group_by,
                &theme,
                description.as_deref(),
            ),
            Some(WidgetsAction::Remove { id }) => commands::cmd_widgets_remove(data_file, &id),
        },
        Commands::Chat {
            message,
            architect,
            image,
        } => commands::cmd_chat(data_file, &message, architect, image.as_deref()).await,
        Commands::Notifications { action } => match action {
            None | Some(NotificationsAction::List) => commands::cmd_notifications_list(data_file),
            Some(NotificationsAction::MarkRead) => commands::cmd_notifications_mark_read(data_file),
            Some(NotificationsAction::Clear) => commands::cmd_notifications_clear(data_file),
        },
        Commands::Export { export_type } => match export_type {
            ExportType::Full { output } => commands::cmd_export_full(data_file, &output),
            ExportType::Transactions {
                output,
                from,
                to,
                group,
            } => commands::cmd_export_transactions(
                data_file,
                output.as_deref(),
                from.as_deref(),
                to.as_deref(),
                group.as_deref(),
            ),
        },
        Commands::Import { file, yes } => commands::cmd_import(data_file, &file, yes),
        Commands::Reset { yes } => commands::cmd_reset(data_file, yes),
        Commands::Login { name, email } => commands::cmd_login(data_file, &name, email.as_deref()),
        Commands::Logout => commands::cmd_logout(data_file),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::cmd_config_show(data_file),
            ConfigAction::Pro { value } => commands::cmd_config_pro(data_file, &value),
            ConfigAction::ToggleLanguage => commands::cmd_config_toggle_language(data_file),
            ConfigAction::ToggleDarkMode => commands::cmd_config_toggle_dark_mode(data_file),
            ConfigAction::ToggleAutoSync => commands::cmd_config_toggle_auto_sync(data_file),
        },
    }
}
