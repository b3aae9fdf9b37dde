//! Transaction commands

use std::path::Path;

use anyhow::Result;
use purse_core::analytics::{filter_window, TimeWindow};
use purse_core::models::{NewTransaction, TransactionPatch, TransactionType};
use purse_core::store::Action;
use purse_core::Assistant;

use super::{dispatch_and_report, open_store, parse_date_opt, today};

#[allow(clippy::too_many_arguments)]
pub async fn cmd_add(
    data_file: Option<&Path>,
    amount: f64,
    kind: &str,
    group: &str,
    client: Option<&str>,
    date: Option<&str>,
    note: Option<&str>,
    currency: Option<&str>,
    suggest_note: bool,
) -> Result<()> {
    let kind: TransactionType = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let date = parse_date_opt(date)?.unwrap_or_else(today);

    let mut store = open_store(data_file)?;

    let mut note = note.map(String::from);
    if note.is_none() && suggest_note {
        if let Some(assistant) = Assistant::from_env() {
            let counterparty = client
                .map(|id| store.state().client_name(id).to_string())
                .unwrap_or_else(|| store.state().group_name(group).to_string());
            let suggestion = assistant
                .suggest_note(store.state(), kind, amount, &counterparty)
                .await;
            if !suggestion.is_empty() {
                println!("💡 Suggested note: {}", suggestion);
                note = Some(suggestion);
            }
        }
    }

    dispatch_and_report(
        &mut store,
        Action::AddTransaction(NewTransaction {
            amount,
            currency: currency.map(String::from),
            kind,
            date,
            group_id: group.to_string(),
            client_id: client.map(String::from),
            note,
        }),
    )?;

    if let Some(tx) = store.state().transactions.first() {
        if tx.amount == amount && tx.date == date {
            println!(
                "Recorded {} {} of {:.2} {} → balance {:.2}",
                tx.id,
                tx.kind,
                tx.amount,
                tx.currency,
                store.state().wallet_balance
            );
        }
    }
    Ok(())
}

pub fn cmd_tx_list(
    data_file: Option<&Path>,
    window: &str,
    group: Option<&str>,
    limit: usize,
) -> Result<()> {
    let window: TimeWindow = window.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let store = open_store(data_file)?;
    let state = store.state();

    let mut rows = filter_window(&state.transactions, window, today());
    if let Some(group) = group {
        rows.retain(|t| t.group_id == group);
    }

    println!("Transactions ({}, {} shown):", window, rows.len().min(limit));
    for tx in rows.iter().take(limit) {
        println!(
            "  {}  {}  {:>10.2} {}  {:8}  {}  {}",
            tx.id,
            tx.date,
            tx.amount,
            tx.currency,
            tx.kind.to_string(),
            state.group_name(&tx.group_id),
            tx.note.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub fn cmd_tx_update(
    data_file: Option<&Path>,
    id: &str,
    amount: Option<f64>,
    kind: Option<&str>,
    date: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<TransactionType>())
        .transpose()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let date = parse_date_opt(date)?;

    let mut store = open_store(data_file)?;
    let existed = store.state().transactions.iter().any(|t| t.id == id);
    dispatch_and_report(
        &mut store,
        Action::UpdateTransaction {
            id: id.to_string(),
            patch: TransactionPatch {
                amount,
                kind,
                date,
                note: note.map(String::from),
                ..Default::default()
            },
        },
    )?;
    if existed {
        println!("Updated {} → balance {:.2}", id, store.state().wallet_balance);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

pub fn cmd_tx_delete(data_file: Option<&Path>, id: &str) -> Result<()> {
    let mut store = open_store(data_file)?;
    let existed = store.state().transactions.iter().any(|t| t.id == id);
    dispatch_and_report(
        &mut store,
        Action::DeleteTransaction { id: id.to_string() },
    )?;
    if existed {
        println!("Deleted {} → balance {:.2}", id, store.state().wallet_balance);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}
