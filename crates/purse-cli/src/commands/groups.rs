//! Group and client commands

use std::path::Path;

use anyhow::Result;
use purse_core::analytics::group_balance;
use purse_core::store::Action;

use super::{dispatch_and_report, open_store};

pub fn cmd_groups_list(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();

    println!("Groups:");
    for group in &state.groups {
        let balance = group_balance(&state.transactions, &group.id);
        let budget = group
            .monthly_budget
            .map(|b| format!("budget {:.2}/mo", b))
            .unwrap_or_else(|| "no budget".to_string());
        println!(
            "  {}  {} {}  net {:>10.2}  ({})",
            group.id,
            group.icon.as_deref().unwrap_or("·"),
            group.name,
            balance.net,
            budget
        );
    }
    Ok(())
}

pub fn cmd_groups_add(
    data_file: Option<&Path>,
    name: &str,
    icon: Option<&str>,
    budget: Option<f64>,
) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(
        &mut store,
        Action::AddGroup {
            name: name.to_string(),
            icon: icon.map(String::from),
            monthly_budget: budget,
        },
    )?;
    if let Some(group) = store.state().groups.last() {
        if group.name == name {
            println!("Added group {} ({})", group.name, group.id);
        }
    }
    Ok(())
}

pub fn cmd_groups_set_budget(
    data_file: Option<&Path>,
    id: &str,
    amount: Option<f64>,
) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(
        &mut store,
        Action::SetGroupBudget {
            id: id.to_string(),
            amount,
        },
    )?;
    match amount {
        Some(amount) => println!("Budget for {} set to {:.2}/mo", id, amount),
        None => println!("Budget for {} cleared", id),
    }
    Ok(())
}

pub fn cmd_groups_delete(data_file: Option<&Path>, id: &str, cascade: bool) -> Result<()> {
    let mut store = open_store(data_file)?;
    let existed = store.state().group(id).is_some();
    dispatch_and_report(
        &mut store,
        Action::DeleteGroup {
            id: id.to_string(),
            cascade,
        },
    )?;
    if existed && store.state().group(id).is_none() {
        println!("Deleted group {}", id);
    }
    Ok(())
}

pub fn cmd_clients_list(data_file: Option<&Path>, group: Option<&str>) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();

    println!("Clients:");
    for client in state
        .clients
        .iter()
        .filter(|c| group.map(|g| c.group_id == g).unwrap_or(true))
    {
        println!(
            "  {}  {} {}  (group {}){}",
            client.id,
            client.icon.as_deref().unwrap_or("·"),
            client.name,
            state.group_name(&client.group_id),
            client
                .contact
                .as_deref()
                .map(|c| format!("  {}", c))
                .unwrap_or_default()
        );
    }
    Ok(())
}

pub fn cmd_clients_add(
    data_file: Option<&Path>,
    name: &str,
    group: &str,
    icon: Option<&str>,
    contact: Option<&str>,
) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(
        &mut store,
        Action::AddClient {
            name: name.to_string(),
            group_id: group.to_string(),
            icon: icon.map(String::from),
            contact: contact.map(String::from),
        },
    )?;
    if let Some(client) = store.state().clients.last() {
        if client.name == name {
            println!("Added client {} ({})", client.name, client.id);
        }
    }
    Ok(())
}

pub fn cmd_clients_delete(data_file: Option<&Path>, id: &str) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(&mut store, Action::DeleteClient { id: id.to_string() })?;
    println!("Deleted client {}", id);
    Ok(())
}
