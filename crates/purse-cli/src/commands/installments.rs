//! Installment plan commands

use std::path::Path;

use anyhow::Result;
use purse_core::models::{InstallmentStatus, InstallmentType, NewInstallment};
use purse_core::store::Action;

use super::{dispatch_and_report, open_store, parse_date_opt, today};

pub fn cmd_installments_list(data_file: Option<&Path>, all: bool) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();

    println!("Installment plans:");
    for inst in state
        .installments
        .iter()
        .filter(|i| all || i.status == InstallmentStatus::Active)
    {
        println!(
            "  {}  {} [{}]  {:.2}/mo  {}/{} paid  {}",
            inst.id,
            inst.title,
            inst.kind,
            inst.monthly_amount,
            inst.paid_count,
            inst.installment_count,
            inst.status
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_installments_add(
    data_file: Option<&Path>,
    title: &str,
    total: f64,
    count: u32,
    rate: f64,
    start: Option<&str>,
    kind: &str,
    group: Option<&str>,
) -> Result<()> {
    let kind: InstallmentType = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let start = parse_date_opt(start)?.unwrap_or_else(today);

    let mut store = open_store(data_file)?;
    dispatch_and_report(
        &mut store,
        Action::AddInstallment(NewInstallment {
            title: title.to_string(),
            total_amount: total,
            interest_rate: rate,
            start_date: start,
            installment_count: count,
            kind,
            linked_group_id: group.map(String::from),
        }),
    )?;
    if let Some(inst) = store.state().installments.last() {
        if inst.title == title {
            println!(
                "Added plan {} ({}): {:.2}/mo for {} months",
                inst.title, inst.id, inst.monthly_amount, inst.installment_count
            );
        }
    }
    Ok(())
}

pub fn cmd_installments_pay(
    data_file: Option<&Path>,
    id: &str,
    penalty: f64,
    date: Option<&str>,
) -> Result<()> {
    let date = parse_date_opt(date)?.unwrap_or_else(today);
    let mut store = open_store(data_file)?;
    let before = store.state().installment(id).map(|i| i.paid_count);
    dispatch_and_report(
        &mut store,
        Action::PayInstallment {
            id: id.to_string(),
            penalty,
            date,
        },
    )?;
    if let Some(inst) = store.state().installment(id) {
        if Some(inst.paid_count) != before {
            println!(
                "Paid {} ({}/{}) → balance {:.2}",
                inst.title,
                inst.paid_count,
                inst.installment_count,
                store.state().wallet_balance
            );
        }
    }
    Ok(())
}

pub fn cmd_installments_delete(data_file: Option<&Path>, id: &str) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(&mut store, Action::DeleteInstallment { id: id.to_string() })?;
    println!("Deleted plan {}", id);
    Ok(())
}
