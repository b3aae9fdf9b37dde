//! Core commands: init, status, login/logout, config, reset

use std::path::Path;

use anyhow::Result;
use purse_core::analytics::{self, installment_summary};
use purse_core::models::{Language, ProfilePatch};
use purse_core::store::Action;

use super::{confirm, dispatch_and_report, open_store};

pub fn cmd_init(data_file: Option<&Path>) -> Result<()> {
    let mut store = open_store(data_file)?;
    // Touch the snapshot so the file exists on disk.
    store.dispatch(Action::SetNotification(None))?;
    println!("✅ Purse initialized");
    println!();
    println!("Next steps:");
    println!("  1. Add a group:        purse groups add Household --budget 2000");
    println!("  2. Record an expense:  purse add --amount 40 --group <id>");
    println!("  3. See where you are:  purse report summary");
    Ok(())
}

pub fn cmd_status(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();

    println!("💰 Balance: {:.2} {}", state.wallet_balance, state.base_currency);
    println!(
        "   {} transactions | {} groups | {} clients | {} installment plans",
        state.transactions.len(),
        state.groups.len(),
        state.clients.len(),
        state.installments.len()
    );

    let summary = installment_summary(&state.installments);
    if summary.remaining_months > 0 {
        println!(
            "   Monthly commitment: {:.2} ({} payments left, {:.2} outstanding)",
            summary.monthly_commitment, summary.remaining_months, summary.total_remaining
        );
    }

    if state.user_profile.is_authenticated {
        println!("   Signed in as {}", state.user_profile.name);
    } else {
        println!("   Not signed in");
    }
    if state.is_pro {
        println!("   Tier: PRO");
    }

    // The cached balance must always agree with the log.
    let recomputed = analytics::net_balance(&state.transactions);
    if (state.wallet_balance - recomputed).abs() > 1e-6 {
        println!(
            "⚠️  Balance drift detected: cached {:.2} vs recomputed {:.2}",
            state.wallet_balance, recomputed
        );
    }
    Ok(())
}

pub fn cmd_login(data_file: Option<&Path>, name: &str, email: Option<&str>) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(
        &mut store,
        Action::Login(ProfilePatch {
            name: Some(name.to_string()),
            email: email.map(String::from),
            avatar: None,
        }),
    )
}

pub fn cmd_logout(data_file: Option<&Path>) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(&mut store, Action::Logout)
}

pub fn cmd_config_show(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();
    println!("Language:  {}", state.language.instruction_name());
    println!("Dark mode: {}", if state.dark_mode { "on" } else { "off" });
    println!("Auto-sync: {}", if state.auto_sync { "on" } else { "off" });
    println!("Pro tier:  {}", if state.is_pro { "on" } else { "off" });
    println!("Currency:  {}", state.base_currency);
    println!("AI model:  {}", state.api_config.model);
    Ok(())
}

pub fn cmd_config_pro(data_file: Option<&Path>, value: &str) -> Result<()> {
    let enabled = match value.to_lowercase().as_str() {
        "on" | "true" => true,
        "off" | "false" => false,
        other => anyhow::bail!("Expected on/off, got '{}'", other),
    };
    let mut store = open_store(data_file)?;
    store.dispatch(Action::SetPro(enabled))?;
    println!("Pro tier {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

pub fn cmd_config_toggle_language(data_file: Option<&Path>) -> Result<()> {
    let mut store = open_store(data_file)?;
    store.dispatch(Action::ToggleLanguage)?;
    let lang = match store.state().language {
        Language::Ar => "Arabic",
        Language::En => "English",
    };
    println!("Language set to {}", lang);
    Ok(())
}

pub fn cmd_config_toggle_dark_mode(data_file: Option<&Path>) -> Result<()> {
    let mut store = open_store(data_file)?;
    store.dispatch(Action::ToggleDarkMode)?;
    println!(
        "Dark mode {}",
        if store.state().dark_mode { "on" } else { "off" }
    );
    Ok(())
}

pub fn cmd_config_toggle_auto_sync(data_file: Option<&Path>) -> Result<()> {
    let mut store = open_store(data_file)?;
    store.dispatch(Action::ToggleAutoSync)?;
    println!(
        "Auto-sync {}",
        if store.state().auto_sync { "on" } else { "off" }
    );
    Ok(())
}

pub fn cmd_reset(data_file: Option<&Path>, yes: bool) -> Result<()> {
    if !yes && !confirm("This deletes all local data. Continue?")? {
        println!("Aborted");
        return Ok(());
    }
    let mut store = open_store(data_file)?;
    store.dispatch(Action::ResetData)?;
    println!("✅ Data reset to defaults");
    Ok(())
}
