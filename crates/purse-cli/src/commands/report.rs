//! Analytics reports and widget management

use std::path::Path;

use anyhow::Result;
use purse_core::analytics::{
    budget_overview, chart_series, filter_window, group_balance, installment_summary,
    total_expense, total_income, BudgetLevel, TimeWindow,
};
use purse_core::models::{ChartSpec, ChartType, ColorTheme, DataSource, GroupAxis};
use purse_core::store::Action;

use super::{dispatch_and_report, open_store, today};

pub fn cmd_report_summary(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();

    println!("📊 Summary");
    println!(
        "   Income {:.2} | Expense {:.2} | Balance {:.2} {}",
        total_income(&state.transactions),
        total_expense(&state.transactions),
        state.wallet_balance,
        state.base_currency
    );
    println!();
    for group in &state.groups {
        let balance = group_balance(&state.transactions, &group.id);
        if balance.income == 0.0 && balance.expense == 0.0 {
            continue;
        }
        println!(
            "   {:20}  +{:>10.2}  -{:>10.2}  net {:>10.2}",
            group.name, balance.income, balance.expense, balance.net
        );
    }
    Ok(())
}

pub fn cmd_report_budget(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();

    println!("📊 Budgets for {}", today().format("%B %Y"));
    let overview = budget_overview(state, today());
    if overview.is_empty() {
        println!("   No groups have a monthly budget");
        return Ok(());
    }
    for (name, status) in overview {
        let marker = match status.level {
            BudgetLevel::Within => "  ",
            BudgetLevel::Near => "⚠️ ",
            BudgetLevel::Exceeded => "🔴",
        };
        println!(
            "   {} {:20}  {:>8.2} / {:>8.2}  ({:.0}%)",
            marker,
            name,
            status.spent,
            status.budget,
            status.ratio * 100.0
        );
    }
    Ok(())
}

pub fn cmd_report_chart(
    data_file: Option<&Path>,
    source: &str,
    group_by: &str,
    window: &str,
    top: Option<usize>,
) -> Result<()> {
    let source: DataSource = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let axis: GroupAxis = group_by.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let window: TimeWindow = window.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let store = open_store(data_file)?;
    let state = store.state();
    let filtered = filter_window(&state.transactions, window, today());
    let points = chart_series(&filtered, source, axis, &state.groups, &state.clients, top);

    println!("📊 {} by {} ({})", source.as_str(), axis.as_str(), window);
    let max = points
        .iter()
        .map(|p| p.value.abs())
        .fold(0.0_f64, f64::max)
        .max(1.0);
    for point in &points {
        let bar = "█".repeat(((point.value.abs() / max) * 30.0).round() as usize);
        println!("   {:20} {:>12.2}  {}", point.label, point.value, bar);
    }
    Ok(())
}

pub fn cmd_report_installments(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let summary = installment_summary(&store.state().installments);

    println!("📊 Installments (active plans)");
    println!("   Monthly commitment: {:>12.2}", summary.monthly_commitment);
    println!("   Total obligation:   {:>12.2}", summary.total_obligation);
    println!("   Paid so far:        {:>12.2}", summary.total_paid);
    println!("   Remaining:          {:>12.2}", summary.total_remaining);
    println!("   Payments left:      {:>12}", summary.remaining_months);
    Ok(())
}

pub fn cmd_widgets_list(data_file: Option<&Path>) -> Result<()> {
    let store = open_store(data_file)?;
    let state = store.state();

    println!("Active widgets:");
    for id in &state.active_widgets {
        println!("  {}", id);
    }
    if !state.custom_widgets.is_empty() {
        println!("Custom widgets:");
        for widget in &state.custom_widgets {
            println!(
                "  {}  {} ({} of {} by {}, {})",
                widget.id,
                widget.title,
                widget.chart_type.as_str(),
                widget.data_source.as_str(),
                widget.group_by.as_str(),
                widget.color_theme.as_str()
            );
        }
    }
    Ok(())
}

pub fn cmd_widgets_add(
    data_file: Option<&Path>,
    title: &str,
    chart_type: &str,
    source: &str,
    group_by: &str,
    theme: &str,
    description: Option<&str>,
) -> Result<()> {
    let chart_type: ChartType = chart_type.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let data_source: DataSource = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let group_by: GroupAxis = group_by.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let color_theme: ColorTheme = theme.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let mut store = open_store(data_file)?;
    dispatch_and_report(
        &mut store,
        Action::AddCustomWidget(ChartSpec {
            title: title.to_string(),
            description: description.unwrap_or("Custom widget").to_string(),
            chart_type,
            data_source,
            group_by,
            color_theme,
        }),
    )?;
    if let Some(widget) = store.state().custom_widgets.last() {
        println!("Added widget {} ({})", widget.title, widget.id);
    }
    Ok(())
}

pub fn cmd_widgets_remove(data_file: Option<&Path>, id: &str) -> Result<()> {
    let mut store = open_store(data_file)?;
    dispatch_and_report(
        &mut store,
        Action::RemoveAnalyticsWidget { id: id.to_string() },
    )?;
    println!("Removed widget {}", id);
    Ok(())
}
