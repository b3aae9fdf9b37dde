//! Derived-value engine
//!
//! Pure, read-only projections over a state snapshot. Everything here is
//! recomputable from scratch; no function keeps hidden state. Given the
//! same collections and the same "today", results are identical, which is
//! what makes the analytics views and the AI context summary testable.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::models::{
    AppState, Client, DataSource, Group, GroupAxis, Installment, InstallmentStatus, Transaction,
    TransactionType,
};

/// Budget ratio at which a group is flagged as approaching its limit
pub const NEAR_BUDGET_THRESHOLD: f64 = 0.8;

/// Sum of all income amounts
pub fn total_income(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Income)
        .map(|t| t.amount)
        .sum()
}

/// Sum of all expense amounts
pub fn total_expense(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Expense)
        .map(|t| t.amount)
        .sum()
}

/// Income minus expense over the whole log
///
/// The store's cached `wallet_balance` must always agree with this.
pub fn net_balance(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.balance_effect()).sum()
}

/// Income/expense/net totals for one group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupBalance {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

/// Totals over all transactions referencing `group_id`
pub fn group_balance(transactions: &[Transaction], group_id: &str) -> GroupBalance {
    let mut income = 0.0;
    let mut expense = 0.0;
    for tx in transactions.iter().filter(|t| t.group_id == group_id) {
        match tx.kind {
            TransactionType::Income => income += tx.amount,
            TransactionType::Expense => expense += tx.amount,
        }
    }
    GroupBalance {
        income,
        expense,
        net: income - expense,
    }
}

/// How far a group is through its monthly budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLevel {
    Within,
    /// At or past the near threshold, not yet over
    Near,
    /// Past 100%
    Exceeded,
}

/// Budget consumption for one group in one calendar month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    pub budget: f64,
    pub spent: f64,
    /// spent / budget
    pub ratio: f64,
    pub level: BudgetLevel,
}

/// Budget consumption for the calendar month containing `month_of`
///
/// Returns None when the group has no budget configured.
pub fn monthly_budget_status(
    group: &Group,
    transactions: &[Transaction],
    month_of: NaiveDate,
) -> Option<BudgetStatus> {
    use chrono::Datelike;

    let budget = group.monthly_budget?;
    let spent: f64 = transactions
        .iter()
        .filter(|t| {
            t.group_id == group.id
                && t.kind == TransactionType::Expense
                && t.date.year() == month_of.year()
                && t.date.month() == month_of.month()
        })
        .map(|t| t.amount)
        .sum();
    let ratio = spent / budget;
    let level = if ratio > 1.0 {
        BudgetLevel::Exceeded
    } else if ratio >= NEAR_BUDGET_THRESHOLD {
        BudgetLevel::Near
    } else {
        BudgetLevel::Within
    };
    Some(BudgetStatus {
        budget,
        spent,
        ratio,
        level,
    })
}

/// Trailing time window for analytics filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Days7,
    #[default]
    Days30,
    Days365,
    All,
}

impl TimeWindow {
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::Days7 => Some(7),
            Self::Days30 => Some(30),
            Self::Days365 => Some(365),
            Self::All => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days7 => "7d",
            Self::Days30 => "30d",
            Self::Days365 => "365d",
            Self::All => "all",
        }
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "7d" => Ok(Self::Days7),
            "30d" => Ok(Self::Days30),
            "365d" => Ok(Self::Days365),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown time window: {} (use 7d, 30d, 365d, all)", s)),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transactions within the trailing window, lower edge inclusive
///
/// A transaction dated exactly `window` days before `today` is included;
/// one day older is not. Dates are UTC calendar days, so there is no
/// time-of-day component to go wrong at midnight.
pub fn filter_window<'a>(
    transactions: &'a [Transaction],
    window: TimeWindow,
    today: NaiveDate,
) -> Vec<&'a Transaction> {
    match window.days() {
        None => transactions.iter().collect(),
        Some(days) => {
            let cutoff = today - Duration::days(days);
            transactions.iter().filter(|t| t.date >= cutoff).collect()
        }
    }
}

/// One aggregated point for a chart widget
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Aggregate transactions for a chart widget
///
/// Groups the given transactions by the axis, summing per key according
/// to the data source (`Net` subtracts expenses). Group/client axes sort
/// descending by value; the date axis stays chronological. `cap` keeps
/// the top N after sorting.
pub fn chart_series(
    transactions: &[&Transaction],
    source: DataSource,
    axis: GroupAxis,
    groups: &[Group],
    clients: &[Client],
    cap: Option<usize>,
) -> Vec<ChartPoint> {
    // BTreeMap keeps date keys ordered and the output deterministic.
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();

    for tx in transactions {
        let contribution = match (source, tx.kind) {
            (DataSource::Income, TransactionType::Income) => tx.amount,
            (DataSource::Expense, TransactionType::Expense) => tx.amount,
            (DataSource::Net, TransactionType::Income) => tx.amount,
            (DataSource::Net, TransactionType::Expense) => -tx.amount,
            _ => continue,
        };
        let key = match axis {
            GroupAxis::Group => groups
                .iter()
                .find(|g| g.id == tx.group_id)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            GroupAxis::Client => tx
                .client_id
                .as_deref()
                .and_then(|id| clients.iter().find(|c| c.id == id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            GroupAxis::Date => tx.date.to_string(),
        };
        *buckets.entry(key).or_insert(0.0) += contribution;
    }

    let mut points: Vec<ChartPoint> = buckets
        .into_iter()
        .map(|(label, value)| ChartPoint { label, value })
        .collect();

    if axis != GroupAxis::Date {
        points.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    }
    if let Some(cap) = cap {
        points.truncate(cap);
    }
    points
}

/// Running wallet balance by day, for trend charts
pub fn running_balance_by_day(transactions: &[Transaction]) -> Vec<(NaiveDate, f64)> {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for tx in transactions {
        *daily.entry(tx.date).or_insert(0.0) += tx.balance_effect();
    }
    let mut running = 0.0;
    daily
        .into_iter()
        .map(|(date, net)| {
            running += net;
            (date, running)
        })
        .collect()
}

/// Rollup across active installment plans
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InstallmentSummary {
    /// Sum of monthly amounts still being paid
    pub monthly_commitment: f64,
    /// Sum of principal plus interest
    pub total_obligation: f64,
    /// Amount already paid in
    pub total_paid: f64,
    /// Obligation minus paid
    pub total_remaining: f64,
    /// Payments left across all active plans
    pub remaining_months: u32,
}

/// Totals over all `Active` installments
pub fn installment_summary(installments: &[Installment]) -> InstallmentSummary {
    let mut summary = InstallmentSummary::default();
    for inst in installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Active)
    {
        summary.monthly_commitment += inst.monthly_amount;
        summary.total_obligation += inst.total_with_interest();
        summary.total_paid += inst.total_paid();
        summary.remaining_months += inst.remaining_months();
    }
    summary.total_remaining = summary.total_obligation - summary.total_paid;
    summary
}

/// Budget statuses for every budgeted group, for the dashboard
pub fn budget_overview(state: &AppState, month_of: NaiveDate) -> Vec<(String, BudgetStatus)> {
    state
        .groups
        .iter()
        .filter_map(|g| {
            monthly_budget_status(g, &state.transactions, month_of)
                .map(|status| (g.name.clone(), status))
        })
        .collect()
}
