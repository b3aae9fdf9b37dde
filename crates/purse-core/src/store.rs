//! State store: the single authoritative mutation point
//!
//! All mutation flows through `apply(state, action)`, a pure function
//! with no hidden I/O, so mutation history is replayable and testable.
//! `Store` is the impure shell that owns the state tree, runs actions
//! through the reducer, and persists a snapshot after every dispatch.
//!
//! Actions that need "today" carry the date in their payload; the
//! caller stamps it at the dispatch boundary. That keeps the reducer
//! deterministic under replay.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::Result;
use crate::models::{
    AppNotification, AppState, ApiKeyDefinition, ChartSpec, ChatMessage, Client, ClientPatch,
    CustomWidget, Group, GroupPatch, Installment, InstallmentPatch, InstallmentStatus,
    NewInstallment, NewTransaction, Notice, NoticeLevel, ProfilePatch, Transaction,
    TransactionPatch, TransactionType, UserProfile, DEBTS_GROUP_ID,
};
use crate::snapshot::SnapshotStore;

/// Id of the API key auto-provisioned on first login
const DEFAULT_KEY_ID: &str = "key-default";

/// The closed set of state mutations
#[derive(Debug, Clone)]
pub enum Action {
    AddTransaction(NewTransaction),
    UpdateTransaction { id: String, patch: TransactionPatch },
    DeleteTransaction { id: String },
    AddGroup { name: String, icon: Option<String>, monthly_budget: Option<f64> },
    UpdateGroup { id: String, patch: GroupPatch },
    SetGroupBudget { id: String, amount: Option<f64> },
    DeleteGroup { id: String, cascade: bool },
    AddClient { name: String, group_id: String, icon: Option<String>, contact: Option<String> },
    UpdateClient { id: String, patch: ClientPatch },
    DeleteClient { id: String },
    AddInstallment(NewInstallment),
    PayInstallment { id: String, penalty: f64, date: NaiveDate },
    UpdateInstallment { id: String, patch: InstallmentPatch },
    DeleteInstallment { id: String },
    SetPro(bool),
    Login(ProfilePatch),
    Logout,
    UpdateProfile(UserProfile),
    AddApiKey { key: String, label: String },
    RemoveApiKey { id: String },
    SetActiveApiKey { id: String },
    AddChatMessage { message: ChatMessage, pro: bool },
    ClearChat { pro: bool },
    AddCustomWidget(ChartSpec),
    AddAnalyticsWidget { id: String },
    RemoveAnalyticsWidget { id: String },
    ToggleLanguage,
    ToggleDarkMode,
    ToggleAutoSync,
    SetNotification(Option<Notice>),
    MarkNotificationsRead,
    ClearNotificationHistory,
    ImportState(Box<AppState>),
    ResetData,
}

impl Action {
    /// Stable name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddTransaction(_) => "add_transaction",
            Self::UpdateTransaction { .. } => "update_transaction",
            Self::DeleteTransaction { .. } => "delete_transaction",
            Self::AddGroup { .. } => "add_group",
            Self::UpdateGroup { .. } => "update_group",
            Self::SetGroupBudget { .. } => "set_group_budget",
            Self::DeleteGroup { .. } => "delete_group",
            Self::AddClient { .. } => "add_client",
            Self::UpdateClient { .. } => "update_client",
            Self::DeleteClient { .. } => "delete_client",
            Self::AddInstallment(_) => "add_installment",
            Self::PayInstallment { .. } => "pay_installment",
            Self::UpdateInstallment { .. } => "update_installment",
            Self::DeleteInstallment { .. } => "delete_installment",
            Self::SetPro(_) => "set_pro",
            Self::Login(_) => "login",
            Self::Logout => "logout",
            Self::UpdateProfile(_) => "update_profile",
            Self::AddApiKey { .. } => "add_api_key",
            Self::RemoveApiKey { .. } => "remove_api_key",
            Self::SetActiveApiKey { .. } => "set_active_api_key",
            Self::AddChatMessage { .. } => "add_chat_message",
            Self::ClearChat { .. } => "clear_chat",
            Self::AddCustomWidget(_) => "add_custom_widget",
            Self::AddAnalyticsWidget { .. } => "add_analytics_widget",
            Self::RemoveAnalyticsWidget { .. } => "remove_analytics_widget",
            Self::ToggleLanguage => "toggle_language",
            Self::ToggleDarkMode => "toggle_dark_mode",
            Self::ToggleAutoSync => "toggle_auto_sync",
            Self::SetNotification(_) => "set_notification",
            Self::MarkNotificationsRead => "mark_notifications_read",
            Self::ClearNotificationHistory => "clear_notification_history",
            Self::ImportState(_) => "import_state",
            Self::ResetData => "reset_data",
        }
    }
}

/// Mint a fresh prefixed id from the state's counter
fn mint_id(state: &mut AppState, prefix: &str) -> String {
    let id = format!("{}-{}", prefix, state.next_id);
    state.next_id += 1;
    id
}

/// Set the transient notification and append it to history
fn notify(state: &mut AppState, message: impl Into<String>, level: NoticeLevel) {
    let message = message.into();
    let id = mint_id(state, "n");
    state.notification = Some(Notice {
        message: message.clone(),
        level,
    });
    state.notification_history.push(AppNotification {
        id,
        message,
        level,
        read: false,
    });
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Expense total for a group in the calendar month of `date`
fn month_expense_total(state: &AppState, group_id: &str, date: NaiveDate) -> f64 {
    state
        .transactions
        .iter()
        .filter(|t| {
            t.group_id == group_id
                && t.kind == TransactionType::Expense
                && same_month(t.date, date)
        })
        .map(|t| t.amount)
        .sum()
}

/// Surface a budget-exceeded notification when the group's spending for
/// the transaction's month has crossed its monthly budget. Informational
/// only, never rejects the transaction.
fn check_budget(state: &mut AppState, group_id: &str, date: NaiveDate) {
    let Some(group) = state.group(group_id) else {
        return;
    };
    let Some(budget) = group.monthly_budget else {
        return;
    };
    let name = group.name.clone();
    let spent = month_expense_total(state, group_id, date);
    if spent > budget {
        notify(
            state,
            format!("Budget alert: {} exceeded its monthly budget", name),
            NoticeLevel::Error,
        );
    }
}

/// Apply one action to the state tree, producing the next state
///
/// Pure: same state + same action always produce the same result.
/// Validation failures reject the action, leaving everything but the
/// transient notification untouched.
pub fn apply(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::AddTransaction(input) => {
            if input.amount <= 0.0 {
                notify(&mut state, "Amount must be positive", NoticeLevel::Error);
                return state;
            }
            if state.group(&input.group_id).is_none() {
                notify(
                    &mut state,
                    format!("Unknown group: {}", input.group_id),
                    NoticeLevel::Error,
                );
                return state;
            }
            if let Some(ref client_id) = input.client_id {
                if state.client(client_id).is_none() {
                    notify(
                        &mut state,
                        format!("Unknown client: {}", client_id),
                        NoticeLevel::Error,
                    );
                    return state;
                }
            }

            let id = mint_id(&mut state, "t");
            let tx = Transaction {
                id,
                amount: input.amount,
                currency: input
                    .currency
                    .unwrap_or_else(|| state.base_currency.clone()),
                kind: input.kind,
                date: input.date,
                group_id: input.group_id.clone(),
                client_id: input.client_id,
                note: input.note,
            };
            state.wallet_balance += tx.balance_effect();
            let is_expense = tx.kind == TransactionType::Expense;
            let date = tx.date;
            state.transactions.insert(0, tx);
            if is_expense {
                check_budget(&mut state, &input.group_id, date);
            }
            state
        }
        Action::UpdateTransaction { id, patch } => {
            let Some(idx) = state.transactions.iter().position(|t| t.id == id) else {
                return state;
            };
            if let Some(amount) = patch.amount {
                if amount <= 0.0 {
                    notify(&mut state, "Amount must be positive", NoticeLevel::Error);
                    return state;
                }
            }
            let tx = &mut state.transactions[idx];
            // Remove the old effect before mutating so the balance is
            // corrected exactly once, never double-counted.
            let old_effect = tx.balance_effect();
            if let Some(amount) = patch.amount {
                tx.amount = amount;
            }
            if let Some(currency) = patch.currency {
                tx.currency = currency;
            }
            if let Some(kind) = patch.kind {
                tx.kind = kind;
            }
            if let Some(date) = patch.date {
                tx.date = date;
            }
            if let Some(group_id) = patch.group_id {
                tx.group_id = group_id;
            }
            if let Some(client_id) = patch.client_id {
                tx.client_id = Some(client_id);
            }
            if let Some(note) = patch.note {
                tx.note = Some(note);
            }
            let new_effect = tx.balance_effect();
            state.wallet_balance += new_effect - old_effect;
            state
        }
        Action::DeleteTransaction { id } => {
            let Some(idx) = state.transactions.iter().position(|t| t.id == id) else {
                return state;
            };
            let tx = state.transactions.remove(idx);
            state.wallet_balance -= tx.balance_effect();
            state
        }
        Action::AddGroup {
            name,
            icon,
            monthly_budget,
        } => {
            if name.trim().is_empty() {
                notify(&mut state, "Group name is required", NoticeLevel::Error);
                return state;
            }
            let id = mint_id(&mut state, "g");
            state.groups.push(Group {
                id,
                name,
                icon,
                monthly_budget: monthly_budget.filter(|b| *b > 0.0),
            });
            state
        }
        Action::UpdateGroup { id, patch } => {
            let Some(group) = state.groups.iter_mut().find(|g| g.id == id) else {
                return state;
            };
            if let Some(name) = patch.name {
                group.name = name;
            }
            if let Some(icon) = patch.icon {
                group.icon = Some(icon);
            }
            if let Some(budget) = patch.monthly_budget {
                group.monthly_budget = Some(budget);
            }
            state
        }
        Action::SetGroupBudget { id, amount } => {
            if let Some(amount) = amount {
                if amount <= 0.0 {
                    notify(&mut state, "Budget must be positive", NoticeLevel::Error);
                    return state;
                }
            }
            let Some(group) = state.groups.iter_mut().find(|g| g.id == id) else {
                return state;
            };
            group.monthly_budget = amount;
            state
        }
        Action::DeleteGroup { id, cascade } => {
            if state.group(&id).is_none() {
                return state;
            }
            let referenced = state.transactions.iter().any(|t| t.group_id == id)
                || state.clients.iter().any(|c| c.group_id == id);
            if referenced && !cascade {
                notify(
                    &mut state,
                    "Group still has transactions or clients; delete with cascade to remove them",
                    NoticeLevel::Error,
                );
                return state;
            }
            if cascade {
                // Reverse each removed transaction's balance effect so the
                // wallet invariant survives the cascade.
                let removed: f64 = state
                    .transactions
                    .iter()
                    .filter(|t| t.group_id == id)
                    .map(|t| t.balance_effect())
                    .sum();
                state.wallet_balance -= removed;
                state.transactions.retain(|t| t.group_id != id);
                state.clients.retain(|c| c.group_id != id);
            }
            state.groups.retain(|g| g.id != id);
            state
        }
        Action::AddClient {
            name,
            group_id,
            icon,
            contact,
        } => {
            if name.trim().is_empty() {
                notify(&mut state, "Client name is required", NoticeLevel::Error);
                return state;
            }
            if state.group(&group_id).is_none() {
                notify(
                    &mut state,
                    format!("Unknown group: {}", group_id),
                    NoticeLevel::Error,
                );
                return state;
            }
            let id = mint_id(&mut state, "c");
            state.clients.push(Client {
                id,
                name,
                group_id,
                icon,
                contact,
            });
            state
        }
        Action::UpdateClient { id, patch } => {
            let Some(client) = state.clients.iter_mut().find(|c| c.id == id) else {
                return state;
            };
            if let Some(name) = patch.name {
                client.name = name;
            }
            if let Some(group_id) = patch.group_id {
                client.group_id = group_id;
            }
            if let Some(icon) = patch.icon {
                client.icon = Some(icon);
            }
            if let Some(contact) = patch.contact {
                client.contact = Some(contact);
            }
            state
        }
        Action::DeleteClient { id } => {
            // Transactions keep their client_id; dangling ids render "Unknown".
            state.clients.retain(|c| c.id != id);
            state
        }
        Action::AddInstallment(input) => {
            if input.title.trim().is_empty() {
                notify(&mut state, "Installment title is required", NoticeLevel::Error);
                return state;
            }
            if input.total_amount <= 0.0 {
                notify(&mut state, "Total amount must be positive", NoticeLevel::Error);
                return state;
            }
            if input.installment_count == 0 {
                notify(
                    &mut state,
                    "Installment count must be positive",
                    NoticeLevel::Error,
                );
                return state;
            }
            if input.interest_rate < 0.0 {
                notify(
                    &mut state,
                    "Interest rate cannot be negative",
                    NoticeLevel::Error,
                );
                return state;
            }
            let monthly_amount = Installment::monthly_amount_for(
                input.total_amount,
                input.interest_rate,
                input.installment_count,
            );
            let id = mint_id(&mut state, "i");
            state.installments.push(Installment {
                id,
                title: input.title,
                total_amount: input.total_amount,
                interest_rate: input.interest_rate,
                start_date: input.start_date,
                installment_count: input.installment_count,
                paid_count: 0,
                monthly_amount,
                status: InstallmentStatus::Active,
                kind: input.kind,
                last_payment_date: None,
                linked_group_id: input.linked_group_id,
            });
            state
        }
        Action::PayInstallment { id, penalty, date } => {
            if penalty < 0.0 {
                notify(&mut state, "Penalty cannot be negative", NoticeLevel::Error);
                return state;
            }
            let Some(idx) = state.installments.iter().position(|i| i.id == id) else {
                notify(
                    &mut state,
                    format!("Unknown installment: {}", id),
                    NoticeLevel::Error,
                );
                return state;
            };
            if state.installments[idx].status == InstallmentStatus::Completed {
                notify(
                    &mut state,
                    "Installment plan is already completed",
                    NoticeLevel::Info,
                );
                return state;
            }

            let (title, amount, group_id, paid, count) = {
                let inst = &state.installments[idx];
                (
                    inst.title.clone(),
                    inst.monthly_amount + penalty,
                    inst.linked_group_id
                        .clone()
                        .unwrap_or_else(|| DEBTS_GROUP_ID.to_string()),
                    inst.paid_count + 1,
                    inst.installment_count,
                )
            };

            let tx_id = mint_id(&mut state, "t");
            state.transactions.insert(
                0,
                Transaction {
                    id: tx_id,
                    amount,
                    currency: state.base_currency.clone(),
                    kind: TransactionType::Expense,
                    date,
                    group_id: group_id.clone(),
                    client_id: None,
                    note: Some(format!("Installment payment: {} ({}/{})", title, paid, count)),
                },
            );
            state.wallet_balance -= amount;

            let inst = &mut state.installments[idx];
            inst.paid_count = paid;
            inst.last_payment_date = Some(date);
            if paid == count {
                inst.status = InstallmentStatus::Completed;
                notify(
                    &mut state,
                    format!("Installment plan completed: {}", title),
                    NoticeLevel::Success,
                );
            }
            check_budget(&mut state, &group_id, date);
            state
        }
        Action::UpdateInstallment { id, patch } => {
            let Some(idx) = state.installments.iter().position(|i| i.id == id) else {
                return state;
            };
            let paid_count = state.installments[idx].paid_count;
            if let Some(count) = patch.installment_count {
                if count < paid_count {
                    notify(
                        &mut state,
                        "Installment count cannot drop below payments already made",
                        NoticeLevel::Error,
                    );
                    return state;
                }
            }
            if let Some(total) = patch.total_amount {
                if total <= 0.0 {
                    notify(&mut state, "Total amount must be positive", NoticeLevel::Error);
                    return state;
                }
            }
            if let Some(rate) = patch.interest_rate {
                if rate < 0.0 {
                    notify(
                        &mut state,
                        "Interest rate cannot be negative",
                        NoticeLevel::Error,
                    );
                    return state;
                }
            }
            let inst = &mut state.installments[idx];
            if let Some(title) = patch.title {
                inst.title = title;
            }
            if let Some(total) = patch.total_amount {
                inst.total_amount = total;
            }
            if let Some(rate) = patch.interest_rate {
                inst.interest_rate = rate;
            }
            if let Some(start) = patch.start_date {
                inst.start_date = start;
            }
            if let Some(count) = patch.installment_count {
                inst.installment_count = count;
            }
            if let Some(kind) = patch.kind {
                inst.kind = kind;
            }
            if let Some(group_id) = patch.linked_group_id {
                inst.linked_group_id = Some(group_id);
            }
            inst.monthly_amount = Installment::monthly_amount_for(
                inst.total_amount,
                inst.interest_rate,
                inst.installment_count,
            );
            inst.status = if inst.paid_count == inst.installment_count {
                InstallmentStatus::Completed
            } else {
                InstallmentStatus::Active
            };
            state
        }
        Action::DeleteInstallment { id } => {
            // Past payment transactions stay; they were real expenses.
            state.installments.retain(|i| i.id != id);
            state
        }
        Action::SetPro(value) => {
            state.is_pro = value;
            state
        }
        Action::Login(patch) => {
            if let Some(name) = patch.name {
                state.user_profile.name = name;
            }
            if let Some(email) = patch.email {
                state.user_profile.email = email;
            }
            if let Some(avatar) = patch.avatar {
                state.user_profile.avatar = Some(avatar);
            }
            state.user_profile.is_authenticated = true;

            // First login provisions a default cloud key so the assistant
            // works out of the box.
            if state.api_config.keys.is_empty() {
                state.api_config.keys.push(ApiKeyDefinition {
                    id: DEFAULT_KEY_ID.to_string(),
                    key: String::new(),
                    label: "Cloud Default Key".to_string(),
                    provisioned: true,
                });
                state.api_config.active_key_id = Some(DEFAULT_KEY_ID.to_string());
            }

            let name = state.user_profile.name.clone();
            notify(
                &mut state,
                format!("Welcome back, {}!", name),
                NoticeLevel::Success,
            );
            state
        }
        Action::Logout => {
            // Session boundary only; financial data is untouched.
            state.user_profile = UserProfile::default();
            notify(&mut state, "Logged out", NoticeLevel::Info);
            state
        }
        Action::UpdateProfile(profile) => {
            state.user_profile = profile;
            state
        }
        Action::AddApiKey { key, label } => {
            let id = mint_id(&mut state, "k");
            let replace_default = state
                .api_config
                .active_key_id
                .as_deref()
                .map(|active| active == DEFAULT_KEY_ID)
                .unwrap_or(true);
            state.api_config.keys.push(ApiKeyDefinition {
                id: id.clone(),
                key,
                label,
                provisioned: false,
            });
            if replace_default {
                state.api_config.active_key_id = Some(id);
            }
            state
        }
        Action::RemoveApiKey { id } => {
            state.api_config.keys.retain(|k| k.id != id);
            if state.api_config.active_key_id.as_deref() == Some(id.as_str()) {
                state.api_config.active_key_id =
                    state.api_config.keys.first().map(|k| k.id.clone());
            }
            state
        }
        Action::SetActiveApiKey { id } => {
            if state.api_config.keys.iter().any(|k| k.id == id) {
                state.api_config.active_key_id = Some(id);
            }
            state
        }
        Action::AddChatMessage { message, pro } => {
            if pro {
                state.pro_chat_history.push(message);
            } else {
                state.chat_history.push(message);
            }
            state
        }
        Action::ClearChat { pro } => {
            if pro {
                state.pro_chat_history.clear();
            } else {
                state.chat_history.clear();
            }
            state
        }
        Action::AddCustomWidget(spec) => {
            let id = mint_id(&mut state, "w");
            state.custom_widgets.push(CustomWidget {
                id,
                title: spec.title,
                description: spec.description,
                chart_type: spec.chart_type,
                data_source: spec.data_source,
                group_by: spec.group_by,
                color_theme: spec.color_theme,
            });
            state
        }
        Action::AddAnalyticsWidget { id } => {
            if !state.active_widgets.contains(&id) {
                state.active_widgets.push(id);
            }
            state
        }
        Action::RemoveAnalyticsWidget { id } => {
            state.active_widgets.retain(|w| *w != id);
            state.custom_widgets.retain(|w| w.id != id);
            state
        }
        Action::ToggleLanguage => {
            state.language = match state.language {
                crate::models::Language::Ar => crate::models::Language::En,
                crate::models::Language::En => crate::models::Language::Ar,
            };
            state
        }
        Action::ToggleDarkMode => {
            state.dark_mode = !state.dark_mode;
            state
        }
        Action::ToggleAutoSync => {
            state.auto_sync = !state.auto_sync;
            state
        }
        Action::SetNotification(notice) => {
            match notice {
                Some(notice) => notify(&mut state, notice.message, notice.level),
                None => state.notification = None,
            }
            state
        }
        Action::MarkNotificationsRead => {
            for entry in &mut state.notification_history {
                entry.read = true;
            }
            state
        }
        Action::ClearNotificationHistory => {
            state.notification_history.clear();
            state
        }
        Action::ImportState(snapshot) => {
            let mut next = *snapshot;
            // Repair any drift the imported snapshot carried; the balance
            // invariant must hold against the transaction log.
            next.wallet_balance = crate::analytics::net_balance(&next.transactions);
            notify(&mut next, "Data imported", NoticeLevel::Success);
            next
        }
        Action::ResetData => AppState::default(),
    }
}

/// Owns the state tree and persists a snapshot after every dispatch
pub struct Store {
    state: AppState,
    snapshots: Option<SnapshotStore>,
}

impl Store {
    /// In-memory store with default state (no persistence)
    pub fn in_memory() -> Self {
        Self {
            state: AppState::default(),
            snapshots: None,
        }
    }

    /// In-memory store seeded with a given state
    pub fn with_state(state: AppState) -> Self {
        Self {
            state,
            snapshots: None,
        }
    }

    /// Open a store backed by a snapshot file, loading the persisted
    /// state or falling back to defaults
    pub fn open(snapshots: SnapshotStore) -> Self {
        let state = snapshots.load_or_default();
        Self {
            state,
            snapshots: Some(snapshots),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run one action through the reducer and persist the result
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        debug!(action = action.name(), "dispatching");
        let state = std::mem::take(&mut self.state);
        self.state = apply(state, action);
        if let Some(ref snapshots) = self.snapshots {
            snapshots.save(&self.state)?;
        }
        Ok(())
    }
}
