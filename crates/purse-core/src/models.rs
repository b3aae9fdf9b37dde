//! Domain models for Purse

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Id of the seeded group that installment payments fall back to when a
/// plan has no linked group.
pub const DEBTS_GROUP_ID: &str = "g-debts";

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
///
/// Owned exclusively by the store. `group_id` and `client_id` are
/// foreign-key references; dangling ids are tolerated and rendered as
/// "Unknown" by consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Always positive; direction comes from `kind`
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Day resolution, UTC calendar day
    pub date: NaiveDate,
    pub group_id: String,
    pub client_id: Option<String>,
    pub note: Option<String>,
}

impl Transaction {
    /// Signed effect of this transaction on the wallet balance
    pub fn balance_effect(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Input for creating a transaction (before id assignment)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    /// Defaults to the state's base currency when None
    pub currency: Option<String>,
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub group_id: String,
    pub client_id: Option<String>,
    pub note: Option<String>,
}

/// Partial update for a transaction; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub kind: Option<TransactionType>,
    pub date: Option<NaiveDate>,
    pub group_id: Option<String>,
    pub client_id: Option<String>,
    pub note: Option<String>,
}

/// A spending category / cost center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub monthly_budget: Option<f64>,
}

/// Partial update for a group
#[derive(Debug, Clone, Default)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub monthly_budget: Option<f64>,
}

/// A counterparty, bound to one group at creation time
///
/// The binding is not updated automatically when the group is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub group_id: String,
    pub icon: Option<String>,
    pub contact: Option<String>,
}

/// Partial update for a client
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub group_id: Option<String>,
    pub icon: Option<String>,
    pub contact: Option<String>,
}

/// Lifecycle status of an installment plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Active,
    Completed,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of installment plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentType {
    Loan,
    #[default]
    Purchase,
    /// Rotating savings circle
    Jamiyah,
}

impl InstallmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loan => "loan",
            Self::Purchase => "purchase",
            Self::Jamiyah => "jamiyah",
        }
    }
}

impl std::str::FromStr for InstallmentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loan" => Ok(Self::Loan),
            "purchase" => Ok(Self::Purchase),
            "jamiyah" => Ok(Self::Jamiyah),
            _ => Err(format!("Unknown installment type: {}", s)),
        }
    }
}

impl std::fmt::Display for InstallmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A multi-period debt or purchase plan paid down via monthly payments
///
/// `paid_count` only ever increases, via the pay operation. Once the
/// plan reaches `Completed` no further payments are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: String,
    pub title: String,
    pub total_amount: f64,
    /// Percentage, >= 0
    pub interest_rate: f64,
    pub start_date: NaiveDate,
    pub installment_count: u32,
    pub paid_count: u32,
    /// Derived: total_amount * (1 + interest_rate/100) / installment_count
    pub monthly_amount: f64,
    pub status: InstallmentStatus,
    #[serde(rename = "type")]
    pub kind: InstallmentType,
    pub last_payment_date: Option<NaiveDate>,
    /// Payments are tagged to this group, or to the default debts group
    pub linked_group_id: Option<String>,
}

impl Installment {
    /// Monthly payment for a plan's terms
    pub fn monthly_amount_for(total_amount: f64, interest_rate: f64, installment_count: u32) -> f64 {
        total_amount * (1.0 + interest_rate / 100.0) / installment_count as f64
    }

    /// Principal plus interest over the plan's lifetime
    pub fn total_with_interest(&self) -> f64 {
        self.total_amount * (1.0 + self.interest_rate / 100.0)
    }

    /// Amount paid so far
    pub fn total_paid(&self) -> f64 {
        self.paid_count as f64 * self.monthly_amount
    }

    pub fn remaining_months(&self) -> u32 {
        self.installment_count - self.paid_count
    }
}

/// Input for creating an installment plan
#[derive(Debug, Clone)]
pub struct NewInstallment {
    pub title: String,
    pub total_amount: f64,
    pub interest_rate: f64,
    pub start_date: NaiveDate,
    pub installment_count: u32,
    pub kind: InstallmentType,
    pub linked_group_id: Option<String>,
}

/// Partial update for an installment plan
///
/// The pay operation is the only way to advance `paid_count`.
#[derive(Debug, Clone, Default)]
pub struct InstallmentPatch {
    pub title: Option<String>,
    pub total_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub installment_count: Option<u32>,
    pub kind: Option<InstallmentType>,
    pub linked_group_id: Option<String>,
}

/// Chart mark type for a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Pie,
    Area,
    Line,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Area => "area",
            Self::Line => "line",
        }
    }
}

impl std::str::FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            "area" => Ok(Self::Area),
            "line" => Ok(Self::Line),
            _ => Err(format!("Unknown chart type: {}", s)),
        }
    }
}

/// Which transaction amounts a widget aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Income,
    #[default]
    Expense,
    /// Income minus expense
    Net,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Net => "net",
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "net" => Ok(Self::Net),
            _ => Err(format!("Unknown data source: {}", s)),
        }
    }
}

/// Axis a widget groups transactions by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupAxis {
    #[default]
    Group,
    Client,
    Date,
}

impl GroupAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Client => "client",
            Self::Date => "date",
        }
    }
}

impl std::str::FromStr for GroupAxis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "group" => Ok(Self::Group),
            "client" => Ok(Self::Client),
            "date" => Ok(Self::Date),
            _ => Err(format!("Unknown group axis: {}", s)),
        }
    }
}

/// Color theme for a chart widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blue,
    Emerald,
    Rose,
    Amber,
    Purple,
}

impl ColorTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Emerald => "emerald",
            Self::Rose => "rose",
            Self::Amber => "amber",
            Self::Purple => "purple",
        }
    }
}

impl std::str::FromStr for ColorTheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blue" => Ok(Self::Blue),
            "emerald" => Ok(Self::Emerald),
            "rose" => Ok(Self::Rose),
            "amber" => Ok(Self::Amber),
            "purple" => Ok(Self::Purple),
            _ => Err(format!("Unknown color theme: {}", s)),
        }
    }
}

/// A chart configuration on the analytics dashboard
///
/// Purely presentational; has no effect on financial calculations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomWidget {
    pub id: String,
    pub title: String,
    pub description: String,
    pub chart_type: ChartType,
    pub data_source: DataSource,
    pub group_by: GroupAxis,
    pub color_theme: ColorTheme,
}

/// Widget configuration before id assignment (user- or AI-produced)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub title: String,
    pub description: String,
    pub chart_type: ChartType,
    pub data_source: DataSource,
    pub group_by: GroupAxis,
    pub color_theme: ColorTheme,
}

/// Role of a chat transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// An entry in one of the two append-only chat transcripts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Severity of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    #[default]
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A transient, dismissible notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

/// A retained notification history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: String,
    pub message: String,
    pub level: NoticeLevel,
    pub read: bool,
}

/// The signed-in (or guest) user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub is_authenticated: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Guest".to_string(),
            email: String::new(),
            avatar: None,
            is_authenticated: false,
        }
    }
}

/// Fields a login may supply; unset fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Generative AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    Local,
}

/// A registered API key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyDefinition {
    pub id: String,
    pub key: String,
    pub label: String,
    /// Provisioned automatically on login rather than user-entered
    pub provisioned: bool,
}

/// AI service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub provider: AiProvider,
    pub keys: Vec<ApiKeyDefinition>,
    pub active_key_id: Option<String>,
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            keys: Vec::new(),
            active_key_id: None,
            model: "gemini-flash".to_string(),
        }
    }
}

/// UI language preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    #[default]
    En,
}

impl Language {
    /// English name of the language, for AI instructions
    pub fn instruction_name(&self) -> &'static str {
        match self {
            Self::Ar => "Arabic",
            Self::En => "English",
        }
    }
}

/// Root aggregate holding the entire application state tree
///
/// The store is the sole owner; all mutation flows through the action
/// dispatcher. Every field carries a serde default so a snapshot
/// written by an older version deserializes with sane defaults for
/// fields it did not know about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    /// Cached running total, kept equal to income minus expense
    pub wallet_balance: f64,
    pub base_currency: String,
    /// Counter backing fresh id assignment; the reducer stays pure
    pub next_id: u64,
    pub groups: Vec<Group>,
    pub clients: Vec<Client>,
    pub transactions: Vec<Transaction>,
    pub installments: Vec<Installment>,
    pub language: Language,
    pub dark_mode: bool,
    pub auto_sync: bool,
    pub is_pro: bool,
    pub user_profile: UserProfile,
    pub api_config: ApiConfig,
    pub chat_history: Vec<ChatMessage>,
    pub pro_chat_history: Vec<ChatMessage>,
    /// Ids of predefined analytics widgets currently shown
    pub active_widgets: Vec<String>,
    pub custom_widgets: Vec<CustomWidget>,
    pub notification: Option<Notice>,
    pub notification_history: Vec<AppNotification>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            wallet_balance: 0.0,
            base_currency: "USD".to_string(),
            next_id: 1,
            groups: vec![Group {
                id: DEBTS_GROUP_ID.to_string(),
                name: "Debts".to_string(),
                icon: Some("💸".to_string()),
                monthly_budget: None,
            }],
            clients: Vec::new(),
            transactions: Vec::new(),
            installments: Vec::new(),
            language: Language::default(),
            dark_mode: false,
            auto_sync: true,
            is_pro: false,
            user_profile: UserProfile::default(),
            api_config: ApiConfig::default(),
            chat_history: Vec::new(),
            pro_chat_history: Vec::new(),
            active_widgets: vec!["cash_flow".to_string(), "spending_by_group".to_string()],
            custom_widgets: Vec::new(),
            notification: None,
            notification_history: Vec::new(),
        }
    }
}

impl AppState {
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn installment(&self, id: &str) -> Option<&Installment> {
        self.installments.iter().find(|i| i.id == id)
    }

    /// Group name for display, tolerating dangling references
    pub fn group_name(&self, id: &str) -> &str {
        self.group(id).map(|g| g.name.as_str()).unwrap_or("Unknown")
    }

    /// Client name for display, tolerating dangling references
    pub fn client_name(&self, id: &str) -> &str {
        self.client(id).map(|c| c.name.as_str()).unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_amount_exact() {
        let monthly = Installment::monthly_amount_for(12000.0, 0.0, 12);
        assert_eq!(monthly, 1000.0);
    }

    #[test]
    fn test_monthly_amount_with_interest() {
        let monthly = Installment::monthly_amount_for(10000.0, 10.0, 10);
        assert!((monthly - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn test_balance_effect_sign() {
        let tx = Transaction {
            id: "t-1".into(),
            amount: 50.0,
            currency: "USD".into(),
            kind: TransactionType::Expense,
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            group_id: "g-1".into(),
            client_id: None,
            note: None,
        };
        assert_eq!(tx.balance_effect(), -50.0);
    }

    #[test]
    fn test_default_state_has_debts_group() {
        let state = AppState::default();
        assert!(state.group(DEBTS_GROUP_ID).is_some());
        assert_eq!(state.wallet_balance, 0.0);
    }

    #[test]
    fn test_dangling_reference_renders_unknown() {
        let state = AppState::default();
        assert_eq!(state.group_name("g-nope"), "Unknown");
        assert_eq!(state.client_name("c-nope"), "Unknown");
    }

    #[test]
    fn test_enum_round_trip() {
        let parsed: ChartType = "pie".parse().unwrap();
        assert_eq!(parsed, ChartType::Pie);
        assert_eq!(parsed.as_str(), "pie");
        assert!("sankey".parse::<ChartType>().is_err());
    }
}
