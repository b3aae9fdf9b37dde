//! AI tool declarations and typed argument schemas
//!
//! The assistant may invoke a closed set of tools: propose an
//! installment plan, or create a chart widget. Each tool's arguments are
//! a strongly-typed struct validated at the mediation boundary before
//! anything reaches the rest of the system. Which tools a request
//! carries is decided by `enabled_capabilities`, a single policy gate
//! rather than per-caller wiring.

use chrono::NaiveDate;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;

use crate::ai::types::{ChatMode, ToolDecl};
use crate::error::{Error, Result};
use crate::models::{
    ChartSpec, ChartType, ColorTheme, DataSource, GroupAxis, InstallmentType, NewInstallment,
};

pub const PROPOSE_INSTALLMENT_TOOL: &str = "propose_installment_plan";
pub const CREATE_CHART_TOOL: &str = "create_chart";

/// Citation links appended to an elevated reply
pub const MAX_SOURCE_LINKS: usize = 3;

/// Raw arguments of a `propose_installment_plan` call, as sent by the
/// service. Validated into an [`InstallmentProposal`] before use.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposeInstallmentArgs {
    /// Item name or debt title
    pub title: String,
    /// Principal amount
    pub total_amount: f64,
    /// Interest percentage (0 if none)
    #[serde(default)]
    pub interest_rate: f64,
    /// Number of monthly payments
    pub installment_count: u32,
    /// ISO date YYYY-MM-DD
    #[serde(default)]
    pub start_date: Option<String>,
    /// Plan kind: loan, purchase or jamiyah
    #[serde(default, rename = "type")]
    pub kind: Option<InstallmentType>,
}

/// A validated installment plan proposal
///
/// Never applied to state automatically. The caller surfaces it for
/// explicit accept/reject; only an accept turns it into an
/// `AddInstallment` action.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentProposal {
    pub title: String,
    pub total_amount: f64,
    pub interest_rate: f64,
    pub installment_count: u32,
    pub start_date: Option<NaiveDate>,
    pub kind: InstallmentType,
}

impl ProposeInstallmentArgs {
    /// Validate the raw arguments into a proposal
    pub fn validate(self) -> Result<InstallmentProposal> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("proposal title is empty".into()));
        }
        if self.total_amount <= 0.0 {
            return Err(Error::Validation(format!(
                "proposal total amount must be positive, got {}",
                self.total_amount
            )));
        }
        if self.installment_count == 0 {
            return Err(Error::Validation(
                "proposal installment count must be positive".into(),
            ));
        }
        if self.interest_rate < 0.0 {
            return Err(Error::Validation(format!(
                "proposal interest rate cannot be negative, got {}",
                self.interest_rate
            )));
        }
        let start_date = match self.start_date.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                Error::Validation(format!("proposal start date is not YYYY-MM-DD: {}", raw))
            })?),
        };
        Ok(InstallmentProposal {
            title: self.title,
            total_amount: self.total_amount,
            interest_rate: self.interest_rate,
            installment_count: self.installment_count,
            start_date,
            kind: self.kind.unwrap_or_default(),
        })
    }
}

impl InstallmentProposal {
    /// Turn an accepted proposal into store input, defaulting the start
    /// date to `today` when the service omitted one
    pub fn into_new_installment(self, today: NaiveDate) -> NewInstallment {
        NewInstallment {
            title: self.title,
            total_amount: self.total_amount,
            interest_rate: self.interest_rate,
            start_date: self.start_date.unwrap_or(today),
            installment_count: self.installment_count,
            kind: self.kind,
            linked_group_id: None,
        }
    }
}

/// Raw arguments of a `create_chart` call
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChartArgs {
    /// Widget title
    pub title: String,
    /// One-line description of what the chart shows
    #[serde(default)]
    pub description: Option<String>,
    pub chart_type: ChartType,
    pub data_source: DataSource,
    pub group_by: GroupAxis,
    #[serde(default)]
    pub color_theme: Option<ColorTheme>,
}

impl CreateChartArgs {
    /// Fill defaults and produce a widget spec
    pub fn into_spec(self) -> Result<ChartSpec> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("chart title is empty".into()));
        }
        Ok(ChartSpec {
            title: self.title,
            description: self
                .description
                .unwrap_or_else(|| "AI generated insight".to_string()),
            chart_type: self.chart_type,
            data_source: self.data_source,
            group_by: self.group_by,
            color_theme: self.color_theme.unwrap_or_default(),
        })
    }
}

/// A validated tool invocation, the only shapes the AI can request
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    ProposeInstallment(InstallmentProposal),
    CreateChart(ChartSpec),
}

fn schema_value<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| serde_json::json!({}))
}

/// Declaration for the installment proposal tool
pub fn propose_installment_tool() -> ToolDecl {
    ToolDecl::new(
        PROPOSE_INSTALLMENT_TOOL,
        "Proposes a new installment plan or debt record to be added to the app.",
        schema_value::<ProposeInstallmentArgs>(),
    )
}

/// Declaration for the chart widget tool
pub fn create_chart_tool() -> ToolDecl {
    ToolDecl::new(
        CREATE_CHART_TOOL,
        "Creates a custom analytics chart widget for the user dashboard based on their data request.",
        schema_value::<CreateChartArgs>(),
    )
}

/// Capabilities enabled for one request
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub tools: Vec<ToolDecl>,
    /// Elevated mode may ground answers in live web search
    pub live_search: bool,
}

/// Policy gate mapping tier and chat mode to capabilities
///
/// Standard chats get the installment tool only. The architect chat of
/// a pro-tier user additionally gets chart generation and live search.
pub fn enabled_capabilities(is_pro: bool, mode: ChatMode) -> Capabilities {
    if is_pro && mode == ChatMode::Architect {
        Capabilities {
            tools: vec![create_chart_tool(), propose_installment_tool()],
            live_search: true,
        }
    } else {
        Capabilities {
            tools: vec![propose_installment_tool()],
            live_search: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(json: serde_json::Value) -> ProposeInstallmentArgs {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_proposal_args_validate() {
        let proposal = args(serde_json::json!({
            "title": "TV",
            "totalAmount": 5000.0,
            "installmentCount": 10,
            "type": "purchase"
        }))
        .validate()
        .unwrap();
        assert_eq!(proposal.title, "TV");
        assert_eq!(proposal.interest_rate, 0.0);
        assert_eq!(proposal.kind, InstallmentType::Purchase);
        assert!(proposal.start_date.is_none());
    }

    #[test]
    fn test_proposal_args_parse_start_date() {
        let proposal = args(serde_json::json!({
            "title": "Loan",
            "totalAmount": 1000.0,
            "installmentCount": 4,
            "startDate": "2025-03-01",
            "type": "loan"
        }))
        .validate()
        .unwrap();
        assert_eq!(
            proposal.start_date,
            Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
        assert_eq!(proposal.kind, InstallmentType::Loan);
    }

    #[test]
    fn test_proposal_args_reject_bad_values() {
        assert!(args(serde_json::json!({
            "title": "TV", "totalAmount": 0.0, "installmentCount": 10
        }))
        .validate()
        .is_err());

        assert!(args(serde_json::json!({
            "title": "TV", "totalAmount": 100.0, "installmentCount": 0
        }))
        .validate()
        .is_err());

        assert!(args(serde_json::json!({
            "title": "TV", "totalAmount": 100.0, "installmentCount": 5,
            "startDate": "March 1st"
        }))
        .validate()
        .is_err());
    }

    #[test]
    fn test_chart_args_defaults() {
        let spec: CreateChartArgs = serde_json::from_value(serde_json::json!({
            "title": "Spending by group",
            "chartType": "pie",
            "dataSource": "expense",
            "groupBy": "group"
        }))
        .unwrap();
        let spec = spec.into_spec().unwrap();
        assert_eq!(spec.color_theme, ColorTheme::Blue);
        assert_eq!(spec.description, "AI generated insight");
    }

    #[test]
    fn test_capability_tiering() {
        let caps = enabled_capabilities(false, ChatMode::Standard);
        assert_eq!(caps.tools.len(), 1);
        assert!(!caps.live_search);

        // Architect mode without pro stays standard
        let caps = enabled_capabilities(false, ChatMode::Architect);
        assert_eq!(caps.tools.len(), 1);
        assert!(!caps.live_search);

        let caps = enabled_capabilities(true, ChatMode::Architect);
        assert_eq!(caps.tools.len(), 2);
        assert!(caps.live_search);
    }

    #[test]
    fn test_tool_schema_has_required_fields() {
        let tool = propose_installment_tool();
        let schema = serde_json::to_string(&tool.parameters).unwrap();
        assert!(schema.contains("totalAmount"));
        assert!(schema.contains("installmentCount"));
    }
}
