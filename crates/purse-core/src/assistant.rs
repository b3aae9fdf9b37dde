//! AI mediation layer
//!
//! Translates application state plus a user message into one request to
//! the generative service, and translates the response back into plain
//! text, an optional chart widget spec, and an optional installment
//! proposal. Never mutates state: a chart spec may be applied by the
//! caller directly (presentational), while an installment proposal must
//! go through [`accept_proposal`] after explicit user confirmation.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::ai::{AiBackend, AiClient, ChatMode, ChatTurn, GenerateRequest, InlineImage};
use crate::ai::parsing::{format_sources_block, parse_tool_calls, unique_citations};
use crate::context::build_financial_context;
use crate::models::{AppState, ChartSpec, TransactionType};
use crate::store::Action;
use crate::tools::{enabled_capabilities, InstallmentProposal, ToolInvocation, MAX_SOURCE_LINKS};

/// Sampling temperature for chat requests
const CHAT_TEMPERATURE: f32 = 0.5;

/// Outcome of one chat exchange
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    /// Display text, including any appended sources block
    pub text: String,
    /// May be applied automatically; purely presentational
    pub chart_widget: Option<ChartSpec>,
    /// Must never be applied without explicit user confirmation
    pub installment_proposal: Option<InstallmentProposal>,
    /// Citation URLs extracted from grounded answers
    pub sources: Vec<String>,
}

/// The conversational assistant
pub struct Assistant {
    client: AiClient,
}

impl Assistant {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }

    /// Create from environment; None when no backend is configured
    pub fn from_env() -> Option<Self> {
        AiClient::from_env().map(Self::new)
    }

    pub fn client(&self) -> &AiClient {
        &self.client
    }

    fn system_instruction(state: &AppState) -> String {
        format!(
            "Identity: You are \"Purse AI\", a senior financial consultant.\n\
             Language: Respond in {}.\n\
             Context: {}\n\
             Capabilities:\n\
             - If the user asks to add an installment plan or debt (e.g. \"I bought a TV for 5000 on 10 months\"), use the 'propose_installment_plan' tool.\n\
             - If the user asks to visualize data, use 'create_chart'.\n",
            state.language.instruction_name(),
            build_financial_context(state),
        )
    }

    /// Send one chat message and interpret the response
    ///
    /// Infallible from the caller's perspective: any transport or parse
    /// failure becomes a user-visible text reply describing it.
    pub async fn send_message(
        &self,
        state: &AppState,
        message: &str,
        mode: ChatMode,
        image: Option<InlineImage>,
    ) -> ChatReply {
        let transcript = if mode.is_pro_transcript() {
            &state.pro_chat_history
        } else {
            &state.chat_history
        };
        let history = transcript
            .iter()
            .map(|m| ChatTurn {
                role: m.role,
                text: m.text.clone(),
            })
            .collect();

        let capabilities = enabled_capabilities(state.is_pro, mode);
        let live_search = capabilities.live_search;

        let request = GenerateRequest {
            system: Self::system_instruction(state),
            history,
            message: message.to_string(),
            image,
            tools: capabilities.tools,
            live_search,
            temperature: CHAT_TEMPERATURE,
            elevated: state.is_pro,
        };

        let reply = match self.client.generate(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "AI request failed");
                return ChatReply {
                    text: format!("Assistant error: {}", e),
                    ..Default::default()
                };
            }
        };

        let mut out = ChatReply {
            text: reply.text,
            ..Default::default()
        };

        for invocation in parse_tool_calls(&reply.tool_calls) {
            match invocation {
                ToolInvocation::CreateChart(spec) => {
                    info!(title = %spec.title, "AI generated a chart widget");
                    out.text
                        .push_str(&format!("\n\n[Generated chart: {}]", spec.title));
                    out.chart_widget = Some(spec);
                }
                ToolInvocation::ProposeInstallment(proposal) => {
                    info!(title = %proposal.title, "AI proposed an installment plan");
                    out.text.push_str(&format!(
                        "\n\n[Proposed installment plan: {}]",
                        proposal.title
                    ));
                    out.installment_proposal = Some(proposal);
                }
            }
        }

        if live_search {
            out.sources = unique_citations(&reply.citations, MAX_SOURCE_LINKS);
            out.text.push_str(&format_sources_block(&out.sources));
        }

        out
    }

    /// Suggest a short note for a transaction entry form
    ///
    /// Best effort: returns an empty string on any failure.
    pub async fn suggest_note(
        &self,
        state: &AppState,
        kind: TransactionType,
        amount: f64,
        counterparty: &str,
    ) -> String {
        let request = GenerateRequest {
            temperature: 0.5,
            ..GenerateRequest::simple(
                format!(
                    "Suggest a short note for a personal finance transaction. Max 4 words. Language: {}.",
                    state.language.instruction_name()
                ),
                format!(
                    "Smart note for: {} of {} {} via {}.",
                    kind, amount, state.base_currency, counterparty
                ),
            )
        };
        match self.client.generate(request).await {
            Ok(reply) => reply.text.trim().to_string(),
            Err(_) => String::new(),
        }
    }
}

/// Convert an accepted installment proposal into the store action
///
/// This is the only path by which a proposal reaches state; rejecting a
/// proposal simply means never calling this.
pub fn accept_proposal(proposal: InstallmentProposal, today: NaiveDate) -> Action {
    Action::AddInstallment(proposal.into_new_installment(today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GenerateReply, MockBackend, RawToolCall};
    use crate::models::{AppState, ChatMessage, ChatRole};
    use crate::store::apply;
    use crate::tools::{CREATE_CHART_TOOL, PROPOSE_INSTALLMENT_TOOL};
    use chrono::Utc;

    fn assistant_with(mock: MockBackend) -> Assistant {
        Assistant::new(AiClient::Mock(mock))
    }

    fn proposal_reply() -> GenerateReply {
        GenerateReply {
            text: "Sounds affordable.".into(),
            tool_calls: vec![RawToolCall {
                name: PROPOSE_INSTALLMENT_TOOL.into(),
                args: serde_json::json!({
                    "title": "TV",
                    "totalAmount": 5000.0,
                    "installmentCount": 10
                }),
            }],
            citations: vec![],
        }
    }

    #[tokio::test]
    async fn test_proposal_surfaced_but_not_applied() {
        let mock = MockBackend::new();
        mock.enqueue(proposal_reply());
        let assistant = assistant_with(mock);

        let state = AppState::default();
        let reply = assistant
            .send_message(&state, "I bought a TV", ChatMode::Standard, None)
            .await;

        let proposal = reply.installment_proposal.expect("proposal expected");
        assert_eq!(proposal.title, "TV");
        assert!(reply.text.contains("[Proposed installment plan: TV]"));
        // Nothing was dispatched; the state still has no installments.
        assert!(state.installments.is_empty());
    }

    #[tokio::test]
    async fn test_accepting_proposal_goes_through_reducer() {
        let mock = MockBackend::new();
        mock.enqueue(proposal_reply());
        let assistant = assistant_with(mock);

        let state = AppState::default();
        let reply = assistant
            .send_message(&state, "I bought a TV", ChatMode::Standard, None)
            .await;
        let proposal = reply.installment_proposal.unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let state = apply(state, accept_proposal(proposal, today));
        assert_eq!(state.installments.len(), 1);
        assert_eq!(state.installments[0].title, "TV");
        assert_eq!(state.installments[0].monthly_amount, 500.0);
        assert_eq!(state.installments[0].start_date, today);
    }

    #[tokio::test]
    async fn test_chart_widget_returned_for_auto_apply() {
        let mock = MockBackend::new();
        mock.enqueue(GenerateReply {
            text: "Here is your chart.".into(),
            tool_calls: vec![RawToolCall {
                name: CREATE_CHART_TOOL.into(),
                args: serde_json::json!({
                    "title": "Spending by group",
                    "chartType": "pie",
                    "dataSource": "expense",
                    "groupBy": "group"
                }),
            }],
            citations: vec![],
        });
        let assistant = assistant_with(mock);

        let reply = assistant
            .send_message(&AppState::default(), "chart my spending", ChatMode::Standard, None)
            .await;
        let spec = reply.chart_widget.expect("chart expected");
        assert_eq!(spec.title, "Spending by group");
        assert!(reply.text.contains("[Generated chart: Spending by group]"));
    }

    #[tokio::test]
    async fn test_failure_becomes_visible_text() {
        let mock = MockBackend::new();
        mock.enqueue_error("connection refused");
        let assistant = assistant_with(mock);

        let reply = assistant
            .send_message(&AppState::default(), "hello", ChatMode::Standard, None)
            .await;
        assert!(reply.text.starts_with("Assistant error:"));
        assert!(reply.installment_proposal.is_none());
        assert!(reply.chart_widget.is_none());
    }

    #[tokio::test]
    async fn test_capability_tiering_in_requests() {
        let mock = MockBackend::new();
        let assistant = assistant_with(mock.clone());

        let mut state = AppState::default();
        assistant
            .send_message(&state, "hi", ChatMode::Standard, None)
            .await;

        state.is_pro = true;
        assistant
            .send_message(&state, "hi", ChatMode::Architect, None)
            .await;

        let requests = mock.requests();
        assert_eq!(requests[0].tools.len(), 1);
        assert!(!requests[0].live_search);
        assert!(!requests[0].elevated);

        assert_eq!(requests[1].tools.len(), 2);
        assert!(requests[1].live_search);
        assert!(requests[1].elevated);
    }

    #[tokio::test]
    async fn test_citations_appended_distinctly_in_elevated_mode() {
        let mock = MockBackend::new();
        mock.enqueue(GenerateReply {
            text: "Gold is up.".into(),
            tool_calls: vec![],
            citations: vec![
                "https://a.test".into(),
                "https://a.test".into(),
                "https://b.test".into(),
            ],
        });
        let assistant = assistant_with(mock);

        let mut state = AppState::default();
        state.is_pro = true;
        let reply = assistant
            .send_message(&state, "gold price?", ChatMode::Architect, None)
            .await;
        assert_eq!(reply.sources, vec!["https://a.test", "https://b.test"]);
        assert!(reply.text.contains("--- Sources ---"));
        assert!(reply.text.starts_with("Gold is up."));
    }

    #[tokio::test]
    async fn test_history_follows_selected_transcript() {
        let mock = MockBackend::new();
        let assistant = assistant_with(mock.clone());

        let mut state = AppState::default();
        state.chat_history.push(ChatMessage {
            role: ChatRole::User,
            text: "standard question".into(),
            timestamp: Utc::now(),
        });
        state.pro_chat_history.push(ChatMessage {
            role: ChatRole::Model,
            text: "architect answer".into(),
            timestamp: Utc::now(),
        });

        assistant
            .send_message(&state, "next", ChatMode::Architect, None)
            .await;
        let requests = mock.requests();
        assert_eq!(requests[0].history.len(), 1);
        assert_eq!(requests[0].history[0].text, "architect answer");
    }

    #[tokio::test]
    async fn test_suggest_note_swallows_failures() {
        let mock = MockBackend::new();
        mock.enqueue_error("offline");
        let assistant = assistant_with(mock);

        let note = assistant
            .suggest_note(&AppState::default(), TransactionType::Expense, 40.0, "Acme")
            .await;
        assert_eq!(note, "");
    }
}
