//! Gemini backend implementation
//!
//! HTTP client for a Gemini-style `generateContent` API. Builds one
//! request per chat turn: system instruction, role/text history, the
//! current user message (plus optional inline image), the enabled tool
//! declarations, and optionally the live-search capability.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ChatRole;

use super::types::{GenerateReply, GenerateRequest, RawToolCall};
use super::AiBackend;

const DEFAULT_HOST: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-flash-latest";
const DEFAULT_PRO_MODEL: &str = "gemini-pro-latest";

/// Gemini-style HTTP backend
///
/// Carries two model ids; requests flagged as elevated use the pro
/// model, everything else the standard one.
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
    pro_model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, api_key: &str, model: &str, pro_model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            pro_model: pro_model.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Requires `GEMINI_API_KEY`; `GEMINI_HOST`, `GEMINI_MODEL` and
    /// `GEMINI_PRO_MODEL` are optional overrides.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        let host = std::env::var("GEMINI_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let pro_model =
            std::env::var("GEMINI_PRO_MODEL").unwrap_or_else(|_| DEFAULT_PRO_MODEL.to_string());
        Some(Self::new(&host, &api_key, &model, &pro_model))
    }

    /// Create a new instance with a different standard model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    fn model_for(&self, elevated: bool) -> &str {
        if elevated {
            &self.pro_model
        } else {
            &self.model
        }
    }
}

// Wire types for the generateContent API.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    system_instruction: ApiContent,
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiInlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
}

impl ApiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    function_declarations: Vec<ApiFunctionDeclaration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: ApiContent,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<GroundingWeb>,
}

#[derive(Debug, Deserialize)]
struct GroundingWeb {
    #[serde(default)]
    uri: Option<String>,
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

#[async_trait::async_trait]
impl AiBackend for GeminiBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply> {
        let model = self.model_for(request.elevated).to_string();

        let mut contents: Vec<ApiContent> = request
            .history
            .iter()
            .map(|turn| ApiContent {
                role: Some(role_name(turn.role).to_string()),
                parts: vec![ApiPart::text(&turn.text)],
            })
            .collect();

        let mut parts = vec![ApiPart::text(&request.message)];
        if let Some(ref image) = request.image {
            parts.push(ApiPart {
                inline_data: Some(ApiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
                ..Default::default()
            });
        }
        contents.push(ApiContent {
            role: Some("user".to_string()),
            parts,
        });

        let mut tools = Vec::new();
        if request.live_search {
            tools.push(ApiTool {
                google_search: Some(serde_json::json!({})),
                ..Default::default()
            });
        }
        if !request.tools.is_empty() {
            tools.push(ApiTool {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|t| ApiFunctionDeclaration {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.parameters.clone(),
                    })
                    .collect(),
                ..Default::default()
            });
        }

        let body = ApiRequest {
            system_instruction: ApiContent {
                role: None,
                parts: vec![ApiPart::text(&request.system)],
            },
            contents,
            tools,
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        debug!(
            model = %model,
            history = request.history.len(),
            tools = request.tools.len(),
            live_search = request.live_search,
            "Sending generateContent request"
        );

        let response = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "AI service error ({}): {}",
                status, body
            )));
        }

        let api_response: ApiResponse = response.json().await?;
        let Some(candidate) = api_response.candidates.into_iter().next() else {
            return Err(Error::InvalidData("AI response has no candidates".into()));
        };

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.parts {
            if let Some(text) = part.text {
                text_parts.push(text);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(RawToolCall {
                    name: call.name,
                    args: call.args,
                });
            }
        }

        let citations: Vec<String> = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web.and_then(|w| w.uri))
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            tool_calls = tool_calls.len(),
            citations = citations.len(),
            "Received generateContent response"
        );

        Ok(GenerateReply {
            text: text_parts.join("\n"),
            tool_calls,
            citations,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_selection_by_elevation() {
        let backend = GeminiBackend::new("https://example.test", "key", "flash", "pro");
        assert_eq!(backend.model_for(false), "flash");
        assert_eq!(backend.model_for(true), "pro");
    }

    #[test]
    fn test_request_serialization_shape() {
        let body = ApiRequest {
            system_instruction: ApiContent {
                role: None,
                parts: vec![ApiPart::text("context")],
            },
            contents: vec![ApiContent {
                role: Some("user".into()),
                parts: vec![ApiPart::text("hello")],
            }],
            tools: vec![ApiTool {
                google_search: Some(serde_json::json!({})),
                ..Default::default()
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "context");
        assert_eq!(json["contents"][0]["role"], "user");
        assert!(json["tools"][0]["googleSearch"].is_object());
    }

    #[test]
    fn test_response_parsing_with_function_call_and_grounding() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here you go."},
                        {"functionCall": {"name": "create_chart", "args": {"title": "Spend"}}}
                    ]
                },
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://example.test/a"}},
                        {"web": {"uri": "https://example.test/b"}}
                    ]
                }
            }]
        });
        let parsed: ApiResponse = serde_json::from_value(raw).unwrap();
        let candidate = &parsed.candidates[0];
        assert_eq!(candidate.content.parts.len(), 2);
        assert!(candidate.grounding_metadata.is_some());
    }
}
