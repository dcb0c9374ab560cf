//! Google Gemini model client.
//!
//! Implements the model boundary over the `generateContent` REST endpoint.
//! Tool-call turns are serialized back as `functionCall` parts and tool
//! results as `functionResponse` parts, so the model sees its own requests
//! and their outcomes in the history it is re-prompted with.

use serde_json::{Map, Value, json};

use factotum_core::config::GenerationConfig;
use factotum_core::conversation::{Conversation, Role, TurnContent};
use factotum_core::error::ModelError;
use factotum_core::model::{ChatModel, ModelResponse, ResponsePart, ToolCallRequest};
use factotum_core::schema::ToolSpec;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiModel {
    api_key: String,
    model: String,
    generation: GenerationConfig,
    client: reqwest::blocking::Client,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, generation: GenerationConfig) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            generation,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        let resource = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!(
            "{API_BASE}/{resource}:generateContent?key={}",
            self.api_key
        )
    }

    fn build_request_body(&self, history: &Conversation, tools: &[ToolSpec]) -> Value {
        let mut contents = Vec::new();

        for turn in history.turns() {
            let entry = match (&turn.role, &turn.content) {
                (Role::User, TurnContent::Text(text)) => json!({
                    "role": "user",
                    "parts": [{ "text": text }],
                }),
                (Role::Model, TurnContent::Text(text)) => json!({
                    "role": "model",
                    "parts": [{ "text": text }],
                }),
                (Role::Model, TurnContent::ToolCall(call)) => json!({
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": call.name,
                            "args": Value::Object(call.args.clone()),
                        }
                    }],
                }),
                (_, TurnContent::ToolResult { name, payload }) => json!({
                    "role": "user",
                    "parts": [{
                        "functionResponse": {
                            "name": name,
                            "response": { "result": payload },
                        }
                    }],
                }),
                // The remaining combinations cannot be constructed.
                _ => continue,
            };
            contents.push(entry);
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.generation.temperature,
                "topK": self.generation.top_k,
                "topP": self.generation.top_p,
                "maxOutputTokens": self.generation.max_tokens,
            },
        });

        if !tools.is_empty() {
            let declarations: Vec<Value> = tools.iter().map(ToolSpec::to_declaration).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        body
    }

    fn parse_response(parsed: &Value) -> Result<ModelResponse, ModelError> {
        let candidate = parsed
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| ModelError::Malformed("no candidates in response".to_string()))?;

        let mut parts = Vec::new();
        if let Some(candidate_parts) = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
        {
            for part in candidate_parts {
                if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                    parts.push(ResponsePart::Text(text.to_string()));
                }
                if let Some(call) = part.get("functionCall") {
                    let name = call
                        .get("name")
                        .and_then(|n| n.as_str())
                        .unwrap_or_default()
                        .to_string();
                    let args = match call.get("args") {
                        Some(Value::Object(map)) => map.clone(),
                        _ => Map::new(),
                    };
                    parts.push(ResponsePart::ToolCall(ToolCallRequest::new(name, args)));
                }
            }
        }

        Ok(ModelResponse::from_parts(parts))
    }
}

impl ChatModel for GeminiModel {
    fn generate(
        &self,
        history: &Conversation,
        tools: &[ToolSpec],
    ) -> Result<ModelResponse, ModelError> {
        let body = self.build_request_body(history, tools);

        tracing::debug!(model = %self.model, turns = history.len(), "Calling Gemini API");
        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Value = response
            .json()
            .map_err(|e| ModelError::Malformed(e.to_string()))?;
        Self::parse_response(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> GeminiModel {
        GeminiModel::new("test-key", "models/test-model", GenerationConfig::default())
    }

    #[test]
    fn request_body_carries_tool_exchanges() {
        let mut history = Conversation::new();
        history.push_user_text("list my files");
        let mut args = Map::new();
        args.insert("dir_path".to_string(), json!("."));
        history.record_tool_exchange(
            ToolCallRequest::new("list_directory_contents", args),
            json!({"total_files": 2}),
        );

        let body = model().build_request_body(&history, &[]);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["parts"][0]["text"], "list my files");
        assert_eq!(
            contents[1]["parts"][0]["functionCall"]["name"],
            "list_directory_contents"
        );
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["response"]["result"]["total_files"],
            2
        );
    }

    #[test]
    fn response_parsing_preserves_part_order() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "let me check" },
                        { "functionCall": { "name": "get_system_info", "args": {} } },
                    ]
                }
            }]
        });

        let response = GeminiModel::parse_response(&raw).unwrap();
        assert_eq!(response.parts.len(), 2);
        assert!(matches!(&response.parts[0], ResponsePart::Text(t) if t == "let me check"));
        assert!(matches!(
            &response.parts[1],
            ResponsePart::ToolCall(call) if call.name == "get_system_info"
        ));
        assert!(response.has_tool_calls());
    }

    #[test]
    fn empty_candidates_are_malformed() {
        let raw = json!({ "candidates": [] });
        assert!(matches!(
            GeminiModel::parse_response(&raw),
            Err(ModelError::Malformed(_))
        ));
    }

    #[test]
    fn endpoint_handles_bare_and_qualified_names() {
        let qualified = model();
        assert!(qualified.endpoint().contains("/models/test-model:generateContent"));

        let bare = GeminiModel::new("k", "test-model", GenerationConfig::default());
        assert!(bare.endpoint().contains("/models/test-model:generateContent"));
    }
}
