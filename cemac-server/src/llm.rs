//! Chat completions upstream for the JAVI assistant
//!
//! Speaks the OpenAI compatible `chat/completions` wire format. The API key is
//! attached here and nowhere else.

use cemac_client::assistant::{AssistantRequest, ChatRole};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Persona given to the model before the business context
pub const SYSTEM_PROMPT: &str = "Eres JAVI, el asistente de la papelería CEMAC. \
Respondes en español, de forma breve y práctica, sobre inventario, ventas y \
clientes. Usa solo los datos del contexto; si falta información, dilo.";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            url,
            api_key,
            model,
        }
    }

    /// Send one chat turn and return the model's reply text
    pub async fn complete(&self, request: &AssistantRequest) -> ServerResult<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages: build_messages(request),
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServerError::UpstreamStatus {
                status: status.as_u16(),
                message: upstream_message(&message),
            });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ServerError::Upstream("respuesta vacía del modelo".into()))
    }
}

fn build_messages(request: &AssistantRequest) -> Vec<ChatMessage> {
    let system = match request.context.as_deref().map(str::trim) {
        Some(context) if !context.is_empty() => {
            format!("{SYSTEM_PROMPT}\n\nContexto del negocio:\n{context}")
        }
        _ => SYSTEM_PROMPT.to_string(),
    };

    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(ChatMessage {
        role: "system",
        content: system,
    });
    messages.extend(request.history.iter().map(|turn| ChatMessage {
        role: match turn.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        },
        content: turn.content.clone(),
    }));
    messages.push(ChatMessage {
        role: "user",
        content: request.message.clone(),
    });
    messages
}

/// Pull `error.message` out of a provider error body, else the raw text
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cemac_client::ChatTurn;

    #[test]
    fn test_messages_order_and_context() {
        let request = AssistantRequest {
            context: Some("Inventario: 12 productos".into()),
            history: vec![ChatTurn::user("hola"), ChatTurn::assistant("¡Hola!")],
            message: "¿Qué falta?".into(),
        };
        let messages = build_messages(&request);
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert!(messages[0].content.ends_with("Inventario: 12 productos"));
        assert_eq!(messages[3].content, "¿Qué falta?");
    }

    #[test]
    fn test_blank_context_uses_bare_prompt() {
        let request = AssistantRequest {
            context: Some("  ".into()),
            history: vec![],
            message: "x".into(),
        };
        assert_eq!(build_messages(&request)[0].content, SYSTEM_PROMPT);
    }

    #[test]
    fn test_upstream_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(upstream_message(body), "Incorrect API key provided");
        assert_eq!(upstream_message("Bad Gateway"), "Bad Gateway");
    }
}
