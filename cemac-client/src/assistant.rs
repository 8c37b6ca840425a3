//! JAVI assistant client
//!
//! Talks to the local server's `/api/assistant/chat` proxy. The model API key
//! lives on the server; the client only sends the conversation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ClientResult;
use crate::http::HttpClient;

/// Chat proxy path on the local server
pub const CHAT_PATH: &str = "/api/assistant/chat";

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    /// Unix millis
    #[serde(default)]
    pub at: i64,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            at: shared::util::now_millis(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            at: shared::util::now_millis(),
        }
    }
}

/// Chat request sent to the proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantRequest {
    /// Business context (inventory / sales summary) prepended by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
}

/// Chat reply from the proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply: String,
}

#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn chat(&self, request: &AssistantRequest) -> ClientResult<AssistantReply>;
}

/// Proxy client over any [`HttpClient`]
#[derive(Debug, Clone)]
pub struct AssistantClient<H> {
    http: H,
}

impl<H: HttpClient> AssistantClient<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }
}

#[async_trait]
impl<H: HttpClient> AssistantApi for AssistantClient<H> {
    async fn chat(&self, request: &AssistantRequest) -> ClientResult<AssistantReply> {
        self.http.post(CHAT_PATH, request).await
    }
}
