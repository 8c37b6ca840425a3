use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use cemac_client::assistant::{AssistantReply, AssistantRequest, CHAT_PATH};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Longest user message accepted by the proxy
const MAX_MESSAGE_CHARS: usize = 4000;

pub fn router() -> Router<AppState> {
    Router::new().route(CHAT_PATH, post(chat))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<AssistantRequest>,
) -> ServerResult<Json<AssistantReply>> {
    let llm = state.llm.as_ref().ok_or(ServerError::AssistantDisabled)?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ServerError::BadRequest("El mensaje no puede estar vacío".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ServerError::BadRequest(format!(
            "El mensaje no puede exceder {MAX_MESSAGE_CHARS} caracteres"
        )));
    }

    tracing::info!(history = request.history.len(), "Assistant chat request");
    let reply = llm.complete(&request).await?;
    Ok(Json(AssistantReply { reply }))
}
