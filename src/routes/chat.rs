use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::{relay, session::ChatSession},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(ChatRequest { chat, history }) = payload?;
    tracing::debug!(history = history.len(), "chat request");

    let mut session = ChatSession::start(state.model.clone(), history);
    let text = session.send_message(&chat).await?;

    Ok(Json(ChatResponse { text }))
}

pub async fn stream_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    tracing::debug!(history = payload.history.len(), "stream request");

    let opened = relay::open_stream(state.model.clone(), payload).await?;

    Ok((
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(opened.body),
    )
        .into_response())
}
