// src/services/model.rs
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::message::ChatTurn;

/// Ordered text fragments produced by a streaming model call.
pub type TextStream = BoxStream<'static, Result<String, ModelError>>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode model response: {0}")]
    Decode(String),

    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("model returned no text (finish reason: {})", .finish_reason.as_deref().unwrap_or("unknown"))]
    EmptyResponse { finish_reason: Option<String> },
}

/// A generative model that continues a conversation.
///
/// `contents` is the full ordered conversation, ending with the newest user turn.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, contents: &[ChatTurn]) -> Result<String, ModelError>;

    /// Errors raised before the first fragment (connection, status) are returned
    /// directly; later failures arrive as an `Err` item and end the stream.
    async fn generate_stream(&self, contents: Vec<ChatTurn>) -> Result<TextStream, ModelError>;
}
