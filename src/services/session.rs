// src/services/session.rs
use std::{fmt::Debug, sync::Arc};

use crate::message::ChatTurn;
use crate::services::model::{ChatModel, ModelError, TextStream};

/// A conversation against a model, seeded with client-supplied history.
///
/// Lives for a single request; nothing is stored once it is dropped.
pub struct ChatSession {
    model: Arc<dyn ChatModel>,
    history: Vec<ChatTurn>,
}

impl Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("turns", &self.history.len())
            .finish()
    }
}

impl ChatSession {
    pub fn start(model: Arc<dyn ChatModel>, history: Vec<ChatTurn>) -> Self {
        Self { model, history }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Send `text` as the next user turn and wait for the full reply.
    /// On success both turns are appended to the history; on failure it is unchanged.
    pub async fn send_message(&mut self, text: &str) -> Result<String, ModelError> {
        self.history.push(ChatTurn::user(text));
        match self.model.generate(&self.history).await {
            Ok(reply) => {
                self.history.push(ChatTurn::model(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// Send `text` and receive the reply as it is generated.
    pub async fn send_message_stream(self, text: &str) -> Result<TextStream, ModelError> {
        let mut contents = self.history;
        contents.push(ChatTurn::user(text));
        self.model.generate_stream(contents).await
    }
}
