//! Gemini REST client implementing [`ChatModel`].
//!
//! Calls `models/{model}:generateContent` for full replies and
//! `models/{model}:streamGenerateContent?alt=sse` for incremental ones. The API key
//! travels in the `x-goog-api-key` header and is only exposed when building a request.

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use secrecy::ExposeSecret;

use crate::config::Config;
use crate::message::ChatTurn;
use crate::services::model::{ChatModel, ModelError, TextStream};

use types::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse, SystemInstruction};

pub struct GeminiClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl GeminiClient {
    pub fn new(config: Arc<Config>) -> Result<Self, ModelError> {
        // No request timeout: long generations are bounded only by the provider.
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.config.base_url, self.config.model, method
        )
    }

    async fn post(&self, contents: &[ChatTurn], stream: bool) -> Result<reqwest::Response, ModelError> {
        let body = GenerateContentRequest {
            system_instruction: SystemInstruction::new(&self.config.system_instruction),
            contents,
        };

        let mut request = if stream {
            self.http
                .post(self.url("streamGenerateContent"))
                .query(&[("alt", "sse")])
        } else {
            self.http.post(self.url("generateContent"))
        };
        request = request
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&body);

        tracing::debug!(model = %self.config.model, turns = contents.len(), stream, "calling Gemini");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .map(|body| body.error.message)
                .unwrap_or(raw);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

fn check(response: &GenerateContentResponse) -> Result<(), ModelError> {
    if let Some(err) = &response.error {
        return Err(ModelError::Api {
            status: err.code.unwrap_or(500),
            message: err.message.clone(),
        });
    }
    if let Some(reason) = response.block_reason() {
        return Err(ModelError::Blocked(reason.to_string()));
    }
    Ok(())
}

/// Text carried by one streamed event; events without text are skipped.
fn event_text(data: &str) -> Result<Option<String>, ModelError> {
    let response: GenerateContentResponse =
        serde_json::from_str(data).map_err(|e| ModelError::Decode(e.to_string()))?;
    check(&response)?;
    Ok(response.text().filter(|t| !t.is_empty()))
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, contents: &[ChatTurn]) -> Result<String, ModelError> {
        let response: GenerateContentResponse = self
            .post(contents, false)
            .await?
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        check(&response)?;
        response.text().ok_or_else(|| ModelError::EmptyResponse {
            finish_reason: response.finish_reason().map(str::to_string),
        })
    }

    async fn generate_stream(&self, contents: Vec<ChatTurn>) -> Result<TextStream, ModelError> {
        let mut events = Box::pin(self.post(&contents, true).await?.bytes_stream().eventsource());

        let stream = async_stream::stream! {
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(EventStreamError::Transport(e)) => {
                        yield Err(ModelError::Http(e));
                        return;
                    }
                    Err(e) => {
                        yield Err(ModelError::Decode(e.to_string()));
                        return;
                    }
                };
                match event_text(&event.data) {
                    Ok(Some(text)) => {
                        yield Ok(text);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}
