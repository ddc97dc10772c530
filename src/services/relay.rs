// src/services/relay.rs
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::watch;

use crate::message::ChatRequest;
use crate::services::model::{ChatModel, ModelError};
use crate::services::session::ChatSession;

/// Lifecycle of one streaming request. `Completed` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    SessionOpened,
    Streaming,
    Completed,
    Failed,
}

impl StreamPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamPhase::Completed | StreamPhase::Failed)
    }
}

/// An opened relay: the response body plus a view of its current phase.
pub struct RelayStream<S> {
    pub body: S,
    pub phase: watch::Receiver<StreamPhase>,
}

#[derive(Debug)]
struct PhaseTracker {
    tx: watch::Sender<StreamPhase>,
    fragments: usize,
}

impl PhaseTracker {
    fn new() -> (Self, watch::Receiver<StreamPhase>) {
        let (tx, rx) = watch::channel(StreamPhase::Idle);
        (Self { tx, fragments: 0 }, rx)
    }

    fn phase(&self) -> StreamPhase {
        *self.tx.borrow()
    }

    fn advance(&mut self, next: StreamPhase) {
        let from = self.phase();
        debug_assert!(!from.is_terminal(), "phase {from:?} is terminal");
        tracing::debug!(?from, to = ?next, fragments = self.fragments, "stream phase");
        self.tx.send_replace(next);
    }
}

impl Drop for PhaseTracker {
    // The body stream is dropped when the client goes away.
    fn drop(&mut self) {
        if !self.phase().is_terminal() {
            tracing::info!(fragments = self.fragments, "client disconnected mid-stream");
            self.tx.send_replace(StreamPhase::Failed);
        }
    }
}

/// Open a streaming session and return the body stream that relays each fragment
/// as it arrives. Failures before the first upstream byte are returned here.
pub async fn open_stream(
    model: Arc<dyn ChatModel>,
    request: ChatRequest,
) -> Result<RelayStream<impl Stream<Item = Result<Bytes, ModelError>> + Send + 'static>, ModelError>
{
    let (mut tracker, phase) = PhaseTracker::new();
    let session = ChatSession::start(model, request.history);
    tracker.advance(StreamPhase::SessionOpened);

    let mut upstream = match session.send_message_stream(&request.chat).await {
        Ok(upstream) => upstream,
        Err(e) => {
            tracker.advance(StreamPhase::Failed);
            return Err(e);
        }
    };

    let body = async_stream::stream! {
        let mut tracker = tracker;
        tracker.advance(StreamPhase::Streaming);
        while let Some(item) = upstream.next().await {
            match item {
                Ok(text) => {
                    tracker.fragments += 1;
                    yield Ok(Bytes::from(text));
                }
                Err(e) => {
                    tracing::error!(error = %e, fragments = tracker.fragments, "stream aborted by model error");
                    tracker.advance(StreamPhase::Failed);
                    yield Err(e);
                    return;
                }
            }
        }
        tracker.advance(StreamPhase::Completed);
    };

    Ok(RelayStream { body, phase })
}
