#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use axum::Router;
use futures::StreamExt;
use gemini_relay::message::{ChatTurn, Role};
use gemini_relay::routes::create_router;
use gemini_relay::services::model::{ChatModel, ModelError, TextStream};
use gemini_relay::state::AppState;

pub enum Behavior {
    /// Reply describes the contents it received; streams one fragment per turn.
    Echo,
    /// Every call fails before producing output.
    Fail,
    /// Streams the given fragments.
    Chunks(Vec<&'static str>),
    /// Streams the given fragments, then fails.
    FailAfter(Vec<&'static str>),
    /// Streams one fragment then never finishes; the flag flips when the stream is dropped.
    Hang(Arc<AtomicBool>),
}

pub struct MockModel {
    behavior: Behavior,
    pub seen: Mutex<Vec<Vec<ChatTurn>>>,
}

impl MockModel {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn last_contents(&self) -> Vec<ChatTurn> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

pub fn describe(turn: &ChatTurn) -> String {
    let role = match &turn.role {
        Some(Role::User) => "user",
        Some(Role::Model) => "model",
        Some(Role::Other(role)) => role.as_str(),
        None => "-",
    };
    format!("{role}:{}", turn.text())
}

// Gemini answers 400 for roles it does not know.
fn check_roles(contents: &[ChatTurn]) -> Result<(), ModelError> {
    match contents
        .iter()
        .find(|t| matches!(t.role, Some(Role::Other(_))))
    {
        Some(_) => Err(ModelError::Api {
            status: 400,
            message: "Please use a valid role: user, model.".into(),
        }),
        None => Ok(()),
    }
}

fn quota_error() -> ModelError {
    ModelError::Api {
        status: 429,
        message: "quota exceeded".into(),
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatModel for MockModel {
    async fn generate(&self, contents: &[ChatTurn]) -> Result<String, ModelError> {
        self.seen.lock().unwrap().push(contents.to_vec());
        check_roles(contents)?;
        match &self.behavior {
            Behavior::Fail => Err(quota_error()),
            Behavior::Chunks(chunks) => Ok(chunks.concat()),
            _ => Ok(contents.iter().map(describe).collect::<Vec<_>>().join(" | ")),
        }
    }

    async fn generate_stream(&self, contents: Vec<ChatTurn>) -> Result<TextStream, ModelError> {
        self.seen.lock().unwrap().push(contents.clone());
        check_roles(&contents)?;
        match &self.behavior {
            Behavior::Echo => {
                let items: Vec<Result<String, ModelError>> =
                    contents.iter().map(|t| Ok(format!("{}\n", describe(t)))).collect();
                Ok(futures::stream::iter(items).boxed())
            }
            Behavior::Fail => Err(quota_error()),
            Behavior::Chunks(chunks) => {
                let items: Vec<Result<String, ModelError>> =
                    chunks.iter().map(|c| Ok(c.to_string())).collect();
                Ok(futures::stream::iter(items).boxed())
            }
            Behavior::FailAfter(chunks) => {
                let mut items: Vec<Result<String, ModelError>> =
                    chunks.iter().map(|c| Ok(c.to_string())).collect();
                items.push(Err(quota_error()));
                Ok(futures::stream::iter(items).boxed())
            }
            Behavior::Hang(dropped) => {
                let flag = DropFlag(dropped.clone());
                let stream = async_stream::stream! {
                    let _flag = flag;
                    yield Ok::<_, ModelError>("first".to_string());
                    futures::future::pending::<()>().await;
                };
                Ok(stream.boxed())
            }
        }
    }
}

pub fn app(model: Arc<MockModel>) -> Router {
    let state = Arc::new(AppState::new(model));
    create_router().with_state(state)
}
