//! Decision oracle: the collaborator that turns a conversation into a reply.
//!
//! The round controller only sees [`DecisionOracle`]; the HTTP client and the
//! scripted replay are interchangeable behind it.

pub mod chat;
pub mod retry;
pub mod scripted;

use async_trait::async_trait;

use crate::domain::ChatMessage;
use crate::error::Result;

pub use chat::ChatCompletionsOracle;
pub use retry::RetryPolicy;
pub use scripted::ScriptedOracle;

/// Produces one free-text reply for a conversation history.
///
/// The newest prompt is the last user turn of `history`.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String>;
}
