use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::DecisionOracle;
use crate::domain::ChatMessage;
use crate::error::Result;

/// Replays canned replies in order, then a fixed fallback reply.
///
/// Every history it is called with is kept, so callers can inspect exactly
/// which prompts were issued. With no replies at all, every stage falls back
/// to its default decision, which is what dry runs use.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedOracle {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: String::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply used once the script runs out
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Histories seen so far, one per call
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Last prompt of every call, in order
    pub fn prompts(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|h| h.last().map(|m| m.content.clone()))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(history.to_vec());
        }
        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_then_falls_back() {
        let oracle = ScriptedOracle::new(["a", "b"]).with_fallback("z");
        let history = vec![ChatMessage::user("q")];
        assert_eq!(oracle.generate(&history).await.unwrap(), "a");
        assert_eq!(oracle.generate(&history).await.unwrap(), "b");
        assert_eq!(oracle.generate(&history).await.unwrap(), "z");
        assert_eq!(oracle.call_count(), 3);
        assert_eq!(oracle.remaining(), 0);
        assert_eq!(oracle.prompts(), vec!["q", "q", "q"]);
    }

    #[test]
    fn test_default_oracle_replies_empty() {
        let oracle = ScriptedOracle::default();
        let reply = tokio_test::block_on(oracle.generate(&[ChatMessage::user("Mode?")])).unwrap();
        assert!(reply.is_empty());
        assert_eq!(oracle.call_count(), 1);
    }
}
