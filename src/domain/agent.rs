use serde::{Deserialize, Serialize};
use std::fmt;

/// Role tag on a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One role-tagged turn of an agent's conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Which side of the game an agent plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    Platform,
    Seller,
}

/// Per-agent ledger: identity, running balance and append-only conversation
///
/// The history is never truncated; it is the only state an agent carries
/// from one round to the next.
#[derive(Debug, Clone)]
pub struct Agent {
    name: String,
    role: AgentRole,
    role_desc: String,
    balance: f64,
    history: Vec<ChatMessage>,
}

impl Agent {
    /// Create an agent whose history opens with the game setting and its role
    pub fn new(
        name: impl Into<String>,
        role: AgentRole,
        role_desc: impl Into<String>,
        game_setting: &str,
    ) -> Self {
        let role_desc = role_desc.into();
        let history = vec![ChatMessage::system(format!("{}\n\n{}", game_setting, role_desc))];
        Self {
            name: name.into(),
            role,
            role_desc,
            balance: 0.0,
            history,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    /// Add a round's profit (may be negative)
    pub fn credit(&mut self, profit: f64) {
        self.balance += profit;
    }

    /// One-line status used in prompts
    pub fn status(&self) -> String {
        format!("{} ({}) profit={:.2}", self.name, self.role_desc, self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_history_starts_with_setting() {
        let agent = Agent::new("Amazonia", AgentRole::Platform, "You are M.", "Rules.");
        assert_eq!(agent.history().len(), 1);
        assert_eq!(agent.history()[0].role, ChatRole::System);
        assert_eq!(agent.history()[0].content, "Rules.\n\nYou are M.");
        assert_eq!(agent.balance(), 0.0);
    }

    #[test]
    fn test_credit_accumulates_negative_profit() {
        let mut agent = Agent::new("StartUpInc", AgentRole::Seller, "You are S.", "Rules.");
        agent.credit(10.5);
        agent.credit(-20.0);
        assert!((agent.balance() + 9.5).abs() < 1e-12);
        assert!(agent.status().contains("profit=-9.50"));
    }

    #[test]
    fn test_chat_role_serializes_lowercase() {
        let msg = ChatMessage::assistant("ok");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }
}
