pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod game;
pub mod oracle;

pub use config::{AppConfig, GameConfig, RegulationConfig};
pub use domain::{Agent, BusinessMode, ChatMessage, RoundDecision, RoundRecord, Settlement};
pub use error::{GameError, OracleError, Result};
pub use game::{settle, PlatformGame, RoundController};
pub use oracle::{ChatCompletionsOracle, DecisionOracle, RetryPolicy, ScriptedOracle};
