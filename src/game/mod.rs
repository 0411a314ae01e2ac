//! The platform game: extraction, settlement, the per-round stage protocol,
//! and the multi-round loop.

pub mod engine;
pub mod extract;
pub mod prompts;
pub mod round;
pub mod settlement;

pub use engine::PlatformGame;
pub use round::{available_modes, RoundController};
pub use settlement::{settle, MarketOption, Offer};
