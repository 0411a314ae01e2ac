pub mod agent;
pub mod mode;
pub mod round;

pub use agent::*;
pub use mode::*;
pub use round::*;
