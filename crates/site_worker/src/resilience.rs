mod circuit_breaker;
mod retry;

pub use circuit_breaker::*;
pub use retry::*;
