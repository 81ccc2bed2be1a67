mod client;
mod consumer_types;
mod tower_consumer;
mod traits;

pub use client::*;
pub use consumer_types::*;
pub use tower_consumer::*;
pub use traits::*;
