pub mod domain;
pub mod nats;
pub mod resilience;
pub mod site_worker;

pub use domain::*;
pub use nats::*;
pub use resilience::*;
pub use site_worker::*;
