pub mod cache;
pub mod domain;
pub mod garde;
pub mod nats;
pub mod store;

pub use cache::*;
pub use domain::*;
pub use nats::*;
pub use store::*;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockSiteProjectionCache;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockSiteRepository;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockJetStreamConsumer;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockPullConsumer;
