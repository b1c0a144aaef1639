mod domain;
mod nats;
mod telemetry;

pub use domain::*;
pub use nats::*;
pub use telemetry::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use nats::MockJetStreamConsumer;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockMessageProcessor;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockObjectStorage;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockPullConsumer;
