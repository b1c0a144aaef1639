pub mod domain;
pub mod forecast_worker;
pub mod model;
pub mod nats;

pub use domain::*;
pub use forecast_worker::*;
pub use model::*;
pub use nats::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use model::MockForecaster;
#[cfg(any(test, feature = "testing"))]
pub use model::MockModelProvider;
