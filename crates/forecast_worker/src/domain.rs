mod features;
mod forecast_service;
mod record;
mod report;

pub use features::*;
pub use forecast_service::*;
pub use record::*;
pub use report::*;
