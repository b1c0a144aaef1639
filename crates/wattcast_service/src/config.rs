use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// NATS JetStream stream name for ingest events
    #[serde(default = "default_ingest_stream")]
    pub ingest_stream: String,

    /// NATS subject pattern for the ingest consumer filter
    #[serde(default = "default_ingest_subject")]
    pub ingest_subject: String,

    /// Durable consumer name
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    /// NATS Object Store bucket holding the model artifact and outputs
    #[serde(default = "default_object_store_bucket")]
    pub object_store_bucket: String,

    /// Object key of the trained model artifact
    #[serde(default = "default_model_key")]
    pub model_key: String,

    /// Local directory for staging the downloaded model
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,

    /// Batch size for the consumer
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_ingest_stream() -> String {
    "sensor_readings".to_string()
}

fn default_ingest_subject() -> String {
    "sensor_readings.>".to_string()
}

fn default_consumer_name() -> String {
    "wattcast-forecast".to_string()
}

fn default_object_store_bucket() -> String {
    "energiemodel".to_string()
}

fn default_model_key() -> String {
    "models/xgb_model.json".to_string()
}

fn default_scratch_dir() -> String {
    "/tmp".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_startup_timeout_secs() -> u64 {
    30
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("WATTCAST"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("WATTCAST_LOG_LEVEL");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.ingest_stream, "sensor_readings");
        assert_eq!(config.model_key, "models/xgb_model.json");
        assert_eq!(config.nats_batch_size, 30);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("WATTCAST_LOG_LEVEL", "debug");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "debug");

        // Clean up
        std::env::remove_var("WATTCAST_LOG_LEVEL");
    }
}
