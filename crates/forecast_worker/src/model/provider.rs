use crate::domain::{FEATURE_COUNT, FEATURE_VERSION};
use crate::model::{Forecaster, OnnxForecaster};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use common::ObjectStorage;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait for acquiring the trained model
///
/// A load failure is batch-fatal: the invocation that triggered it aborts
/// without processing any records.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Forecaster>>;
}

/// Loads the model artifact from the object store bucket.
///
/// The artifact is staged to a local scratch file before deserialization,
/// then probed with a zeroed row so an artifact trained against a different
/// feature layout fails at load time instead of corrupting predictions.
pub struct ObjectStoreModelProvider {
    storage: Arc<dyn ObjectStorage>,
    artifact_key: String,
    scratch_dir: PathBuf,
}

impl ObjectStoreModelProvider {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        artifact_key: String,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            artifact_key,
            scratch_dir: scratch_dir.into(),
        }
    }

    fn scratch_path(&self) -> PathBuf {
        let file_name = self
            .artifact_key
            .rsplit('/')
            .next()
            .unwrap_or("model-artifact");
        self.scratch_dir.join(file_name)
    }
}

#[async_trait]
impl ModelProvider for ObjectStoreModelProvider {
    async fn load(&self) -> Result<Arc<dyn Forecaster>> {
        info!(key = %self.artifact_key, "downloading model artifact");
        let bytes = self
            .storage
            .download(&self.artifact_key)
            .await
            .context("failed to download model artifact")?;

        let scratch_path = self.scratch_path();
        tokio::fs::write(&scratch_path, &bytes)
            .await
            .with_context(|| {
                format!(
                    "failed to stage model artifact at {}",
                    scratch_path.display()
                )
            })?;
        debug!(path = %scratch_path.display(), size = bytes.len(), "model artifact staged");

        let session = Session::builder()
            .context("failed to create session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("failed to set optimization level")?
            .commit_from_file(&scratch_path)
            .context("failed to deserialize model artifact")?;

        let forecaster =
            OnnxForecaster::new(session).context("model artifact has an unexpected signature")?;

        // Probe with one zeroed row: an artifact trained on a different
        // feature layout must be rejected here, not discovered record by
        // record
        let probe = forecaster
            .predict(&[[0.0; FEATURE_COUNT]])
            .with_context(|| format!("model rejected a {FEATURE_COUNT}-feature probe row"))?;
        if probe.len() != 1 {
            bail!(
                "model probe returned {} rows for a single input row",
                probe.len()
            );
        }

        info!(feature_version = FEATURE_VERSION, "model loaded and validated");
        Ok(Arc::new(forecaster))
    }
}
