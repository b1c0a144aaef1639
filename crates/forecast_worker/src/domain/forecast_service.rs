use crate::domain::{
    assemble, extract, BatchOutcome, IngestEvent, IngestRecord, RecordOutcome, RecordStatus,
};
use crate::model::{Forecaster, ModelProvider};
use base64::Engine as _;
use bytes::Bytes;
use common::{DomainError, DomainResult, ObjectStorage};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Domain service that turns one ingest event into forecasts and storage writes
///
/// Flow per event:
/// 1. Acquire the model handle (loaded at most once per process lifetime)
/// 2. For each record: decode payload, extract features, predict, assemble
/// 3. Write the enriched record and the forecast result to blob storage
///
/// Record failures are isolated: a failed record is reported in the batch
/// outcome and skipped, and the loop continues. Only a model acquisition
/// failure aborts the whole invocation.
pub struct ForecastService {
    provider: Arc<dyn ModelProvider>,
    storage: Arc<dyn ObjectStorage>,
    model: OnceCell<Arc<dyn Forecaster>>,
}

impl ForecastService {
    pub fn new(provider: Arc<dyn ModelProvider>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            provider,
            storage,
            model: OnceCell::new(),
        }
    }

    /// Process one invocation event and report the aggregate outcome
    #[instrument(skip(self, event), fields(record_count = event.records.len()))]
    pub async fn handle_event(&self, event: IngestEvent) -> BatchOutcome {
        let forecaster = match self
            .model
            .get_or_try_init(|| async { self.provider.load().await })
            .await
        {
            Ok(forecaster) => Arc::clone(forecaster),
            Err(e) => {
                error!(error = %e, "model acquisition failed, aborting invocation");
                return BatchOutcome::batch_failure(format!("Error processing data: {e:#}"));
            }
        };

        let mut outcomes = Vec::with_capacity(event.records.len());
        for (index, record) in event.records.iter().enumerate() {
            match self.process_record(forecaster.as_ref(), record).await {
                Ok(()) => {
                    debug!(index, "record processed");
                    outcomes.push(RecordOutcome {
                        index,
                        status: RecordStatus::Completed,
                    });
                }
                Err(e) => {
                    warn!(index, error = %e, "record failed, skipping");
                    outcomes.push(RecordOutcome {
                        index,
                        status: RecordStatus::Failed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }

        let outcome = BatchOutcome::completed(outcomes);
        info!(
            completed = outcome.succeeded_count(),
            failed = outcome.failed_count(),
            "invocation complete"
        );
        outcome
    }

    async fn process_record(
        &self,
        forecaster: &dyn Forecaster,
        record: &IngestRecord,
    ) -> DomainResult<()> {
        let payload = base64::engine::general_purpose::STANDARD
            .decode(&record.data)
            .map_err(|e| DomainError::PayloadDecodeError(format!("invalid base64 payload: {e}")))?;

        let reading: Map<String, Value> = serde_json::from_slice(&payload).map_err(|e| {
            DomainError::PayloadDecodeError(format!("payload is not a JSON object: {e}"))
        })?;

        let extracted = extract(&reading);

        let predictions = forecaster.predict(&[extracted.vector])?;
        let prediction = predictions
            .first()
            .copied()
            .ok_or_else(|| DomainError::PredictionError("model returned no rows".to_string()))?;

        let result = assemble(prediction, &extracted.enriched);

        let enriched_body = serde_json::to_vec(&extracted.enriched)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        let result_body = serde_json::to_vec(&result)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;

        // Two independent writes; a failure between them leaves the first
        // object in place with no compensation
        self.storage
            .upload(&extracted.data_key, JSON_CONTENT_TYPE, Bytes::from(enriched_body))
            .await
            .map_err(DomainError::StorageError)?;
        debug!(key = %extracted.data_key, "enriched record written");

        self.storage
            .upload(&extracted.result_key, JSON_CONTENT_TYPE, Bytes::from(result_body))
            .await
            .map_err(DomainError::StorageError)?;
        debug!(key = %extracted.result_key, "forecast result written");

        Ok(())
    }
}
