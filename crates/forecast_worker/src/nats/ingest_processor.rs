use crate::domain::{ForecastService, IngestEvent};
use async_trait::async_trait;
use bytes::Bytes;
use common::{MessageProcessor, ProcessingVerdict};
use std::sync::Arc;
use tracing::{debug, error};

/// Bridges consumed stream messages into the forecast service
///
/// Each message carries one JSON-encoded `IngestEvent`. Undecodable messages
/// and batch-level failures are rejected so the stream redelivers them;
/// record-level failures inside an accepted event are already reported in
/// the batch outcome and do not block acknowledgment.
pub struct IngestEventProcessor {
    service: Arc<ForecastService>,
}

impl IngestEventProcessor {
    pub fn new(service: Arc<ForecastService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageProcessor for IngestEventProcessor {
    async fn process(&self, payload: Bytes) -> ProcessingVerdict {
        let event: IngestEvent = match serde_json::from_slice(&payload) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "failed to decode ingest event");
                return ProcessingVerdict::Nak(Some(format!("Decode error: {e}")));
            }
        };

        let outcome = self.service.handle_event(event).await;
        if outcome.is_batch_failure() {
            return ProcessingVerdict::Nak(Some(outcome.message));
        }

        debug!(
            completed = outcome.succeeded_count(),
            failed = outcome.failed_count(),
            "ingest event handled"
        );
        ProcessingVerdict::Ack
    }
}
