use crate::domain::ForecastService;
use crate::model::ObjectStoreModelProvider;
use crate::nats::IngestEventProcessor;
use anyhow::Result;
use common::{NatsClient, NatsConsumer, ObjectStorage};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct ForecastWorkerConfig {
    pub ingest_stream: String,
    pub ingest_subject: String,
    pub consumer_name: String,
    pub model_key: String,
    pub scratch_dir: String,
    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
}

/// Wires the forecast pipeline to its ingest stream
pub struct ForecastWorker {
    consumer: NatsConsumer,
}

impl ForecastWorker {
    pub async fn new(
        nats_client: Arc<NatsClient>,
        storage: Arc<dyn ObjectStorage>,
        config: ForecastWorkerConfig,
    ) -> Result<Self> {
        info!("Initializing forecast worker");

        let provider = Arc::new(ObjectStoreModelProvider::new(
            Arc::clone(&storage),
            config.model_key.clone(),
            config.scratch_dir.clone(),
        ));
        let service = Arc::new(ForecastService::new(provider, storage));
        let processor = Arc::new(IngestEventProcessor::new(service));

        let consumer_client = nats_client.create_consumer_client();
        let consumer = NatsConsumer::new(
            consumer_client,
            &config.ingest_stream,
            &config.consumer_name,
            &config.ingest_subject,
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            processor,
        )
        .await?;

        info!("Forecast worker initialized");
        Ok(Self { consumer })
    }

    /// Run the ingest loop until cancellation
    pub async fn run(self, ctx: CancellationToken) -> Result<()> {
        self.consumer.run(ctx).await
    }
}
