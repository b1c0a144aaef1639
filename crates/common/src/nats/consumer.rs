use crate::nats::traits::{JetStreamConsumer, MessageProcessor, ProcessingVerdict, PullConsumer};
use anyhow::{Context, Result};
use async_nats::jetstream;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A NATS pull consumer that feeds each message payload to a `MessageProcessor`.
///
/// Messages are fetched in batches but handed to the processor one at a time;
/// the processor's verdict decides whether each message is acked or nak'd.
pub struct NatsConsumer {
    consumer: Box<dyn PullConsumer>,
    stream_name: String,
    consumer_name: String,
    batch_size: usize,
    max_wait: Duration,
    processor: Arc<dyn MessageProcessor>,
}

impl NatsConsumer {
    /// Create a new durable pull consumer bound to a processor
    pub async fn new(
        jetstream: Arc<dyn JetStreamConsumer>,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait_secs: u64,
        processor: Arc<dyn MessageProcessor>,
    ) -> Result<Self> {
        debug!(
            stream = %stream_name,
            consumer = %consumer_name,
            filter_subject = %subject_filter,
            "creating nats consumer"
        );

        let config = jetstream::consumer::pull::Config {
            name: Some(consumer_name.to_string()),
            durable_name: Some(consumer_name.to_string()),
            filter_subject: subject_filter.to_string(),
            ack_policy: jetstream::consumer::AckPolicy::Explicit,
            ..Default::default()
        };

        let consumer = jetstream
            .create_consumer(config, stream_name)
            .await
            .context("failed to create consumer")?;

        debug!(
            stream = %stream_name,
            consumer = %consumer_name,
            "nats consumer created successfully"
        );

        Ok(Self {
            consumer,
            stream_name: stream_name.to_string(),
            consumer_name: consumer_name.to_string(),
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            processor,
        })
    }

    /// Run the consumer loop until cancellation
    pub async fn run(mut self, ctx: CancellationToken) -> Result<()> {
        debug!(
            stream = %self.stream_name,
            consumer = %self.consumer_name,
            "starting nats consumer"
        );

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!(
                        stream = %self.stream_name,
                        consumer = %self.consumer_name,
                        "received shutdown signal, stopping consumer"
                    );
                    break;
                }
                result = self.fetch_and_process_batch() => {
                    if let Err(e) = result {
                        error!(
                            stream = %self.stream_name,
                            consumer = %self.consumer_name,
                            error = %e,
                            "error processing batch"
                        );
                        // Continue processing despite errors
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        debug!(
            stream = %self.stream_name,
            consumer = %self.consumer_name,
            "consumer stopped gracefully"
        );
        Ok(())
    }

    async fn fetch_and_process_batch(&mut self) -> Result<()> {
        debug!(
            batch_size = self.batch_size,
            max_wait_secs = self.max_wait.as_secs(),
            "fetching message batch"
        );

        let raw_messages = self
            .consumer
            .fetch_messages(self.batch_size, self.max_wait)
            .await?;

        if raw_messages.is_empty() {
            debug!("no messages in batch");
            return Ok(());
        }

        debug!(message_count = raw_messages.len(), "received message batch");

        for msg in &raw_messages {
            let payload = Bytes::copy_from_slice(&msg.payload);

            let verdict = self.processor.process(payload).await;

            match verdict {
                ProcessingVerdict::Ack => {
                    if let Err(e) = msg.ack().await {
                        error!(
                            subject = %msg.subject,
                            error = %e,
                            "failed to acknowledge message"
                        );
                    }
                }
                ProcessingVerdict::Nak(reason) => {
                    if let Some(ref r) = reason {
                        warn!(
                            subject = %msg.subject,
                            reason = %r,
                            "rejecting message"
                        );
                    } else {
                        warn!(
                            subject = %msg.subject,
                            "rejecting message"
                        );
                    }

                    if let Err(e) = msg.ack_with(jetstream::AckKind::Nak(None)).await {
                        error!(
                            subject = %msg.subject,
                            error = %e,
                            "failed to reject message"
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
