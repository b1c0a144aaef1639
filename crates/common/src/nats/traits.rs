use anyhow::Result;
use async_nats::jetstream;
use async_trait::async_trait;
use bytes::Bytes;

/// Trait for JetStream consumer operations
/// Abstracts the operations needed to create and use a NATS JetStream consumer
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait JetStreamConsumer: Send + Sync {
    /// Create a durable pull consumer on a stream
    async fn create_consumer(
        &self,
        config: jetstream::consumer::pull::Config,
        stream_name: &str,
    ) -> Result<Box<dyn PullConsumer>>;
}

/// Trait for pull consumer operations
/// Abstracts the fetch operation on a pull consumer
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PullConsumer: Send + Sync {
    /// Fetch messages from the consumer
    /// Returns a batch of messages up to max_messages, waiting up to expires duration
    async fn fetch_messages(
        &self,
        max_messages: usize,
        expires: std::time::Duration,
    ) -> Result<Vec<jetstream::Message>>;
}

/// Verdict returned by a message processor, controlling acknowledgment
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingVerdict {
    /// Message handled; acknowledge it
    Ack,
    /// Message not handled; negatively acknowledge with an optional reason
    Nak(Option<String>),
}

/// Trait for processing a single consumed message payload
///
/// Implementations must not panic on malformed payloads; every failure mode
/// maps to a `ProcessingVerdict` so the consumer loop can keep draining.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    /// Process one message payload and decide its acknowledgment
    async fn process(&self, payload: Bytes) -> ProcessingVerdict;
}

/// Trait for blob storage operations against an object store bucket
///
/// Implementations should:
/// - Write the content under the given key, annotated with the content type
/// - Return an error if the underlying store rejects the operation
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload an object under `key` with the given content type annotation
    async fn upload(&self, key: &str, content_type: &str, content: Bytes) -> Result<()>;

    /// Download the object stored under `key`
    async fn download(&self, key: &str) -> Result<Bytes>;
}
