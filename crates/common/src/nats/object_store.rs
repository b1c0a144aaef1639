use crate::nats::traits::ObjectStorage;
use anyhow::{Context, Result};
use async_nats::jetstream;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::debug;

pub struct NatsObjectStoreClient {
    store: jetstream::object_store::ObjectStore,
}

impl NatsObjectStoreClient {
    pub async fn new(jetstream: &jetstream::Context, bucket_name: &str) -> Result<Self> {
        debug!(bucket = %bucket_name, "initializing object store client");

        let store = match jetstream.get_object_store(bucket_name).await {
            Ok(store) => {
                debug!(bucket = %bucket_name, "object store bucket already exists");
                store
            }
            Err(_) => {
                debug!(bucket = %bucket_name, "creating object store bucket");
                jetstream
                    .create_object_store(jetstream::object_store::Config {
                        bucket: bucket_name.to_string(),
                        ..Default::default()
                    })
                    .await
                    .context("failed to create object store bucket")?
            }
        };

        Ok(Self { store })
    }
}

#[async_trait]
impl ObjectStorage for NatsObjectStoreClient {
    async fn upload(&self, key: &str, content_type: &str, content: Bytes) -> Result<()> {
        // The object store has no first-class content-type header; the
        // annotation rides in the object metadata description.
        let meta = jetstream::object_store::ObjectMetadata {
            name: key.to_string(),
            description: Some(content_type.to_string()),
            ..Default::default()
        };

        let mut reader = &content[..];
        self.store
            .put(meta, &mut reader)
            .await
            .context("failed to upload object")?;
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Bytes> {
        let mut object = self.store.get(key).await.context("failed to get object")?;

        let mut buf = Vec::new();
        object
            .read_to_end(&mut buf)
            .await
            .context("failed to read object content")?;

        Ok(Bytes::from(buf))
    }
}
