//! Persistent attributes backed by S3.
//!
//! Attributes are a JSON object per Alexa user. A handler fetches them through
//! an [`AttributesManager`], mutates them in memory and flushes them explicitly
//! before returning. Nothing is cached beyond a single invocation.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::request::RequestEnvelope;
use crate::{Error, Result};

/// User-scoped state that survives between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentAttributes {
    /// Last paused position in the track, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Fields written by other versions of the skill, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Durable key-value store for persistent attributes.
#[async_trait]
pub trait AttributesStore: Send + Sync {
    /// Read the attributes for a user. Unknown users yield empty attributes.
    async fn get_attributes(&self, user_id: &str) -> Result<PersistentAttributes>;

    /// Overwrite the attributes for a user.
    async fn save_attributes(&self, user_id: &str, attributes: &PersistentAttributes) -> Result<()>;
}

/// Stores one JSON object per user in an S3 bucket.
pub struct S3PersistenceAdapter {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3PersistenceAdapter {
    /// Create a new adapter for the given bucket. Objects are stored under
    /// `<prefix>/<userId>`, or at `<userId>` when the prefix is empty.
    pub fn new(client: S3Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    fn object_key(&self, user_id: &str) -> String {
        if self.prefix.is_empty() || self.prefix.ends_with('/') {
            format!("{}{}", self.prefix, user_id)
        } else {
            format!("{}/{}", self.prefix, user_id)
        }
    }
}

#[async_trait]
impl AttributesStore for S3PersistenceAdapter {
    async fn get_attributes(&self, user_id: &str) -> Result<PersistentAttributes> {
        let key = self.object_key(user_id);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                info!(key = %key, "No stored attributes, starting fresh");
                return Ok(PersistentAttributes::default());
            }
            Err(e) => {
                return Err(Error::Persistence(format!(
                    "Could not read item ({}) from bucket ({}): {}",
                    key, self.bucket, e
                )))
            }
        };

        let body = output.body.collect().await.map_err(|e| {
            Error::Persistence(format!(
                "Could not read item ({}) from bucket ({}): {}",
                key, self.bucket, e
            ))
        })?;

        decode_attributes(&body.into_bytes())
    }

    async fn save_attributes(&self, user_id: &str, attributes: &PersistentAttributes) -> Result<()> {
        let key = self.object_key(user_id);
        let payload = serde_json::to_vec(attributes)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/json")
            .body(ByteStream::from(payload))
            .send()
            .await
            .map_err(|e| {
                Error::Persistence(format!(
                    "Could not save item ({}) to bucket ({}): {}",
                    key, self.bucket, e
                ))
            })?;

        Ok(())
    }
}

fn decode_attributes(bytes: &[u8]) -> Result<PersistentAttributes> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(PersistentAttributes::default());
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Per-invocation access to a user's persistent attributes.
pub struct AttributesManager<'a> {
    store: &'a dyn AttributesStore,
    user_id: Option<String>,
    persistent: Option<PersistentAttributes>,
}

impl<'a> AttributesManager<'a> {
    pub fn new(store: &'a dyn AttributesStore, envelope: &RequestEnvelope) -> Self {
        Self {
            store,
            user_id: envelope.user_id().map(String::from),
            persistent: None,
        }
    }

    fn user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| Error::Persistence("Cannot retrieve user id from request envelope".to_string()))
    }

    /// Fetch the attributes, hitting the store at most once per invocation.
    pub async fn persistent_attributes(&mut self) -> Result<&mut PersistentAttributes> {
        if self.persistent.is_none() {
            let user_id = self.user_id()?;
            let attributes = self.store.get_attributes(user_id).await?;
            self.persistent = Some(attributes);
        }
        self.persistent
            .as_mut()
            .ok_or_else(|| Error::Internal("Persistent attributes not loaded".to_string()))
    }

    /// Replace the in-memory attributes; nothing is written until saved.
    pub fn set_persistent_attributes(&mut self, attributes: PersistentAttributes) {
        self.persistent = Some(attributes);
    }

    /// Flush the in-memory attributes to the store.
    pub async fn save_persistent_attributes(&self) -> Result<()> {
        let attributes = self.persistent.as_ref().ok_or_else(|| {
            Error::Persistence(
                "Cannot save persistent attributes: they were neither fetched nor set".to_string(),
            )
        })?;
        self.store.save_attributes(self.user_id()?, attributes).await
    }
}
