//! Pre-signed URLs for the bedtime story track.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;

use crate::{Error, Result};

/// Produces a fetchable URL for the audio track.
#[async_trait]
pub trait TrackUrlProvider: Send + Sync {
    async fn track_url(&self) -> Result<String>;
}

/// Signs short-lived GET URLs for a single S3 object.
pub struct S3TrackSigner {
    client: S3Client,
    bucket: String,
    key: String,
    expires_in: Duration,
}

impl S3TrackSigner {
    pub fn new(
        client: S3Client,
        bucket: impl Into<String>,
        key: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
            expires_in,
        }
    }
}

#[async_trait]
impl TrackUrlProvider for S3TrackSigner {
    async fn track_url(&self) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.expires_in)
            .map_err(|e| Error::Config(format!("Invalid presigning lifetime: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .presigned(presigning)
            .await
            .map_err(|e| Error::Aws(format!("Failed to presign {}: {}", self.key, e)))?;

        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    fn offline_client() -> S3Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("ap-northeast-1"))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .build();
        S3Client::from_conf(config)
    }

    #[tokio::test]
    async fn test_signed_url_targets_media_object() {
        let signer = S3TrackSigner::new(
            offline_client(),
            "oyasumi-media",
            "Media/oyasumi_ehon.mp3",
            Duration::from_secs(60),
        );

        let url = signer.track_url().await.unwrap();
        assert!(url.starts_with("https://"), "{}", url);
        assert!(url.contains("oyasumi-media"), "{}", url);
        assert!(url.contains("/Media/oyasumi_ehon.mp3?"), "{}", url);
        assert!(url.contains("X-Amz-Expires=60"), "{}", url);
        assert!(url.contains("X-Amz-Signature="), "{}", url);
    }

    #[tokio::test]
    async fn test_signed_url_rejects_overlong_lifetime() {
        let signer = S3TrackSigner::new(
            offline_client(),
            "oyasumi-media",
            "Media/oyasumi_ehon.mp3",
            Duration::from_secs(700_000),
        );

        assert!(matches!(signer.track_url().await, Err(Error::Config(_))));
    }
}
