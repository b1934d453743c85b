//! Configuration management for the skill Lambda.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Default S3 key of the bedtime story track.
pub const DEFAULT_MEDIA_OBJECT_KEY: &str = "Media/oyasumi_ehon.mp3";

/// Default lifetime of a pre-signed track URL.
pub const DEFAULT_MEDIA_URL_EXPIRES_SECS: u64 = 60;

/// S3 refuses to presign URLs valid for longer than a week.
pub const MAX_MEDIA_URL_EXPIRES_SECS: u64 = 604_800;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Bucket holding the persistent attributes
    pub persistence_bucket: String,
    /// Key prefix for attribute objects
    pub persistence_prefix: String,
    /// Bucket holding the audio track
    pub media_bucket: String,
    /// Object key of the audio track
    pub media_object_key: String,
    /// How long a pre-signed track URL stays valid
    pub media_url_expires_in: Duration,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let persistence_bucket = lookup("S3_PERSISTENCE_BUCKET")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("S3_PERSISTENCE_BUCKET not set".to_string()))?;

        let media_url_expires_in = match lookup("MEDIA_URL_EXPIRES_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    Error::Config(format!("Invalid MEDIA_URL_EXPIRES_SECS '{}': {}", raw, e))
                })?;
                if secs == 0 || secs > MAX_MEDIA_URL_EXPIRES_SECS {
                    return Err(Error::Config(format!(
                        "MEDIA_URL_EXPIRES_SECS must be between 1 and {}, got {}",
                        MAX_MEDIA_URL_EXPIRES_SECS, secs
                    )));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_MEDIA_URL_EXPIRES_SECS),
        };

        Ok(Self {
            persistence_prefix: lookup("S3_PERSISTENCE_PREFIX").unwrap_or_default(),
            media_bucket: lookup("MEDIA_BUCKET").unwrap_or_else(|| persistence_bucket.clone()),
            media_object_key: lookup("MEDIA_OBJECT_KEY")
                .unwrap_or_else(|| DEFAULT_MEDIA_OBJECT_KEY.to_string()),
            media_url_expires_in,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            persistence_bucket,
        })
    }
}
