//! Shared library for the Oyasumi Ehon skill Lambda.
//!
//! This crate provides the Alexa envelope types, configuration, persistence and
//! media clients used by the skill handlers.

pub mod config;
pub mod error;
pub mod media;
pub mod persistence;
pub mod request;
pub mod response;

pub use config::Config;
pub use error::{Error, Result};
pub use media::{S3TrackSigner, TrackUrlProvider};
pub use persistence::{AttributesManager, AttributesStore, PersistentAttributes, S3PersistenceAdapter};
pub use request::{AudioPlayerEvent, RequestEnvelope, RequestKind};
pub use response::{PlayBehavior, ResponseBuilder, ResponseEnvelope};
