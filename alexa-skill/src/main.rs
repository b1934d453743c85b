//! Oyasumi Ehon Skill Lambda - Plays a bedtime story and remembers where it paused.

mod handlers;
mod playback;
mod router;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{Config, RequestEnvelope, ResponseEnvelope, S3PersistenceAdapter, S3TrackSigner};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::router::Router;

/// Application state, built once per cold start.
struct AppState {
    router: Router,
    store: S3PersistenceAdapter,
    tracks: S3TrackSigner,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let s3_client = aws_sdk_s3::Client::new(&sdk_config);

        info!(
            persistence_bucket = %config.persistence_bucket,
            media_bucket = %config.media_bucket,
            media_key = %config.media_object_key,
            "Skill configured"
        );

        Ok(Self {
            router: Router::skill(),
            store: S3PersistenceAdapter::new(
                s3_client.clone(),
                config.persistence_bucket.clone(),
                config.persistence_prefix.clone(),
            ),
            tracks: S3TrackSigner::new(
                s3_client,
                config.media_bucket,
                config.media_object_key,
                config.media_url_expires_in,
            ),
        })
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<RequestEnvelope>) -> Result<ResponseEnvelope, Error> {
    let (envelope, _context) = event.into_parts();

    Ok(state
        .router
        .handle_envelope(&envelope, &state.store, &state.tracks)
        .await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
