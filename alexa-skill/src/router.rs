//! Request routing: first matching handler wins, failures become an apology.

use async_trait::async_trait;
use shared::{
    AttributesManager, AttributesStore, Error, RequestEnvelope, ResponseBuilder, ResponseEnvelope, Result,
    TrackUrlProvider,
};
use tracing::{error, info};

use crate::handlers;
use crate::playback;

/// Spoken when a handler fails or nothing handles the request.
pub const APOLOGY_SPEECH: &str = "すみません。分かりません。";

/// Everything a handler may touch during one invocation.
pub struct HandlerInput<'a> {
    pub envelope: &'a RequestEnvelope,
    pub attributes: AttributesManager<'a>,
    tracks: &'a dyn TrackUrlProvider,
}

impl<'a> HandlerInput<'a> {
    pub fn new(
        envelope: &'a RequestEnvelope,
        store: &'a dyn AttributesStore,
        tracks: &'a dyn TrackUrlProvider,
    ) -> Self {
        Self {
            envelope,
            attributes: AttributesManager::new(store, envelope),
            tracks,
        }
    }

    /// Play the track from `offset`, signing a fresh URL.
    pub async fn play_from(&self, offset: u64) -> Result<ResponseEnvelope> {
        let url = self.tracks.track_url().await?;
        Ok(playback::play_response(&url, offset))
    }
}

#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool;

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope>;
}

/// Ordered handler chain, built once per cold start.
pub struct Router {
    handlers: Vec<Box<dyn RequestHandler>>,
}

impl Router {
    pub fn new(handlers: Vec<Box<dyn RequestHandler>>) -> Self {
        Self { handlers }
    }

    /// The skill's handler chain.
    pub fn skill() -> Self {
        Self::new(handlers::chain())
    }

    /// Handle one envelope end to end. Never fails: errors become the apology.
    pub async fn handle_envelope(
        &self,
        envelope: &RequestEnvelope,
        store: &dyn AttributesStore,
        tracks: &dyn TrackUrlProvider,
    ) -> ResponseEnvelope {
        let mut input = HandlerInput::new(envelope, store, tracks);
        self.dispatch(&mut input).await
    }

    pub async fn dispatch(&self, input: &mut HandlerInput<'_>) -> ResponseEnvelope {
        match self.route(input).await {
            Ok(response) => response,
            Err(e) => error_response(&input.envelope.request.request_type, &e),
        }
    }

    async fn route(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let envelope = input.envelope;
        let request = &envelope.request;
        let handler = self
            .handlers
            .iter()
            .find(|h| h.can_handle(input))
            .ok_or_else(|| Error::UnhandledRequest(request.request_type.clone()))?;

        info!(
            handler = handler.name(),
            request_type = %request.request_type,
            request_id = request.request_id.as_deref().unwrap_or("-"),
            timestamp = ?request.timestamp,
            "Dispatching request"
        );

        handler.handle(input).await
    }
}

/// Log the failure and apologise, keeping the session open.
pub fn error_response(request_type: &str, error: &Error) -> ResponseEnvelope {
    error!(request_type = %request_type, error = %error, "Error handled");

    ResponseBuilder::new()
        .speak(APOLOGY_SPEECH)
        .reprompt(APOLOGY_SPEECH)
        .get_response()
}
