//! Request handlers for the Oyasumi Ehon skill.
//!
//! The order of [`chain`] is the routing priority. The intent reflector
//! matches every IntentRequest, so it must stay last.

use async_trait::async_trait;
use shared::{RequestKind, ResponseBuilder, ResponseEnvelope, Result};
use tracing::info;

use crate::playback;
use crate::router::{HandlerInput, RequestHandler};

pub const PLAY_INTENT: &str = "PlayOyasumiEhonIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const PAUSE_INTENT: &str = "AMAZON.PauseIntent";
pub const RESUME_INTENT: &str = "AMAZON.ResumeIntent";
pub const YES_INTENT: &str = "AMAZON.YesIntent";
pub const NO_INTENT: &str = "AMAZON.NoIntent";

pub const RESUME_QUESTION: &str = "途中から再生させますか？";
pub const HELP_SPEECH: &str = "お休み絵本を起動して、再生してと言ってください。";

/// Handlers in routing priority order.
pub fn chain() -> Vec<Box<dyn RequestHandler>> {
    vec![
        Box::new(LaunchRequestHandler),
        Box::new(PlayIntentHandler),
        Box::new(AudioPlayerEventHandler),
        Box::new(PauseIntentHandler),
        Box::new(ResumeIntentHandler),
        Box::new(YesIntentHandler),
        Box::new(NoIntentHandler),
        Box::new(HelpIntentHandler),
        Box::new(CancelAndStopIntentHandler),
        Box::new(SessionEndedRequestHandler),
        Box::new(IntentReflectorHandler),
    ]
}

fn is_intent(input: &HandlerInput<'_>, name: &str) -> bool {
    input.envelope.request.kind() == RequestKind::Intent(name)
}

/// Starts from the beginning, or asks whether to resume a saved position.
pub struct LaunchRequestHandler;

#[async_trait]
impl RequestHandler for LaunchRequestHandler {
    fn name(&self) -> &'static str {
        "LaunchRequestHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.envelope.request.kind() == RequestKind::Launch
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let offset = playback::persisted_offset(&mut input.attributes).await?;
        info!(offset = ?offset, "Launch");

        match offset {
            None | Some(0) => input.play_from(0).await,
            Some(_) => Ok(ResponseBuilder::new()
                .speak(RESUME_QUESTION)
                .reprompt(RESUME_QUESTION)
                .get_response()),
        }
    }
}

/// "Play" spoken directly always starts over.
pub struct PlayIntentHandler;

#[async_trait]
impl RequestHandler for PlayIntentHandler {
    fn name(&self) -> &'static str {
        "PlayIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        is_intent(input, PLAY_INTENT)
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        info!(intent = PLAY_INTENT, "Play from start");
        input.play_from(0).await
    }
}

/// Acknowledges playback lifecycle notifications without acting on them.
pub struct AudioPlayerEventHandler;

#[async_trait]
impl RequestHandler for AudioPlayerEventHandler {
    fn name(&self) -> &'static str {
        "AudioPlayerEventHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        matches!(input.envelope.request.kind(), RequestKind::AudioPlayer(_))
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let request = &input.envelope.request;
        info!(
            request_type = %request.request_type,
            token = request.token.as_deref().unwrap_or("-"),
            offset = ?request.offset_in_milliseconds,
            "AudioPlayer event"
        );
        Ok(ResponseBuilder::new().get_response())
    }
}

/// Saves where playback stopped, then stops.
pub struct PauseIntentHandler;

#[async_trait]
impl RequestHandler for PauseIntentHandler {
    fn name(&self) -> &'static str {
        "PauseIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        is_intent(input, PAUSE_INTENT)
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let offset = playback::live_offset(input.envelope);
        playback::save_persisted_offset(&mut input.attributes, offset).await?;
        Ok(playback::stop_response())
    }
}

/// Continues in-session from the device's own position.
pub struct ResumeIntentHandler;

#[async_trait]
impl RequestHandler for ResumeIntentHandler {
    fn name(&self) -> &'static str {
        "ResumeIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        is_intent(input, RESUME_INTENT)
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let offset = playback::live_offset(input.envelope);
        input.play_from(offset).await
    }
}

/// "Yes" to the resume question: continue from the saved position.
pub struct YesIntentHandler;

#[async_trait]
impl RequestHandler for YesIntentHandler {
    fn name(&self) -> &'static str {
        "YesIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        is_intent(input, YES_INTENT)
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let offset = playback::persisted_offset(&mut input.attributes)
            .await?
            .unwrap_or(0);
        input.play_from(offset).await
    }
}

/// "No" to the resume question: start over, leaving the saved position alone.
pub struct NoIntentHandler;

#[async_trait]
impl RequestHandler for NoIntentHandler {
    fn name(&self) -> &'static str {
        "NoIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        is_intent(input, NO_INTENT)
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        input.play_from(0).await
    }
}

pub struct HelpIntentHandler;

#[async_trait]
impl RequestHandler for HelpIntentHandler {
    fn name(&self) -> &'static str {
        "HelpIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        is_intent(input, HELP_INTENT)
    }

    async fn handle(&self, _input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        Ok(ResponseBuilder::new()
            .speak(HELP_SPEECH)
            .reprompt(HELP_SPEECH)
            .get_response())
    }
}

pub struct CancelAndStopIntentHandler;

#[async_trait]
impl RequestHandler for CancelAndStopIntentHandler {
    fn name(&self) -> &'static str {
        "CancelAndStopIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        is_intent(input, CANCEL_INTENT) || is_intent(input, STOP_INTENT)
    }

    async fn handle(&self, _input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        Ok(playback::stop_response())
    }
}

/// Session end. The position is not saved here; only a pause saves it.
pub struct SessionEndedRequestHandler;

#[async_trait]
impl RequestHandler for SessionEndedRequestHandler {
    fn name(&self) -> &'static str {
        "SessionEndedRequestHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.envelope.request.kind() == RequestKind::SessionEnded
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let request = &input.envelope.request;
        info!(
            reason = request.reason.as_deref().unwrap_or("-"),
            error_type = request.error.as_ref().and_then(|e| e.error_type.as_deref()),
            error_message = request.error.as_ref().and_then(|e| e.message.as_deref()),
            "Session ended"
        );
        Ok(ResponseBuilder::new().get_response())
    }
}

/// Echoes unmatched intent names back, for interaction model debugging.
pub struct IntentReflectorHandler;

#[async_trait]
impl RequestHandler for IntentReflectorHandler {
    fn name(&self) -> &'static str {
        "IntentReflectorHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        matches!(input.envelope.request.kind(), RequestKind::Intent(_))
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<ResponseEnvelope> {
        let intent_name = input.envelope.request.intent_name().unwrap_or_default();
        let speech = format!("{}が呼ばれました。", intent_name);
        info!(intent = intent_name, "Reflecting intent");

        Ok(ResponseBuilder::new()
            .speak(&speech)
            .with_should_end_session(true)
            .get_response())
    }
}
