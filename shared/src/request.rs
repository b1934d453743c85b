//! Inbound Alexa request envelope.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Request envelope delivered by the Alexa service.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<Context>,
    pub request: Request,
}

/// Session block (absent for AudioPlayer requests).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub new: Option<bool>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

/// Device context sent with every request.
#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: Option<SystemState>,
    #[serde(rename = "AudioPlayer", default)]
    pub audio_player: Option<AudioPlayerState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemState {
    #[serde(default)]
    pub user: Option<User>,
}

/// Live playback state reported by the device.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlayerState {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub offset_in_milliseconds: Option<u64>,
    #[serde(default)]
    pub player_activity: Option<String>,
}

/// The request body. Fields not used by a given request type stay `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    /// SessionEndedRequest only
    #[serde(default)]
    pub reason: Option<String>,
    /// SessionEndedRequest only
    #[serde(default)]
    pub error: Option<RequestError>,
    /// AudioPlayer requests only
    #[serde(default)]
    pub token: Option<String>,
    /// AudioPlayer requests only
    #[serde(default)]
    pub offset_in_milliseconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// AudioPlayer lifecycle notifications the skill acknowledges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioPlayerEvent {
    PlaybackStarted,
    PlaybackNearlyFinished,
    PlaybackStopped,
    PlaybackFinished,
}

/// Routing view of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind<'a> {
    Launch,
    Intent(&'a str),
    AudioPlayer(AudioPlayerEvent),
    SessionEnded,
    Other(&'a str),
}

impl Request {
    pub fn kind(&self) -> RequestKind<'_> {
        match self.request_type.as_str() {
            "LaunchRequest" => RequestKind::Launch,
            "IntentRequest" => match &self.intent {
                Some(intent) => RequestKind::Intent(&intent.name),
                None => RequestKind::Other(&self.request_type),
            },
            "SessionEndedRequest" => RequestKind::SessionEnded,
            "AudioPlayer.PlaybackStarted" => RequestKind::AudioPlayer(AudioPlayerEvent::PlaybackStarted),
            "AudioPlayer.PlaybackNearlyFinished" => {
                RequestKind::AudioPlayer(AudioPlayerEvent::PlaybackNearlyFinished)
            }
            "AudioPlayer.PlaybackStopped" => RequestKind::AudioPlayer(AudioPlayerEvent::PlaybackStopped),
            "AudioPlayer.PlaybackFinished" => RequestKind::AudioPlayer(AudioPlayerEvent::PlaybackFinished),
            other => RequestKind::Other(other),
        }
    }

    /// Intent name for IntentRequests.
    pub fn intent_name(&self) -> Option<&str> {
        match self.kind() {
            RequestKind::Intent(name) => Some(name),
            _ => None,
        }
    }
}

impl RequestEnvelope {
    /// The account-scoped user id, preferring the context over the session.
    pub fn user_id(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.user.as_ref())
            .or_else(|| self.session.as_ref().and_then(|s| s.user.as_ref()))
            .map(|u| u.user_id.as_str())
    }

    /// Live playback state, if the device reported any.
    pub fn audio_player(&self) -> Option<&AudioPlayerState> {
        self.context.as_ref().and_then(|c| c.audio_player.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> RequestEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_intent_request() {
        let envelope = parse(json!({
            "version": "1.0",
            "session": {
                "sessionId": "amzn1.echo-api.session.1",
                "new": false,
                "user": { "userId": "amzn1.ask.account.session-user" }
            },
            "context": {
                "System": { "user": { "userId": "amzn1.ask.account.context-user" } },
                "AudioPlayer": {
                    "token": "oyasumi_ehon",
                    "offsetInMilliseconds": 48213,
                    "playerActivity": "PAUSED"
                }
            },
            "request": {
                "type": "IntentRequest",
                "requestId": "amzn1.echo-api.request.1",
                "timestamp": "2024-01-05T12:34:56Z",
                "locale": "ja-JP",
                "intent": { "name": "AMAZON.ResumeIntent", "confirmationStatus": "NONE" }
            }
        }));

        assert_eq!(envelope.request.kind(), RequestKind::Intent("AMAZON.ResumeIntent"));
        assert_eq!(envelope.request.intent_name(), Some("AMAZON.ResumeIntent"));
        assert_eq!(envelope.user_id(), Some("amzn1.ask.account.context-user"));
        assert_eq!(
            envelope.audio_player().and_then(|a| a.offset_in_milliseconds),
            Some(48213)
        );
        assert!(envelope.request.timestamp.is_some());
    }

    #[test]
    fn test_request_kinds() {
        let kind_of = |request_type: &str| {
            let envelope = parse(json!({ "request": { "type": request_type } }));
            format!("{:?}", envelope.request.kind())
        };

        assert_eq!(kind_of("LaunchRequest"), "Launch");
        assert_eq!(kind_of("SessionEndedRequest"), "SessionEnded");
        assert_eq!(kind_of("AudioPlayer.PlaybackStarted"), "AudioPlayer(PlaybackStarted)");
        assert_eq!(kind_of("AudioPlayer.PlaybackNearlyFinished"), "AudioPlayer(PlaybackNearlyFinished)");
        assert_eq!(kind_of("AudioPlayer.PlaybackStopped"), "AudioPlayer(PlaybackStopped)");
        assert_eq!(kind_of("AudioPlayer.PlaybackFinished"), "AudioPlayer(PlaybackFinished)");
        assert_eq!(kind_of("AudioPlayer.PlaybackFailed"), "Other(\"AudioPlayer.PlaybackFailed\")");
        // An IntentRequest without an intent cannot be routed by name.
        assert_eq!(kind_of("IntentRequest"), "Other(\"IntentRequest\")");
    }

    #[test]
    fn test_user_id_falls_back_to_session() {
        let envelope = parse(json!({
            "session": { "user": { "userId": "session-user" } },
            "context": { "System": {} },
            "request": { "type": "LaunchRequest" }
        }));
        assert_eq!(envelope.user_id(), Some("session-user"));

        let envelope = parse(json!({ "request": { "type": "LaunchRequest" } }));
        assert_eq!(envelope.user_id(), None);
        assert!(envelope.audio_player().is_none());
    }
}
