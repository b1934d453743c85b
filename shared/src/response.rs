//! Outbound Alexa response envelope and builder.

use serde::Serialize;

/// Response envelope returned to the Alexa service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: Response,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
}

/// Speech rendered by the device. Builders always produce SSML.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
}

impl OutputSpeech {
    pub fn ssml(text: &str) -> Self {
        OutputSpeech::Ssml {
            ssml: format!("<speak>{}</speak>", strip_speak_tags(text)),
        }
    }

    /// The spoken text without SSML framing.
    pub fn text(&self) -> &str {
        match self {
            OutputSpeech::Ssml { ssml } => strip_speak_tags(ssml),
        }
    }
}

fn strip_speak_tags(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix("<speak>")
        .and_then(|t| t.strip_suffix("</speak>"))
        .unwrap_or(text)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayBehavior {
    ReplaceAll,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "AudioPlayer.Play", rename_all = "camelCase")]
    AudioPlayerPlay {
        play_behavior: PlayBehavior,
        audio_item: AudioItem,
    },
    #[serde(rename = "AudioPlayer.Stop")]
    AudioPlayerStop,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioItem {
    pub stream: Stream,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub token: String,
    pub url: String,
    pub offset_in_milliseconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_previous_token: Option<String>,
}

/// Fluent builder for a single response.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(mut self, text: &str) -> Self {
        self.response.output_speech = Some(OutputSpeech::ssml(text));
        self
    }

    /// Adding a reprompt keeps the session open.
    pub fn reprompt(mut self, text: &str) -> Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::ssml(text),
        });
        self.response.should_end_session = Some(false);
        self
    }

    pub fn with_should_end_session(mut self, value: bool) -> Self {
        self.response.should_end_session = Some(value);
        self
    }

    pub fn add_audio_player_play_directive(
        mut self,
        play_behavior: PlayBehavior,
        url: &str,
        token: &str,
        offset_in_milliseconds: u64,
        expected_previous_token: Option<&str>,
    ) -> Self {
        self.response.directives.push(Directive::AudioPlayerPlay {
            play_behavior,
            audio_item: AudioItem {
                stream: Stream {
                    token: token.to_string(),
                    url: url.to_string(),
                    offset_in_milliseconds,
                    expected_previous_token: expected_previous_token.map(String::from),
                },
            },
        });
        self
    }

    pub fn add_audio_player_stop_directive(mut self) -> Self {
        self.response.directives.push(Directive::AudioPlayerStop);
        self
    }

    pub fn get_response(self) -> ResponseEnvelope {
        ResponseEnvelope {
            version: "1.0".to_string(),
            response: self.response,
        }
    }
}

impl ResponseEnvelope {
    /// Spoken text of the main output speech.
    pub fn speech_text(&self) -> Option<&str> {
        self.response.output_speech.as_ref().map(OutputSpeech::text)
    }

    /// Spoken text of the reprompt.
    pub fn reprompt_text(&self) -> Option<&str> {
        self.response
            .reprompt
            .as_ref()
            .map(|r| r.output_speech.text())
    }

    /// Offset of the play directive, if the response starts playback.
    pub fn play_offset(&self) -> Option<u64> {
        self.response.directives.iter().find_map(|d| match d {
            Directive::AudioPlayerPlay { audio_item, .. } => {
                Some(audio_item.stream.offset_in_milliseconds)
            }
            _ => None,
        })
    }

    pub fn is_stop(&self) -> bool {
        self.response
            .directives
            .iter()
            .any(|d| matches!(d, Directive::AudioPlayerStop))
    }
}
