//! Fakes and envelope fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{AttributesStore, Error, PersistentAttributes, RequestEnvelope, Result, TrackUrlProvider};

pub const USER_ID: &str = "amzn1.ask.account.TESTUSER";
pub const TRACK_URL: &str = "https://media.example.com/Media/oyasumi_ehon.mp3?X-Amz-Signature=abc";

/// In-memory attribute store that records every write.
#[derive(Default)]
pub struct MemoryStore {
    attributes: Mutex<HashMap<String, PersistentAttributes>>,
    writes: Mutex<Vec<PersistentAttributes>>,
    reads: AtomicUsize,
    unreachable: bool,
}

impl MemoryStore {
    pub fn with_offset(offset: u64) -> Self {
        let store = Self::default();
        store.attributes.lock().unwrap().insert(
            USER_ID.to_string(),
            PersistentAttributes {
                offset: Some(offset),
                ..Default::default()
            },
        );
        store
    }

    /// A store whose every call fails, like an unreachable bucket.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn stored_offset(&self) -> Option<u64> {
        self.attributes
            .lock()
            .unwrap()
            .get(USER_ID)
            .and_then(|a| a.offset)
    }

    pub fn saved_offsets(&self) -> Vec<u64> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter_map(|a| a.offset)
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttributesStore for MemoryStore {
    async fn get_attributes(&self, user_id: &str) -> Result<PersistentAttributes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(Error::Persistence("Could not read item: connection refused".to_string()));
        }
        Ok(self
            .attributes
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_attributes(&self, user_id: &str, attributes: &PersistentAttributes) -> Result<()> {
        if self.unreachable {
            return Err(Error::Persistence("Could not save item: connection refused".to_string()));
        }
        self.attributes
            .lock()
            .unwrap()
            .insert(user_id.to_string(), attributes.clone());
        self.writes.lock().unwrap().push(attributes.clone());
        Ok(())
    }
}

/// Always hands out the same URL.
pub struct FixedTrackUrl;

#[async_trait]
impl TrackUrlProvider for FixedTrackUrl {
    async fn track_url(&self) -> Result<String> {
        Ok(TRACK_URL.to_string())
    }
}

fn envelope(request: Value, audio_player: Option<u64>) -> RequestEnvelope {
    let mut context = json!({ "System": { "user": { "userId": USER_ID } } });
    if let Some(offset) = audio_player {
        context["AudioPlayer"] = json!({
            "token": "oyasumi_ehon",
            "offsetInMilliseconds": offset,
            "playerActivity": "PAUSED"
        });
    }
    serde_json::from_value(json!({
        "version": "1.0",
        "session": {
            "sessionId": "amzn1.echo-api.session.TEST",
            "new": false,
            "user": { "userId": USER_ID }
        },
        "context": context,
        "request": request
    }))
    .unwrap()
}

pub fn launch_envelope() -> RequestEnvelope {
    envelope(
        json!({
            "type": "LaunchRequest",
            "requestId": "amzn1.echo-api.request.launch",
            "timestamp": "2024-01-05T21:00:00Z",
            "locale": "ja-JP"
        }),
        None,
    )
}

pub fn intent_envelope(name: &str, live_offset: Option<u64>) -> RequestEnvelope {
    envelope(
        json!({
            "type": "IntentRequest",
            "requestId": "amzn1.echo-api.request.intent",
            "timestamp": "2024-01-05T21:00:05Z",
            "locale": "ja-JP",
            "intent": { "name": name, "confirmationStatus": "NONE" }
        }),
        live_offset,
    )
}

pub fn request_envelope(request_type: &str) -> RequestEnvelope {
    envelope(
        json!({
            "type": request_type,
            "requestId": "amzn1.echo-api.request.other",
            "timestamp": "2024-01-05T21:00:10Z",
            "locale": "ja-JP",
            "token": "oyasumi_ehon",
            "offsetInMilliseconds": 0,
            "reason": "USER_INITIATED"
        }),
        None,
    )
}
