//! Playback offset bookkeeping and the play/stop responses.

use shared::{AttributesManager, PlayBehavior, RequestEnvelope, ResponseBuilder, ResponseEnvelope, Result};
use tracing::info;

/// Token identifying the single track this skill plays.
pub const TRACK_TOKEN: &str = "oyasumi_ehon";

/// Position reported by the device's audio player, 0 when it reports none.
pub fn live_offset(envelope: &RequestEnvelope) -> u64 {
    let offset = envelope
        .audio_player()
        .and_then(|player| player.offset_in_milliseconds)
        .unwrap_or(0);
    info!(offset, "Live offset");
    offset
}

/// Offset saved by an earlier pause, if any.
pub async fn persisted_offset(attributes: &mut AttributesManager<'_>) -> Result<Option<u64>> {
    Ok(attributes.persistent_attributes().await?.offset)
}

/// Overwrite the saved offset and flush it.
pub async fn save_persisted_offset(attributes: &mut AttributesManager<'_>, offset: u64) -> Result<()> {
    let mut updated = attributes.persistent_attributes().await?.clone();
    updated.offset = Some(offset);
    attributes.set_persistent_attributes(updated);
    attributes.save_persistent_attributes().await?;
    info!(offset, "Saved offset");
    Ok(())
}

/// Replace whatever is playing with the track, starting at `offset`.
pub fn play_response(url: &str, offset: u64) -> ResponseEnvelope {
    ResponseBuilder::new()
        .add_audio_player_play_directive(PlayBehavior::ReplaceAll, url, TRACK_TOKEN, offset, None)
        .get_response()
}

pub fn stop_response() -> ResponseEnvelope {
    ResponseBuilder::new()
        .add_audio_player_stop_directive()
        .get_response()
}
