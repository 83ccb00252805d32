//! Terminal stand-in for an audio device.

use std::io::Write;

use trainclock_core::{AudioAsset, AudioError, AudioPlayer};

/// Rings the terminal bell and names the cue on stderr.
pub struct BellPlayer;

impl AudioPlayer for BellPlayer {
    fn play(&mut self, asset: &AudioAsset, volume: f64) -> Result<(), AudioError> {
        let mut stderr = std::io::stderr().lock();
        write!(stderr, "\x07[{} {:.0}%] ", asset.cue, volume * 100.0)
            .and_then(|_| stderr.flush())
            .map_err(|e| AudioError::PlaybackFailed {
                location: asset.location.clone(),
                message: e.to_string(),
            })
    }
}
