//! Audio cue playback.
//!
//! Engines only name the cues they want played, inside their events. The
//! [`CueDispatcher`] resolves each cue to an asset through [`AudioConfig`]
//! and hands it to an [`AudioPlayer`]. Playback failures are logged and
//! dropped; nothing flows back into an engine.

use crate::error::AudioError;
use crate::events::Event;
use crate::interval::IntervalCue;
use crate::storage::AudioConfig;
use crate::yoyo::BeepCue;

/// A cue from either engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Interval(IntervalCue),
    Shuttle(BeepCue),
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Interval(c) => c.name(),
            Cue::Shuttle(c) => c.name(),
        }
    }

    /// Cues carried by `event`, in playback order.
    pub fn from_event(event: &Event) -> Vec<Cue> {
        match event {
            Event::PhaseChanged { cues, .. } => cues.iter().copied().map(Cue::Interval).collect(),
            Event::ShuttleCue { cue, .. } => vec![Cue::Shuttle(*cue)],
            _ => Vec::new(),
        }
    }
}

/// A resolved sound: which cue, and where its file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub cue: &'static str,
    pub location: String,
}

pub trait AudioPlayer: Send {
    /// Start playing `asset` at `volume` (0.0 ..= 1.0). Must not block for
    /// the length of the sound.
    fn play(&mut self, asset: &AudioAsset, volume: f64) -> Result<(), AudioError>;
}

/// Player that plays nothing.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&mut self, _asset: &AudioAsset, _volume: f64) -> Result<(), AudioError> {
        Ok(())
    }
}

pub struct CueDispatcher {
    player: Box<dyn AudioPlayer>,
    config: AudioConfig,
}

impl CueDispatcher {
    pub fn new(player: Box<dyn AudioPlayer>, config: AudioConfig) -> Self {
        Self { player, config }
    }

    pub fn is_muted(&self) -> bool {
        self.config.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
    }

    pub fn volume(&self) -> f64 {
        self.config.volume
    }

    /// Clamped to 0.0 ..= 1.0.
    pub fn set_volume(&mut self, volume: f64) {
        self.config.volume = volume.clamp(0.0, 1.0);
    }

    pub fn resolve(&self, cue: Cue) -> Result<AudioAsset, AudioError> {
        let assets = match cue {
            Cue::Interval(_) => &self.config.assets.interval,
            Cue::Shuttle(_) => &self.config.assets.yoyo,
        };
        assets
            .get(cue.name())
            .map(|location| AudioAsset {
                cue: cue.name(),
                location: location.clone(),
            })
            .ok_or_else(|| AudioError::MissingAsset(cue.name().to_string()))
    }

    /// Play every cue carried by `event`. Returns how many were played.
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let cues = Cue::from_event(event);
        if cues.is_empty() {
            return 0;
        }
        if self.config.muted {
            tracing::debug!(count = cues.len(), "muted: cues dropped");
            return 0;
        }

        let volume = self.config.volume;
        let mut played = 0;
        for cue in cues {
            let result = match self.resolve(cue) {
                Ok(asset) => self.player.play(&asset, volume),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => played += 1,
                Err(e) => tracing::warn!(cue = cue.name(), error = %e, "audio cue failed"),
            }
        }
        played
    }

    pub fn dispatch_all<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) -> usize {
        events.into_iter().map(|e| self.dispatch(e)).sum()
    }
}
