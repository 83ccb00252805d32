//! Drift-resistant elapsed time shared by both engines.
//!
//! Neither engine counts ticks. Elapsed time is always re-derived from the
//! wall clock:
//!
//! ```text
//! elapsed = accumulated_before_pause + (now - resume_reference)
//! ```
//!
//! so a delayed, throttled or missed tick only changes *when* the engine
//! notices the time, never *what* time it sees.

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Format seconds as `MM:SS`.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Pausable wall-clock accumulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stopwatch {
    /// Elapsed milliseconds folded in before the current run segment.
    accumulated_ms: u64,
    /// Wall-clock reference of the current run segment. `None` while stopped.
    #[serde(default)]
    reference_ms: Option<u64>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.reference_ms.is_some()
    }

    /// Begin (or continue) measuring from `now`.
    pub fn start_at(&mut self, now: u64) {
        if self.reference_ms.is_none() {
            self.reference_ms = Some(now);
        }
    }

    /// Freeze the accumulated time.
    pub fn pause_at(&mut self, now: u64) {
        if let Some(reference) = self.reference_ms.take() {
            self.accumulated_ms = self
                .accumulated_ms
                .saturating_add(now.saturating_sub(reference));
        }
    }

    /// Continue with a fresh reference; accumulated time is untouched.
    pub fn resume_at(&mut self, now: u64) {
        self.start_at(now);
    }

    pub fn elapsed_ms_at(&self, now: u64) -> u64 {
        match self.reference_ms {
            Some(reference) => self
                .accumulated_ms
                .saturating_add(now.saturating_sub(reference)),
            None => self.accumulated_ms,
        }
    }

    pub fn elapsed_secs_at(&self, now: u64) -> f64 {
        self.elapsed_ms_at(now) as f64 / 1000.0
    }

    /// Jump to `secs` of elapsed time. A running stopwatch keeps running from
    /// the new position.
    pub fn seek_at(&mut self, secs: f64, now: u64) {
        self.accumulated_ms = secs_to_ms(secs);
        if self.reference_ms.is_some() {
            self.reference_ms = Some(now);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs.max(0.0) * 1000.0).round() as u64
}

/// A closed or half-open interval on the session time axis, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// An ordered, non-overlapping sequence of segments laid on one time axis.
///
/// Implemented by the generated phase schedule and by the shuttle table so
/// that both engines share the same membership lookups.
pub trait Timeline {
    fn len(&self) -> usize;

    fn span(&self, index: usize) -> Option<Span>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the segment with `start <= t < end`.
    fn segment_at(&self, t: f64) -> Option<usize> {
        (0..self.len()).find(|&i| {
            self.span(i)
                .map(|s| t >= s.start && t < s.end)
                .unwrap_or(false)
        })
    }

    /// Index of the segment with `start <= t <= end`.
    fn segment_covering(&self, t: f64) -> Option<usize> {
        (0..self.len()).find(|&i| {
            self.span(i)
                .map(|s| t >= s.start && t <= s.end)
                .unwrap_or(false)
        })
    }

    /// Index of the latest segment that ended strictly before `t`.
    fn last_ended_before(&self, t: f64) -> Option<usize> {
        (0..self.len())
            .rev()
            .find(|&i| self.span(i).map(|s| t > s.end).unwrap_or(false))
    }

    /// Index of the first segment starting strictly after `t`.
    fn first_starting_after(&self, t: f64) -> Option<usize> {
        (0..self.len()).find(|&i| self.span(i).map(|s| t < s.start).unwrap_or(false))
    }
}
