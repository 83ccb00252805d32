//! Aggregate snapshot of one Yo-Yo test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::athlete::AthleteResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Planned,
    InProgress,
    Paused,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }
}

/// Owned by the Yo-Yo engine; collaborators only ever see clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Athlete ids in the order they joined.
    pub participants: Vec<String>,
    pub status: SessionStatus,
    pub results: Vec<AthleteResult>,
    /// Table index of the current shuttle; `None` before the first one.
    pub current_shuttle: Option<usize>,
    /// Wall-clock start, epoch milliseconds.
    pub start_time: u64,
    /// Test seconds.
    pub elapsed_time: f64,
}

impl TestSession {
    pub fn new(start_time: u64, results: Vec<AthleteResult>) -> Self {
        Self {
            id: format!("test-{start_time}"),
            date: DateTime::from_timestamp_millis(start_time as i64).unwrap_or_else(Utc::now),
            participants: results.iter().map(|r| r.id.clone()).collect(),
            status: SessionStatus::InProgress,
            results,
            current_shuttle: None,
            start_time,
            elapsed_time: 0.0,
        }
    }

    pub fn result(&self, athlete_id: &str) -> Option<&AthleteResult> {
        self.results.iter().find(|r| r.id == athlete_id)
    }

    /// Mean estimated distance over all participants, in metres.
    pub fn average_distance(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let total: u64 = self.results.iter().map(|r| u64::from(r.estimated_distance)).sum();
        total as f64 / self.results.len() as f64
    }
}
