//! Participant status and distance accounting.
//!
//! ```text
//! Waiting -> Active -> Warned -> DroppedOut
//!              \          \
//!               `----------`--> Completed
//! ```
//!
//! An athlete only banks the distance of shuttles they finished. A drop-out
//! during shuttle `k` is credited with shuttle `k - 1`.

use serde::{Deserialize, Serialize};

use super::protocol::ShuttleTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AthleteStatus {
    Waiting,
    Active,
    Warned,
    DroppedOut,
    Completed,
}

impl AthleteStatus {
    /// Still on the course: eligible for failures and distance credit.
    pub fn is_running(&self) -> bool {
        matches!(self, AthleteStatus::Active | AthleteStatus::Warned)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AthleteStatus::DroppedOut | AthleteStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AthleteStatus::Waiting => "waiting",
            AthleteStatus::Active => "active",
            AthleteStatus::Warned => "warned",
            AthleteStatus::DroppedOut => "dropped-out",
            AthleteStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for AthleteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(AthleteStatus::Waiting),
            "active" => Ok(AthleteStatus::Active),
            "warned" => Ok(AthleteStatus::Warned),
            "dropped-out" => Ok(AthleteStatus::DroppedOut),
            "completed" => Ok(AthleteStatus::Completed),
            other => Err(format!("unknown athlete status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteResult {
    pub id: String,
    pub name: String,
    pub status: AthleteStatus,
    /// 0 or 1.
    pub warnings: u8,
    /// 1-based shuttle number the athlete dropped out on.
    #[serde(default)]
    pub drop_out_shuttle: Option<u32>,
    /// Test seconds at drop-out.
    #[serde(default)]
    pub drop_out_time: Option<f64>,
    /// Metres.
    pub estimated_distance: u32,
    pub completed: bool,
}

/// What a failure report did to an athlete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureOutcome {
    Warned,
    DroppedOut {
        drop_out_shuttle: u32,
        estimated_distance: u32,
    },
}

impl AthleteResult {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: AthleteStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            warnings: 0,
            drop_out_shuttle: None,
            drop_out_time: None,
            estimated_distance: 0,
            completed: false,
        }
    }

    /// Enter the test: `Active` with a clean warning count.
    pub fn activate(&mut self) {
        self.status = AthleteStatus::Active;
        self.warnings = 0;
    }

    /// Apply a failure report during shuttle `shuttle_index` (`None` before
    /// the first shuttle, treated as shuttle 0).
    ///
    /// Athletes that are not running ignore the report.
    pub fn register_failure(
        &mut self,
        shuttle_index: Option<usize>,
        elapsed: f64,
        table: &ShuttleTable,
    ) -> Option<FailureOutcome> {
        match self.status {
            AthleteStatus::Active => {
                self.status = AthleteStatus::Warned;
                self.warnings = 1;
                Some(FailureOutcome::Warned)
            }
            AthleteStatus::Warned => {
                let current = shuttle_index.unwrap_or(0);
                let last_completed = current as i64 - 1;
                let drop_out_shuttle = current as u32 + 1;
                let estimated_distance = table.estimated_distance(last_completed);

                self.status = AthleteStatus::DroppedOut;
                self.drop_out_shuttle = Some(drop_out_shuttle);
                self.drop_out_time = Some(elapsed);
                self.estimated_distance = estimated_distance;
                self.completed = false;
                Some(FailureOutcome::DroppedOut {
                    drop_out_shuttle,
                    estimated_distance,
                })
            }
            _ => None,
        }
    }

    /// Bank the distance of the shuttle just completed. Only running athletes
    /// are credited.
    pub fn credit(&mut self, distance: u32) {
        if self.status.is_running() {
            self.estimated_distance = distance;
        }
    }

    /// Finish the test with `final_distance`. Only running athletes complete.
    pub fn complete(&mut self, final_distance: u32) {
        if self.status.is_running() {
            self.status = AthleteStatus::Completed;
            self.completed = true;
            self.estimated_distance = final_distance;
        }
    }
}
