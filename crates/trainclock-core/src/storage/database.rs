//! SQLite-based storage for completed Yo-Yo test sessions.
//!
//! Provides persistent storage for:
//! - Test sessions (one row per test)
//! - Per-athlete results of each session

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{data_dir, SessionStore};
use crate::error::{DatabaseError, Result};
use crate::yoyo::{AthleteResult, AthleteStatus, SessionStatus, TestSession};

/// One persisted session, summarized for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub status: String,
    pub elapsed_time: f64,
    pub current_shuttle: Option<usize>,
    pub participants: u32,
    pub best_distance: u32,
}

/// SQLite database for test session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/trainclock/trainclock.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("trainclock.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS test_sessions (
                id              TEXT PRIMARY KEY,
                date            TEXT NOT NULL,
                status          TEXT NOT NULL,
                current_shuttle INTEGER,
                elapsed_time    REAL NOT NULL DEFAULT 0,
                started_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS athlete_results (
                session_id         TEXT NOT NULL REFERENCES test_sessions(id) ON DELETE CASCADE,
                position           INTEGER NOT NULL,
                athlete_id         TEXT NOT NULL,
                name               TEXT NOT NULL,
                status             TEXT NOT NULL,
                warnings           INTEGER NOT NULL DEFAULT 0,
                drop_out_shuttle   INTEGER,
                drop_out_time      REAL,
                estimated_distance INTEGER NOT NULL DEFAULT 0,
                completed          INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (session_id, athlete_id)
            );

            CREATE INDEX IF NOT EXISTS idx_test_sessions_date ON test_sessions(date);",
        )?;
        Ok(())
    }

    /// Insert or replace a session together with all of its results.
    ///
    /// # Errors
    /// Returns an error if any statement fails; nothing is written then.
    pub fn record_session(&self, session: &TestSession) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO test_sessions
                (id, date, status, current_shuttle, elapsed_time, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.date.to_rfc3339(),
                session.status.as_str(),
                session.current_shuttle.map(|i| i as i64),
                session.elapsed_time,
                session.start_time as i64,
            ],
        )?;
        tx.execute(
            "DELETE FROM athlete_results WHERE session_id = ?1",
            params![session.id],
        )?;
        for (position, r) in session.results.iter().enumerate() {
            tx.execute(
                "INSERT INTO athlete_results
                    (session_id, position, athlete_id, name, status, warnings,
                     drop_out_shuttle, drop_out_time, estimated_distance, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    session.id,
                    position as i64,
                    r.id,
                    r.name,
                    r.status.as_str(),
                    r.warnings,
                    r.drop_out_shuttle,
                    r.drop_out_time,
                    r.estimated_distance,
                    r.completed,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.date, s.status, s.elapsed_time, s.current_shuttle,
                    COUNT(r.athlete_id), COALESCE(MAX(r.estimated_distance), 0)
             FROM test_sessions s
             LEFT JOIN athlete_results r ON r.session_id = s.id
             GROUP BY s.id
             ORDER BY s.started_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, Option<i64>>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, u32>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, date, status, elapsed_time, current_shuttle, participants, best_distance) = row?;
            records.push(SessionRecord {
                id,
                date: parse_date(&date)?,
                status,
                elapsed_time,
                current_shuttle: current_shuttle.map(|i| i as usize),
                participants,
                best_distance,
            });
        }
        Ok(records)
    }

    /// Results of one session, in participant order.
    pub fn results_for(&self, session_id: &str) -> Result<Vec<AthleteResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT athlete_id, name, status, warnings, drop_out_shuttle, drop_out_time,
                    estimated_distance, completed
             FROM athlete_results
             WHERE session_id = ?1
             ORDER BY position",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, Option<u32>>(4)?,
                row.get::<_, Option<f64>>(5)?,
                row.get::<_, u32>(6)?,
                row.get::<_, bool>(7)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, name, status, warnings, drop_out_shuttle, drop_out_time, estimated_distance, completed) =
                row?;
            let status: AthleteStatus = status
                .parse()
                .map_err(|e: String| DatabaseError::QueryFailed(e))?;
            results.push(AthleteResult {
                id,
                name,
                status,
                warnings,
                drop_out_shuttle,
                drop_out_time,
                estimated_distance,
                completed,
            });
        }
        Ok(results)
    }

    /// Rebuild a full session from its rows.
    pub fn load_session(&self, session_id: &str) -> Result<Option<TestSession>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, date, status, current_shuttle, elapsed_time, started_at
                 FROM test_sessions WHERE id = ?1",
                params![session_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, date, status, current_shuttle, elapsed_time, started_at)) = row else {
            return Ok(None);
        };
        let results = self.results_for(&id)?;
        Ok(Some(TestSession {
            participants: results.iter().map(|r| r.id.clone()).collect(),
            date: parse_date(&date)?,
            status: parse_session_status(&status)?,
            current_shuttle: current_shuttle.map(|i| i as usize),
            start_time: started_at as u64,
            elapsed_time,
            results,
            id,
        }))
    }
}

impl SessionStore for Database {
    fn save_session(&self, session: &TestSession) -> Result<()> {
        self.record_session(session)
    }
}

fn parse_date(raw: &str) -> std::result::Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad date '{raw}': {e}")))
}

fn parse_session_status(raw: &str) -> std::result::Result<SessionStatus, DatabaseError> {
    match raw {
        "planned" => Ok(SessionStatus::Planned),
        "in-progress" => Ok(SessionStatus::InProgress),
        "paused" => Ok(SessionStatus::Paused),
        "completed" => Ok(SessionStatus::Completed),
        other => Err(DatabaseError::QueryFailed(format!("unknown session status: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_session(start: u64) -> TestSession {
        let mut session = TestSession::new(
            start,
            vec![
                AthleteResult::new("eray", "Eray", AthleteStatus::Active),
                AthleteResult::new("silas", "Silas", AthleteStatus::Active),
            ],
        );
        session.results[0].complete(3640);
        session.results[1].status = AthleteStatus::DroppedOut;
        session.results[1].warnings = 1;
        session.results[1].drop_out_shuttle = Some(6);
        session.results[1].drop_out_time = Some(115.2);
        session.results[1].estimated_distance = 200;
        session.status = SessionStatus::Completed;
        session.current_shuttle = Some(90);
        session.elapsed_time = 1765.3;
        session
    }

    #[test]
    fn record_and_reload() {
        let db = Database::open_memory().unwrap();
        let session = finished_session(1_700_000_000_000);
        db.record_session(&session).unwrap();

        let loaded = db.load_session(&session.id).unwrap().unwrap();
        assert_eq!(loaded, session);
        assert!(db.load_session("test-0").unwrap().is_none());
    }

    #[test]
    fn rerecording_replaces_results() {
        let db = Database::open_memory().unwrap();
        let mut session = finished_session(1);
        db.record_session(&session).unwrap();
        session.results.truncate(1);
        session.participants.truncate(1);
        db.record_session(&session).unwrap();
        assert_eq!(db.results_for(&session.id).unwrap().len(), 1);
    }

    #[test]
    fn recent_sessions_newest_first() {
        let db = Database::open_memory().unwrap();
        db.save_session(&finished_session(1_000)).unwrap();
        db.save_session(&finished_session(2_000)).unwrap();

        let records = db.recent_sessions(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "test-2000");
        assert_eq!(records[0].participants, 2);
        assert_eq!(records[0].best_distance, 3640);
        assert_eq!(records[0].status, "completed");
        assert_eq!(db.recent_sessions(1).unwrap().len(), 1);
    }
}
