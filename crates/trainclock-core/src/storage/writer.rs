//! Off-thread session persistence.
//!
//! The Yo-Yo tick loop must never wait on SQLite. `BackgroundStore` owns a
//! writer thread holding the [`Database`]; saving only queues a clone of the
//! session.

use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use super::{Database, SessionStore};
use crate::error::{DatabaseError, Result};
use crate::yoyo::TestSession;

pub struct BackgroundStore {
    sender: Option<Sender<TestSession>>,
    worker: Option<JoinHandle<usize>>,
}

impl BackgroundStore {
    /// Move `db` onto a dedicated writer thread.
    pub fn spawn(db: Database) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<TestSession>();
        let worker = std::thread::Builder::new()
            .name("trainclock-writer".into())
            .spawn(move || {
                let mut written = 0;
                for session in receiver {
                    match db.record_session(&session) {
                        Ok(()) => {
                            written += 1;
                            tracing::debug!(session = %session.id, "session persisted");
                        }
                        Err(e) => {
                            tracing::warn!(session = %session.id, error = %e, "failed to persist session");
                        }
                    }
                }
                written
            })?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Open the database at `path` and spawn the writer.
    pub fn open_at(path: &Path) -> Result<Self> {
        Self::spawn(Database::open_at(path)?)
    }

    /// Flush pending writes and stop the writer. Returns the number of
    /// sessions written.
    pub fn finish(mut self) -> usize {
        self.shutdown()
    }

    fn shutdown(&mut self) -> usize {
        drop(self.sender.take());
        match self.worker.take().map(JoinHandle::join) {
            Some(Ok(written)) => written,
            Some(Err(_)) => {
                tracing::warn!("session writer panicked");
                0
            }
            None => 0,
        }
    }
}

impl SessionStore for BackgroundStore {
    fn save_session(&self, session: &TestSession) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(DatabaseError::WriterClosed)?;
        sender
            .send(session.clone())
            .map_err(|_| DatabaseError::WriterClosed)?;
        Ok(())
    }
}

impl Drop for BackgroundStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
