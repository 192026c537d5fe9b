use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::clock::Clock;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub clock: Arc<dyn Clock>,
    /// Held by every mutation and rotation job for the length of its
    /// check-then-write, so they never interleave.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}
