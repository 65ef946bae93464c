use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::hanoi::Move;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub disks: u32,
    /// Elapsed seconds.
    pub time: f64,
    pub moves: u32,
}

/// A move as written to the history log, with towers numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedMove {
    pub source: usize,
    pub destination: usize,
}

impl From<Move> for RecordedMove {
    fn from(mv: Move) -> Self {
        Self {
            source: mv.from + 1,
            destination: mv.to + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveHistoryEntry {
    pub game_id: String,
    pub player_name: String,
    pub disks: u32,
    pub moves: Vec<RecordedMove>,
    pub time: f64,
}

static GAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique per game session within this process: UTC timestamp to the
/// millisecond plus a sequence number.
pub fn new_game_id() -> String {
    let seq = GAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{seq:04}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"))
}
