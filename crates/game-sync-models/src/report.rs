use crate::entry::PlaytimeEntry;
use serde::{Deserialize, Serialize};

/// Final per-platform sync result. Games keep catalog iteration order; no
/// sort is applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncReport {
    pub user_name: String,
    pub games: Vec<PlaytimeEntry>,
}
