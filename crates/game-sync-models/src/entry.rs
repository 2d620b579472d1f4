use serde::{Deserialize, Serialize};

/// One owned game in the normalized report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaytimeEntry {
    /// Backend-native identifier (offer id or space id).
    pub id: String,
    pub name: String,
    pub playtime_mins: u64,
    /// Epoch seconds; 0 when the backend reported nothing.
    pub last_played: u64,
}
