use serde::{Deserialize, Serialize};

/// The authenticated account a sync runs against. Resolved once per sync,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>, // Origin only; Connect has no persona layer
    pub display_name: String,
}
