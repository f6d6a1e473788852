use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored binary image. Immutable once created; owned by whichever
/// aggregate created it and deleted only as a cascade of its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub public_url: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Size in bytes.
    pub size: u64,
    pub timestamp: DateTime<Utc>,
}
