use crate::model::DocRef;
use serde::{Deserialize, Serialize};

/// A style reference image (typically an artwork) applied to content images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleImage {
    pub image: DocRef,
    pub name: String,
    pub artist: String,
    pub user_id: String,
}
