use crate::model::DocRef;
use serde::{Deserialize, Serialize};

/// The synthesis result for one (content image, style image) pair. At most
/// one of these exists per pair; re-requesting the same pair returns the
/// existing document instead of re-invoking inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylizedImage {
    pub content_image: DocRef,
    pub style_image: DocRef,
    pub image: DocRef,
    pub user_id: String,
}
