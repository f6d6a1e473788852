use crate::model::DocRef;
use serde::{Deserialize, Serialize};

/// Aggregate tracking all style applications performed against one content
/// image. Exactly one card exists per content image; new stylizations append
/// to the two reference sets with set-union semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub content_image: DocRef,
    pub applied_style_images: Vec<DocRef>,
    pub resulting_stylized_images: Vec<DocRef>,
    pub user_id: String,
    pub name: String,
}
