use crate::model::DocRef;
use serde::{Deserialize, Serialize};

/// A user-uploaded content image, the subject onto which styles are applied.
///
/// `user_id` is the ownership sentinel: a concrete value restricts access to
/// that principal, the empty string marks an admin-created, globally visible
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentImage {
    pub image: DocRef,
    pub user_id: String,
}
