use crate::error::{Error, Result};
use crate::model::{Collection, Document, Id, Principal};

/// Existence check, always applied before any access check so an absent
/// document never leaks ownership information through a different error.
pub fn check_exists(
    collection: Collection,
    id: &Id,
    document: Option<Document>,
) -> Result<Document> {
    document.ok_or_else(|| Error::not_found(collection, id))
}

/// Ownership check against the raw `userId` field. Role-agnostic: the Admin
/// exemption is the caller's decision, applied by not calling this at all.
pub fn check_access(principal: &Principal, document: &Document) -> Result<()> {
    let owner = document.user_id();
    if !owner.is_empty() && owner != principal.id {
        return Err(Error::forbidden(document.collection, &document.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldMap;
    use serde_json::json;

    fn owned_by(owner: &str) -> Document {
        let mut data = FieldMap::new();
        data.insert("userId".into(), json!(owner));
        Document::new(Collection::ContentImages, "c1", data)
    }

    #[test]
    fn missing_document_is_not_found() {
        let err = check_exists(Collection::Images, &"x".to_string(), None).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn public_documents_are_readable_by_anyone() {
        let document = owned_by("");
        assert!(check_access(&Principal::user("u1"), &document).is_ok());
        assert!(check_access(&Principal::user("u2"), &document).is_ok());
    }

    #[test]
    fn foreign_documents_are_forbidden() {
        let document = owned_by("u1");
        assert!(check_access(&Principal::user("u1"), &document).is_ok());
        let err = check_access(&Principal::user("u2"), &document).unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }
}
