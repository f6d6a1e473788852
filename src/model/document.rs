use crate::model::{Collection, DocRef, FieldMap, Id};
use serde_json::Value;

/// Handle to a stored document: its identity plus the raw field map as the
/// store returned it. Absence is modeled as `Option<Document>` at the store
/// boundary; an existing handle always carries data.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: Collection,
    pub id: Id,
    pub data: FieldMap,
}

impl Document {
    pub fn new(collection: Collection, id: impl Into<Id>, data: FieldMap) -> Self {
        Self {
            collection,
            id: id.into(),
            data,
        }
    }

    /// This document's identity as a reference value for other documents.
    pub fn doc_ref(&self) -> DocRef {
        DocRef::new(self.collection, self.id.clone())
    }

    /// Raw ownership field. Missing or empty means "visible to every
    /// principal".
    pub fn user_id(&self) -> &str {
        self.data
            .get("userId")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Read a single-reference field from the raw data.
    pub fn reference(&self, field: &str) -> Option<DocRef> {
        self.data.get(field).and_then(DocRef::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_id_defaults_to_public() {
        let doc = Document::new(Collection::Images, "i1", FieldMap::new());
        assert_eq!(doc.user_id(), "");

        let mut data = FieldMap::new();
        data.insert("userId".into(), json!("u1"));
        let doc = Document::new(Collection::ContentImages, "c1", data);
        assert_eq!(doc.user_id(), "u1");
    }

    #[test]
    fn reference_reads_serialized_refs() {
        let mut data = FieldMap::new();
        data.insert("image".into(), json!({"$ref": "images/i1"}));
        data.insert("userId".into(), json!("u1"));
        let doc = Document::new(Collection::ContentImages, "c1", data);
        assert_eq!(
            doc.reference("image"),
            Some(DocRef::new(Collection::Images, "i1"))
        );
        assert_eq!(doc.reference("userId"), None);
    }
}
