use crate::model::{Collection, DocRef, Document, FieldMap, Id};
use anyhow::Result;
use serde_json::Value;

/// Query predicate over raw document data. The store evaluates these against
/// the stored field maps; reference operands compare by their serialized
/// identity value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every document in the collection.
    All,
    /// Field equality on a raw value.
    FieldEq { field: String, value: Value },
    /// Field value is one of the given values. Documents missing the field
    /// never match.
    FieldIn { field: String, values: Vec<Value> },
    /// Reference equality on a single-reference field.
    RefEq { field: String, target: DocRef },
    /// Conjunction of predicates.
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn field_eq(field: impl Into<String>, value: Value) -> Self {
        Predicate::FieldEq {
            field: field.into(),
            value,
        }
    }

    pub fn ref_eq(field: impl Into<String>, target: DocRef) -> Self {
        Predicate::RefEq {
            field: field.into(),
            target,
        }
    }

    /// The ownership filter: documents that are public or belong to the
    /// given user.
    pub fn visible_to(user_id: &str) -> Self {
        Predicate::FieldIn {
            field: "userId".into(),
            values: vec![Value::String(String::new()), Value::String(user_id.into())],
        }
    }
}

/// One mutation of a single document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Set(Value),
    /// Append values not already present, preserving existing order. Creates
    /// the array if the field is missing.
    ArrayUnion(Vec<Value>),
}

/// Partial update of a document; applied field by field, in order.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub ops: Vec<(String, FieldOp)>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.ops.push((field.into(), FieldOp::Set(value)));
        self
    }

    pub fn array_union(mut self, field: impl Into<String>, refs: Vec<DocRef>) -> Self {
        let values = refs.iter().map(DocRef::to_value).collect();
        self.ops.push((field.into(), FieldOp::ArrayUnion(values)));
        self
    }

    /// Apply this patch to a raw field map. Shared by both store adapters so
    /// union semantics cannot drift between them.
    pub fn apply(&self, data: &mut FieldMap) {
        for (field, op) in &self.ops {
            match op {
                FieldOp::Set(value) => {
                    data.insert(field.clone(), value.clone());
                }
                FieldOp::ArrayUnion(values) => {
                    let entry = data
                        .entry(field.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if let Value::Array(existing) = entry {
                        for value in values {
                            if !existing.contains(value) {
                                existing.push(value.clone());
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Typed access to the named collections. Per-document operations are
/// independently atomic; nothing here spans documents, so multi-document
/// sequences built on top (cascades, upserts) are best-effort.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a raw document and return its store-assigned id.
    async fn create(&self, collection: Collection, data: FieldMap) -> Result<Id>;
    async fn get(&self, collection: Collection, id: &Id) -> Result<Option<Document>>;
    async fn query(&self, collection: Collection, predicate: &Predicate) -> Result<Vec<Document>>;
    /// Returns false when the document does not exist.
    async fn update(&self, collection: Collection, id: &Id, patch: DocumentPatch) -> Result<bool>;
    /// Returns false when the document did not exist.
    async fn delete(&self, collection: Collection, id: &Id) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Collection;
    use serde_json::json;

    #[test]
    fn array_union_skips_existing_entries() {
        let mut data = FieldMap::new();
        data.insert("appliedStyleImages".into(), json!([{"$ref": "style-images/s1"}]));

        let patch = DocumentPatch::new().array_union(
            "appliedStyleImages",
            vec![
                DocRef::new(Collection::StyleImages, "s1"),
                DocRef::new(Collection::StyleImages, "s2"),
            ],
        );
        patch.apply(&mut data);
        patch.apply(&mut data); // idempotent

        assert_eq!(
            data.get("appliedStyleImages").unwrap(),
            &json!([{"$ref": "style-images/s1"}, {"$ref": "style-images/s2"}])
        );
    }

    #[test]
    fn array_union_creates_missing_field() {
        let mut data = FieldMap::new();
        DocumentPatch::new()
            .array_union("resultingStylizedImages", vec![DocRef::new(Collection::StylizedImages, "z1")])
            .apply(&mut data);
        assert_eq!(
            data.get("resultingStylizedImages").unwrap(),
            &json!([{"$ref": "stylized-images/z1"}])
        );
    }

    #[test]
    fn set_overwrites() {
        let mut data = FieldMap::new();
        data.insert("name".into(), json!(""));
        DocumentPatch::new()
            .set("name", json!("sunset"))
            .apply(&mut data);
        assert_eq!(data.get("name").unwrap(), &json!("sunset"));
    }
}
