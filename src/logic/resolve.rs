use crate::error::Result;
use crate::model::{ref_fields, Collection, DocRef, Document, FieldMap, RefArity, RefField};
use crate::store::DocumentStore;
use futures::future::try_join_all;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// How far population follows references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Recursively replace every reference field, to unbounded depth.
    Deep,
    /// Replace only the top-level reference fields by one hop, leaving the
    /// referenced documents raw. Used when the caller already holds one side
    /// of a relation through another path.
    Shallow,
}

/// Turns raw documents into populated aggregates by walking the per-kind
/// reference-field descriptors.
///
/// Precondition: the reference graph described by `ref_fields` is acyclic.
/// There is no cycle detection; a cycle would recurse forever.
pub struct Resolver<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Populate one document. With `add_id` the document's own identity is
    /// injected under the reserved `id` key; callers merging several
    /// aggregates disable it and assign the id themselves.
    pub async fn populate(&self, document: &Document, depth: Depth, add_id: bool) -> Result<Value> {
        let mut populated = self
            .resolve_fields(document.collection, &document.data, depth)
            .await?;
        if add_id {
            populated.insert("id".to_string(), Value::String(document.id.clone()));
        }
        Ok(Value::Object(populated))
    }

    /// Resolve every reference field of a raw field map. Sibling reference
    /// fields are fetched concurrently; recursion within one branch is
    /// sequential relative to its own children.
    fn resolve_fields<'b>(
        &'b self,
        collection: Collection,
        data: &'b FieldMap,
        depth: Depth,
    ) -> Pin<Box<dyn Future<Output = Result<FieldMap>> + Send + 'b>> {
        Box::pin(async move {
            let descriptors: Vec<&RefField> = ref_fields(collection)
                .iter()
                .filter(|field| data.contains_key(field.name))
                .collect();

            let resolved = try_join_all(
                descriptors
                    .iter()
                    .map(|field| self.resolve_field(field, &data[field.name], depth)),
            )
            .await?;

            let mut populated = data.clone();
            for (field, value) in descriptors.iter().zip(resolved) {
                populated.insert(field.name.to_string(), value);
            }
            Ok(populated)
        })
    }

    async fn resolve_field(
        &self,
        field: &RefField,
        value: &Value,
        depth: Depth,
    ) -> Result<Value> {
        match field.arity {
            RefArity::One => self.resolve_ref_value(value, depth).await,
            RefArity::Many => {
                let Value::Array(items) = value else {
                    return Ok(value.clone());
                };
                let resolved =
                    try_join_all(items.iter().map(|item| self.resolve_ref_value(item, depth)))
                        .await?;
                Ok(Value::Array(resolved))
            }
        }
    }

    /// Resolve a single reference value. A dangling reference degrades to
    /// `null`; it never raises.
    async fn resolve_ref_value(&self, value: &Value, depth: Depth) -> Result<Value> {
        let Some(doc_ref) = DocRef::from_value(value) else {
            // Non-reference values (including an already-null slot) pass
            // through unchanged.
            return Ok(value.clone());
        };
        let Some(referenced) = self.store.get(doc_ref.collection, &doc_ref.id).await? else {
            return Ok(Value::Null);
        };
        match depth {
            Depth::Shallow => Ok(Value::Object(referenced.data)),
            Depth::Deep => Ok(Value::Object(
                self.resolve_fields(referenced.collection, &referenced.data, Depth::Deep)
                    .await?,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldMap;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_with_id(
            Collection::Images,
            "i1",
            fields(&[("publicUrl", json!("http://cdn/i1.png")), ("width", json!(64))]),
        );
        store.insert_with_id(
            Collection::ContentImages,
            "c1",
            fields(&[("image", json!({"$ref": "images/i1"})), ("userId", json!("u1"))]),
        );
        store
    }

    #[tokio::test]
    async fn deep_population_expands_nested_references() {
        let store = seeded_store();
        store.insert_with_id(
            Collection::StylizedImages,
            "z1",
            fields(&[
                ("contentImage", json!({"$ref": "content-images/c1"})),
                ("styleImage", json!({"$ref": "style-images/missing"})),
                ("image", json!({"$ref": "images/i1"})),
                ("userId", json!("u1")),
            ]),
        );

        let document = store
            .get(Collection::StylizedImages, &"z1".to_string())
            .await
            .unwrap()
            .unwrap();
        let populated = Resolver::new(&store)
            .populate(&document, Depth::Deep, true)
            .await
            .unwrap();

        assert_eq!(populated["id"], json!("z1"));
        // two hops: stylized -> content -> image
        assert_eq!(
            populated["contentImage"]["image"]["publicUrl"],
            json!("http://cdn/i1.png")
        );
        // dangling style reference degrades to null
        assert_eq!(populated["styleImage"], Value::Null);
        assert_eq!(populated["userId"], json!("u1"));
    }

    #[tokio::test]
    async fn shallow_population_stops_after_one_hop() {
        let store = seeded_store();
        let document = store
            .get(Collection::ContentImages, &"c1".to_string())
            .await
            .unwrap()
            .unwrap();

        let populated = Resolver::new(&store)
            .populate(&document, Depth::Shallow, false)
            .await
            .unwrap();

        assert_eq!(populated["image"]["publicUrl"], json!("http://cdn/i1.png"));
        // add_id disabled: the caller assigns identity
        assert!(populated.get("id").is_none());
    }

    #[tokio::test]
    async fn many_valued_reference_fields_resolve_each_entry() {
        let store = seeded_store();
        store.insert_with_id(
            Collection::StyleImages,
            "s1",
            fields(&[("image", json!({"$ref": "images/i1"})), ("name", json!("wave")), ("userId", json!(""))]),
        );
        store.insert_with_id(
            Collection::ProductCards,
            "p1",
            fields(&[
                ("contentImage", json!({"$ref": "content-images/c1"})),
                (
                    "appliedStyleImages",
                    json!([{"$ref": "style-images/s1"}, {"$ref": "style-images/gone"}]),
                ),
                ("resultingStylizedImages", json!([])),
                ("userId", json!("u1")),
                ("name", json!("")),
            ]),
        );

        let document = store
            .get(Collection::ProductCards, &"p1".to_string())
            .await
            .unwrap()
            .unwrap();
        let populated = Resolver::new(&store)
            .populate(&document, Depth::Deep, true)
            .await
            .unwrap();

        let applied = populated["appliedStyleImages"].as_array().unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0]["name"], json!("wave"));
        assert_eq!(applied[1], Value::Null);
    }
}
