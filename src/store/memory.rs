use crate::model::{generate_id, Collection, Document, FieldMap, Id};
use crate::store::traits::{DocumentPatch, DocumentStore, Predicate};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// In-memory document store for tests and local development. BTreeMaps keep
/// query results in a deterministic order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<Id, FieldMap>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(predicate: &Predicate, data: &FieldMap) -> bool {
        match predicate {
            Predicate::All => true,
            Predicate::FieldEq { field, value } => data.get(field) == Some(value),
            Predicate::FieldIn { field, values } => data
                .get(field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Predicate::RefEq { field, target } => data.get(field) == Some(&target.to_value()),
            Predicate::And(predicates) => predicates.iter().all(|p| Self::matches(p, data)),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: Collection, data: FieldMap) -> Result<Id> {
        let id = generate_id();
        self.collections
            .write()
            .entry(collection)
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &Id) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .map(|data| Document::new(collection, id.clone(), data.clone())))
    }

    async fn query(&self, collection: Collection, predicate: &Predicate) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(&collection) else {
            return Ok(Vec::new());
        };
        Ok(documents
            .iter()
            .filter(|(_, data)| Self::matches(predicate, data))
            .map(|(id, data)| Document::new(collection, id.clone(), data.clone()))
            .collect())
    }

    async fn update(&self, collection: Collection, id: &Id, patch: DocumentPatch) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(data) = collections
            .get_mut(&collection)
            .and_then(|documents| documents.get_mut(id))
        else {
            return Ok(false);
        };
        patch.apply(data);
        Ok(true)
    }

    async fn delete(&self, collection: Collection, id: &Id) -> Result<bool> {
        let mut collections = self.collections.write();
        Ok(collections
            .get_mut(&collection)
            .map(|documents| documents.remove(id).is_some())
            .unwrap_or(false))
    }
}

/// Insert a document under a caller-chosen id; test seams only.
impl MemoryStore {
    pub fn insert_with_id(&self, collection: Collection, id: impl Into<Id>, data: FieldMap) {
        self.collections
            .write()
            .entry(collection)
            .or_default()
            .insert(id.into(), data);
    }
}
