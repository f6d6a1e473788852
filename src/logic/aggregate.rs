use crate::error::Result;
use crate::logic::guard;
use crate::logic::resolve::{Depth, Resolver};
use crate::model::{Collection, DocRef, Document, FieldMap, Id, Principal};
use crate::store::{DocumentStore, Predicate};
use futures::future::try_join_all;
use serde_json::Value;

/// Generic per-collection orchestration: store access, guarding, and
/// population combined into the create/fetch/delete operations every entity
/// kind shares. The per-kind controllers are thin wrappers over this.
pub struct Aggregate<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    collection: Collection,
}

impl<'a, S: DocumentStore + ?Sized> Aggregate<'a, S> {
    pub fn new(store: &'a S, collection: Collection) -> Self {
        Self { store, collection }
    }

    /// Insert a raw document and return its reference. No population.
    pub async fn create_one(&self, data: FieldMap) -> Result<DocRef> {
        let id = self.store.create(self.collection, data).await?;
        Ok(DocRef::new(self.collection, id))
    }

    /// Get, guard, and populate one document. Admin principals skip the
    /// access check entirely; existence is always checked first.
    pub async fn fetch_one(&self, id: &Id, principal: Option<&Principal>) -> Result<Value> {
        let document = self.require(id, principal).await?;
        Resolver::new(self.store)
            .populate(&document, Depth::Deep, true)
            .await
    }

    /// Populate every visible document. A non-admin principal restricts the
    /// query to public documents and their own; population runs concurrently
    /// across the matches.
    pub async fn fetch_all(&self, principal: Option<&Principal>) -> Result<Vec<Value>> {
        let predicate = match principal {
            Some(p) if !p.is_admin() => Predicate::visible_to(&p.id),
            _ => Predicate::All,
        };
        let documents = self.store.query(self.collection, &predicate).await?;
        let resolver = Resolver::new(self.store);
        try_join_all(
            documents
                .iter()
                .map(|document| resolver.populate(document, Depth::Deep, true)),
        )
        .await
    }

    /// Guarded delete without cascade. Kinds with dependents use
    /// `delete_with_cascade` instead.
    pub async fn delete_one(&self, id: &Id, principal: Option<&Principal>) -> Result<()> {
        let document = self.require(id, principal).await?;
        self.store.delete(self.collection, &document.id).await?;
        Ok(())
    }

    /// Get + existence + ownership, returning the raw handle. The building
    /// block for every guarded operation.
    pub async fn require(&self, id: &Id, principal: Option<&Principal>) -> Result<Document> {
        let document = guard::check_exists(
            self.collection,
            id,
            self.store.get(self.collection, id).await?,
        )?;
        if let Some(principal) = principal {
            if !principal.is_admin() {
                guard::check_access(principal, &document)?;
            }
        }
        Ok(document)
    }
}

/// Guarded delete with the cascade shared by content and style images:
/// dependent stylized images go first, then the owned image, then the parent
/// itself, so concurrent readers observe dangling references for as short a
/// window as possible. Best-effort only; the sequence is not transactional.
pub async fn delete_with_cascade<S: DocumentStore + ?Sized>(
    store: &S,
    collection: Collection,
    dependent_field: &str,
    id: &Id,
    principal: Option<&Principal>,
) -> Result<()> {
    let document = Aggregate::new(store, collection).require(id, principal).await?;

    let dependents = store
        .query(
            Collection::StylizedImages,
            &Predicate::ref_eq(dependent_field, document.doc_ref()),
        )
        .await?;
    for dependent in &dependents {
        store
            .delete(Collection::StylizedImages, &dependent.id)
            .await?;
    }

    if let Some(image_ref) = document.reference("image") {
        store.delete(image_ref.collection, &image_ref.id).await?;
    }

    store.delete(collection, &document.id).await?;
    Ok(())
}
