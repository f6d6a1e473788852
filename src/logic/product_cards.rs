use crate::error::{Error, Result};
use crate::logic::aggregate::Aggregate;
use crate::model::{fields_of, Collection, DocRef, Id, Principal, ProductCard};
use crate::store::{DocumentPatch, DocumentStore, Predicate};
use serde_json::Value;

pub struct ProductCardController<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> ProductCardController<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Idempotent upsert-or-link for the card tracking one content image.
    /// Zero matches creates the card with singleton reference sets; one match
    /// appends both references with set-union semantics; more than one match
    /// means the one-card-per-content-image invariant is broken and fails
    /// loudly instead of silently picking one.
    pub async fn create_or_update(
        &self,
        content_ref: DocRef,
        style_ref: DocRef,
        stylized_ref: DocRef,
        principal: &Principal,
    ) -> Result<()> {
        let matches = self
            .store
            .query(
                Collection::ProductCards,
                &Predicate::ref_eq("contentImage", content_ref.clone()),
            )
            .await?;

        match matches.as_slice() {
            [] => {
                let card = ProductCard {
                    content_image: content_ref,
                    applied_style_images: vec![style_ref],
                    resulting_stylized_images: vec![stylized_ref],
                    user_id: principal.owner_id(),
                    name: String::new(),
                };
                self.store
                    .create(Collection::ProductCards, fields_of(&card)?)
                    .await?;
                Ok(())
            }
            [existing] => {
                let patch = DocumentPatch::new()
                    .array_union("appliedStyleImages", vec![style_ref])
                    .array_union("resultingStylizedImages", vec![stylized_ref]);
                let updated = self
                    .store
                    .update(Collection::ProductCards, &existing.id, patch)
                    .await?;
                if !updated {
                    // The card was seen by the query but gone by the update;
                    // the references just linked would be silently lost.
                    return Err(Error::Inconsistency(format!(
                        "product card {} for {content_ref} vanished before the update applied",
                        existing.id
                    )));
                }
                Ok(())
            }
            found => Err(Error::Inconsistency(format!(
                "expected at most one product card for {content_ref}, found {}",
                found.len()
            ))),
        }
    }

    pub async fn fetch_one(&self, id: &Id, principal: Option<&Principal>) -> Result<Value> {
        Aggregate::new(self.store, Collection::ProductCards)
            .fetch_one(id, principal)
            .await
    }

    pub async fn fetch_all(&self, principal: Option<&Principal>) -> Result<Vec<Value>> {
        Aggregate::new(self.store, Collection::ProductCards)
            .fetch_all(principal)
            .await
    }
}
