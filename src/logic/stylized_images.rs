use crate::error::{Error, Result};
use crate::logic::aggregate::Aggregate;
use crate::logic::guard;
use crate::logic::images::probe_dimensions;
use crate::logic::product_cards::ProductCardController;
use crate::logic::resolve::{Depth, Resolver};
use crate::model::{
    fields_of, Collection, DocRef, Document, Id, Image, Principal, StylizedImage,
};
use crate::services::{ObjectStorage, StyleTransferModel};
use crate::store::{DocumentStore, Predicate};
use chrono::Utc;
use serde_json::Value;

pub struct StylizedImageController<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    storage: &'a dyn ObjectStorage,
    model: &'a dyn StyleTransferModel,
}

impl<'a, S: DocumentStore + ?Sized> StylizedImageController<'a, S> {
    pub fn new(
        store: &'a S,
        storage: &'a dyn ObjectStorage,
        model: &'a dyn StyleTransferModel,
    ) -> Self {
        Self {
            store,
            storage,
            model,
        }
    }

    /// Create-or-link for one (content image, style image) pair.
    ///
    /// Both sources are guarded first. If a stylized image already exists
    /// for the exact pair it is returned populated, with no inference call
    /// and no new document. Otherwise the model synthesizes a new image, the
    /// result is persisted, and the content image's product card is created
    /// or extended.
    ///
    /// The existence check and the later create are not one atomic step: two
    /// concurrent calls for the same pair can both miss and create two
    /// documents. That window is documented, not closed.
    pub async fn create_or_link(
        &self,
        content_image_id: &Id,
        style_image_id: &Id,
        principal: &Principal,
    ) -> Result<Value> {
        let (content, style) = futures::try_join!(
            self.store.get(Collection::ContentImages, content_image_id),
            self.store.get(Collection::StyleImages, style_image_id),
        )?;
        let content = guard::check_exists(Collection::ContentImages, content_image_id, content)?;
        let style = guard::check_exists(Collection::StyleImages, style_image_id, style)?;
        if !principal.is_admin() {
            guard::check_access(principal, &content)?;
            guard::check_access(principal, &style)?;
        }

        let pair = Predicate::And(vec![
            Predicate::ref_eq("contentImage", content.doc_ref()),
            Predicate::ref_eq("styleImage", style.doc_ref()),
        ]);
        let existing = self.store.query(Collection::StylizedImages, &pair).await?;
        if let Some(found) = existing.first() {
            if !principal.is_admin() {
                guard::check_access(principal, found)?;
            }
            return Resolver::new(self.store)
                .populate(found, Depth::Deep, true)
                .await;
        }

        let (content_url, style_url) = futures::try_join!(
            self.source_public_url(&content),
            self.source_public_url(&style),
        )?;
        let stylized_url = self.model.predict(&content_url, &style_url).await?;
        let image_ref = self.persist_result_image(&stylized_url).await?;

        let stylized = StylizedImage {
            content_image: content.doc_ref(),
            style_image: style.doc_ref(),
            image: image_ref,
            user_id: principal.owner_id(),
        };
        let data = fields_of(&stylized)?;
        let id = self
            .store
            .create(Collection::StylizedImages, data.clone())
            .await?;
        let stylized_ref = DocRef::new(Collection::StylizedImages, id.clone());

        ProductCardController::new(self.store)
            .create_or_update(content.doc_ref(), style.doc_ref(), stylized_ref, principal)
            .await?;

        let document = Document::new(Collection::StylizedImages, id, data);
        Resolver::new(self.store)
            .populate(&document, Depth::Deep, true)
            .await
    }

    pub async fn fetch_one(&self, id: &Id, principal: Option<&Principal>) -> Result<Value> {
        Aggregate::new(self.store, Collection::StylizedImages)
            .fetch_one(id, principal)
            .await
    }

    pub async fn fetch_all(&self, principal: Option<&Principal>) -> Result<Vec<Value>> {
        Aggregate::new(self.store, Collection::StylizedImages)
            .fetch_all(principal)
            .await
    }

    /// Stylized images own no dependents; product card entries pointing at a
    /// deleted one degrade to `null` during population.
    pub async fn delete(&self, id: &Id, principal: Option<&Principal>) -> Result<()> {
        Aggregate::new(self.store, Collection::StylizedImages)
            .delete_one(id, principal)
            .await
    }

    /// Public URL of the Image document a content or style image owns.
    async fn source_public_url(&self, source: &Document) -> Result<String> {
        let image_ref = source.reference("image").ok_or_else(|| {
            Error::Inconsistency(format!("{} carries no image reference", source.doc_ref()))
        })?;
        let image = guard::check_exists(
            image_ref.collection,
            &image_ref.id,
            self.store.get(image_ref.collection, &image_ref.id).await?,
        )?;
        image
            .data
            .get("publicUrl")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                Error::Inconsistency(format!("{image_ref} has no publicUrl field"))
            })
    }

    /// The model hands back only a URL; fetch the bytes once to record real
    /// dimensions and size in the Image document.
    async fn persist_result_image(&self, public_url: &str) -> Result<DocRef> {
        let bytes = self.storage.fetch(public_url).await?;
        let (width, height) = probe_dimensions(&bytes)
            .map_err(|err| Error::Upstream(format!("unreadable synthesized image: {err}")))?;

        let filename = public_url
            .rsplit_once('/')
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| public_url.to_string());
        let image = Image {
            public_url: public_url.to_string(),
            filename,
            width,
            height,
            size: bytes.len() as u64,
            timestamp: Utc::now(),
        };
        let id = self
            .store
            .create(Collection::Images, fields_of(&image)?)
            .await?;
        Ok(DocRef::new(Collection::Images, id))
    }
}
