use crate::error::Result;
use crate::logic::aggregate::{delete_with_cascade, Aggregate};
use crate::logic::images::{create_image_document, UploadedFile};
use crate::logic::resolve::{Depth, Resolver};
use crate::model::{fields_of, owner_of, Collection, Document, Id, Principal, StyleImage};
use crate::services::ObjectStorage;
use crate::store::DocumentStore;
use serde_json::Value;

/// Caller-supplied metadata accompanying a style image upload.
#[derive(Debug, Clone, Default)]
pub struct StyleImageMeta {
    pub name: String,
    pub artist: String,
}

pub struct StyleImageController<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    storage: &'a dyn ObjectStorage,
}

impl<'a, S: DocumentStore + ?Sized> StyleImageController<'a, S> {
    pub fn new(store: &'a S, storage: &'a dyn ObjectStorage) -> Self {
        Self { store, storage }
    }

    pub async fn create(
        &self,
        file: UploadedFile,
        meta: StyleImageMeta,
        principal: Option<&Principal>,
    ) -> Result<Value> {
        let (image_ref, _image) =
            create_image_document(self.store, self.storage, "style-images", &file).await?;

        let style_image = StyleImage {
            image: image_ref,
            name: meta.name,
            artist: meta.artist,
            user_id: owner_of(principal),
        };
        let data = fields_of(&style_image)?;
        let created = Aggregate::new(self.store, Collection::StyleImages)
            .create_one(data.clone())
            .await?;

        let document = Document::new(Collection::StyleImages, created.id, data);
        Resolver::new(self.store)
            .populate(&document, Depth::Deep, true)
            .await
    }

    pub async fn fetch_one(&self, id: &Id, principal: Option<&Principal>) -> Result<Value> {
        Aggregate::new(self.store, Collection::StyleImages)
            .fetch_one(id, principal)
            .await
    }

    pub async fn fetch_all(&self, principal: Option<&Principal>) -> Result<Vec<Value>> {
        Aggregate::new(self.store, Collection::StyleImages)
            .fetch_all(principal)
            .await
    }

    pub async fn delete(&self, id: &Id, principal: Option<&Principal>) -> Result<()> {
        delete_with_cascade(
            self.store,
            Collection::StyleImages,
            "styleImage",
            id,
            principal,
        )
        .await
    }
}
