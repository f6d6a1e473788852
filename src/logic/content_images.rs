use crate::error::Result;
use crate::logic::aggregate::{delete_with_cascade, Aggregate};
use crate::logic::images::{create_image_document, UploadedFile};
use crate::logic::resolve::{Depth, Resolver};
use crate::model::{fields_of, owner_of, Collection, ContentImage, Document, Id, Principal};
use crate::services::ObjectStorage;
use crate::store::DocumentStore;
use serde_json::Value;

pub struct ContentImageController<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    storage: &'a dyn ObjectStorage,
}

impl<'a, S: DocumentStore + ?Sized> ContentImageController<'a, S> {
    pub fn new(store: &'a S, storage: &'a dyn ObjectStorage) -> Self {
        Self { store, storage }
    }

    /// Upload the file, persist its Image document, then the ContentImage
    /// document referencing it, and return the populated aggregate.
    pub async fn create(
        &self,
        file: UploadedFile,
        principal: Option<&Principal>,
    ) -> Result<Value> {
        let (image_ref, _image) =
            create_image_document(self.store, self.storage, "content-images", &file).await?;

        let content_image = ContentImage {
            image: image_ref,
            user_id: owner_of(principal),
        };
        let data = fields_of(&content_image)?;
        let created = Aggregate::new(self.store, Collection::ContentImages)
            .create_one(data.clone())
            .await?;

        let document = Document::new(Collection::ContentImages, created.id, data);
        Resolver::new(self.store)
            .populate(&document, Depth::Deep, true)
            .await
    }

    pub async fn fetch_one(&self, id: &Id, principal: Option<&Principal>) -> Result<Value> {
        Aggregate::new(self.store, Collection::ContentImages)
            .fetch_one(id, principal)
            .await
    }

    pub async fn fetch_all(&self, principal: Option<&Principal>) -> Result<Vec<Value>> {
        Aggregate::new(self.store, Collection::ContentImages)
            .fetch_all(principal)
            .await
    }

    /// Cascading delete: dependent stylized images, the owned image, then
    /// the content image itself.
    pub async fn delete(&self, id: &Id, principal: Option<&Principal>) -> Result<()> {
        delete_with_cascade(
            self.store,
            Collection::ContentImages,
            "contentImage",
            id,
            principal,
        )
        .await
    }
}
