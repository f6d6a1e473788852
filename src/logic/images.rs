use crate::error::{Error, Result};
use crate::logic::aggregate::Aggregate;
use crate::model::{fields_of, Collection, DocRef, Id, Image};
use crate::services::ObjectStorage;
use crate::store::DocumentStore;
use chrono::Utc;
use serde_json::Value;

/// An uploaded file as handed over by the multipart boundary.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Decode width and height from raw image bytes. Rejects anything the image
/// crate cannot parse.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| Error::InvalidInput(format!("could not decode image bytes: {err}")))?;
    Ok((decoded.width(), decoded.height()))
}

/// Upload the file to object storage and persist the Image document that
/// describes it. Returns the new document's reference together with the
/// entity for callers assembling a populated response.
pub async fn create_image_document<S: DocumentStore + ?Sized>(
    store: &S,
    storage: &dyn ObjectStorage,
    path_prefix: &str,
    file: &UploadedFile,
) -> Result<(DocRef, Image)> {
    let (width, height) = probe_dimensions(&file.bytes)?;
    let path = format!("{path_prefix}/{}", file.filename);
    let public_url = storage.store(&path, &file.content_type, &file.bytes).await?;

    let image = Image {
        public_url,
        filename: file.filename.clone(),
        width,
        height,
        size: file.bytes.len() as u64,
        timestamp: Utc::now(),
    };
    let id = store.create(Collection::Images, fields_of(&image)?).await?;
    Ok((DocRef::new(Collection::Images, id), image))
}

/// Read access to stored Image documents. Images carry no ownership field,
/// so they are served in the unauthenticated context.
pub struct ImageController<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> ImageController<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn fetch_one(&self, id: &Id) -> Result<Value> {
        Aggregate::new(self.store, Collection::Images)
            .fetch_one(id, None)
            .await
    }

    pub async fn fetch_all(&self) -> Result<Vec<Value>> {
        Aggregate::new(self.store, Collection::Images)
            .fetch_all(None)
            .await
    }
}
