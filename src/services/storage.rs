use crate::error::{Error, Result};
use reqwest::header::CONTENT_TYPE;

/// Binary object storage boundary: uploaded images go in, public URLs come
/// out. Any write failure surfaces as an upstream failure.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store the bytes under `path` and return the public URL they are
    /// served from.
    async fn store(&self, path: &str, content_type: &str, bytes: &[u8]) -> Result<String>;

    /// Fetch the bytes behind a public URL. Used to probe synthesized images
    /// the inference collaborator only hands back by URL.
    async fn fetch(&self, public_url: &str) -> Result<Vec<u8>>;
}

/// HTTP object storage: PUT against an upload endpoint, serve from a public
/// base URL. Matches a bucket fronted by a CDN or a storage emulator.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    upload_base_url: String,
    public_base_url: String,
}

impl HttpObjectStorage {
    pub fn new(upload_base_url: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_base_url: upload_base_url.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn store(&self, path: &str, content_type: &str, bytes: &[u8]) -> Result<String> {
        let upload_url = format!("{}/{}", self.upload_base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .put(&upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "storage upload to {upload_url} failed with status {}",
                response.status()
            )));
        }
        Ok(format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            path
        ))
    }

    async fn fetch(&self, public_url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(public_url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "fetching {public_url} failed with status {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
