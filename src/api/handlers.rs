use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::api::principal::AuthContext;
use crate::error::Error;
use crate::logic::{
    ContentImageController, ImageController, ProductCardController, StyleImageController,
    StyleImageMeta, StylizedImageController, UploadedFile,
};
use crate::model::{Id, Principal};
use crate::services::{ObjectStorage, StyleTransferModel};
use crate::store::DocumentStore;

/// Shared application state: the store plus the two external collaborators,
/// injected at startup so tests can swap in doubles.
pub struct AppState<S: DocumentStore> {
    pub store: Arc<S>,
    pub storage: Arc<dyn ObjectStorage>,
    pub model: Arc<dyn StyleTransferModel>,
    /// Whether error responses may carry internal detail; enabled only for
    /// development deployments.
    pub expose_error_details: bool,
}

impl<S: DocumentStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            storage: Arc::clone(&self.storage),
            model: Arc::clone(&self.model),
            expose_error_details: self.expose_error_details,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<T, ApiError>;

impl<S: DocumentStore> AppState<S> {
    /// Map a core failure onto its HTTP shape. The kind tag is always
    /// stable; the message is environment-gated.
    pub fn fail(&self, err: Error) -> ApiError {
        let status = match &err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Inconsistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if self.expose_error_details {
            err.to_string()
        } else {
            match &err {
                // Client-addressable failures keep their message; internal
                // detail stays inside.
                Error::NotFound(m) | Error::Forbidden(m) | Error::InvalidInput(m) => m.clone(),
                Error::Upstream(_) => "an upstream service failed".to_string(),
                Error::Inconsistency(_) => "internal error".to_string(),
            }
        };
        (
            status,
            Json(ErrorBody {
                error: err.kind(),
                message,
            }),
        )
    }

    /// Owned resources accept no unauthenticated context; only images and
    /// the health check are served without a principal.
    fn require_principal<'a>(&self, auth: &'a AuthContext) -> Result<&'a Principal, ApiError> {
        auth.principal().ok_or_else(|| {
            self.fail(Error::Forbidden(
                "this resource requires a principal".to_string(),
            ))
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// --- images -----------------------------------------------------------------

pub async fn list_images<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<Json<Vec<Value>>> {
    let images = ImageController::new(&*state.store)
        .fetch_all()
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(images))
}

pub async fn get_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Value>> {
    let image = ImageController::new(&*state.store)
        .fetch_one(&id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(image))
}

// --- content images ---------------------------------------------------------

pub async fn create_content_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let principal = state.require_principal(&auth)?;
    let upload = read_upload(multipart).await.map_err(|e| state.fail(e))?;
    let populated = ContentImageController::new(&*state.store, &*state.storage)
        .create(upload.file, Some(principal))
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(populated)))
}

pub async fn list_content_images<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Value>>> {
    let content_images = ContentImageController::new(&*state.store, &*state.storage)
        .fetch_all(Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(content_images))
}

pub async fn get_content_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<Id>,
) -> ApiResult<Json<Value>> {
    let content_image = ContentImageController::new(&*state.store, &*state.storage)
        .fetch_one(&id, Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(content_image))
}

pub async fn delete_content_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    ContentImageController::new(&*state.store, &*state.storage)
        .delete(&id, Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- style images -----------------------------------------------------------

pub async fn create_style_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let principal = state.require_principal(&auth)?;
    let upload = read_upload(multipart).await.map_err(|e| state.fail(e))?;
    let meta = StyleImageMeta {
        name: upload.text("name"),
        artist: upload.text("artist"),
    };
    let populated = StyleImageController::new(&*state.store, &*state.storage)
        .create(upload.file, meta, Some(principal))
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(populated)))
}

pub async fn list_style_images<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Value>>> {
    let style_images = StyleImageController::new(&*state.store, &*state.storage)
        .fetch_all(Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(style_images))
}

pub async fn get_style_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<Id>,
) -> ApiResult<Json<Value>> {
    let style_image = StyleImageController::new(&*state.store, &*state.storage)
        .fetch_one(&id, Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(style_image))
}

pub async fn delete_style_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    StyleImageController::new(&*state.store, &*state.storage)
        .delete(&id, Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- stylized images --------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStylizedImageRequest {
    pub content_image_id: Id,
    pub style_image_id: Id,
}

pub async fn create_stylized_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Json(request): Json<CreateStylizedImageRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let principal = state.require_principal(&auth)?;
    let populated = StylizedImageController::new(&*state.store, &*state.storage, &*state.model)
        .create_or_link(&request.content_image_id, &request.style_image_id, principal)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(populated)))
}

pub async fn list_stylized_images<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Value>>> {
    let stylized_images = StylizedImageController::new(&*state.store, &*state.storage, &*state.model)
        .fetch_all(Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(stylized_images))
}

pub async fn get_stylized_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<Id>,
) -> ApiResult<Json<Value>> {
    let stylized_image = StylizedImageController::new(&*state.store, &*state.storage, &*state.model)
        .fetch_one(&id, Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(stylized_image))
}

pub async fn delete_stylized_image<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    StylizedImageController::new(&*state.store, &*state.storage, &*state.model)
        .delete(&id, Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- product cards ----------------------------------------------------------

pub async fn list_product_cards<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Value>>> {
    let product_cards = ProductCardController::new(&*state.store)
        .fetch_all(Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(product_cards))
}

pub async fn get_product_card<S: DocumentStore>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<Id>,
) -> ApiResult<Json<Value>> {
    let product_card = ProductCardController::new(&*state.store)
        .fetch_one(&id, Some(state.require_principal(&auth)?))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(product_card))
}

// --- multipart --------------------------------------------------------------

struct Upload {
    file: UploadedFile,
    texts: std::collections::HashMap<String, String>,
}

impl Upload {
    fn text(&self, field: &str) -> String {
        self.texts.get(field).cloned().unwrap_or_default()
    }
}

/// Pull the single file field plus any text fields out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, Error> {
    let mut file = None;
    let mut texts = std::collections::HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| Error::InvalidInput(format!("malformed multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| Error::InvalidInput(format!("unreadable file field: {err}")))?;
            file = Some(UploadedFile {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|err| Error::InvalidInput(format!("unreadable field {name}: {err}")))?;
            texts.insert(name, value);
        }
    }

    let file = file.ok_or_else(|| {
        Error::InvalidInput("multipart upload must contain a file field".to_string())
    })?;
    Ok(Upload { file, texts })
}
