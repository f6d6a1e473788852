use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::DocumentStore;

pub fn create_router<S: DocumentStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Images (read-only; created as a side effect of uploads and
        // stylization)
        .route("/images", get(handlers::list_images::<S>))
        .route("/images/:id", get(handlers::get_image::<S>))
        // Content images
        .route("/content-images", post(handlers::create_content_image::<S>))
        .route("/content-images", get(handlers::list_content_images::<S>))
        .route("/content-images/:id", get(handlers::get_content_image::<S>))
        .route(
            "/content-images/:id",
            delete(handlers::delete_content_image::<S>),
        )
        // Style images
        .route("/style-images", post(handlers::create_style_image::<S>))
        .route("/style-images", get(handlers::list_style_images::<S>))
        .route("/style-images/:id", get(handlers::get_style_image::<S>))
        .route(
            "/style-images/:id",
            delete(handlers::delete_style_image::<S>),
        )
        // Stylized images (create-or-link)
        .route(
            "/stylized-images",
            post(handlers::create_stylized_image::<S>),
        )
        .route("/stylized-images", get(handlers::list_stylized_images::<S>))
        .route(
            "/stylized-images/:id",
            get(handlers::get_stylized_image::<S>),
        )
        .route(
            "/stylized-images/:id",
            delete(handlers::delete_stylized_image::<S>),
        )
        // Product cards (created and extended by stylization, never directly)
        .route("/product-cards", get(handlers::list_product_cards::<S>))
        .route("/product-cards/:id", get(handlers::get_product_card::<S>))
}
