pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod services;
pub mod store;

pub use api::handlers::AppState;
pub use api::routes::create_router;
pub use error::{Error, Result};
pub use logic::{
    Aggregate, ContentImageController, Depth, ImageController, ProductCardController, Resolver,
    StyleImageController, StyleImageMeta, StylizedImageController, UploadedFile,
};
pub use model::*;
pub use services::{
    HttpObjectStorage, HttpStyleTransferModel, ObjectStorage, StyleTransferModel,
};
pub use store::{DocumentPatch, DocumentStore, MemoryStore, PostgresStore, Predicate};
