pub mod aggregate;
pub mod content_images;
pub mod guard;
pub mod images;
pub mod product_cards;
pub mod resolve;
pub mod style_images;
pub mod stylized_images;

pub use aggregate::{delete_with_cascade, Aggregate};
pub use content_images::ContentImageController;
pub use images::{ImageController, UploadedFile};
pub use product_cards::ProductCardController;
pub use resolve::{Depth, Resolver};
pub use style_images::{StyleImageController, StyleImageMeta};
pub use stylized_images::StylizedImageController;
