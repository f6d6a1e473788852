pub mod common;
pub mod content_image;
pub mod document;
pub mod image;
pub mod principal;
pub mod product_card;
pub mod style_image;
pub mod stylized_image;

pub use common::*;
pub use content_image::*;
pub use document::*;
pub use self::image::*;
pub use principal::*;
pub use product_card::*;
pub use style_image::*;
pub use stylized_image::*;
