pub mod inference;
pub mod storage;

pub use inference::*;
pub use storage::*;
