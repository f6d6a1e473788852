pub mod handlers;
pub mod principal;
pub mod routes;

pub use handlers::*;
pub use principal::*;
pub use routes::*;
