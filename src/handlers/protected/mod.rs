// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `middleware::require_user`, which puts the
// authenticated user into the request extensions as `CurrentUser`.

pub mod business;
pub mod products;
pub mod profile;
pub mod upload;

pub use business::business_put;
pub use products::{product_delete, product_post, product_put};
pub use profile::user_me;
pub use upload::{upload_product, upload_profile};
