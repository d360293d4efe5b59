// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, registration, email verification and read-only
// catalogue access.

pub mod products;
pub mod registration;
pub mod system;
pub mod token;
pub mod validation;
pub mod verify;

pub use products::{product_get, product_list};
pub use registration::registration_post;
pub use system::{health, root};
pub use token::token_post;
pub use verify::email_verify_get;
