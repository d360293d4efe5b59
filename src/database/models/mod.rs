pub mod business;
pub mod product;
pub mod user;

pub use business::{Business, BusinessUpdate};
pub use product::{Product, ProductDraft, ProductInput};
pub use user::{NewUser, User};
