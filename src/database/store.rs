use async_trait::async_trait;
use thiserror::Error;

use super::models::{Business, BusinessUpdate, NewUser, Product, ProductDraft, User};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn user_not_found(id: i64) -> Self {
        StoreError::NotFound(format!("user {} not found", id))
    }

    pub fn business_not_found(id: i64) -> Self {
        StoreError::NotFound(format!("business {} not found", id))
    }

    pub fn product_not_found(id: i64) -> Self {
        StoreError::NotFound(format!("product {} not found", id))
    }
}

/// Data-access operations the handlers depend on.
///
/// Lookups that name a single record by id return `StoreError::NotFound`
/// when it does not exist; lookups by natural key return `Option`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user and its business (named after the user) as one unit.
    async fn create_user_with_business(&self, user: NewUser) -> Result<(User, Business), StoreError>;

    async fn user_by_id(&self, id: i64) -> Result<User, StoreError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Returns true if the flag changed, false if the user was already verified.
    async fn mark_user_verified(&self, id: i64) -> Result<bool, StoreError>;

    async fn business_by_id(&self, id: i64) -> Result<Business, StoreError>;

    async fn business_by_owner(&self, owner_id: i64) -> Result<Business, StoreError>;

    async fn update_business(&self, id: i64, update: BusinessUpdate) -> Result<Business, StoreError>;

    async fn set_business_logo(&self, id: i64, logo: &str) -> Result<Business, StoreError>;

    async fn create_product(&self, business_id: i64, draft: ProductDraft) -> Result<Product, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn product_by_id(&self, id: i64) -> Result<Product, StoreError>;

    /// Replace all editable fields and refresh `date_published`.
    async fn update_product(&self, id: i64, draft: ProductDraft) -> Result<Product, StoreError>;

    async fn set_product_image(&self, id: i64, image: &str) -> Result<Product, StoreError>;

    async fn delete_product(&self, id: i64) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
