// Ownership checks for mutations.
//
// Walks resource -> owning business -> owning user and compares the owner
// with the authenticated user by id.

use crate::database::models::{Business, Product, User};
use crate::database::Store;
use crate::error::ApiError;

fn ensure_same_user(current: &User, owner: &User) -> Result<(), ApiError> {
    if current.id != owner.id {
        tracing::warn!(
            "Ownership check failed: user {} ({}) is not owner {} ({})",
            current.id,
            current.username,
            owner.id,
            owner.username
        );
        return Err(ApiError::not_owner());
    }
    Ok(())
}

/// Load a business the current user owns
pub async fn owned_business(store: &dyn Store, current: &User, business_id: i64) -> Result<Business, ApiError> {
    let business = store.business_by_id(business_id).await?;
    let owner = store.user_by_id(business.owner_id).await?;
    ensure_same_user(current, &owner)?;
    Ok(business)
}

/// Load a product whose business the current user owns
pub async fn owned_product(
    store: &dyn Store,
    current: &User,
    product_id: i64,
) -> Result<(Product, Business), ApiError> {
    let product = store.product_by_id(product_id).await?;
    let business = owned_business(store, current, product.business_id).await?;
    Ok((product, business))
}
