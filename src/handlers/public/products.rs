// handlers/public/products.rs - anonymous product reads

use axum::extract::{Path, State};
use serde::Serialize;

use crate::database::models::{Business, Product, User};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Business fields shown alongside a single product
#[derive(Debug, Serialize)]
pub struct BusinessDetails {
    pub name: String,
    pub logo: String,
    pub city: String,
    pub region: String,
    pub business_description: Option<String>,
    pub owner_id: i64,
    pub email: String,
    pub join_date: String,
}

impl BusinessDetails {
    fn new(business: Business, owner: User) -> Self {
        Self {
            name: business.business_name,
            logo: business.logo,
            city: business.city,
            region: business.region,
            business_description: business.business_description,
            owner_id: owner.id,
            email: owner.email,
            join_date: owner.join_date.format("%b %d %Y").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetails {
    pub product_details: Product,
    pub business_details: BusinessDetails,
}

/// GET /product - every product
pub async fn product_list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.store().list_products().await?;
    Ok(ApiResponse::success(products))
}

/// GET /product/:id - one product with its business and owner contact
pub async fn product_get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ProductDetails> {
    let product = state.store().product_by_id(id).await?;
    let business = state.store().business_by_id(product.business_id).await?;
    let owner = state.store().user_by_id(business.owner_id).await?;

    Ok(ApiResponse::success(ProductDetails {
        product_details: product,
        business_details: BusinessDetails::new(business, owner),
    }))
}
