use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_PRODUCT_IMAGE: &str = "productDefault.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub original_price: Decimal,
    pub new_price: Decimal,
    pub percentage_discount: Decimal,
    pub offer_expiration_date: Option<NaiveDate>,
    pub product_image: String,
    pub date_published: DateTime<Utc>,
    pub business_id: i64,
}

/// Client-supplied product fields, used for both create and full update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub original_price: Decimal,
    pub new_price: Decimal,
    pub offer_expiration_date: Option<NaiveDate>,
}

/// Validated product write with the derived discount filled in.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub original_price: Decimal,
    pub new_price: Decimal,
    pub percentage_discount: Decimal,
    pub offer_expiration_date: Option<NaiveDate>,
}
