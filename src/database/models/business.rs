use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_LOGO: &str = "default.jpg";
pub const DEFAULT_LOCATION: &str = "Unspecified";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Business {
    pub id: i64,
    pub business_name: String,
    pub city: String,
    pub region: String,
    pub business_description: Option<String>,
    pub logo: String,
    pub owner_id: i64,
}

/// Editable profile fields. The logo is only changed through image upload.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessUpdate {
    pub business_name: String,
    pub city: String,
    pub region: String,
    pub business_description: Option<String>,
}
