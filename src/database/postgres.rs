use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::models::business::{DEFAULT_LOCATION, DEFAULT_LOGO};
use super::models::product::DEFAULT_PRODUCT_IMAGE;
use super::models::{Business, BusinessUpdate, NewUser, Product, ProductDraft, User};
use super::store::{Store, StoreError};
use crate::config::DatabaseConfig;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_verified, join_date";
const BUSINESS_COLUMNS: &str =
    "id, business_name, city, region, business_description, logo, owner_id";
const PRODUCT_COLUMNS: &str = "id, name, category, original_price, new_price, percentage_discount, \
     offer_expiration_date, product_image, date_published, business_id";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool using the configured URL and limits
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config.url.as_deref().ok_or_else(|| {
            StoreError::Sqlx(sqlx::Error::Configuration("DATABASE_URL is not set".into()))
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected to database (max_connections={})", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

/// Turn unique-constraint failures into conflicts, pass everything else through
fn map_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let what = db.constraint().unwrap_or("unique constraint").to_string();
            StoreError::Conflict(format!("{} already exists", what))
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user_with_business(&self, user: NewUser) -> Result<(User, Business), StoreError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let business = sqlx::query_as::<_, Business>(&format!(
            "INSERT INTO businesses (business_name, city, region, logo, owner_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            BUSINESS_COLUMNS
        ))
        .bind(&created.username)
        .bind(DEFAULT_LOCATION)
        .bind(DEFAULT_LOCATION)
        .bind(DEFAULT_LOGO)
        .bind(created.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok((created, business))
    }

    async fn user_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::user_not_found(id))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn mark_user_verified(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET is_verified = TRUE WHERE id = $1 AND is_verified = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        // Distinguish "already verified" from "no such user"
        self.user_by_id(id).await?;
        Ok(false)
    }

    async fn business_by_id(&self, id: i64) -> Result<Business, StoreError> {
        sqlx::query_as::<_, Business>(&format!(
            "SELECT {} FROM businesses WHERE id = $1",
            BUSINESS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::business_not_found(id))
    }

    async fn business_by_owner(&self, owner_id: i64) -> Result<Business, StoreError> {
        sqlx::query_as::<_, Business>(&format!(
            "SELECT {} FROM businesses WHERE owner_id = $1",
            BUSINESS_COLUMNS
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("business for user {} not found", owner_id)))
    }

    async fn update_business(&self, id: i64, update: BusinessUpdate) -> Result<Business, StoreError> {
        sqlx::query_as::<_, Business>(&format!(
            "UPDATE businesses SET business_name = $2, city = $3, region = $4, business_description = $5 \
             WHERE id = $1 RETURNING {}",
            BUSINESS_COLUMNS
        ))
        .bind(id)
        .bind(&update.business_name)
        .bind(&update.city)
        .bind(&update.region)
        .bind(&update.business_description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| StoreError::business_not_found(id))
    }

    async fn set_business_logo(&self, id: i64, logo: &str) -> Result<Business, StoreError> {
        sqlx::query_as::<_, Business>(&format!(
            "UPDATE businesses SET logo = $2 WHERE id = $1 RETURNING {}",
            BUSINESS_COLUMNS
        ))
        .bind(id)
        .bind(logo)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::business_not_found(id))
    }

    async fn create_product(&self, business_id: i64, draft: ProductDraft) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, category, original_price, new_price, percentage_discount, \
             offer_expiration_date, product_image, business_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.original_price)
        .bind(draft.new_price)
        .bind(draft.percentage_discount)
        .bind(draft.offer_expiration_date)
        .bind(DEFAULT_PRODUCT_IMAGE)
        .bind(business_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn product_by_id(&self, id: i64) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::product_not_found(id))
    }

    async fn update_product(&self, id: i64, draft: ProductDraft) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET name = $2, category = $3, original_price = $4, new_price = $5, \
             percentage_discount = $6, offer_expiration_date = $7, date_published = NOW() \
             WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.original_price)
        .bind(draft.new_price)
        .bind(draft.percentage_discount)
        .bind(draft.offer_expiration_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| StoreError::product_not_found(id))
    }

    async fn set_product_image(&self, id: i64, image: &str) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET product_image = $2 WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(image)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::product_not_found(id))
    }

    async fn delete_product(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::product_not_found(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
