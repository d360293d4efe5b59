use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::models::business::{DEFAULT_LOCATION, DEFAULT_LOGO};
use super::models::product::DEFAULT_PRODUCT_IMAGE;
use super::models::{Business, BusinessUpdate, NewUser, Product, ProductDraft, User};
use super::store::{Store, StoreError};

/// In-process store with the same uniqueness rules as the SQL schema.
/// Backs `serve --memory` and the test suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    businesses: BTreeMap<i64, Business>,
    products: BTreeMap<i64, Product>,
    next_user_id: i64,
    next_business_id: i64,
    next_product_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn business_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.businesses
            .values()
            .any(|b| b.business_name == name && Some(b.id) != except)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user_with_business(&self, user: NewUser) -> Result<(User, Business), StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("users_username_key already exists".to_string()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key already exists".to_string()));
        }
        if tables.business_name_taken(&user.username, None) {
            return Err(StoreError::Conflict(
                "businesses_business_name_key already exists".to_string(),
            ));
        }

        let user_id = next_id(&mut tables.next_user_id);
        let created = User {
            id: user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_verified: false,
            join_date: Utc::now(),
        };

        let business_id = next_id(&mut tables.next_business_id);
        let business = Business {
            id: business_id,
            business_name: created.username.clone(),
            city: DEFAULT_LOCATION.to_string(),
            region: DEFAULT_LOCATION.to_string(),
            business_description: None,
            logo: DEFAULT_LOGO.to_string(),
            owner_id: user_id,
        };

        tables.users.insert(user_id, created.clone());
        tables.businesses.insert(business_id, business.clone());
        Ok((created, business))
    }

    async fn user_by_id(&self, id: i64) -> Result<User, StoreError> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(id))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn mark_user_verified(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::user_not_found(id))?;
        if user.is_verified {
            return Ok(false);
        }
        user.is_verified = true;
        Ok(true)
    }

    async fn business_by_id(&self, id: i64) -> Result<Business, StoreError> {
        let tables = self.tables.read().await;
        tables
            .businesses
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::business_not_found(id))
    }

    async fn business_by_owner(&self, owner_id: i64) -> Result<Business, StoreError> {
        let tables = self.tables.read().await;
        tables
            .businesses
            .values()
            .find(|b| b.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("business for user {} not found", owner_id)))
    }

    async fn update_business(&self, id: i64, update: BusinessUpdate) -> Result<Business, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.business_name_taken(&update.business_name, Some(id)) {
            return Err(StoreError::Conflict(
                "businesses_business_name_key already exists".to_string(),
            ));
        }
        let business = tables
            .businesses
            .get_mut(&id)
            .ok_or_else(|| StoreError::business_not_found(id))?;
        business.business_name = update.business_name;
        business.city = update.city;
        business.region = update.region;
        business.business_description = update.business_description;
        Ok(business.clone())
    }

    async fn set_business_logo(&self, id: i64, logo: &str) -> Result<Business, StoreError> {
        let mut tables = self.tables.write().await;
        let business = tables
            .businesses
            .get_mut(&id)
            .ok_or_else(|| StoreError::business_not_found(id))?;
        business.logo = logo.to_string();
        Ok(business.clone())
    }

    async fn create_product(&self, business_id: i64, draft: ProductDraft) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.businesses.contains_key(&business_id) {
            return Err(StoreError::business_not_found(business_id));
        }
        let id = next_id(&mut tables.next_product_id);
        let product = Product {
            id,
            name: draft.name,
            category: draft.category,
            original_price: draft.original_price,
            new_price: draft.new_price,
            percentage_discount: draft.percentage_discount,
            offer_expiration_date: draft.offer_expiration_date,
            product_image: DEFAULT_PRODUCT_IMAGE.to_string(),
            date_published: Utc::now(),
            business_id,
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn product_by_id(&self, id: i64) -> Result<Product, StoreError> {
        let tables = self.tables.read().await;
        tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::product_not_found(id))
    }

    async fn update_product(&self, id: i64, draft: ProductDraft) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::product_not_found(id))?;
        product.name = draft.name;
        product.category = draft.category;
        product.original_price = draft.original_price;
        product.new_price = draft.new_price;
        product.percentage_discount = draft.percentage_discount;
        product.offer_expiration_date = draft.offer_expiration_date;
        product.date_published = Utc::now();
        Ok(product.clone())
    }

    async fn set_product_image(&self, id: i64, image: &str) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::product_not_found(id))?;
        product.product_image = image.to_string();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::product_not_found(id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: "hash".to_string(),
        }
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Mango".to_string(),
            category: "Fruit".to_string(),
            original_price: Decimal::new(1000, 2),
            new_price: Decimal::new(800, 2),
            percentage_discount: Decimal::new(2000, 2),
            offer_expiration_date: None,
        }
    }

    #[tokio::test]
    async fn user_creation_adds_exactly_one_business() {
        let store = MemoryStore::new();
        let (user, business) = store.create_user_with_business(new_user("alice")).await.unwrap();

        assert_eq!(business.owner_id, user.id);
        assert_eq!(business.business_name, "alice");
        assert_eq!(business.logo, DEFAULT_LOGO);
        assert_eq!(store.business_by_owner(user.id).await.unwrap(), business);
        assert_eq!(store.tables.read().await.businesses.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user_with_business(new_user("alice")).await.unwrap();

        let same_name = store.create_user_with_business(new_user("alice")).await;
        assert!(matches!(same_name, Err(StoreError::Conflict(_))));

        let mut same_email = new_user("bob");
        same_email.email = "alice@example.com".to_string();
        let result = store.create_user_with_business(same_email).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        // Failed inserts leave nothing behind
        assert_eq!(store.tables.read().await.users.len(), 1);
        assert_eq!(store.tables.read().await.businesses.len(), 1);
    }

    #[tokio::test]
    async fn mark_verified_reports_whether_it_changed() {
        let store = MemoryStore::new();
        let (user, _) = store.create_user_with_business(new_user("alice")).await.unwrap();

        assert!(store.mark_user_verified(user.id).await.unwrap());
        assert!(!store.mark_user_verified(user.id).await.unwrap());
        assert!(store.user_by_id(user.id).await.unwrap().is_verified);
        assert!(matches!(
            store.mark_user_verified(999).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn product_lifecycle() {
        let store = MemoryStore::new();
        let (_, business) = store.create_user_with_business(new_user("alice")).await.unwrap();

        let product = store.create_product(business.id, draft()).await.unwrap();
        assert_eq!(product.product_image, DEFAULT_PRODUCT_IMAGE);
        assert_eq!(store.list_products().await.unwrap().len(), 1);

        let mut changed = draft();
        changed.new_price = Decimal::new(500, 2);
        let updated = store.update_product(product.id, changed).await.unwrap();
        assert_eq!(updated.new_price, Decimal::new(500, 2));
        assert!(updated.date_published >= product.date_published);

        store.delete_product(product.id).await.unwrap();
        assert!(matches!(
            store.product_by_id(product.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_product(product.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn products_require_an_existing_business() {
        let store = MemoryStore::new();
        let result = store.create_product(42, draft()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
