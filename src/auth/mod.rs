pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::{SecurityConfig, MAX_TOKEN_TTL_HOURS};
use crate::database::models::User;
use crate::database::{Store, StoreError};

pub use password::PasswordHasher;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials, please try again")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a token may be used for. Access tokens authenticate API calls;
/// verification tokens only confirm an email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    EmailVerification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 identity tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    verification_ttl: Duration,
    bcrypt_cost: u32,
    // Checked against when the username is unknown so both paths pay for bcrypt
    dummy_hash: OnceCell<String>,
}

const DUMMY_PASSWORD: &str = "shopfront-unknown-user";

fn ttl_hours(hours: u64) -> Duration {
    Duration::hours(hours.min(MAX_TOKEN_TTL_HOURS) as i64)
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_hours: u64, verification_ttl_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: ttl_hours(access_ttl_hours),
            verification_ttl: ttl_hours(verification_ttl_hours),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Work factor used for the unknown-user comparison hash
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            &security.jwt_secret,
            security.jwt_expiry_hours,
            security.verification_expiry_hours,
        )
        .with_bcrypt_cost(security.bcrypt_cost)
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Sign a token for `user`
    pub fn encode(&self, user: &User, purpose: TokenPurpose) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match purpose {
            TokenPurpose::Access => self.access_ttl,
            TokenPurpose::EmailVerification => self.verification_ttl,
        };
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Check signature, expiry and purpose; does not touch the store
    pub fn decode(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.purpose != purpose {
            return Err(AuthError::InvalidToken("token cannot be used here".to_string()));
        }
        Ok(data.claims)
    }

    /// Authenticate `username`/`password` and return a signed access token.
    pub async fn issue(&self, store: &dyn Store, username: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = store.user_by_username(username).await? else {
            let dummy = self.dummy_hash().await?.to_string();
            password::verify_blocking(password.to_string(), dummy).await;
            tracing::warn!("Rejected login for '{}': unknown user", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_blocking(password.to_string(), user.password_hash.clone()).await {
            tracing::warn!("Rejected login for '{}': bad password", username);
            return Err(AuthError::InvalidCredentials);
        }

        self.encode(&user, TokenPurpose::Access)
    }

    async fn dummy_hash(&self) -> Result<&str, AuthError> {
        let hasher = PasswordHasher::new(self.bcrypt_cost);
        self.dummy_hash
            .get_or_try_init(|| hasher.hash_blocking(DUMMY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    /// Resolve an access token to the user it names.
    pub async fn verify(&self, store: &dyn Store, token: &str) -> Result<User, AuthError> {
        self.verify_for(store, token, TokenPurpose::Access).await
    }

    pub async fn verify_for(
        &self,
        store: &dyn Store,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<User, AuthError> {
        let claims = self.decode(token, purpose)?;
        let user = store.user_by_id(claims.id).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;

    const SECRET: &str = "unit-test-secret";

    fn service() -> TokenService {
        TokenService::new(SECRET, 1, 1).with_bcrypt_cost(4)
    }

    async fn store_with_user(username: &str, password: &str) -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let password_hash = PasswordHasher::new(4).hash(password).unwrap();
        let (user, _) = store
            .create_user_with_business(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash,
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn issued_token_resolves_to_same_user() {
        let (store, user) = store_with_user("alice", "password123").await;
        let tokens = service();

        let token = tokens.issue(&store, "alice", "password123").await.unwrap();
        let resolved = tokens.verify(&store, &token).await.unwrap();
        assert_eq!(resolved, user);

        let claims = tokens.decode(&token, TokenPurpose::Access).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let (store, _) = store_with_user("alice", "password123").await;
        let tokens = service();

        let wrong_password = tokens.issue(&store, "alice", "nope").await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

        let unknown_user = tokens.issue(&store, "mallory", "password123").await;
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_user_still_runs_bcrypt() {
        let (store, _) = store_with_user("alice", "password123").await;
        let tokens = service();
        assert!(!tokens.dummy_hash.initialized());

        let result = tokens.issue(&store, "mallory", "password123").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let dummy = tokens.dummy_hash.get().unwrap();
        assert!(dummy.starts_with("$2"));
        assert!(!password::verify("password123", dummy));
    }

    #[test]
    fn oversized_ttls_are_capped() {
        let tokens = TokenService::new(SECRET, u64::MAX, u64::MAX);
        assert_eq!(tokens.access_ttl, Duration::hours(MAX_TOKEN_TTL_HOURS as i64));

        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            is_verified: false,
            join_date: Utc::now(),
        };
        let claims = tokens
            .decode(&tokens.encode(&user, TokenPurpose::Access).unwrap(), TokenPurpose::Access)
            .unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_HOURS as i64 * 3600);
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_are_rejected() {
        let (store, user) = store_with_user("alice", "password123").await;
        let tokens = service();
        let token = tokens.encode(&user, TokenPurpose::Access).unwrap();

        // Flip a character in the signature segment
        let (signed, signature) = token.rsplit_once('.').unwrap();
        let first = signature.chars().next().unwrap();
        let replacement = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", signed, replacement, &signature[1..]);
        assert!(matches!(
            tokens.verify(&store, &tampered).await,
            Err(AuthError::InvalidToken(_))
        ));

        let other = TokenService::new("some-other-secret", 1, 1);
        let foreign = other.encode(&user, TokenPurpose::Access).unwrap();
        assert!(matches!(
            tokens.verify(&store, &foreign).await,
            Err(AuthError::InvalidToken(_))
        ));

        assert!(matches!(
            tokens.verify(&store, "not.a.jwt").await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected() {
        let (store, user) = store_with_user("alice", "password123").await;
        let tokens = service();
        let past = Utc::now() - Duration::hours(2);
        let token = tokens
            .sign(&Claims {
                id: user.id,
                username: user.username.clone(),
                purpose: TokenPurpose::Access,
                iat: past.timestamp(),
                exp: (past + Duration::minutes(5)).timestamp(),
            })
            .unwrap();

        assert!(matches!(
            tokens.verify(&store, &token).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn purposes_are_not_interchangeable() {
        let (store, user) = store_with_user("alice", "password123").await;
        let tokens = service();

        let verification = tokens.encode(&user, TokenPurpose::EmailVerification).unwrap();
        assert!(tokens.verify(&store, &verification).await.is_err());
        assert!(tokens
            .verify_for(&store, &verification, TokenPurpose::EmailVerification)
            .await
            .is_ok());

        let access = tokens.encode(&user, TokenPurpose::Access).unwrap();
        assert!(tokens
            .verify_for(&store, &access, TokenPurpose::EmailVerification)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_not_found() {
        let (_, user) = store_with_user("alice", "password123").await;
        let tokens = service();
        let token = tokens.encode(&user, TokenPurpose::Access).unwrap();

        let empty = MemoryStore::new();
        assert!(matches!(
            tokens.verify(&empty, &token).await,
            Err(AuthError::Store(StoreError::NotFound(_)))
        ));
    }
}
