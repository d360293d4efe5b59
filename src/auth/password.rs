//! Password hashing with bcrypt.

use super::AuthError;

/// One-way salted password hashing at a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Hash on the blocking pool so the work factor does not stall the runtime.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// A stored value that is not a valid bcrypt hash never matches.
pub fn verify(password: &str, hashed: &str) -> bool {
    match bcrypt::verify(password, hashed) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

pub async fn verify_blocking(password: String, hashed: String) -> bool {
    tokio::task::spawn_blocking(move || verify(&password, &hashed))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new(TEST_COST);
        let hashed = hasher.hash("correct horse").unwrap();

        assert_ne!(hashed, "correct horse");
        assert!(verify("correct horse", &hashed));
        assert!(!verify("wrong horse", &hashed));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = PasswordHasher::new(TEST_COST);
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify("anything", "not-a-bcrypt-hash"));
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hasher = PasswordHasher::new(TEST_COST);
        let hashed = hasher.hash_blocking("s3cret-pass".to_string()).await.unwrap();
        assert!(verify_blocking("s3cret-pass".to_string(), hashed.clone()).await);
        assert!(!verify_blocking("other".to_string(), hashed).await);
    }
}
