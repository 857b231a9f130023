use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::Credential;
use crate::db::operations::UserStore;
use crate::error::{AuthError, DatabaseError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Username
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

/// The username behind a verified login or a validated token. Scoped to a
/// single request; nothing is persisted.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_expiry: Duration,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt_secret: String,
        token_expiry_hours: i64,
        hash_cost: u32,
    ) -> Self {
        Self {
            users,
            jwt_secret,
            token_expiry: Duration::hours(token_expiry_hours),
            hash_cost,
        }
    }

    /// Check a plaintext password against the stored bcrypt hash.
    ///
    /// Not-found, store failures, and hash mismatches all collapse into
    /// `InvalidCredentials` so the login surface cannot be used to probe
    /// which usernames exist.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MalformedCredentials);
        }

        let credential = match self.users.find_by_login(username).await {
            Ok(Some(credential)) => credential,
            Ok(None) | Err(_) => return Err(AuthError::InvalidCredentials),
        };

        let matches = bcrypt::verify(password, &credential.password_hash).unwrap_or(false);
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity {
            username: username.to_string(),
        })
    }

    /// Mint a signed token for a verified identity.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.username.clone(),
            exp: (now + self.token_expiry).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Decode and verify a presented token. Signature and expiry failures
    /// are indistinguishable to the caller.
    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Unauthorized);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Strict `now < exp`
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::Unauthorized)?;

        Ok(Identity {
            username: data.claims.sub,
        })
    }

    /// Create a credential record, rejecting logins that already exist.
    pub async fn register(&self, login: &str, password: &str) -> Result<(), AuthError> {
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::MalformedCredentials);
        }

        let existing = self
            .users
            .find_by_login(login)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if existing.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash =
            bcrypt::hash(password, self.hash_cost).map_err(|e| AuthError::Internal(e.to_string()))?;

        match self
            .users
            .insert_credential(Credential::new(login.to_string(), password_hash))
            .await
        {
            Ok(()) => Ok(()),
            // Lost the race on the unique index between check and insert
            Err(DatabaseError::Duplicate) => Err(AuthError::Conflict),
            Err(e) => Err(AuthError::Internal(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::operations::MockUserStore;
    use crate::testing::MemoryUserStore;

    fn service_with(users: Arc<dyn UserStore>) -> AuthService {
        AuthService::new(users, "test_secret".to_string(), 1, 4)
    }

    #[test_log::test(tokio::test)]
    async fn test_register_then_verify() {
        let service = service_with(Arc::new(MemoryUserStore::new()));

        service.register("alice", "secret").await.unwrap();
        let identity = service.verify("alice", "secret").await.unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[test_log::test(tokio::test)]
    async fn test_issue_validate_roundtrip() {
        let service = service_with(Arc::new(MemoryUserStore::new()));

        service.register("alice", "secret").await.unwrap();
        let identity = service.verify("alice", "secret").await.unwrap();
        let token = service.issue(&identity).unwrap();
        assert!(!token.is_empty());

        let decoded = service.validate(&token).unwrap();
        assert_eq!(decoded.username, "alice");
    }

    #[tokio::test]
    async fn test_verify_failures_are_uniform() {
        let service = service_with(Arc::new(MemoryUserStore::new()));
        service.register("alice", "secret").await.unwrap();

        // Wrong password and unknown user must return the same variant.
        let wrong = service.verify("alice", "nope").await.unwrap_err();
        let unknown = service.verify("nobody", "secret").await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_verify_empty_credentials() {
        let service = service_with(Arc::new(MemoryUserStore::new()));

        let err = service.verify("", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials));

        let err = service.verify("alice", "").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials));
    }

    #[tokio::test]
    async fn test_store_failure_collapses_to_invalid() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_login()
            .returning(|_| Err(DatabaseError::QueryError("connection refused".to_string())));

        let service = service_with(Arc::new(store));
        let err = service.verify("alice", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_register_performs_no_write() {
        let mut store = MockUserStore::new();
        let hash = bcrypt::hash("pw1", 4).unwrap();
        store
            .expect_find_by_login()
            .returning(move |_| Ok(Some(Credential::new("bob".to_string(), hash.clone()))));
        store.expect_insert_credential().times(0);

        let service = service_with(Arc::new(store));
        let err = service.register("bob", "pw2").await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn test_register_empty_credentials() {
        let service = service_with(Arc::new(MemoryUserStore::new()));

        let err = service.register("", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials));

        let err = service.register("bob", "").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials));
    }

    #[tokio::test]
    async fn test_insert_race_maps_to_conflict() {
        let mut store = MockUserStore::new();
        store.expect_find_by_login().returning(|_| Ok(None));
        store
            .expect_insert_credential()
            .returning(|_| Err(DatabaseError::Duplicate));

        let service = service_with(Arc::new(store));
        let err = service.register("bob", "pw1").await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let service = service_with(Arc::new(MemoryUserStore::new()));

        // Craft a token whose expiry is already in the past.
        let now = Utc::now();
        let claims = Claims {
            sub: "alice".to_string(),
            exp: (now - Duration::seconds(10)).timestamp(),
            iat: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret".as_bytes()),
        )
        .unwrap();

        let err = service.validate(&token).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_foreign_signature_rejected() {
        let service = service_with(Arc::new(MemoryUserStore::new()));

        let now = Utc::now();
        let claims = Claims {
            sub: "alice".to_string(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("some_other_secret".as_bytes()),
        )
        .unwrap();

        let err = service.validate(&token).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let service = service_with(Arc::new(MemoryUserStore::new()));

        assert!(matches!(
            service.validate("not-a-jwt").unwrap_err(),
            AuthError::Unauthorized
        ));
        assert!(matches!(
            service.validate("").unwrap_err(),
            AuthError::Unauthorized
        ));
    }
}
