//! Shopper authentication service.
//!
//! Password hashing sits behind [`CredentialHasher`]; the service only ever
//! stores and compares digests.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use suds_core::validation::require_length;
use suds_core::{Email, ShopperId, ValidationError};

use crate::db::{RepositoryError, ShopperStore};
use crate::models::{NewShopper, Shopper};

/// Accepted name lengths, in characters.
const NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=50;

/// Accepted password lengths, in characters.
const PASSWORD_LENGTH: std::ops::RangeInclusive<usize> = 8..=100;

/// One-way credential hashing.
pub trait CredentialHasher: Send + Sync {
    /// Produce a self-describing digest of `secret`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    fn hash(&self, secret: &str) -> Result<String, AuthError>;

    /// Whether `secret` produced `digest`. Malformed digests never verify.
    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        PasswordHash::new(digest).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// Signup form input.
#[derive(Debug, Clone)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Signup {
    /// Check every field, returning the first problem found.
    fn validate(&self) -> Result<Email, ValidationError> {
        require_length("first_name", &self.first_name, NAME_LENGTH)?;
        require_length("last_name", &self.last_name, NAME_LENGTH)?;
        let email = Email::parse(&self.email)
            .map_err(|e| ValidationError::new("email", e.to_string()))?;

        if !PASSWORD_LENGTH.contains(&self.password.chars().count()) {
            return Err(ValidationError::new(
                "password",
                format!(
                    "must be between {} and {} characters",
                    PASSWORD_LENGTH.start(),
                    PASSWORD_LENGTH.end()
                ),
            ));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::new(
                "confirm_password",
                "passwords do not match",
            ));
        }
        Ok(email)
    }
}

/// Authentication service.
///
/// Handles shopper signup, login and account deletion.
pub struct AuthService<'a, S: ?Sized> {
    shoppers: &'a S,
    hasher: &'a dyn CredentialHasher,
}

impl<'a, S> AuthService<'a, S>
where
    S: ShopperStore + ?Sized,
{
    #[must_use]
    pub const fn new(shoppers: &'a S, hasher: &'a dyn CredentialHasher) -> Self {
        Self { shoppers, hasher }
    }

    /// Register a shopper.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a rejected field and
    /// `AuthError::EmailTaken` if the email is already registered.
    #[instrument(skip_all)]
    pub async fn signup(&self, form: &Signup) -> Result<Shopper, AuthError> {
        let email = form.validate()?;
        let credential_digest = self.hasher.hash(&form.password)?;

        let shopper = self
            .shoppers
            .create_shopper(&NewShopper {
                first_name: form.first_name.trim().to_string(),
                last_name: form.last_name.trim().to_string(),
                email,
                credential_digest,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(shopper_id = %shopper.id, "Shopper signed up");
        Ok(shopper)
    }

    /// Check an email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a malformed email, an
    /// unknown email, or a wrong password alike.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Shopper, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (shopper, digest) = self
            .shoppers
            .credentials_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &digest) {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(shopper_id = %shopper.id, "Shopper logged in");
        Ok(shopper)
    }

    /// Delete a shopper's account.
    ///
    /// The open cart is deleted; completed orders are kept without an owner.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ShopperNotFound` if the account is already gone.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, shopper: ShopperId) -> Result<(), AuthError> {
        self.shoppers
            .delete_shopper(shopper)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::ShopperNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!("Shopper account deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    /// Reversible stand-in so tests skip Argon2's cost.
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, secret: &str) -> Result<String, AuthError> {
            Ok(format!("plain:{secret}"))
        }

        fn verify(&self, secret: &str, digest: &str) -> bool {
            digest.strip_prefix("plain:") == Some(secret)
        }
    }

    fn signup(email: &str) -> Signup {
        Signup {
            first_name: "Ada".into(),
            last_name: "Lather".into(),
            email: email.into(),
            password: "correct horse".into(),
            confirm_password: "correct horse".into(),
        }
    }

    #[test]
    fn test_argon2_round_trip() {
        let hasher = Argon2Hasher;
        let digest = hasher.hash("lather-rinse-repeat").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("lather-rinse-repeat", &digest));
        assert!(!hasher.verify("lather-rinse", &digest));
        assert!(!hasher.verify("lather-rinse-repeat", "not-a-digest"));
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, &PlainHasher);

        let created = auth.signup(&signup(" Ada@Example.com ")).await.unwrap();
        assert_eq!(created.email.as_str(), "ada@example.com");

        let logged_in = auth.login("ADA@example.com", "correct horse").await.unwrap();
        assert_eq!(logged_in.id, created.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, &PlainHasher);
        auth.signup(&signup("ada@example.com")).await.unwrap();

        for (email, password) in [
            ("ada@example.com", "wrong password"),
            ("nobody@example.com", "correct horse"),
            ("not-an-email", "correct horse"),
        ] {
            assert!(matches!(
                auth.login(email, password).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, &PlainHasher);
        auth.signup(&signup("ada@example.com")).await.unwrap();

        assert!(matches!(
            auth.signup(&signup("ADA@example.com")).await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_signup_validation_names_the_field() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, &PlainHasher);

        let mut short_name = signup("ada@example.com");
        short_name.first_name = "A".into();
        let mut mismatch = signup("ada@example.com");
        mismatch.confirm_password = "different horse".into();
        let mut short_password = signup("ada@example.com");
        short_password.password = "short".into();
        short_password.confirm_password = "short".into();

        for (form, field) in [
            (short_name, "first_name"),
            (mismatch, "confirm_password"),
            (short_password, "password"),
            (signup("ada-at-example.com"), "email"),
        ] {
            match auth.signup(&form).await {
                Err(AuthError::Validation(err)) => assert_eq!(err.field, field),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
        assert!(matches!(
            auth.login("ada@example.com", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_delete_account_twice() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, &PlainHasher);
        let shopper = auth.signup(&signup("ada@example.com")).await.unwrap();

        auth.delete_account(shopper.id).await.unwrap();
        assert!(matches!(
            auth.delete_account(shopper.id).await,
            Err(AuthError::ShopperNotFound)
        ));
        assert!(matches!(
            auth.login("ada@example.com", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
