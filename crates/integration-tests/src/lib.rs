//! Integration tests for the suds storefront.
//!
//! The full router (sessions, request IDs, error mapping) runs in-process
//! against `MemoryStore`, so no database or server is needed:
//!
//! ```bash
//! cargo test -p suds-integration-tests
//! ```
//!
//! [`TestApp`] carries the session cookie between requests the way a browser
//! would.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use suds_core::{Money, ProductId, ShopperId};
use suds_storefront::db::{CatalogStore, MemoryStore};
use suds_storefront::middleware::{SESSION_COOKIE_NAME, configure_session_layer};
use suds_storefront::models::Product;
use suds_storefront::routes;
use suds_storefront::services::auth::{AuthError, CredentialHasher};
use suds_storefront::state::AppState;

/// Password used by [`TestApp::signup_and_login`].
pub const PASSWORD: &str = "correct horse battery";

/// Reversible hasher so tests skip Argon2's deliberate slowness.
#[derive(Debug, Default)]
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{secret}"))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        digest.strip_prefix("plain:") == Some(secret)
    }
}

/// A response with its body decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body, `Value::Null` when empty, or the raw text when not JSON.
    pub body: Value,
}

/// One simulated browser talking to a fresh storefront.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// A storefront with an empty catalog and no shoppers.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), Arc::new(PlainHasher));
        let sessions = configure_session_layer(
            tower_sessions::MemoryStore::default(),
            tower_sessions::cookie::Key::generate(),
            false,
        );

        Self {
            router: routes::router(state, sessions),
            store,
            cookie: None,
        }
    }

    /// A second browser against the same storefront, with no session.
    #[must_use]
    pub fn new_client(&self) -> Self {
        Self {
            router: self.router.clone(),
            store: self.store.clone(),
            cookie: None,
        }
    }

    /// The backing store, for assertions and fault injection.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Number of open carts the store holds for `shopper`.
    ///
    /// # Panics
    ///
    /// Panics if `shopper` is not a valid shopper ID.
    pub async fn open_cart_count(&self, shopper: i64) -> usize {
        let id = i32::try_from(shopper).expect("shopper id fits in i32");
        self.store.open_cart_count(ShopperId::new(id)).await
    }

    /// Whether this client currently holds a session cookie.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    /// The `name=value` session cookie this client sends, if any.
    #[must_use]
    pub fn session_cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Replace the session cookie sent with later requests.
    pub fn set_session_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    /// Add a product to the catalog.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects the write.
    pub async fn seed_product(&self, id: i32, name: &str, cents: i64, product_type: &str) {
        self.store
            .upsert_product(&Product {
                id: ProductId::new(id),
                name: name.to_string(),
                price: Money::from_cents(cents),
                product_type: product_type.to_string(),
                description: format!("{name}, handmade"),
                picture: None,
                featured: false,
            })
            .await
            .expect("seed product");
    }

    /// Send a request, remembering any session cookie in the response.
    ///
    /// # Panics
    ///
    /// Panics if the router fails to produce a response.
    pub async fn send(&mut self, method: Method, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method(method.clone()).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if method == Method::POST {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        }
        let body = if form.is_empty() {
            Body::empty()
        } else {
            Body::from(encode_form(form))
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with(SESSION_COOKIE_NAME))
        {
            self.cookie = session_cookie(set_cookie);
        }

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, &[]).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, uri, form).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, &[]).await
    }

    /// Register a shopper and sign in as them. Returns the shopper ID.
    ///
    /// # Panics
    ///
    /// Panics if signup or login does not succeed.
    pub async fn signup_and_login(&mut self, email: &str) -> i64 {
        let signup = self
            .post(
                "/auth/signup",
                &[
                    ("first_name", "Ada"),
                    ("last_name", "Lovelace"),
                    ("email", email),
                    ("password", PASSWORD),
                    ("confirm_password", PASSWORD),
                ],
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "signup: {:?}", signup.body);

        let login = self
            .post("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await;
        assert_eq!(login.status, StatusCode::OK, "login: {:?}", login.body);

        login.body["id"].as_i64().expect("shopper id")
    }
}

fn encode_form(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `name=value` from a `Set-Cookie` header, or `None` when the cookie is
/// being cleared.
fn session_cookie(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    let (_, value) = pair.split_once('=')?;
    if value.is_empty() || set_cookie.contains("Max-Age=0") {
        return None;
    }
    Some(pair.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_parsing() {
        assert_eq!(
            session_cookie("suds_session=abc; HttpOnly; SameSite=Lax; Path=/"),
            Some("suds_session=abc".to_string())
        );
        assert_eq!(session_cookie("suds_session=; Max-Age=0; Path=/"), None);
    }

    #[test]
    fn test_form_encoding_escapes_reserved_characters() {
        assert_eq!(
            encode_form(&[("email", "a+b@example.com"), ("q", "x y")]),
            "email=a%2Bb%40example.com&q=x%20y"
        );
    }
}
