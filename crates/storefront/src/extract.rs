//! Form and path extractors that reject with the storefront's JSON errors.
//!
//! axum's own `Form` and `Path` reject with plain-text bodies and their own
//! status codes. [`ValidForm`] and [`ValidPath`] wrap them and turn every
//! rejection into an [`AppError::Validation`] naming the offending field:
//!
//! ```json
//! {"error": "is invalid", "field": "product_id"}
//! ```

use axum::{
    Form,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{FormRejection, PathRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use suds_core::{CartId, ValidationError};

use crate::error::AppError;

/// Names of the fields a client submits for a form or path value.
pub trait InputFields {
    /// Field names, in declaration order. A rejection that cannot be pinned
    /// to one of them is reported against the first.
    const FIELDS: &'static [&'static str];
}

impl InputFields for CartId {
    const FIELDS: &'static [&'static str] = &["cart_id"];
}

/// `application/x-www-form-urlencoded` body extractor.
pub struct ValidForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned + InputFields,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(rejection) => Err(form_rejection::<T>(&rejection)),
        }
    }
}

/// Path parameter extractor.
pub struct ValidPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + InputFields + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(path_rejection::<T>(&rejection)),
        }
    }
}

fn form_rejection<T: InputFields>(rejection: &FormRejection) -> AppError {
    let detail = rejection.body_text();
    tracing::debug!(%detail, "form rejected");

    let message = match rejection {
        FormRejection::InvalidFormContentType(_) => {
            "must be sent as application/x-www-form-urlencoded"
        }
        FormRejection::FailedToDeserializeForm(_)
        | FormRejection::FailedToDeserializeFormBody(_)
            if detail.contains("missing field") =>
        {
            "is required"
        }
        _ => "is invalid",
    };
    AppError::Validation(ValidationError::new(
        offending_field(T::FIELDS, &detail),
        message,
    ))
}

fn path_rejection<T: InputFields>(rejection: &PathRejection) -> AppError {
    let detail = rejection.body_text();
    tracing::debug!(%detail, "path rejected");

    AppError::Validation(ValidationError::new(
        offending_field(T::FIELDS, &detail),
        "is invalid",
    ))
}

/// The field a deserialization message refers to.
///
/// Messages name fields either as `` `field` `` or as a `field: ` path
/// prefix after the rejection's own `...: ` prefix.
fn offending_field(fields: &'static [&'static str], detail: &str) -> &'static str {
    fields
        .iter()
        .copied()
        .find(|field| {
            detail.contains(&format!("`{field}`")) || detail.contains(&format!(": {field}: "))
        })
        .or_else(|| fields.first().copied())
        .unwrap_or("form")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    use suds_core::ProductId;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct PasswordPair {
        #[allow(dead_code)]
        password: String,
        #[allow(dead_code)]
        confirm_password: String,
    }

    impl InputFields for PasswordPair {
        const FIELDS: &'static [&'static str] = &["password", "confirm_password"];
    }

    #[derive(Debug, Deserialize)]
    struct Line {
        product_id: ProductId,
    }

    impl InputFields for Line {
        const FIELDS: &'static [&'static str] = &["product_id"];
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/pair",
                post(|ValidForm(_): ValidForm<PasswordPair>| async { StatusCode::OK }),
            )
            .route(
                "/line",
                post(|ValidForm(line): ValidForm<Line>| async move { line.product_id.to_string() }),
            )
            .route(
                "/carts/{cart_id}",
                post(|ValidPath(id): ValidPath<CartId>| async move { id.to_string() }),
            )
    }

    async fn send(uri: &str, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let response = app()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    const FORM: Option<&str> = Some("application/x-www-form-urlencoded");

    #[test]
    fn test_offending_field_prefers_exact_names() {
        let fields = PasswordPair::FIELDS;
        assert_eq!(
            offending_field(fields, "Failed to deserialize form body: missing field `confirm_password`"),
            "confirm_password"
        );
        assert_eq!(
            offending_field(fields, "Failed to deserialize form body: missing field `password`"),
            "password"
        );
        assert_eq!(offending_field(fields, "something else"), "password");
        assert_eq!(offending_field(&[], "something else"), "form");
    }

    #[tokio::test]
    async fn test_well_formed_values_pass_through() {
        let (status, _) = send("/line", FORM, "product_id=7").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unparseable_form_value_names_field() {
        let (status, body) = send("/line", FORM, "product_id=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "product_id");
        assert_eq!(body["error"], "is invalid");
    }

    #[tokio::test]
    async fn test_missing_form_field_is_required() {
        let (status, body) = send("/pair", FORM, "password=hunter22").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "confirm_password");
        assert_eq!(body["error"], "is required");
    }

    #[tokio::test]
    async fn test_wrong_content_type_is_json_error() {
        let (status, body) = send("/line", Some("application/json"), r#"{"product_id":1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "product_id");
    }

    #[tokio::test]
    async fn test_unparseable_path_names_param() {
        let (status, body) = send("/carts/abc", None, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "cart_id");
        assert_eq!(body["error"], "is invalid");
    }
}
