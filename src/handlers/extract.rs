//! Request extractors whose rejections render as `ErrorResponse` JSON.
//!
//! They wrap axum's `Json`, `Query` and `Path` and keep their names, so
//! handlers only swap the import.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::errors::ServiceError;

/// JSON body; a malformed or mistyped body is a 400 validation error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Json(value))
    }
}

/// Query string; unparsable dates or enums are 400 validation errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Query(value))
    }
}

/// Path parameters; an id that is not a UUID is a 400 validation error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Path(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Reading {
        #[allow(dead_code)]
        value: i64,
    }

    async fn accept(Json(_): Json<Reading>) -> StatusCode {
        StatusCode::NO_CONTENT
    }

    async fn send(body: &'static str, content_type: &str) -> axum::response::Response {
        let app = Router::new().route("/", post(accept));
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        app.oneshot(request).await.unwrap().into_response()
    }

    #[tokio::test]
    async fn mistyped_field_is_a_json_bad_request() {
        let response = send(r#"{"value":"abc"}"#, "application/json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let response = send(r#"{"value":1}"#, "text/plain").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let response = send(r#"{"value":1}"#, "application/json").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
