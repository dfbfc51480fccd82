//! Body and query extractors that reject with the JSON error envelope
//! instead of axum's plain-text rejections.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    debug!(error = %rejection.body_text(), "json body rejected");
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::invalid_request("Expected a JSON body.")
        }
        other => AppError::invalid_request(format!("Invalid JSON body: {}", other.body_text())),
    }
}

pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map(|q| ApiQuery(q.0))
            .map_err(|rejection: QueryRejection| {
                AppError::invalid_request(format!("Invalid query string: {}", rejection.body_text()))
            })
    }
}

pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|p| ApiPath(p.0))
            .map_err(|rejection: PathRejection| {
                debug!(error = %rejection.body_text(), "path rejected");
                AppError::invalid_request(format!("Invalid path parameter: {}", rejection.body_text()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Food {
        name: String,
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_request() {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let err = ApiJson::<Food>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn valid_json_passes_through() {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"oats"}"#))
            .unwrap();
        let ApiJson(body) = ApiJson::<Food>::from_request(req, &()).await.unwrap();
        assert_eq!(body.name, "oats");
    }

    #[tokio::test]
    async fn bad_query_is_invalid_request() {
        #[derive(Debug, Deserialize)]
        struct Limit {
            #[allow(dead_code)]
            limit: u32,
        }
        let (mut parts, _) = Request::builder()
            .uri("/meals?limit=many")
            .body(())
            .unwrap()
            .into_parts();
        let err = ApiQuery::<Limit>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
