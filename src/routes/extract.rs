use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::error::{AppError, ServiceError};

/// JSON body extractor that reports failures with the service's stable error
/// identifiers instead of axum's default rejection bodies. Bodies are read
/// (and size-checked) before any room lock is taken.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError(map_rejection(&rejection))),
        }
    }
}

fn map_rejection(rejection: &JsonRejection) -> ServiceError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::BodyTooLarge
    } else {
        ServiceError::InvalidJson
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request as HttpRequest};

    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Probe {
        #[allow(dead_code)]
        number: i64,
    }

    async fn extract(body: &'static str) -> Result<AppJson<Probe>, AppError> {
        let request = HttpRequest::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        AppJson::<Probe>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn valid_json_passes_through() {
        assert!(extract(r#"{"number": 7}"#).await.is_ok());
    }

    #[tokio::test]
    async fn malformed_json_maps_to_the_stable_id() {
        let err = extract("{not json").await.unwrap_err();
        assert_eq!(err.0, ServiceError::InvalidJson);
    }
}
