//! Request extractors

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use push_common::AppError;
use serde::de::DeserializeOwned;

use super::ApiError;

/// JSON body extractor whose every rejection is `400 {"error": "Invalid request body"}`
#[derive(Debug, Clone)]
pub struct BodyJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for BodyJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            let reason = match &e {
                JsonRejection::JsonDataError(_) => "data",
                JsonRejection::JsonSyntaxError(_) => "syntax",
                JsonRejection::MissingJsonContentType(_) => "content-type",
                JsonRejection::BytesRejection(_) => "bytes",
                _ => "other",
            };
            tracing::info!(reason = reason, error = %e, "Rejected request body");
            ApiError::from(AppError::InvalidBody)
        })?;

        Ok(BodyJson(value))
    }
}
