use axum::{
    async_trait,
    extract::{rejection::QueryRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// JSON body that has been deserialized and checked against its `Validate` schema.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rej| AppError::field("body", rej.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

pub fn query_rejection(rej: QueryRejection) -> AppError {
    AppError::field("query", rej.body_text())
}

pub(crate) fn message(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(msg.into());
    err
}

#[cfg(test)]
pub(crate) fn parse_query<T: DeserializeOwned>(uri: &str) -> Result<T, AppError> {
    let uri: axum::http::Uri = uri.parse().expect("valid uri");
    axum::extract::Query::<T>::try_from_uri(&uri)
        .map(|axum::extract::Query(v)| v)
        .map_err(query_rejection)
}
