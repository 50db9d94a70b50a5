//! Extractors whose rejections render through `WebError`, so malformed
//! requests get the same JSON error body as every other failure.

use std::marker::PhantomData;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{model::ResourceTyped, web::WebError};

/// JSON request body. Any decoding failure is a 400.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string parameters. Any decoding failure is a 400.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Id of a resource taken from the single path parameter. An id that does
/// not parse names no resource, so it is rejected as a 404 of `R`.
#[derive(Debug)]
pub struct PathId<R>(pub Uuid, pub PhantomData<fn() -> R>);

impl<S, R> FromRequestParts<S> for PathId<R>
where
    S: Send + Sync,
    R: ResourceTyped,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                WebError::resource_invalid_id(R::get_resource_type(), rejection.body_text())
            })?;
        Ok(Self(id, PhantomData))
    }
}
