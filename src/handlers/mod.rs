use axum::{
    async_trait, body::HttpBody, extract::FromRequest, http::Request, BoxError, Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

pub(crate) mod task;
pub(crate) mod user;
pub(crate) mod ws;

pub(crate) use task::*;
pub(crate) use user::*;
pub(crate) use ws::*;

pub(crate) use crate::constants::{RE_PASSWORD, RE_USERNAME};

/// A validated JSON body with some input.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ValidatedJson<T>(pub(crate) T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
