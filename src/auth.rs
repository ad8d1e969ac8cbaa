use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, TypedHeader},
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    constants::{SESSION_DURATION_SECS, SESSION_KEY_PREFIX},
    error::ServerError,
    impl_redis_rv,
    server::State,
    utils::RKeys,
};

/// The identity resolved from a session token, stored in redis for the
/// lifetime of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserInfo {
    pub(crate) id: Uuid,
    pub(crate) name: String,
}

impl_redis_rv!(UserInfo);

/// The authorization of a user making a request.
#[derive(Debug)]
pub(crate) enum Auth {
    KnownUser(UserInfo),
    UnknownUser,
}

impl Auth {
    /// The authenticated identity, or `NotAuthorized` for anonymous callers.
    pub(crate) fn user(self) -> Result<UserInfo, ServerError> {
        match self {
            Auth::KnownUser(user) => Ok(user),
            Auth::UnknownUser => Err(ServerError::NotAuthorized),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(server_state) = Extension::<Arc<State>>::from_request_parts(parts, state)
            .await
            .expect("State extension missing");

        let bearer = Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
            .await
            .unwrap_or(None);

        match bearer {
            Some(TypedHeader(Authorization(bearer))) => {
                let prefixed_key = format!("{}{}", SESSION_KEY_PREFIX, bearer.token());
                match server_state
                    .redis_manager
                    .clone()
                    .get(&prefixed_key)
                    .await?
                {
                    Some(user) => Ok(Auth::KnownUser(user)),
                    None => Ok(Auth::UnknownUser),
                }
            }
            None => Ok(Auth::UnknownUser),
        }
    }
}

/// Create a session entry in redis for this user, returning the bearer token
/// the client should present on subsequent requests.
pub(crate) async fn create_session(state: &State, user: UserInfo) -> Result<String, ServerError> {
    let RKeys {
        base_key,
        prefixed_key,
    } = RKeys::generate(SESSION_KEY_PREFIX);

    let _: () = state
        .redis_manager
        .clone()
        .set_ex(&prefixed_key, user, SESSION_DURATION_SECS as usize)
        .await?;

    Ok(base_key)
}

/// Delete the session entry for this token, if any.
pub(crate) async fn destroy_session(state: &State, token: &str) -> Result<(), ServerError> {
    let prefixed_key = format!("{}{}", SESSION_KEY_PREFIX, token);
    let _: () = state.redis_manager.clone().del(&prefixed_key).await?;
    Ok(())
}
