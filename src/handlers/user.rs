use axum::{
    extract::{Extension, TypedHeader},
    headers::{authorization::Bearer, Authorization},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use entity::user;
use libreauth::pass::HashBuilder;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use ulid::Ulid;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{self, UserInfo};
use crate::error::ServerError;
use crate::handlers::{ValidatedJson, RE_PASSWORD, RE_USERNAME};
use crate::server::State;
use crate::utils::pass::{HASHER, PWD_SCHEME_VERSION};

/// The input of a `POST /api/auth/register` request.
#[derive(Debug, Validate, Deserialize)]
pub(crate) struct RegisterInput {
    /// The provided username.
    #[validate(
        length(
            min = 5,
            max = 32,
            message = "Minimum length is 5 characters, maximum is 32"
        ),
        regex(
            path = "RE_USERNAME",
            message = "Can only contain letters, numbers, dashes (-), periods (.), and underscores (_)"
        )
    )]
    pub(crate) name: String,
    /// The provided email.
    #[validate(email(message = "Must be a valid email address."))]
    pub(crate) email: String,
    /// The provided password.
    #[validate(
        length(
            min = 8,
            max = 128,
            message = "Minimum length is 8 characters, maximum is 128"
        ),
        regex(
            path = "RE_PASSWORD",
            message = "Must be alphanumeric and contain at least one number."
        )
    )]
    pub(crate) password: String,
}

/// The input of a `POST /api/auth/login` request.
#[derive(Debug, Validate, Deserialize)]
pub(crate) struct LoginInput {
    #[validate(email(message = "Must be a valid email address."))]
    pub(crate) email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Minimum length is 8 characters, maximum is 128"
    ))]
    pub(crate) password: String,
}

/// The caller-visible user profile.
#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
}

/// The response of a successful register or login.
///
/// The token is meant to be used as a bearer authorization header value in
/// subsequent requests.
#[derive(Debug, Serialize)]
pub(crate) struct AuthResponse {
    pub(crate) token: String,
    pub(crate) user: ProfileResponse,
}

/// Handler for `POST /api/auth/register`
pub(crate) async fn register(
    Extension(state): Extension<Arc<State>>,
    ValidatedJson(input): ValidatedJson<RegisterInput>,
) -> Result<Response, ServerError> {
    // check if either this username or email already exist in our database
    let conflict = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Name.eq(input.name.as_str()))
                .add(user::Column::Email.eq(input.email.as_str())),
        )
        .one(&state.db)
        .await?;

    if conflict.is_some() {
        return Ok((
            StatusCode::CONFLICT,
            Json(json!({ "message": "A user with this name or email already exists." })),
        )
            .into_response());
    }

    let password = HASHER
        .hash(&input.password)
        .map_err(|e| anyhow::anyhow!("hasher failed hashing: {:?}", e))?;

    let user = user::ActiveModel {
        id: Set(Uuid::from(Ulid::new())),
        name: Set(input.name),
        email: Set(input.email),
        password: Set(password),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    let token = auth::create_session(
        &state,
        UserInfo {
            id: user.id,
            name: user.name.clone(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: ProfileResponse {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    )
        .into_response())
}

/// Handler for `POST /api/auth/login`
pub(crate) async fn login(
    Extension(state): Extension<Arc<State>>,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> Result<Response, ServerError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(input.email.as_str()))
        .one(&state.db)
        .await?
        .ok_or(ServerError::NotAuthorized)?;

    let checker = HashBuilder::from_phc(&user.password)
        .map_err(|e| anyhow::anyhow!("stored password hash is invalid: {:?}", e))?;

    if !checker.is_valid(&input.password) {
        return Err(ServerError::NotAuthorized);
    }
    if checker.needs_update(Some(PWD_SCHEME_VERSION)) {
        // password hash scheme is stale, rehash
        let password = HASHER
            .hash(&input.password)
            .map_err(|e| anyhow::anyhow!("hasher failed hashing: {:?}", e))?;
        let mut stale: user::ActiveModel = user.clone().into();
        stale.password = Set(password);
        stale.update(&state.db).await?;
    }

    let token = auth::create_session(
        &state,
        UserInfo {
            id: user.id,
            name: user.name.clone(),
        },
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            token,
            user: ProfileResponse {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    )
        .into_response())
}

/// Handler for `DELETE /api/auth/logout`
pub(crate) async fn logout(
    Extension(state): Extension<Arc<State>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Response, ServerError> {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        auth::destroy_session(&state, bearer.token()).await?;
    }
    Ok(StatusCode::OK.into_response())
}
