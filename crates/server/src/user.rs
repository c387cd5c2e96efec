//! User API endpoints.

use api_types::{
    Envelope,
    user::{UserRegister, UserUpdate, UserView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, extract::JsonBody, server::ServerState};

pub(crate) fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        created_at: user.created_at,
    }
}

/// Creates an account. This is the only unauthenticated endpoint.
pub async fn register(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<UserRegister>,
) -> Result<(StatusCode, Json<Envelope<UserView>>), ServerError> {
    let user = state
        .engine
        .register_user(&payload.username, &payload.password)
        .await
        .map_err(ServerError::failed("Failed to register user"))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("User registered successfully", map_user(user))),
    ))
}

pub async fn me(Extension(user): Extension<engine::User>) -> Json<Envelope<UserView>> {
    Json(Envelope::ok("Get user success", map_user(user)))
}

/// Renames the caller and/or changes their password.
pub async fn update_me(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<UserUpdate>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    if payload.username.is_none() && payload.password.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of username or password".to_string(),
        ));
    }

    let user = state
        .engine
        .update_user(engine::UpdateUserCmd {
            user_id: user.id,
            username: payload.username,
            password: payload.password,
        })
        .await
        .map_err(ServerError::failed("Failed to update user"))?;

    Ok(Json(Envelope::ok("Update user success", map_user(user))))
}

/// Deletes the caller's account and everything they own.
pub async fn delete_me(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    let user = state
        .engine
        .delete_user(user.id)
        .await
        .map_err(ServerError::failed("Failed to delete user"))?;

    Ok(Json(Envelope::ok("Delete user success", map_user(user))))
}
