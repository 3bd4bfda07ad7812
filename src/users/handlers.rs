use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        dto::{
            CheckPasswordRequest, CheckPasswordResponse, ListUsersQuery, UserCreateRequest,
            UserResponse,
        },
        password::verify_password,
        repo_types::RepoError,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/user", post(create_user))
        .route("/check_password", post(check_password))
}

#[instrument(skip(state, query))]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let Query(query) = query?;
    let limit = query.validate()?;

    let users = state.users.list_users(limit).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserCreateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(payload) = payload?;
    let new_user = payload.validate().map_err(|errors| {
        warn!(fields = ?errors.iter().map(|e| e.field).collect::<Vec<_>>(), "invalid create request");
        ApiError::Validation(errors)
    })?;

    let id = state.users.insert_user(new_user.clone()).await?;

    info!(user_id = id, email = %new_user.email_addr, "user created");
    Ok((StatusCode::CREATED, Json(UserResponse::created(id, new_user))))
}

#[instrument(skip(state, query))]
pub async fn check_password(
    State(state): State<AppState>,
    query: Result<Query<CheckPasswordRequest>, QueryRejection>,
) -> ApiResult<Json<CheckPasswordResponse>> {
    let Query(query) = query?;
    let request = query.validate()?;

    let id = state
        .users
        .find_id_by_email(&request.email_addr)
        .await?
        .ok_or(ApiError::NotFound)?;

    // A missing hash here means the row vanished between the two reads.
    let hash = state
        .users
        .find_password_hash(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let matches = verify_password(&request.password, &hash)
        .map_err(|e| ApiError::Internal(RepoError::Hash(e)))?;
    if !matches {
        warn!(user_id = id, "password mismatch");
        return Err(ApiError::PasswordMismatch);
    }

    Ok(Json(CheckPasswordResponse {
        id,
        email_addr: request.email_addr,
        password_matches: true,
    }))
}
