use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::User,
    extractors::{JsonObject, RawUserId},
    services::{decode_create, decode_update, parse_user_id},
};
use crate::{error::ApiError, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .put(missing_identifier)
                .delete(missing_identifier)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/:id",
            get(get_user)
                .post(create_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(method_not_allowed),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.list().await)
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    RawUserId(raw_id): RawUserId,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&raw_id)?;
    let user = state.users.find_by_id(id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, ApiError> {
    let req = decode_create(&body)?;
    if body.contains_key("id") {
        warn!("client supplied id ignored on create");
    }
    let user = state.users.insert(req).await;
    info!(user_id = %user.id, username = %user.username, "create_user ok");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/users/{}", user.id))],
        Json(user),
    ))
}

/// The body is read before the id is checked, so a malformed body wins over a
/// malformed id.
#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    RawUserId(raw_id): RawUserId,
    JsonObject(body): JsonObject,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&raw_id)?;
    let patch = decode_update(&body)?;
    let user = state.users.replace(id, patch).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    RawUserId(raw_id): RawUserId,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&raw_id)?;
    state.users.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn missing_identifier() -> ApiError {
    ApiError::MissingIdentifier
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn endpoint_not_found() -> ApiError {
    ApiError::EndpointNotFound
}
