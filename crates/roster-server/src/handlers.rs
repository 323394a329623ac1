//! REST handlers for the user collection.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use roster_core::{UserId, UserPatch};
use roster_store::StoreError;

use crate::server::AppState;

/// Query parameters for `GET /users`.
///
/// `user_id` arrives as a raw string so a non-integer value gets the
/// service's own 400 body instead of a framework rejection.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

/// Body of `POST /users`. Both fields are required; they are optional here
/// so that absence maps to a 400 with a descriptive message.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// GET /users. Returns the whole collection, or a single `{id: user}`
/// entry when `user_id` is given.
pub async fn list_or_get(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let Some(raw) = query.user_id else {
        return (StatusCode::OK, Json(state.store.list())).into_response();
    };

    let id: UserId = match raw.parse() {
        Ok(id) => id,
        Err(_) => {
            return store_error(StoreError::InvalidArgument(
                "Invalid user_id format. Must be an integer.".to_string(),
            ))
        }
    };

    match state.store.get(id) {
        Ok(user) => (StatusCode::OK, Json(BTreeMap::from([(id, user)]))).into_response(),
        Err(e) => store_error(e),
    }
}

/// POST /users.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUser>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return store_error(StoreError::InvalidArgument(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let (Some(name), Some(email)) = (body.name, body.email) else {
        return store_error(StoreError::InvalidArgument(
            "Missing 'name' or 'email' field in request body".to_string(),
        ));
    };

    let (id, user) = state.store.create(&name, &email);
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "id": id,
            "user": user,
        })),
    )
        .into_response()
}

/// PUT /users/{id}. An empty object body is a valid no-op; a missing or
/// non-object body is rejected before the id is looked up.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> Response {
    let Ok(Json(patch)) = body else {
        return store_error(StoreError::InvalidArgument(
            "Request body must be a JSON object".to_string(),
        ));
    };

    match state.store.update(id, &patch) {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "message": "User updated successfully",
                "id": id,
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

/// DELETE /users/{id}. Returns a confirmation body with 200, never 204.
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Response {
    match state.store.delete(id) {
        Ok(id) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("User with ID {id} deleted successfully"),
            })),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

/// Map a store failure onto its HTTP status and `{"error": ...}` body.
fn store_error(err: StoreError) -> Response {
    let status = match &err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
