//! Menu endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};

use kiosk_core::{MenuItem, MenuItemPatch, NewMenuItem};

use crate::error::ApiError;
use crate::routes::parse_body;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(list_menu).post(create_item))
        .route("/api/menu/{id}", patch(update_item).delete(delete_item))
}

/// `GET /api/menu` - available items with their add-ons.
async fn list_menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let items = state.db.menu().list_available().await?;
    Ok(Json(items))
}

/// `POST /api/menu` - 201 `{id}`.
async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let item: NewMenuItem = parse_body(&body)?;
    let created = state.db.menu().create(&item, state.now()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": created.id }))))
}

/// `PATCH /api/menu/{id}` - partial update, add-on set replaced when given.
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let patch: MenuItemPatch = parse_body(&body)?;
    state.db.menu().update(&id, &patch, state.now()).await?;
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/menu/{id}` - soft delete.
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db.menu().soft_delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}
