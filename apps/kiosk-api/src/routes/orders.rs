//! Order and unit endpoints.
//!
//! ```text
//! POST  /api/orders                         place, 201 {id}
//! GET   /api/orders[?active=true]           list headers, newest first
//! GET   /api/orders/{id}                    full view
//! PATCH /api/orders/{id}                    {status}, order status
//! PATCH /api/orders/{id}/units/{unit_id}    {status}, unit status + roll-up
//! ```

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use kiosk_core::validation::parse_status;
use kiosk_core::{Access, Order, OrderRequest, OrderStatus, OrderSummary, StatusUpdate, UnitStatus};

use crate::error::ApiError;
use crate::routes::parse_body;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(place_order))
        .route("/api/orders/{id}", get(get_order).patch(update_order_status))
        .route("/api/orders/{id}/units/{unit_id}", patch(update_unit_status))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    active: Option<String>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let active = query.active.as_deref() == Some("true");
    let orders = state.db.orders().list(active, state.now()).await?;
    Ok(Json(orders))
}

async fn place_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request: OrderRequest = parse_body(&body)?;

    let id = state
        .db
        .orders()
        .place(
            &request,
            &state.lifecycle,
            state.addon_policy.as_ref(),
            state.now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = state.db.orders().get_view(&id, state.now()).await?;
    Ok(Json(order))
}

/// The lifecycle is checked before the body, so a locked order answers 403
/// even to a bad status.
async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let now = state.now();
    let orders = state.db.orders();

    orders.guard(&id, Access::Write, now).await?;

    let update: StatusUpdate = parse_body(&body)?;
    let status: OrderStatus = parse_status(update.status.as_deref())?;

    orders.update_status(&id, status, now).await?;
    Ok(Json(json!({ "success": true })))
}

/// The status is checked before the order's lifecycle.
async fn update_unit_status(
    State(state): State<AppState>,
    Path((id, unit_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let update: StatusUpdate = parse_body(&body)?;
    let status: UnitStatus = parse_status(update.status.as_deref())?;

    state
        .db
        .orders()
        .update_unit_status(&id, &unit_id, status, state.now())
        .await?;

    Ok(Json(json!({ "success": true })))
}
