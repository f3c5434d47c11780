use crate::communication::{dispatch, ApiError, DataResponse};
use crate::core::AppState;
use crate::database::Filter;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

const UPDATE_FAILED: &str = "ORDER_STATUS_UPDATE_FAILED";
const ORDERS: &str = "orders";
const ORDER_STATUS_HISTORY: &str = "order_status_history";

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    #[serde(default)]
    pub order_id: Option<Uuid>,
    #[serde(default)]
    pub new_status: Option<String>,
    #[serde(default)]
    pub changed_by: Option<String>,
    #[serde(default)]
    pub change_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub success: bool,
    pub order_id: Uuid,
    pub old_status: Option<String>,
    pub new_status: String,
}

/// Date column stamped when an order enters a milestone status
fn milestone_column(status: &str) -> Option<&'static str> {
    match status {
        "confirmed" => Some("confirmed_date"),
        "shipped" => Some("shipped_date"),
        "delivered" => Some("delivered_at"),
        _ => None,
    }
}

pub fn order_status_patch(status: &str, now: DateTime<Utc>) -> Value {
    let mut patch = json!({
        "status": status,
        "updated_at": now,
    });
    if let Some(column) = milestone_column(status) {
        patch[column] = json!(now);
    }
    patch
}

fn notifies_customer(status: &str) -> bool {
    matches!(status, "shipped" | "delivered")
}

pub async fn update_order_status(
    State(state): State<AppState>,
    payload: Result<Json<OrderStatusRequest>, JsonRejection>,
) -> Result<Json<DataResponse<OrderStatusResponse>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(UPDATE_FAILED, &e))?;

    let (order_id, new_status) = match (request.order_id, request.new_status.as_deref()) {
        (Some(id), Some(status)) if !status.trim().is_empty() => (id, status.trim().to_string()),
        _ => {
            return Err(ApiError::bad_request(
                UPDATE_FAILED,
                "order_id and new_status are required",
            ))
        }
    };

    let filter = Filter::new().eq("id", order_id);
    let order = state
        .repository
        .get(ORDERS, &filter)
        .await
        .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found(UPDATE_FAILED, "Order not found"))?;
    let old_status = order.get("status").and_then(Value::as_str).map(str::to_string);

    state
        .repository
        .update(ORDERS, &filter, order_status_patch(&new_status, Utc::now()))
        .await
        .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?;

    info!(
        order_id = %order_id,
        old_status = old_status.as_deref().unwrap_or("unknown"),
        new_status = %new_status,
        "Order status updated"
    );

    let history = json!({
        "order_id": order_id,
        "old_status": old_status,
        "new_status": new_status,
        "changed_by": request.changed_by,
        "change_reason": request.change_reason,
        "notes": request.notes,
    });
    if let Err(e) = state.repository.insert(ORDER_STATUS_HISTORY, history).await {
        warn!(order_id = %order_id, error = %e, "Failed to record status history");
    }

    if notifies_customer(&new_status) {
        dispatch(
            state.notifier.clone(),
            state.notifications.order_function.clone(),
            json!({
                "order_id": order_id,
                "notification_type": new_status,
                "customer_email": order.get("customer_email"),
                "customer_phone": order.get("customer_phone"),
            }),
        );
    }

    Ok(DataResponse::new(OrderStatusResponse {
        success: true,
        order_id,
        old_status,
        new_status,
    }))
}
