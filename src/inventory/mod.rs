use crate::communication::{dispatch, ApiError, DataResponse};
use crate::core::AppState;
use crate::database::{decode_records, Filter};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

const UPDATE_FAILED: &str = "INVENTORY_UPDATE_FAILED";
const ORDER_ITEMS: &str = "order_items";
const INVENTORY: &str = "inventory";
const STOCK_MOVEMENTS: &str = "stock_movements";

#[derive(Error, Debug, PartialEq)]
pub enum InventoryError {
    #[error("order_id is required")]
    MissingOrderId,
    #[error("action is required")]
    MissingAction,
    #[error("Invalid action '{0}'. Must be one of: reserve, release, confirm")]
    InvalidAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryAction {
    /// Order placed
    Reserve,
    /// Order cancelled
    Release,
    /// Order confirmed, stock was already taken at reservation
    Confirm,
}

impl InventoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryAction::Reserve => "reserve",
            InventoryAction::Release => "release",
            InventoryAction::Confirm => "confirm",
        }
    }
}

impl fmt::Display for InventoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryAction {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reserve" => Ok(InventoryAction::Reserve),
            "release" => Ok(InventoryAction::Release),
            "confirm" => Ok(InventoryAction::Confirm),
            other => Err(InventoryError::InvalidAction(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InventoryRequest {
    #[serde(default)]
    pub order_id: Option<Uuid>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub success: bool,
    pub order_id: Uuid,
    pub action: InventoryAction,
    pub items_processed: usize,
}

#[derive(Debug, Deserialize)]
struct OrderItemRow {
    product_id: Value,
    #[serde(default)]
    quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct InventoryRow {
    stock_quantity: i64,
    #[serde(default)]
    low_stock_threshold: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockPlan {
    pub new_stock: i64,
    pub movement_type: &'static str,
    /// Signed quantity recorded on the stock movement
    pub movement_quantity: i64,
}

impl StockPlan {
    pub fn changes_stock(&self, current: i64) -> bool {
        self.new_stock != current
    }
}

/// Stock level and movement produced by applying `action` to one order item
pub fn plan_movement(action: InventoryAction, stock: i64, quantity: i64) -> StockPlan {
    match action {
        InventoryAction::Reserve => StockPlan {
            new_stock: (stock - quantity).max(0),
            movement_type: "outbound",
            movement_quantity: -quantity,
        },
        InventoryAction::Release => StockPlan {
            new_stock: stock + quantity,
            movement_type: "inbound",
            movement_quantity: quantity,
        },
        InventoryAction::Confirm => StockPlan {
            new_stock: stock,
            movement_type: "outbound",
            movement_quantity: quantity,
        },
    }
}

fn validate(request: &InventoryRequest) -> Result<(Uuid, InventoryAction), InventoryError> {
    let order_id = request.order_id.ok_or(InventoryError::MissingOrderId)?;
    let action = request
        .action
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .ok_or(InventoryError::MissingAction)?
        .trim()
        .parse()?;
    Ok((order_id, action))
}

/// Product ids travel as filter text without JSON quoting
fn filter_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub async fn track_inventory(
    State(state): State<AppState>,
    payload: Result<Json<InventoryRequest>, JsonRejection>,
) -> Result<Json<DataResponse<InventoryResponse>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(UPDATE_FAILED, &e))?;
    let (order_id, action) =
        validate(&request).map_err(|e| ApiError::bad_request(UPDATE_FAILED, e.to_string()))?;

    let records = state
        .repository
        .get(ORDER_ITEMS, &Filter::new().eq("order_id", order_id))
        .await
        .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?;
    let items: Vec<OrderItemRow> = decode_records(ORDER_ITEMS, records)
        .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?;

    for item in &items {
        let product_id = filter_value(&item.product_id);
        let filter = Filter::new().eq("product_id", &product_id);

        let rows = state
            .repository
            .get(INVENTORY, &filter)
            .await
            .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?;
        let Some(inventory) = decode_records::<InventoryRow>(INVENTORY, rows)
            .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?
            .into_iter()
            .next()
        else {
            info!(product_id = %product_id, "No inventory found for product");
            continue;
        };

        let quantity = item.quantity.unwrap_or(0);
        let plan = plan_movement(action, inventory.stock_quantity, quantity);

        if plan.changes_stock(inventory.stock_quantity) {
            let patch = json!({
                "stock_quantity": plan.new_stock,
                "last_updated": Utc::now(),
            });
            if let Err(e) = state.repository.update(INVENTORY, &filter, patch).await {
                warn!(product_id = %product_id, error = %e, "Failed to update inventory");
            }
        }

        let movement = json!({
            "product_id": item.product_id,
            "movement_type": plan.movement_type,
            "quantity": plan.movement_quantity,
            "reference_id": order_id,
            "reference_type": "order",
            "notes": format!("Order {}: {}", action, order_id),
        });
        if let Err(e) = state.repository.insert(STOCK_MOVEMENTS, movement).await {
            warn!(product_id = %product_id, error = %e, "Failed to record stock movement");
        }

        if let Some(threshold) = inventory.low_stock_threshold {
            if plan.new_stock <= threshold {
                info!(product_id = %product_id, stock = plan.new_stock, threshold, "Low stock");
                dispatch(
                    state.notifier.clone(),
                    state.notifications.stock_alert_function.clone(),
                    json!({
                        "product_id": item.product_id,
                        "current_stock": plan.new_stock,
                        "threshold": threshold,
                    }),
                );
            }
        }
    }

    info!(order_id = %order_id, action = %action, items = items.len(), "Inventory tracked");

    Ok(DataResponse::new(InventoryResponse {
        success: true,
        order_id,
        action,
        items_processed: items.len(),
    }))
}
