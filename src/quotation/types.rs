use crate::pricing::{CustomerTier, Customizations, LineItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRequest {
    /// Line items to quote; must be a non-empty array
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    /// Only logged, any JSON scalar is accepted
    #[serde(default)]
    pub customer_id: Option<Value>,
    /// Defaults to standard; unknown tiers are treated as standard
    #[serde(default)]
    pub customer_tier: Option<CustomerTier>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedLineItem {
    pub product_id: Option<Value>,
    pub product_name: Option<Value>,
    pub quantity: u64,
    /// unit price including customization premiums
    pub unit_price: String,
    pub subtotal: String,
    pub discount_percentage: u32,
    pub discount_amount: String,
    pub total_price: String,
    pub customizations: Customizations,
    pub customization_premium: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationTotals {
    pub items: Vec<QuotedLineItem>,
    pub subtotal: String,
    pub order_level_discount: String,
    pub tier_discount: String,
    pub total_discount: String,
    pub subtotal_after_discount: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub shipping_cost: String,
    pub final_total: String,
    pub currency: String,
    pub total_quantity: u64,
    pub customer_tier: CustomerTier,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotationStatus {
    Draft,
    Sent,
    Viewed,
    Approved,
    Rejected,
    Expired,
    Converted,
}

impl QuotationStatus {
    pub const ALL: [QuotationStatus; 7] = [
        QuotationStatus::Draft,
        QuotationStatus::Sent,
        QuotationStatus::Viewed,
        QuotationStatus::Approved,
        QuotationStatus::Rejected,
        QuotationStatus::Expired,
        QuotationStatus::Converted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Viewed => "viewed",
            QuotationStatus::Approved => "approved",
            QuotationStatus::Rejected => "rejected",
            QuotationStatus::Expired => "expired",
            QuotationStatus::Converted => "converted",
        }
    }

    /// Column stamped with the time of the transition, if any
    pub fn timestamp_column(self) -> Option<&'static str> {
        match self {
            QuotationStatus::Viewed => Some("viewed_at"),
            QuotationStatus::Approved => Some("approved_at"),
            QuotationStatus::Rejected => Some("rejected_at"),
            _ => None,
        }
    }

    pub fn notifies_customer(self) -> bool {
        matches!(self, QuotationStatus::Sent | QuotationStatus::Approved)
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StatusError {
    #[error("Quotation ID and new status are required")]
    MissingFields,
    #[error("Invalid status. Must be one of: {0}")]
    InvalidStatus(String),
}

impl FromStr for QuotationStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuotationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = QuotationStatus::ALL.iter().map(|s| s.as_str()).collect();
                StatusError::InvalidStatus(valid.join(", "))
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub quotation_id: Option<Uuid>,
    #[serde(default)]
    pub new_status: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub quotation: Value,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
