use crate::communication::{ApiError, DataResponse};
use crate::core::AppState;
use crate::database::{decode_records, Filter};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::info;

const CALCULATION_FAILED: &str = "DELIVERY_CALCULATION_FAILED";
const DELIVERY_ZONES: &str = "delivery_zones";

const DEFAULT_DELIVERY_COST: f64 = 2_500.0;
const DEFAULT_ESTIMATED_DAYS: u32 = 5;
const FREE_DELIVERY_THRESHOLD: f64 = 100_000.0;

#[derive(Error, Debug, PartialEq)]
pub enum DeliveryError {
    #[error("Either postal_code or city is required")]
    MissingLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum DeliveryType {
    #[default]
    Standard,
    Express,
    SameDay,
}

impl From<String> for DeliveryType {
    /// Unknown types are priced as standard delivery
    fn from(label: String) -> Self {
        match label.as_str() {
            "express" => DeliveryType::Express,
            "same_day" => DeliveryType::SameDay,
            _ => DeliveryType::Standard,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeliveryRequest {
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub delivery_type: Option<DeliveryType>,
    #[serde(default)]
    pub cart_total: Option<f64>,
}

/// Row of the `delivery_zones` table. Postgres numerics may arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryZone {
    pub zone_name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_codes: Option<Vec<String>>,
    #[serde(deserialize_with = "amount")]
    pub base_delivery_cost: f64,
    #[serde(default)]
    pub estimated_delivery_days: Option<u32>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub express_delivery_cost: Option<f64>,
    #[serde(default)]
    pub express_delivery_days: Option<u32>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub same_day_delivery_cost: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

fn optional_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<RawAmount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAmount::Number(value)) => Ok(Some(value)),
        Some(RawAmount::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {}", text))),
    }
}

fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    optional_amount(deserializer)?.ok_or_else(|| serde::de::Error::custom("amount is required"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryQuote {
    pub delivery_cost: f64,
    pub delivery_type: DeliveryType,
    pub estimated_days: u32,
    pub zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub free_delivery: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_cost: Option<f64>,
}

/// First zone serving the postal code, or when no postal code is given,
/// the first zone for the city (case insensitive).
pub fn find_zone<'a>(
    zones: &'a [DeliveryZone],
    postal_code: Option<&str>,
    city: Option<&str>,
) -> Option<&'a DeliveryZone> {
    match (postal_code, city) {
        (Some(code), _) => zones.iter().find(|zone| {
            zone.postal_codes
                .as_ref()
                .is_some_and(|codes| codes.iter().any(|c| c == code))
        }),
        (None, Some(city)) => zones.iter().find(|zone| {
            zone.city
                .as_deref()
                .is_some_and(|zone_city| zone_city.eq_ignore_ascii_case(city))
        }),
        (None, None) => None,
    }
}

pub fn quote_delivery(
    zone: Option<&DeliveryZone>,
    delivery_type: DeliveryType,
    cart_total: f64,
) -> DeliveryQuote {
    let Some(zone) = zone else {
        return DeliveryQuote {
            delivery_cost: DEFAULT_DELIVERY_COST,
            delivery_type,
            estimated_days: DEFAULT_ESTIMATED_DAYS,
            zone: "Default".to_string(),
            city: None,
            free_delivery: false,
            original_cost: None,
        };
    };

    let standard_days = zone.estimated_delivery_days.unwrap_or(DEFAULT_ESTIMATED_DAYS);
    let (cost, estimated_days) = match delivery_type {
        DeliveryType::Standard => (zone.base_delivery_cost, standard_days),
        DeliveryType::Express => (
            zone.express_delivery_cost.unwrap_or(zone.base_delivery_cost),
            zone.express_delivery_days.unwrap_or(standard_days),
        ),
        DeliveryType::SameDay => (
            zone.same_day_delivery_cost.unwrap_or(zone.base_delivery_cost),
            1,
        ),
    };

    let free_delivery = cart_total >= FREE_DELIVERY_THRESHOLD;

    DeliveryQuote {
        delivery_cost: if free_delivery { 0.0 } else { cost },
        delivery_type,
        estimated_days,
        zone: zone.zone_name.clone(),
        city: zone.city.clone(),
        free_delivery,
        original_cost: Some(zone.base_delivery_cost),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn calculate_delivery(
    State(state): State<AppState>,
    payload: Result<Json<DeliveryRequest>, JsonRejection>,
) -> Result<Json<DataResponse<DeliveryQuote>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(CALCULATION_FAILED, &e))?;

    let postal_code = non_empty(&request.postal_code);
    let city = non_empty(&request.city);
    if postal_code.is_none() && city.is_none() {
        return Err(ApiError::bad_request(
            CALCULATION_FAILED,
            DeliveryError::MissingLocation.to_string(),
        ));
    }

    let records = state
        .repository
        .get(DELIVERY_ZONES, &Filter::new().eq("is_active", true))
        .await
        .map_err(|e| ApiError::from_database(CALCULATION_FAILED, &e))?;
    let zones: Vec<DeliveryZone> = decode_records(DELIVERY_ZONES, records)
        .map_err(|e| ApiError::from_database(CALCULATION_FAILED, &e))?;

    let zone = find_zone(&zones, postal_code, city);
    let quote = quote_delivery(
        zone,
        request.delivery_type.unwrap_or_default(),
        request.cart_total.unwrap_or(0.0),
    );
    info!(
        zone = %quote.zone,
        delivery_type = ?quote.delivery_type,
        cost = quote.delivery_cost,
        "Delivery quoted"
    );

    Ok(DataResponse::new(quote))
}
