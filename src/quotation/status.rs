use super::types::{QuotationStatus, StatusError, StatusUpdateRequest, StatusUpdateResponse};
use crate::communication::{dispatch, ApiError, DataResponse};
use crate::core::AppState;
use crate::database::Filter;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

const UPDATE_FAILED: &str = "STATUS_UPDATE_FAILED";
const QUOTATIONS: &str = "quotations";
const QUOTATION_ACTIVITIES: &str = "quotation_activities";

fn validate(request: &StatusUpdateRequest) -> Result<(Uuid, QuotationStatus), StatusError> {
    match (request.quotation_id, request.new_status.as_deref()) {
        (Some(id), Some(status)) if !status.is_empty() => Ok((id, status.parse()?)),
        _ => Err(StatusError::MissingFields),
    }
}

/// Fields written to the quotation row for a status change
pub fn status_patch(status: QuotationStatus, now: DateTime<Utc>) -> Value {
    let mut patch = json!({
        "status": status.as_str(),
        "updated_at": now,
    });
    if let Some(column) = status.timestamp_column() {
        patch[column] = json!(now);
    }
    patch
}

fn activity_record(
    quotation_id: Uuid,
    status: QuotationStatus,
    previous_status: Option<&str>,
    request: &StatusUpdateRequest,
) -> Value {
    let mut metadata = match &request.metadata {
        Some(Value::Object(fields)) => fields.clone(),
        _ => Map::new(),
    };
    metadata.insert("previous_status".to_string(), json!(previous_status));
    metadata.insert("new_status".to_string(), json!(status.as_str()));

    json!({
        "quotation_id": quotation_id,
        "activity_type": format!("status_changed_to_{}", status),
        "description": format!("Status changed to {}", status),
        "metadata": metadata,
        "user_id": request.user_id,
        "user_name": request.user_name.as_deref().unwrap_or("System"),
    })
}

pub async fn update_quotation_status(
    State(state): State<AppState>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<DataResponse<StatusUpdateResponse>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(UPDATE_FAILED, &e))?;
    let (quotation_id, status) =
        validate(&request).map_err(|e| ApiError::bad_request(UPDATE_FAILED, e.to_string()))?;

    let filter = Filter::new().eq("id", quotation_id);
    let not_found = || ApiError::not_found(UPDATE_FAILED, format!("Quotation {} not found", quotation_id));

    let existing = state
        .repository
        .get(QUOTATIONS, &filter)
        .await
        .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?;
    let previous_status = existing
        .first()
        .ok_or_else(not_found)?
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string);

    let now = Utc::now();
    let quotation = state
        .repository
        .update(QUOTATIONS, &filter, status_patch(status, now))
        .await
        .map_err(|e| ApiError::from_database(UPDATE_FAILED, &e))?
        .into_iter()
        .next()
        .ok_or_else(not_found)?;

    info!(
        quotation_id = %quotation_id,
        previous_status = previous_status.as_deref().unwrap_or("unknown"),
        new_status = %status,
        "Quotation status updated"
    );

    let activity = activity_record(quotation_id, status, previous_status.as_deref(), &request);
    if let Err(e) = state.repository.insert(QUOTATION_ACTIVITIES, activity).await {
        warn!(quotation_id = %quotation_id, error = %e, "Failed to log quotation activity");
    }

    if status.notifies_customer() {
        dispatch(
            state.notifier.clone(),
            state.notifications.quotation_function.clone(),
            json!({
                "quotationId": quotation_id,
                "eventType": status.as_str(),
                "recipientType": "customer",
            }),
        );
    }

    Ok(DataResponse::new(StatusUpdateResponse {
        quotation,
        message: format!("Status updated to {}", status),
        timestamp: now,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::notifier::testing::{FailingNotifier, RecordingNotifier};
    use crate::core::http_server::testing::{post_json, state};
    use crate::database::memory::{InMemoryRepository, UnavailableRepository};
    use axum::http::StatusCode;
    use std::sync::Arc;
    use std::time::Duration;

    const QUOTATION_ID: &str = "6b0f7c1e-3d5a-4f7e-9a51-0c1d2e3f4a5b";

    fn repository() -> Arc<InMemoryRepository> {
        Arc::new(InMemoryRepository::new().with_records(
            QUOTATIONS,
            vec![json!({"id": QUOTATION_ID, "status": "draft", "total_amount": 55296.25})],
        ))
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("approved".parse::<QuotationStatus>(), Ok(QuotationStatus::Approved));
        assert_eq!(
            "archived".parse::<QuotationStatus>(),
            Err(StatusError::InvalidStatus(
                "draft, sent, viewed, approved, rejected, expired, converted".to_string()
            ))
        );
    }

    #[test]
    fn test_status_patch_timestamps() {
        let now = Utc::now();

        let viewed = status_patch(QuotationStatus::Viewed, now);
        assert_eq!(viewed["status"], "viewed");
        assert_eq!(viewed["viewed_at"], viewed["updated_at"]);

        let sent = status_patch(QuotationStatus::Sent, now);
        assert!(sent.get("viewed_at").is_none());
        assert!(sent.get("approved_at").is_none());
        assert!(sent.get("rejected_at").is_none());

        assert!(status_patch(QuotationStatus::Approved, now).get("approved_at").is_some());
        assert!(status_patch(QuotationStatus::Rejected, now).get("rejected_at").is_some());
    }

    #[tokio::test]
    async fn test_sent_status_updates_logs_and_notifies() {
        let repository = repository();
        let (notifier, mut notifications) = RecordingNotifier::new();

        let (status, body) = post_json(
            state(repository.clone(), Arc::new(notifier)),
            "/quotation-status-updater",
            json!({
                "quotationId": QUOTATION_ID,
                "newStatus": "sent",
                "userId": "staff-4",
                "metadata": {"channel": "whatsapp"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quotation"]["status"], "sent");
        assert_eq!(body["data"]["message"], "Status updated to sent");

        let stored = repository.records(QUOTATIONS);
        assert_eq!(stored[0]["status"], "sent");
        assert!(stored[0]["updated_at"].is_string());

        let activities = repository.records(QUOTATION_ACTIVITIES);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0]["activity_type"], "status_changed_to_sent");
        assert_eq!(activities[0]["user_id"], "staff-4");
        assert_eq!(activities[0]["user_name"], "System");
        assert_eq!(activities[0]["metadata"]["previous_status"], "draft");
        assert_eq!(activities[0]["metadata"]["new_status"], "sent");
        assert_eq!(activities[0]["metadata"]["channel"], "whatsapp");

        let (function, payload) = tokio::time::timeout(Duration::from_secs(1), notifications.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(function, "quotation-notifications");
        assert_eq!(payload["quotationId"], QUOTATION_ID);
        assert_eq!(payload["eventType"], "sent");
        assert_eq!(payload["recipientType"], "customer");
    }

    #[tokio::test]
    async fn test_viewed_status_does_not_notify() {
        let repository = repository();
        let (notifier, mut notifications) = RecordingNotifier::new();

        let (status, _) = post_json(
            state(repository.clone(), Arc::new(notifier)),
            "/quotation-status-updater",
            json!({"quotationId": QUOTATION_ID, "newStatus": "viewed"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(repository.records(QUOTATIONS)[0]["viewed_at"].is_string());
        let received = tokio::time::timeout(Duration::from_millis(50), notifications.recv()).await;
        assert!(received.is_err() || received.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_update() {
        let (status, body) = post_json(
            state(repository(), Arc::new(FailingNotifier)),
            "/quotation-status-updater",
            json!({"quotationId": QUOTATION_ID, "newStatus": "approved"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quotation"]["status"], "approved");
        assert!(body["data"]["quotation"]["approved_at"].is_string());
    }

    #[tokio::test]
    async fn test_validation_failures() {
        let cases = [
            (json!({"newStatus": "sent"}), "Quotation ID and new status are required"),
            (json!({"quotationId": QUOTATION_ID}), "Quotation ID and new status are required"),
            (
                json!({"quotationId": QUOTATION_ID, "newStatus": "archived"}),
                "Invalid status. Must be one of: draft, sent, viewed, approved, rejected, expired, converted",
            ),
        ];

        for (request, message) in cases {
            let (status, body) = post_json(
                state(repository(), Arc::new(FailingNotifier)),
                "/quotation-status-updater",
                request,
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "STATUS_UPDATE_FAILED");
            assert_eq!(body["error"]["message"], message);
        }
    }

    #[tokio::test]
    async fn test_unknown_quotation() {
        let (status, body) = post_json(
            state(repository(), Arc::new(FailingNotifier)),
            "/quotation-status-updater",
            json!({"quotationId": "00000000-0000-0000-0000-000000000000", "newStatus": "sent"}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "STATUS_UPDATE_FAILED");
    }

    #[tokio::test]
    async fn test_database_failure() {
        let (status, body) = post_json(
            state(Arc::new(UnavailableRepository), Arc::new(FailingNotifier)),
            "/quotation-status-updater",
            json!({"quotationId": QUOTATION_ID, "newStatus": "sent"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"]["message"],
            "Database connection error: connection refused"
        );
    }
}
