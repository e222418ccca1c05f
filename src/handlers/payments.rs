use axum::{extract::Path, Json};

use crate::models::*;
use crate::tenancy::{TenantEvents, TenantPayments};
use crate::utils::non_blank;

use super::{ok, ApiError, ApiQuery, ApiResponse};

/// Blank query values mean "no filter"
fn normalize(filter: PaymentFilter) -> PaymentFilter {
    PaymentFilter {
        status: non_blank(&filter.status).map(str::to_string),
        event_id: non_blank(&filter.event_id).map(str::to_string),
    }
}

/// List the tenant's payments, optionally filtered by status and event
pub async fn list_payments(
    payments: TenantPayments,
    ApiQuery(filter): ApiQuery<PaymentFilter>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiError> {
    let list = payments.list(&normalize(filter)).await?;
    Ok(ok(list))
}

/// List payments made at one of the tenant's events
pub async fn list_event_payments(
    events: TenantEvents,
    payments: TenantPayments,
    Path(id): Path<String>,
    ApiQuery(filter): ApiQuery<PaymentFilter>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiError> {
    events
        .find(&id)
        .await?
        .ok_or_else(ApiError::event_not_found)?;

    let filter = PaymentFilter {
        event_id: Some(id),
        ..normalize(filter)
    };
    let list = payments.list(&filter).await?;
    Ok(ok(list))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_event_payments_are_tenant_scoped() {
        let app = TestApp::new().await;
        let (event_id, payment_count) = app.seed_payments("tenant-a").await;

        let uri = format!("/api/events/{}/payments", event_id);
        let (status, json) = app.get(&uri, Some("tenant-a")).await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), payment_count);
        assert!(data.iter().all(|p| p["eventId"] == event_id.as_str()));

        let (status, json) = app.get(&uri, Some("tenant-b")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "EVENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_payments_by_status() {
        let app = TestApp::new().await;
        app.seed_payments("tenant-a").await;

        let (status, json) = app.get("/api/payments?status=PENDING", Some("tenant-a")).await;
        assert_eq!(status, StatusCode::OK);
        for payment in json["data"].as_array().unwrap() {
            assert_eq!(payment["status"], "PENDING");
            assert!(payment["paidAt"].is_null());
        }

        let (_, json) = app.get("/api/payments", Some("tenant-b")).await;
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_blank_filters_are_ignored() {
        let app = TestApp::new().await;
        let (_, payment_count) = app.seed_payments("tenant-a").await;

        let (status, json) = app
            .get("/api/payments?status=&eventId=", Some("tenant-a"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), payment_count);
    }

    #[tokio::test]
    async fn test_bad_query_string_uses_error_envelope() {
        let app = TestApp::new().await;
        let (event_id, _) = app.seed_payments("tenant-a").await;

        let uri = format!("/api/events/{}/payments?status=PENDING&status=REFUNDED", event_id);
        let (status, json) = app.get(&uri, Some("tenant-a")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_QUERY");

        let (status, json) = app.get("/api/payments?eventId=a&eventId=b", Some("tenant-a")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }
}
