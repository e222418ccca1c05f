use axum::{extract::Path, http::StatusCode, Json};
use chrono::{DateTime, Utc};

use crate::models::*;
use crate::tenancy::TenantEvents;
use crate::utils::{non_blank, parse_datetime};

use super::{created, message, ok, ApiError, ApiJson, ApiQuery, ApiResponse, ErrorCode};

/// List the tenant's events, newest first, optionally filtered by status
pub async fn list_events(
    events: TenantEvents,
    ApiQuery(query): ApiQuery<ListEventsQuery>,
) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let list = events.list(non_blank(&query.status)).await?;
    Ok(ok(list))
}

/// Get a single event; events of other tenants are reported as missing
pub async fn get_event(
    events: TenantEvents,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    let event = events
        .find(&id)
        .await?
        .ok_or_else(ApiError::event_not_found)?;
    Ok(ok(event))
}

/// Create a new event owned by the caller's tenant
pub async fn create_event(
    events: TenantEvents,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Event>>), ApiError> {
    let event = validate_create(req, Utc::now())?;
    let event = events.create(event).await?;
    tracing::info!(
        tenant_id = events.tenant_id(),
        user_id = events.user_id(),
        event_id = %event.id,
        "Event created"
    );
    Ok(created(event))
}

/// Partially update an event; omitted fields keep their stored values
pub async fn update_event(
    events: TenantEvents,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    let mut event = events
        .find(&id)
        .await?
        .ok_or_else(ApiError::event_not_found)?;

    validate_update(req)?.apply(&mut event);
    event.updated_at = Utc::now();

    let event = events.save(event).await?;
    Ok(ok(event))
}

/// Delete an event unless it is currently ACTIVE
pub async fn delete_event(
    events: TenantEvents,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let event = events
        .find(&id)
        .await?
        .ok_or_else(ApiError::event_not_found)?;

    if !event.status.is_deletable() {
        return Err(ApiError::conflict(
            ErrorCode::EventActiveDeleteForbidden,
            "Cannot delete an active event",
        ));
    }

    events.delete(&id).await?;
    tracing::info!(
        tenant_id = events.tenant_id(),
        user_id = events.user_id(),
        event_id = %id,
        "Event deleted"
    );
    Ok(message("Event deleted successfully"))
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    parse_datetime(raw).ok_or_else(|| {
        ApiError::bad_request(ErrorCode::EventInvalidDate, format!("Invalid date: {}", raw))
    })
}

fn check_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ApiError> {
    if start >= end {
        return Err(ApiError::bad_request(
            ErrorCode::EventInvalidDateRange,
            "Start date must be before end date",
        ));
    }
    Ok(())
}

fn check_capacity(capacity: i64) -> Result<(), ApiError> {
    if capacity < 0 {
        return Err(ApiError::bad_request(
            ErrorCode::EventInvalidCapacity,
            "Capacity must be a non-negative number",
        ));
    }
    Ok(())
}

fn parse_status(raw: &str) -> Result<EventStatus, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request(
            ErrorCode::EventInvalidStatus,
            format!("Invalid status: {}", raw),
        )
    })
}

/// Validate a create request in the documented order and build the event.
/// The tenant id is left empty; the scoped repository fills it in.
fn validate_create(req: CreateEventRequest, now: DateTime<Utc>) -> Result<Event, ApiError> {
    let name = non_blank(&req.name)
        .ok_or_else(|| ApiError::bad_request(ErrorCode::EventNameRequired, "Event name is required"))?;
    let location = non_blank(&req.location).ok_or_else(|| {
        ApiError::bad_request(ErrorCode::EventLocationRequired, "Event location is required")
    })?;
    let start_raw = non_blank(&req.start_date).ok_or_else(|| {
        ApiError::bad_request(ErrorCode::EventStartDateRequired, "Start date is required")
    })?;
    let end_raw = non_blank(&req.end_date).ok_or_else(|| {
        ApiError::bad_request(ErrorCode::EventEndDateRequired, "End date is required")
    })?;

    let start_date = parse_date(start_raw)?;
    let end_date = parse_date(end_raw)?;
    check_date_range(start_date, end_date)?;

    if let Some(capacity) = req.capacity {
        check_capacity(capacity)?;
    }

    let status = match non_blank(&req.status) {
        Some(raw) => parse_status(raw)?,
        None => EventStatus::Draft,
    };

    Ok(Event {
        id: uuid::Uuid::new_v4().to_string(),
        tenant_id: String::new(),
        name: name.to_string(),
        description: req.description,
        location: location.to_string(),
        address: req.address,
        start_date,
        end_date,
        status,
        capacity: req.capacity,
        config: req.config,
        images: req.images.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    })
}

/// Validate an update request into typed changes.
///
/// Name and location may be omitted but never blanked. Date ordering is only checked when both dates are supplied; a single
/// date is not compared against the stored counterpart.
fn validate_update(req: UpdateEventRequest) -> Result<EventChanges, ApiError> {
    let name = match &req.name {
        Some(_) => Some(non_blank(&req.name).ok_or_else(|| {
            ApiError::bad_request(ErrorCode::EventNameRequired, "Event name cannot be empty")
        })?),
        None => None,
    };
    let location = match &req.location {
        Some(_) => Some(non_blank(&req.location).ok_or_else(|| {
            ApiError::bad_request(ErrorCode::EventLocationRequired, "Event location cannot be empty")
        })?),
        None => None,
    };

    let start_date = req.start_date.as_deref().map(parse_date).transpose()?;
    let end_date = req.end_date.as_deref().map(parse_date).transpose()?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        check_date_range(start, end)?;
    }

    if let Some(Some(capacity)) = req.capacity {
        check_capacity(capacity)?;
    }

    let status = req.status.as_deref().map(parse_status).transpose()?;

    Ok(EventChanges {
        name: name.map(str::to_string),
        description: req.description,
        location: location.map(str::to_string),
        address: req.address,
        start_date,
        end_date,
        status,
        capacity: req.capacity,
        config: req.config,
        images: req.images,
    })
}
