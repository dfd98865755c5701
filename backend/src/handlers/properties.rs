use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use super::extract::{Json, Path, Query};
use super::{created, ok, ApiJson};
use crate::error::{AppError, AppResult};
use crate::models::{
    validate_ranges, AvailabilityInput, AvailabilityRange, Page, PageParams, PropertyDetails,
    PropertyFilter, PropertyInput, PropertyStatus, PropertySummary, StayDates, StayQuote,
};
use crate::services::{availability, properties, reservations};
use crate::state::AppState;

/// Public catalogue: approved listings only.
pub async fn list_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiJson<Page<PropertySummary>>> {
    let filter = PropertyFilter {
        status: Some(PropertyStatus::Approved),
        ..filter
    };
    let page = state
        .run(move |conn| properties::list_properties(conn, &filter, &params))
        .await?;
    Ok(ok(page))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiJson<PropertyDetails>> {
    let details = state
        .run(move |conn| properties::get_property_by_id(conn, id))
        .await?
        .filter(|details| details.property.status == PropertyStatus::Approved.as_str())
        .ok_or_else(|| AppError::not_found(format!("Property {}", id)))?;
    Ok(ok(details))
}

pub async fn create_property(
    State(state): State<AppState>,
    Json(input): Json<PropertyInput>,
) -> AppResult<(StatusCode, ApiJson<PropertyDetails>)> {
    let input = input.validate().map_err(AppError::Validation)?;
    let details = state
        .run(move |conn| properties::create_property(conn, input))
        .await?;
    Ok(created(details))
}

pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PropertyInput>,
) -> AppResult<ApiJson<PropertyDetails>> {
    let input = input.validate().map_err(AppError::Validation)?;
    let details = state
        .run(move |conn| properties::update_property(conn, id, input))
        .await?;
    Ok(ok(details))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiJson<Uuid>> {
    state
        .run(move |conn| properties::delete_property(conn, id))
        .await?;
    Ok(ok(id))
}

pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(dates): Query<StayDates>,
) -> AppResult<ApiJson<StayQuote>> {
    if dates.check_out <= dates.check_in {
        return Err(AppError::validation("check_out must be after check_in"));
    }
    let quote = state
        .run(move |conn| reservations::quote(conn, id, dates.check_in, dates.check_out))
        .await?;
    Ok(ok(quote))
}

pub async fn list_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiJson<Vec<AvailabilityRange>>> {
    let ranges = state
        .run(move |conn| availability::list_availability(conn, id))
        .await?;
    Ok(ok(ranges))
}

pub async fn replace_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(ranges): Json<Vec<AvailabilityInput>>,
) -> AppResult<ApiJson<Vec<AvailabilityRange>>> {
    let rows = validate_ranges(id, ranges).map_err(AppError::Validation)?;
    let ranges = state
        .run(move |conn| availability::replace_availability(conn, id, rows))
        .await?;
    Ok(ok(ranges))
}
