use axum::{extract::State, http::StatusCode};

use super::extract::{Json, Path, Query};
use super::{created, ok, ApiJson};
use crate::error::{AppError, AppResult};
use crate::models::{
    Amenity, AmenityInput, LookupListParams, Page, PageParams, PropertyClass, PropertyClassInput,
    PropertySummary,
};
use crate::services::{lookups, properties};
use crate::state::AppState;

// Public

pub async fn active_amenities(State(state): State<AppState>) -> AppResult<ApiJson<Vec<Amenity>>> {
    let amenities = state
        .run(|conn| lookups::list_amenities(conn, false))
        .await?;
    Ok(ok(amenities))
}

pub async fn active_classes(
    State(state): State<AppState>,
) -> AppResult<ApiJson<Vec<PropertyClass>>> {
    let classes = state.run(|conn| lookups::list_classes(conn, false)).await?;
    Ok(ok(classes))
}

pub async fn class_properties(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiJson<Page<PropertySummary>>> {
    let page = state
        .run(move |conn| properties::list_class_properties(conn, id, &params))
        .await?;
    Ok(ok(page))
}

pub async fn featured(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiJson<Page<PropertySummary>>> {
    let class_name = state.config.featured_class.clone();
    let page = state
        .run(move |conn| properties::list_featured(conn, &class_name, &params))
        .await?;
    Ok(ok(page))
}

// Admin: amenities

pub async fn list_amenities(
    State(state): State<AppState>,
    Query(params): Query<LookupListParams>,
) -> AppResult<ApiJson<Vec<Amenity>>> {
    let amenities = state
        .run(move |conn| lookups::list_amenities(conn, params.include_inactive))
        .await?;
    Ok(ok(amenities))
}

pub async fn get_amenity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiJson<Amenity>> {
    let amenity = state.run(move |conn| lookups::get_amenity(conn, id)).await?;
    Ok(ok(amenity))
}

pub async fn create_amenity(
    State(state): State<AppState>,
    Json(input): Json<AmenityInput>,
) -> AppResult<(StatusCode, ApiJson<Amenity>)> {
    let record = input.into_record().map_err(AppError::Validation)?;
    let amenity = state
        .run(move |conn| lookups::create_amenity(conn, record))
        .await?;
    Ok(created(amenity))
}

pub async fn update_amenity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<AmenityInput>,
) -> AppResult<ApiJson<Amenity>> {
    let changes = input.into_changeset().map_err(AppError::Validation)?;
    let amenity = state
        .run(move |conn| lookups::update_amenity(conn, id, changes))
        .await?;
    Ok(ok(amenity))
}

pub async fn deactivate_amenity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiJson<Amenity>> {
    let amenity = state
        .run(move |conn| lookups::deactivate_amenity(conn, id))
        .await?;
    Ok(ok(amenity))
}

// Admin: property classes

pub async fn list_classes(
    State(state): State<AppState>,
    Query(params): Query<LookupListParams>,
) -> AppResult<ApiJson<Vec<PropertyClass>>> {
    let classes = state
        .run(move |conn| lookups::list_classes(conn, params.include_inactive))
        .await?;
    Ok(ok(classes))
}

pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiJson<PropertyClass>> {
    let class = state.run(move |conn| lookups::get_class(conn, id)).await?;
    Ok(ok(class))
}

pub async fn create_class(
    State(state): State<AppState>,
    Json(input): Json<PropertyClassInput>,
) -> AppResult<(StatusCode, ApiJson<PropertyClass>)> {
    let record = input.into_record().map_err(AppError::Validation)?;
    let class = state
        .run(move |conn| lookups::create_class(conn, record))
        .await?;
    Ok(created(class))
}

pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<PropertyClassInput>,
) -> AppResult<ApiJson<PropertyClass>> {
    let changes = input.into_changeset().map_err(AppError::Validation)?;
    let class = state
        .run(move |conn| lookups::update_class(conn, id, changes))
        .await?;
    Ok(ok(class))
}

pub async fn deactivate_class(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiJson<PropertyClass>> {
    let class = state
        .run(move |conn| lookups::deactivate_class(conn, id))
        .await?;
    Ok(ok(class))
}
