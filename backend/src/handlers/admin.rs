use axum::{extract::State, http::StatusCode};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::extract::{Json, Path, Query};
use super::{created, ok, ApiJson};
use crate::error::{AppError, AppResult};
use crate::models::{
    Page, PageParams, Property, PropertyDetails, PropertyFilter, PropertySummary, StatusChange,
    User, UserInput,
};
use crate::services::maintenance::{self, IncompleteProperty};
use crate::services::{properties, users};
use crate::state::AppState;

/// Review queue; any status filter is honoured.
pub async fn list_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiJson<Page<PropertySummary>>> {
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
        .ok_or_else(|| AppError::not_found(format!("Property {}", id)))?;
    Ok(ok(details))
}

pub async fn set_property_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> AppResult<ApiJson<Property>> {
    let property = state
        .run(move |conn| properties::set_property_status(conn, id, change))
        .await?;
    Ok(ok(property))
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<ApiJson<Vec<User>>> {
    let users = state.run(users::list_users).await?;
    Ok(ok(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> AppResult<(StatusCode, ApiJson<User>)> {
    let input = input.validate().map_err(AppError::Validation)?;
    let user = state.run(move |conn| users::create_user(conn, input)).await?;
    Ok(created(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiJson<Uuid>> {
    state.run(move |conn| users::delete_user(conn, id)).await?;
    Ok(ok(id))
}

pub async fn table_counts(
    State(state): State<AppState>,
) -> AppResult<ApiJson<BTreeMap<&'static str, i64>>> {
    let counts = state.run(maintenance::table_counts).await?;
    Ok(ok(counts))
}

pub async fn incomplete_properties(
    State(state): State<AppState>,
) -> AppResult<ApiJson<Vec<IncompleteProperty>>> {
    let rows = state.run(maintenance::incomplete_properties).await?;
    Ok(ok(rows))
}
