use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use super::extract::{Json, Path, Query};
use super::{created, ok, ApiJson};
use crate::error::{AppError, AppResult};
use crate::models::{Owner, OwnerInput, Page, PageParams, PropertyFilter, PropertySummary};
use crate::services::{owners, properties};
use crate::state::AppState;

pub async fn list_owners(State(state): State<AppState>) -> AppResult<ApiJson<Vec<Owner>>> {
    let owners = state.run(owners::list_owners).await?;
    Ok(ok(owners))
}

pub async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiJson<Owner>> {
    let owner = state.run(move |conn| owners::get_owner(conn, id)).await?;
    Ok(ok(owner))
}

pub async fn create_owner(
    State(state): State<AppState>,
    Json(input): Json<OwnerInput>,
) -> AppResult<(StatusCode, ApiJson<Owner>)> {
    let input = input.validate().map_err(AppError::Validation)?;
    let owner = state
        .run(move |conn| owners::create_owner(conn, input))
        .await?;
    Ok(created(owner))
}

pub async fn update_owner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<OwnerInput>,
) -> AppResult<ApiJson<Owner>> {
    let input = input.validate().map_err(AppError::Validation)?;
    let owner = state
        .run(move |conn| owners::update_owner(conn, id, input))
        .await?;
    Ok(ok(owner))
}

pub async fn delete_owner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiJson<Uuid>> {
    state.run(move |conn| owners::delete_owner(conn, id)).await?;
    Ok(ok(id))
}

/// Every listing of one owner, whatever its status.
pub async fn owner_properties(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiJson<Page<PropertySummary>>> {
    let page = state
        .run(move |conn| {
            owners::get_owner(conn, id)?;
            let filter = PropertyFilter {
                owner_id: Some(id),
                ..PropertyFilter::default()
            };
            properties::list_properties(conn, &filter, &params)
        })
        .await?;
    Ok(ok(page))
}
