use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use super::extract::{Json, Path};
use super::{created, ok, ApiJson};
use crate::error::{AppError, AppResult};
use crate::models::{Reservation, ReservationRequest, ReservationStatusChange};
use crate::services::reservations;
use crate::state::AppState;

pub async fn create_reservation(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Json(request): Json<ReservationRequest>,
) -> AppResult<(StatusCode, ApiJson<Reservation>)> {
    let request = request.validate().map_err(AppError::Validation)?;
    let reservation = state
        .run(move |conn| reservations::create_reservation(conn, property_id, request))
        .await?;
    Ok(created(reservation))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> AppResult<ApiJson<Vec<Reservation>>> {
    let list = state
        .run(move |conn| reservations::list_reservations(conn, property_id))
        .await?;
    Ok(ok(list))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiJson<Reservation>> {
    let reservation = state
        .run(move |conn| reservations::get_reservation(conn, id))
        .await?;
    Ok(ok(reservation))
}

pub async fn set_reservation_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(change): Json<ReservationStatusChange>,
) -> AppResult<ApiJson<Reservation>> {
    let reservation = state
        .run(move |conn| reservations::set_reservation_status(conn, id, change))
        .await?;
    Ok(ok(reservation))
}
