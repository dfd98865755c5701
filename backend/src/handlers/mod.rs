use axum::{extract::State, http::StatusCode, Json};

use crate::db;
use crate::error::AppResult;
use crate::models::ApiResponse;
use crate::state::AppState;

pub mod admin;
pub mod extract;
pub mod lookups;
pub mod owners;
pub mod properties;
pub mod reservations;

pub type ApiJson<T> = Json<ApiResponse<T>>;

pub fn ok<T>(data: T) -> ApiJson<T> {
    Json(ApiResponse::ok(data))
}

pub fn created<T>(data: T) -> (StatusCode, ApiJson<T>) {
    (StatusCode::CREATED, ok(data))
}

pub async fn index() -> &'static str {
    "Rental Listings API"
}

/// Round-trips `SELECT 1` through the pool.
pub async fn health(State(state): State<AppState>) -> AppResult<ApiJson<&'static str>> {
    state.run(db::ping).await?;
    Ok(ok("ok"))
}
