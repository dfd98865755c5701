//! Database operations behind the HTTP handlers. Every function takes a
//! borrowed `PgConnection` and runs synchronously; multi-table writes open
//! their own transaction.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::PgConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::schema;

pub mod availability;
pub mod lookups;
pub mod maintenance;
pub mod owners;
pub mod properties;
pub mod reservations;
pub mod users;

/// Turns a unique-constraint failure into a readable 409.
pub(crate) fn unique_conflict(err: DieselError, message: impl FnOnce() -> String) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AppError::Conflict(message())
        }
        other => AppError::Database(other),
    }
}

pub(crate) fn owner_exists(conn: &mut PgConnection, id: Uuid) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(schema::owners::table.find(id))).get_result(conn)
}

pub(crate) fn user_exists(conn: &mut PgConnection, id: Uuid) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(schema::users::table.find(id))).get_result(conn)
}

pub(crate) fn property_exists(conn: &mut PgConnection, id: Uuid) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(schema::properties::table.find(id))).get_result(conn)
}

pub(crate) fn ensure_property(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
    if property_exists(conn, id)? {
        Ok(())
    } else {
        Err(AppError::not_found(format!("Property {}", id)))
    }
}

pub(crate) fn ensure_user(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
    if user_exists(conn, id)? {
        Ok(())
    } else {
        Err(AppError::Unprocessable(format!("user {} does not exist", id)))
    }
}

/// Ids in `wanted` that are absent from `found`.
pub(crate) fn missing_ids(wanted: &[i32], found: &[i32]) -> Vec<i32> {
    wanted
        .iter()
        .filter(|id| !found.contains(id))
        .copied()
        .collect()
}
