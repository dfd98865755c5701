use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use log::info;
use uuid::Uuid;

use super::unique_conflict;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserInput, DEFAULT_ROLE};
use crate::schema::users;

pub fn create_user(conn: &mut PgConnection, input: UserInput) -> AppResult<User> {
    let user = User {
        id: Uuid::new_v4(),
        full_name: input.full_name,
        email: input.email,
        role: input.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)
        .map_err(|e| unique_conflict(e, || format!("a user with email {} already exists", user.email)))?;

    info!("Created {} user {}", user.role, user.id);
    Ok(user)
}

pub fn list_users(conn: &mut PgConnection) -> AppResult<Vec<User>> {
    let users = users::table
        .order(users::created_at.asc())
        .select(User::as_select())
        .load(conn)?;
    Ok(users)
}

/// Reviewer and confirmer references are cleared by the database.
pub fn delete_user(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    let deleted = diesel::delete(users::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(format!("User {}", id)));
    }
    info!("Deleted user {}", id);
    Ok(())
}
