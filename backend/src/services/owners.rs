use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use log::info;
use uuid::Uuid;

use super::unique_conflict;
use crate::error::{AppError, AppResult};
use crate::models::{NewOwner, Owner, OwnerChangeset, OwnerInput};
use crate::schema::{owners, properties};

pub fn create_owner(conn: &mut PgConnection, input: OwnerInput) -> AppResult<Owner> {
    let now = Utc::now().naive_utc();
    let email = input.email.clone();
    let owner = diesel::insert_into(owners::table)
        .values(&NewOwner {
            id: Uuid::new_v4(),
            full_name: input.full_name,
            email: input.email,
            phone: input.phone,
            created_at: now,
            updated_at: now,
        })
        .returning(Owner::as_returning())
        .get_result(conn)
        .map_err(|e| unique_conflict(e, || format!("an owner with email {} already exists", email)))?;

    info!("Created owner {}", owner.id);
    Ok(owner)
}

pub fn get_owner(conn: &mut PgConnection, id: Uuid) -> AppResult<Owner> {
    owners::table
        .find(id)
        .select(Owner::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("Owner {}", id)))
}

pub fn list_owners(conn: &mut PgConnection) -> AppResult<Vec<Owner>> {
    let owners = owners::table
        .order((owners::full_name.asc(), owners::id.asc()))
        .select(Owner::as_select())
        .load(conn)?;
    Ok(owners)
}

pub fn update_owner(conn: &mut PgConnection, id: Uuid, input: OwnerInput) -> AppResult<Owner> {
    let email = input.email.clone();
    let owner = diesel::update(owners::table.find(id))
        .set(&OwnerChangeset {
            full_name: input.full_name,
            email: input.email,
            phone: input.phone,
            updated_at: Utc::now().naive_utc(),
        })
        .returning(Owner::as_returning())
        .get_result(conn)
        .optional()
        .map_err(|e| unique_conflict(e, || format!("an owner with email {} already exists", email)))?
        .ok_or_else(|| AppError::not_found(format!("Owner {}", id)))?;

    info!("Updated owner {}", id);
    Ok(owner)
}

/// Owners with listings cannot be removed; their properties must go first.
pub fn delete_owner(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    conn.transaction::<_, AppError, _>(|conn| {
        let listings: i64 = properties::table
            .filter(properties::owner_id.eq(id))
            .count()
            .get_result(conn)?;
        if listings > 0 {
            return Err(AppError::conflict(format!(
                "owner {} still has {} properties",
                id, listings
            )));
        }

        let deleted = diesel::delete(owners::table.find(id)).execute(conn)?;
        if deleted == 0 {
            return Err(AppError::not_found(format!("Owner {}", id)));
        }
        info!("Deleted owner {}", id);
        Ok(())
    })
}
