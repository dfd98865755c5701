use diesel::prelude::*;
use diesel::PgConnection;
use log::info;
use uuid::Uuid;

use super::ensure_property;
use crate::error::{AppError, AppResult};
use crate::models::{AvailabilityRange, NewAvailabilityRange};
use crate::schema::property_availability;

pub fn list_availability(
    conn: &mut PgConnection,
    property_id: Uuid,
) -> AppResult<Vec<AvailabilityRange>> {
    ensure_property(conn, property_id)?;
    let ranges = property_availability::table
        .filter(property_availability::property_id.eq(property_id))
        .order(property_availability::start_date.asc())
        .select(AvailabilityRange::as_select())
        .load(conn)?;
    Ok(ranges)
}

/// Replaces the property's calendar with `ranges`.
pub fn replace_availability(
    conn: &mut PgConnection,
    property_id: Uuid,
    ranges: Vec<NewAvailabilityRange>,
) -> AppResult<Vec<AvailabilityRange>> {
    conn.transaction::<_, AppError, _>(|conn| {
        ensure_property(conn, property_id)?;

        diesel::delete(
            property_availability::table.filter(property_availability::property_id.eq(property_id)),
        )
        .execute(conn)?;
        if !ranges.is_empty() {
            diesel::insert_into(property_availability::table)
                .values(&ranges)
                .execute(conn)?;
        }

        info!(
            "Replaced availability of property {} with {} ranges",
            property_id,
            ranges.len()
        );
        list_availability(conn, property_id)
    })
}
