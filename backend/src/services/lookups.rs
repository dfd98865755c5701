//! Amenity and property-class maintenance. Deletion is soft: rows are
//! flagged inactive and keep their links to existing listings.

use diesel::prelude::*;
use diesel::PgConnection;
use log::info;

use super::unique_conflict;
use crate::error::{AppError, AppResult};
use crate::models::{
    Amenity, AmenityChangeset, AmenityRecord, PropertyClass, PropertyClassChangeset,
    PropertyClassRecord,
};
use crate::schema::{amenities, property_classes};

pub fn create_amenity(conn: &mut PgConnection, record: AmenityRecord) -> AppResult<Amenity> {
    let amenity = diesel::insert_into(amenities::table)
        .values(&record)
        .returning(Amenity::as_returning())
        .get_result(conn)
        .map_err(|e| unique_conflict(e, || format!("amenity '{}' already exists", record.name)))?;
    info!("Created amenity {} ({})", amenity.id, amenity.name);
    Ok(amenity)
}

pub fn list_amenities(conn: &mut PgConnection, include_inactive: bool) -> AppResult<Vec<Amenity>> {
    let mut query = amenities::table.into_boxed();
    if !include_inactive {
        query = query.filter(amenities::is_active.eq(true));
    }
    let amenities = query
        .order(amenities::name.asc())
        .select(Amenity::as_select())
        .load(conn)?;
    Ok(amenities)
}

pub fn get_amenity(conn: &mut PgConnection, id: i32) -> AppResult<Amenity> {
    amenities::table
        .find(id)
        .select(Amenity::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("Amenity {}", id)))
}

pub fn update_amenity(
    conn: &mut PgConnection,
    id: i32,
    changes: AmenityChangeset,
) -> AppResult<Amenity> {
    diesel::update(amenities::table.find(id))
        .set(&changes)
        .returning(Amenity::as_returning())
        .get_result(conn)
        .optional()
        .map_err(|e| unique_conflict(e, || format!("amenity '{}' already exists", changes.name)))?
        .ok_or_else(|| AppError::not_found(format!("Amenity {}", id)))
}

pub fn deactivate_amenity(conn: &mut PgConnection, id: i32) -> AppResult<Amenity> {
    let amenity = diesel::update(amenities::table.find(id))
        .set(amenities::is_active.eq(false))
        .returning(Amenity::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("Amenity {}", id)))?;
    info!("Deactivated amenity {} ({})", amenity.id, amenity.name);
    Ok(amenity)
}

pub fn create_class(
    conn: &mut PgConnection,
    record: PropertyClassRecord,
) -> AppResult<PropertyClass> {
    let class = diesel::insert_into(property_classes::table)
        .values(&record)
        .returning(PropertyClass::as_returning())
        .get_result(conn)
        .map_err(|e| unique_conflict(e, || format!("class '{}' already exists", record.name)))?;
    info!("Created property class {} ({})", class.id, class.name);
    Ok(class)
}

pub fn list_classes(
    conn: &mut PgConnection,
    include_inactive: bool,
) -> AppResult<Vec<PropertyClass>> {
    let mut query = property_classes::table.into_boxed();
    if !include_inactive {
        query = query.filter(property_classes::is_active.eq(true));
    }
    let classes = query
        .order(property_classes::name.asc())
        .select(PropertyClass::as_select())
        .load(conn)?;
    Ok(classes)
}

pub fn get_class(conn: &mut PgConnection, id: i32) -> AppResult<PropertyClass> {
    property_classes::table
        .find(id)
        .select(PropertyClass::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("Property class {}", id)))
}

pub fn update_class(
    conn: &mut PgConnection,
    id: i32,
    changes: PropertyClassChangeset,
) -> AppResult<PropertyClass> {
    diesel::update(property_classes::table.find(id))
        .set(&changes)
        .returning(PropertyClass::as_returning())
        .get_result(conn)
        .optional()
        .map_err(|e| unique_conflict(e, || format!("class '{}' already exists", changes.name)))?
        .ok_or_else(|| AppError::not_found(format!("Property class {}", id)))
}

pub fn deactivate_class(conn: &mut PgConnection, id: i32) -> AppResult<PropertyClass> {
    let class = diesel::update(property_classes::table.find(id))
        .set(property_classes::is_active.eq(false))
        .returning(PropertyClass::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("Property class {}", id)))?;
    info!("Deactivated property class {} ({})", class.id, class.name);
    Ok(class)
}
