use diesel::prelude::*;
use diesel::PgConnection;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{AmenityRecord, Property, PropertyClassRecord};
use crate::schema::{
    amenities, owners, properties, property_amenities, property_availability, property_classes,
    property_house_rules, property_images, property_locations, property_nearby_places,
    property_payment_methods, property_pricing, property_property_classes, reservations, users,
};

pub const DEFAULT_AMENITIES: &[(&str, &str)] = &[
    ("Wi-Fi", "wifi"),
    ("Air conditioning", "snowflake"),
    ("Heating", "flame"),
    ("Kitchen", "utensils"),
    ("Washer", "washing-machine"),
    ("Free parking", "car"),
    ("Pool", "waves"),
    ("TV", "tv"),
];

pub const DEFAULT_CLASSES: &[(&str, &str)] = &[
    ("Featured", "Shown in the homepage banner"),
    ("Beachfront", "Steps from the sea"),
    ("Family friendly", "Suited to stays with children"),
];

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub amenities_inserted: usize,
    pub classes_inserted: usize,
}

/// Inserts the default lookup rows. Existing names are left untouched.
pub fn seed_lookups(conn: &mut PgConnection) -> AppResult<SeedReport> {
    let amenity_rows: Vec<AmenityRecord> = DEFAULT_AMENITIES
        .iter()
        .map(|(name, icon)| AmenityRecord {
            name: name.to_string(),
            icon: Some(icon.to_string()),
            is_active: true,
        })
        .collect();
    let class_rows: Vec<PropertyClassRecord> = DEFAULT_CLASSES
        .iter()
        .map(|(name, description)| PropertyClassRecord {
            name: name.to_string(),
            description: Some(description.to_string()),
            is_active: true,
        })
        .collect();

    let report = SeedReport {
        amenities_inserted: diesel::insert_into(amenities::table)
            .values(&amenity_rows)
            .on_conflict(amenities::name)
            .do_nothing()
            .execute(conn)?,
        classes_inserted: diesel::insert_into(property_classes::table)
            .values(&class_rows)
            .on_conflict(property_classes::name)
            .do_nothing()
            .execute(conn)?,
    };

    info!(
        "Seeded {} amenities and {} property classes",
        report.amenities_inserted, report.classes_inserted
    );
    Ok(report)
}

/// Row count of every table, keyed by table name.
pub fn table_counts(conn: &mut PgConnection) -> AppResult<BTreeMap<&'static str, i64>> {
    macro_rules! count {
        ($($table:ident),+ $(,)?) => {{
            let mut counts = BTreeMap::new();
            $(
                counts.insert(stringify!($table), $table::table.count().get_result::<i64>(conn)?);
            )+
            counts
        }};
    }

    Ok(count!(
        owners,
        users,
        properties,
        property_pricing,
        property_locations,
        property_images,
        amenities,
        property_amenities,
        property_classes,
        property_property_classes,
        property_nearby_places,
        property_house_rules,
        property_payment_methods,
        property_availability,
        reservations,
    ))
}

#[derive(Debug, Serialize)]
pub struct IncompleteProperty {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub status: String,
    pub missing_pricing: bool,
    pub missing_location: bool,
}

/// Properties lacking their pricing or location row.
pub fn incomplete_properties(conn: &mut PgConnection) -> AppResult<Vec<IncompleteProperty>> {
    let rows: Vec<(Property, Option<Uuid>, Option<Uuid>)> = properties::table
        .left_join(property_pricing::table)
        .left_join(property_locations::table)
        .filter(
            property_pricing::property_id
                .nullable()
                .is_null()
                .or(property_locations::property_id.nullable().is_null()),
        )
        .order(properties::created_at.asc())
        .select((
            Property::as_select(),
            property_pricing::property_id.nullable(),
            property_locations::property_id.nullable(),
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(property, pricing, location)| IncompleteProperty {
            id: property.id,
            owner_id: property.owner_id,
            title: property.title,
            status: property.status,
            missing_pricing: pricing.is_none(),
            missing_location: location.is_none(),
        })
        .collect())
}
