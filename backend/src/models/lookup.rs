//! Lookup tables shared between listings: amenities and property classes.
//! Both are soft-deleted through `is_active`.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{clean_optional, require_text};
use crate::schema::{amenities, property_classes};

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = amenities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Amenity {
    pub id: i32,
    pub name: String,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = amenities)]
pub struct AmenityRecord {
    pub name: String,
    pub icon: Option<String>,
    pub is_active: bool,
}

/// Full replacement of an amenity. `is_active` is left alone when omitted.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = amenities)]
pub struct AmenityChangeset {
    pub name: String,
    pub icon: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmenityInput {
    pub name: String,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

impl AmenityInput {
    pub fn into_record(self) -> Result<AmenityRecord, String> {
        Ok(AmenityRecord {
            name: require_text("name", &self.name)?,
            icon: clean_optional(self.icon),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    pub fn into_changeset(self) -> Result<AmenityChangeset, String> {
        Ok(AmenityChangeset {
            name: require_text("name", &self.name)?,
            icon: Some(clean_optional(self.icon)),
            is_active: self.is_active,
        })
    }
}

/// A curation tag such as "Featured" or "Beachfront".
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = property_classes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyClass {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_classes)]
pub struct PropertyClassRecord {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = property_classes)]
pub struct PropertyClassChangeset {
    pub name: String,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyClassInput {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl PropertyClassInput {
    pub fn into_record(self) -> Result<PropertyClassRecord, String> {
        Ok(PropertyClassRecord {
            name: require_text("name", &self.name)?,
            description: clean_optional(self.description),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    pub fn into_changeset(self) -> Result<PropertyClassChangeset, String> {
        Ok(PropertyClassChangeset {
            name: require_text("name", &self.name)?,
            description: Some(clean_optional(self.description)),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LookupListParams {
    #[serde(default)]
    pub include_inactive: bool,
}
