use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::{clean_optional, require_text, Amenity, AvailabilityRange, PropertyClass};
use crate::schema::{
    properties, property_amenities, property_house_rules, property_images, property_locations,
    property_nearby_places, property_payment_methods, property_pricing, property_property_classes,
};

pub const MAX_TITLE_LEN: usize = 200;

text_enum! {
    /// Listing lifecycle. New listings start as `Pending` until an admin reviews them.
    PropertyStatus {
        Draft => "draft",
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Archived => "archived",
    }
}

impl PropertyStatus {
    pub fn can_transition_to(self, next: PropertyStatus) -> bool {
        use PropertyStatus::*;
        matches!(
            (self, next),
            (Draft, Pending)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Draft)
                | (Approved, Archived)
                | (Approved, Pending)
                | (Rejected, Pending)
                | (Rejected, Draft)
                | (Archived, Pending)
        )
    }
}

text_enum! {
    PropertyType {
        Apartment => "apartment",
        House => "house",
        Villa => "villa",
        Cabin => "cabin",
        Room => "room",
        Other => "other",
    }
}

text_enum! {
    PaymentMethod {
        Cash => "cash",
        BankTransfer => "bank_transfer",
        Card => "card",
        MobileMoney => "mobile_money",
    }
}

// Root row

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub description: String,
    pub property_type: String,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub bathrooms: i32,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Property {
    pub fn status(&self) -> Result<PropertyStatus, String> {
        self.status.parse()
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = properties)]
pub struct NewProperty {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub description: String,
    pub property_type: String,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub bathrooms: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Root columns rewritten by an update. Status and reviewer are untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = properties)]
#[diesel(treat_none_as_null = true)]
pub struct PropertyChangeset {
    pub owner_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub description: String,
    pub property_type: String,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub bathrooms: i32,
    pub updated_at: NaiveDateTime,
}

// 1:1 children

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = property_pricing)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyPricing {
    pub property_id: Uuid,
    pub currency: String,
    pub nightly_rate_cents: i64,
    pub weekend_rate_cents: Option<i64>,
    pub cleaning_fee_cents: i64,
    pub security_deposit_cents: i64,
    pub minimum_stay_nights: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = property_locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyLocation {
    pub property_id: Uuid,
    pub address_line: String,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// 1:N children

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = property_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyImage {
    pub id: i32,
    pub property_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_images)]
pub struct NewPropertyImage {
    pub property_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = property_nearby_places)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NearbyPlace {
    pub id: i32,
    pub property_id: Uuid,
    pub name: String,
    pub category: String,
    pub distance_km: f64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_nearby_places)]
pub struct NewNearbyPlace {
    pub property_id: Uuid,
    pub name: String,
    pub category: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = property_house_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HouseRule {
    pub id: i32,
    pub property_id: Uuid,
    pub rule: String,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_house_rules)]
pub struct NewHouseRule {
    pub property_id: Uuid,
    pub rule: String,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_payment_methods)]
pub struct NewPaymentMethod {
    pub property_id: Uuid,
    pub method: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_amenities)]
pub struct PropertyAmenityLink {
    pub property_id: Uuid,
    pub amenity_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_property_classes)]
pub struct PropertyClassLink {
    pub property_id: Uuid,
    pub property_class_id: i32,
}

// Request bodies

#[derive(Debug, Clone, Deserialize)]
pub struct PricingInput {
    pub currency: String,
    pub nightly_rate_cents: i64,
    pub weekend_rate_cents: Option<i64>,
    #[serde(default)]
    pub cleaning_fee_cents: i64,
    #[serde(default)]
    pub security_deposit_cents: i64,
    pub minimum_stay_nights: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationInput {
    pub address_line: String,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageInput {
    pub url: String,
    pub caption: Option<String>,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NearbyPlaceInput {
    pub name: String,
    pub category: String,
    pub distance_km: f64,
}

/// Full property aggregate as submitted by the listing form.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInput {
    pub owner_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub description: String,
    pub property_type: PropertyType,
    pub max_guests: i32,
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub beds: i32,
    #[serde(default)]
    pub bathrooms: i32,
    pub pricing: PricingInput,
    pub location: LocationInput,
    #[serde(default)]
    pub images: Vec<ImageInput>,
    #[serde(default)]
    pub amenity_ids: Vec<i32>,
    #[serde(default)]
    pub class_ids: Vec<i32>,
    #[serde(default)]
    pub nearby_places: Vec<NearbyPlaceInput>,
    #[serde(default)]
    pub house_rules: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

/// A checked and normalized [`PropertyInput`], ready to be written.
#[derive(Debug, Clone)]
pub struct ValidatedProperty {
    pub owner_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub description: String,
    pub property_type: PropertyType,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub bathrooms: i32,
    pub pricing: PricingInput,
    pub location: LocationInput,
    pub images: Vec<ImageInput>,
    pub amenity_ids: Vec<i32>,
    pub class_ids: Vec<i32>,
    pub nearby_places: Vec<NearbyPlaceInput>,
    pub house_rules: Vec<String>,
    pub payment_methods: Vec<PaymentMethod>,
}

impl PropertyInput {
    pub fn validate(self) -> Result<ValidatedProperty, String> {
        let title = require_text("title", &self.title)?;
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("title must be at most {} characters", MAX_TITLE_LEN));
        }
        let description = require_text("description", &self.description)?;

        if self.max_guests < 1 {
            return Err("max_guests must be at least 1".to_string());
        }
        for (field, value) in [
            ("bedrooms", self.bedrooms),
            ("beds", self.beds),
            ("bathrooms", self.bathrooms),
        ] {
            if value < 0 {
                return Err(format!("{} cannot be negative", field));
            }
        }

        Ok(ValidatedProperty {
            owner_id: self.owner_id,
            title,
            short_description: clean_optional(self.short_description),
            description,
            property_type: self.property_type,
            max_guests: self.max_guests,
            bedrooms: self.bedrooms,
            beds: self.beds,
            bathrooms: self.bathrooms,
            pricing: validate_pricing(self.pricing)?,
            location: validate_location(self.location)?,
            images: validate_images(self.images)?,
            amenity_ids: dedup_ids(self.amenity_ids),
            class_ids: dedup_ids(self.class_ids),
            nearby_places: validate_nearby_places(self.nearby_places)?,
            house_rules: self
                .house_rules
                .iter()
                .map(|rule| rule.trim().to_string())
                .filter(|rule| !rule.is_empty())
                .collect(),
            payment_methods: dedup_preserving_order(self.payment_methods),
        })
    }
}

fn validate_pricing(pricing: PricingInput) -> Result<PricingInput, String> {
    let currency = pricing.currency.trim().to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("'{}' is not a 3-letter currency code", pricing.currency));
    }
    if pricing.nightly_rate_cents <= 0 {
        return Err("nightly_rate_cents must be positive".to_string());
    }
    if pricing.weekend_rate_cents.is_some_and(|rate| rate < 0)
        || pricing.cleaning_fee_cents < 0
        || pricing.security_deposit_cents < 0
    {
        return Err("prices cannot be negative".to_string());
    }
    let minimum_stay_nights = pricing.minimum_stay_nights.unwrap_or(1);
    if minimum_stay_nights < 1 {
        return Err("minimum_stay_nights must be at least 1".to_string());
    }
    Ok(PricingInput {
        currency,
        minimum_stay_nights: Some(minimum_stay_nights),
        ..pricing
    })
}

fn validate_location(location: LocationInput) -> Result<LocationInput, String> {
    if location.latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
        return Err("latitude must be between -90 and 90".to_string());
    }
    if location.longitude.is_some_and(|lng| !(-180.0..=180.0).contains(&lng)) {
        return Err("longitude must be between -180 and 180".to_string());
    }
    Ok(LocationInput {
        address_line: require_text("address_line", &location.address_line)?,
        city: require_text("city", &location.city)?,
        region: clean_optional(location.region),
        postal_code: clean_optional(location.postal_code),
        country: require_text("country", &location.country)?,
        latitude: location.latitude,
        longitude: location.longitude,
    })
}

/// Orders images, fills in missing sort orders and guarantees exactly one
/// primary image when any images exist.
fn validate_images(images: Vec<ImageInput>) -> Result<Vec<ImageInput>, String> {
    if images.iter().filter(|image| image.is_primary).count() > 1 {
        return Err("only one image can be primary".to_string());
    }

    let mut images = images
        .into_iter()
        .enumerate()
        .map(|(index, image)| -> Result<ImageInput, String> {
            Ok(ImageInput {
                url: require_text("image url", &image.url)?,
                caption: clean_optional(image.caption),
                sort_order: Some(image.sort_order.unwrap_or(index as i32)),
                is_primary: image.is_primary,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;
    images.sort_by_key(|image| image.sort_order);

    if !images.iter().any(|image| image.is_primary) {
        if let Some(first) = images.first_mut() {
            first.is_primary = true;
        }
    }
    Ok(images)
}

fn validate_nearby_places(places: Vec<NearbyPlaceInput>) -> Result<Vec<NearbyPlaceInput>, String> {
    places
        .into_iter()
        .map(|place| -> Result<NearbyPlaceInput, String> {
            if !place.distance_km.is_finite() || place.distance_km < 0.0 {
                return Err(format!("distance to '{}' must be non-negative", place.name.trim()));
            }
            Ok(NearbyPlaceInput {
                name: require_text("nearby place name", &place.name)?,
                category: require_text("nearby place category", &place.category)?,
                distance_km: place.distance_km,
            })
        })
        .collect()
}

fn dedup_ids(ids: Vec<i32>) -> Vec<i32> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

fn dedup_preserving_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

impl ValidatedProperty {
    pub fn new_property(&self, id: Uuid, now: NaiveDateTime) -> NewProperty {
        NewProperty {
            id,
            owner_id: self.owner_id,
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            description: self.description.clone(),
            property_type: self.property_type.as_str().to_string(),
            max_guests: self.max_guests,
            bedrooms: self.bedrooms,
            beds: self.beds,
            bathrooms: self.bathrooms,
            status: PropertyStatus::Pending.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn changeset(&self, now: NaiveDateTime) -> PropertyChangeset {
        PropertyChangeset {
            owner_id: self.owner_id,
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            description: self.description.clone(),
            property_type: self.property_type.as_str().to_string(),
            max_guests: self.max_guests,
            bedrooms: self.bedrooms,
            beds: self.beds,
            bathrooms: self.bathrooms,
            updated_at: now,
        }
    }

    pub fn pricing_row(&self, property_id: Uuid) -> PropertyPricing {
        PropertyPricing {
            property_id,
            currency: self.pricing.currency.clone(),
            nightly_rate_cents: self.pricing.nightly_rate_cents,
            weekend_rate_cents: self.pricing.weekend_rate_cents,
            cleaning_fee_cents: self.pricing.cleaning_fee_cents,
            security_deposit_cents: self.pricing.security_deposit_cents,
            minimum_stay_nights: self.pricing.minimum_stay_nights.unwrap_or(1),
        }
    }

    pub fn location_row(&self, property_id: Uuid) -> PropertyLocation {
        let location = &self.location;
        PropertyLocation {
            property_id,
            address_line: location.address_line.clone(),
            city: location.city.clone(),
            region: location.region.clone(),
            postal_code: location.postal_code.clone(),
            country: location.country.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }

    pub fn image_rows(&self, property_id: Uuid) -> Vec<NewPropertyImage> {
        self.images
            .iter()
            .map(|image| NewPropertyImage {
                property_id,
                url: image.url.clone(),
                caption: image.caption.clone(),
                sort_order: image.sort_order.unwrap_or(0),
                is_primary: image.is_primary,
            })
            .collect()
    }

    pub fn amenity_rows(&self, property_id: Uuid) -> Vec<PropertyAmenityLink> {
        self.amenity_ids
            .iter()
            .map(|&amenity_id| PropertyAmenityLink {
                property_id,
                amenity_id,
            })
            .collect()
    }

    pub fn class_rows(&self, property_id: Uuid) -> Vec<PropertyClassLink> {
        self.class_ids
            .iter()
            .map(|&property_class_id| PropertyClassLink {
                property_id,
                property_class_id,
            })
            .collect()
    }

    pub fn nearby_place_rows(&self, property_id: Uuid) -> Vec<NewNearbyPlace> {
        self.nearby_places
            .iter()
            .map(|place| NewNearbyPlace {
                property_id,
                name: place.name.clone(),
                category: place.category.clone(),
                distance_km: place.distance_km,
            })
            .collect()
    }

    pub fn house_rule_rows(&self, property_id: Uuid) -> Vec<NewHouseRule> {
        self.house_rules
            .iter()
            .enumerate()
            .map(|(index, rule)| NewHouseRule {
                property_id,
                rule: rule.clone(),
                sort_order: index as i32,
            })
            .collect()
    }

    pub fn payment_method_rows(&self, property_id: Uuid) -> Vec<NewPaymentMethod> {
        self.payment_methods
            .iter()
            .map(|method| NewPaymentMethod {
                property_id,
                method: method.as_str().to_string(),
            })
            .collect()
    }
}

// Read models

/// Property root with every child collection attached.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetails {
    #[serde(flatten)]
    pub property: Property,
    pub pricing: Option<PropertyPricing>,
    pub location: Option<PropertyLocation>,
    pub images: Vec<PropertyImage>,
    pub amenities: Vec<Amenity>,
    pub classes: Vec<PropertyClass>,
    pub nearby_places: Vec<NearbyPlace>,
    pub house_rules: Vec<HouseRule>,
    pub payment_methods: Vec<PaymentMethod>,
    pub availability: Vec<AvailabilityRange>,
}

/// Card shown in listing pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub property_type: String,
    pub status: String,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub city: Option<String>,
    pub country: Option<String>,
    pub nightly_rate_cents: Option<i64>,
    pub currency: Option<String>,
    pub primary_image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Joins page rows with their pricing, location and images. Images are
/// expected in display order; the flagged primary wins, else the first.
pub fn assemble_summaries(
    rows: Vec<Property>,
    pricing: Vec<PropertyPricing>,
    locations: Vec<PropertyLocation>,
    images: Vec<PropertyImage>,
) -> Vec<PropertySummary> {
    let pricing: HashMap<Uuid, PropertyPricing> =
        pricing.into_iter().map(|p| (p.property_id, p)).collect();
    let locations: HashMap<Uuid, PropertyLocation> =
        locations.into_iter().map(|l| (l.property_id, l)).collect();

    let mut covers: HashMap<Uuid, PropertyImage> = HashMap::new();
    for image in images {
        let replace = covers
            .get(&image.property_id)
            .map_or(true, |existing| !existing.is_primary && image.is_primary);
        if replace {
            covers.insert(image.property_id, image);
        }
    }

    rows.into_iter()
        .map(|property| {
            let price = pricing.get(&property.id);
            let location = locations.get(&property.id);
            PropertySummary {
                id: property.id,
                owner_id: property.owner_id,
                title: property.title,
                short_description: property.short_description,
                property_type: property.property_type,
                status: property.status,
                max_guests: property.max_guests,
                bedrooms: property.bedrooms,
                bathrooms: property.bathrooms,
                city: location.map(|l| l.city.clone()),
                country: location.map(|l| l.country.clone()),
                nightly_rate_cents: price.map(|p| p.nightly_rate_cents),
                currency: price.map(|p| p.currency.clone()),
                primary_image_url: covers.remove(&property.id).map(|image| image.url),
                created_at: property.created_at,
            }
        })
        .collect()
}

/// Query string of property listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilter {
    pub status: Option<PropertyStatus>,
    pub owner_id: Option<Uuid>,
    pub city: Option<String>,
    pub class_id: Option<i32>,
    pub min_guests: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: PropertyStatus,
    pub reviewed_by: Option<Uuid>,
}
