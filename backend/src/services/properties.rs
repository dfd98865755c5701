use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::PgConnection;
use log::{info, warn};
use uuid::Uuid;

use super::{ensure_user, missing_ids, owner_exists, property_exists};
use crate::error::{AppError, AppResult};
use crate::models::{
    assemble_summaries, Amenity, AvailabilityRange, HouseRule, NearbyPlace, Page, PageParams,
    PaymentMethod, Property, PropertyClass, PropertyDetails, PropertyFilter, PropertyImage,
    PropertyLocation, PropertyPricing, PropertyStatus, PropertySummary, StatusChange,
    ValidatedProperty,
};
use crate::schema::{
    amenities, properties, property_amenities, property_availability, property_classes,
    property_house_rules, property_images, property_locations, property_nearby_places,
    property_payment_methods, property_pricing, property_property_classes,
};

diesel::define_sql_function!(fn lower(x: Text) -> Text);

/// Inserts the root row and every child collection in one transaction.
pub fn create_property(
    conn: &mut PgConnection,
    input: ValidatedProperty,
) -> AppResult<PropertyDetails> {
    let id = Uuid::new_v4();
    let now = Utc::now().naive_utc();

    conn.transaction::<_, AppError, _>(|conn| {
        check_references(conn, &input)?;

        diesel::insert_into(properties::table)
            .values(&input.new_property(id, now))
            .execute(conn)?;
        replace_children(conn, id, &input)?;

        info!("Created property {} for owner {}", id, input.owner_id);
        get_property_by_id(conn, id)?.ok_or_else(|| AppError::not_found(format!("Property {}", id)))
    })
}

/// Rewrites the root row and replaces every child collection. Status is kept.
pub fn update_property(
    conn: &mut PgConnection,
    id: Uuid,
    input: ValidatedProperty,
) -> AppResult<PropertyDetails> {
    let now = Utc::now().naive_utc();

    conn.transaction::<_, AppError, _>(|conn| {
        if !property_exists(conn, id)? {
            return Err(AppError::not_found(format!("Property {}", id)));
        }
        check_references(conn, &input)?;

        diesel::update(properties::table.find(id))
            .set(&input.changeset(now))
            .execute(conn)?;

        replace_children(conn, id, &input)?;

        info!("Updated property {}", id);
        get_property_by_id(conn, id)?.ok_or_else(|| AppError::not_found(format!("Property {}", id)))
    })
}

pub fn delete_property(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    let deleted = diesel::delete(properties::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::not_found(format!("Property {}", id)));
    }
    info!("Deleted property {} and its dependent rows", id);
    Ok(())
}

/// Owner must exist; every amenity and class must exist and be active.
fn check_references(conn: &mut PgConnection, input: &ValidatedProperty) -> AppResult<()> {
    if !owner_exists(conn, input.owner_id)? {
        return Err(AppError::Unprocessable(format!(
            "owner {} does not exist",
            input.owner_id
        )));
    }

    if !input.amenity_ids.is_empty() {
        let found: Vec<i32> = amenities::table
            .filter(amenities::id.eq_any(&input.amenity_ids))
            .filter(amenities::is_active.eq(true))
            .select(amenities::id)
            .load(conn)?;
        let missing = missing_ids(&input.amenity_ids, &found);
        if !missing.is_empty() {
            return Err(AppError::Unprocessable(format!(
                "unknown or inactive amenities: {:?}",
                missing
            )));
        }
    }

    if !input.class_ids.is_empty() {
        let found: Vec<i32> = property_classes::table
            .filter(property_classes::id.eq_any(&input.class_ids))
            .filter(property_classes::is_active.eq(true))
            .select(property_classes::id)
            .load(conn)?;
        let missing = missing_ids(&input.class_ids, &found);
        if !missing.is_empty() {
            return Err(AppError::Unprocessable(format!(
                "unknown or inactive property classes: {:?}",
                missing
            )));
        }
    }

    Ok(())
}

/// Replace-all write of the child tables: delete what exists, insert the new set.
fn replace_children(
    conn: &mut PgConnection,
    id: Uuid,
    input: &ValidatedProperty,
) -> AppResult<()> {
    diesel::delete(property_pricing::table.filter(property_pricing::property_id.eq(id)))
        .execute(conn)?;
    diesel::insert_into(property_pricing::table)
        .values(&input.pricing_row(id))
        .execute(conn)?;

    diesel::delete(property_locations::table.filter(property_locations::property_id.eq(id)))
        .execute(conn)?;
    diesel::insert_into(property_locations::table)
        .values(&input.location_row(id))
        .execute(conn)?;

    diesel::delete(property_images::table.filter(property_images::property_id.eq(id)))
        .execute(conn)?;
    let images = input.image_rows(id);
    if !images.is_empty() {
        diesel::insert_into(property_images::table)
            .values(&images)
            .execute(conn)?;
    }

    diesel::delete(property_amenities::table.filter(property_amenities::property_id.eq(id)))
        .execute(conn)?;
    let amenity_links = input.amenity_rows(id);
    if !amenity_links.is_empty() {
        diesel::insert_into(property_amenities::table)
            .values(&amenity_links)
            .execute(conn)?;
    }

    diesel::delete(
        property_property_classes::table.filter(property_property_classes::property_id.eq(id)),
    )
    .execute(conn)?;
    let class_links = input.class_rows(id);
    if !class_links.is_empty() {
        diesel::insert_into(property_property_classes::table)
            .values(&class_links)
            .execute(conn)?;
    }

    diesel::delete(
        property_nearby_places::table.filter(property_nearby_places::property_id.eq(id)),
    )
    .execute(conn)?;
    let places = input.nearby_place_rows(id);
    if !places.is_empty() {
        diesel::insert_into(property_nearby_places::table)
            .values(&places)
            .execute(conn)?;
    }

    diesel::delete(property_house_rules::table.filter(property_house_rules::property_id.eq(id)))
        .execute(conn)?;
    let rules = input.house_rule_rows(id);
    if !rules.is_empty() {
        diesel::insert_into(property_house_rules::table)
            .values(&rules)
            .execute(conn)?;
    }

    diesel::delete(
        property_payment_methods::table.filter(property_payment_methods::property_id.eq(id)),
    )
    .execute(conn)?;
    let methods = input.payment_method_rows(id);
    if !methods.is_empty() {
        diesel::insert_into(property_payment_methods::table)
            .values(&methods)
            .execute(conn)?;
    }

    Ok(())
}

/// Loads the root row and assembles every child collection.
pub fn get_property_by_id(
    conn: &mut PgConnection,
    id: Uuid,
) -> AppResult<Option<PropertyDetails>> {
    let property = properties::table
        .find(id)
        .select(Property::as_select())
        .first(conn)
        .optional()?;
    let Some(property) = property else {
        return Ok(None);
    };

    let pricing = property_pricing::table
        .find(id)
        .select(PropertyPricing::as_select())
        .first(conn)
        .optional()?;
    let location = property_locations::table
        .find(id)
        .select(PropertyLocation::as_select())
        .first(conn)
        .optional()?;
    let images = property_images::table
        .filter(property_images::property_id.eq(id))
        .order((property_images::sort_order.asc(), property_images::id.asc()))
        .select(PropertyImage::as_select())
        .load(conn)?;
    let amenities = property_amenities::table
        .inner_join(amenities::table)
        .filter(property_amenities::property_id.eq(id))
        .filter(amenities::is_active.eq(true))
        .order(amenities::name.asc())
        .select(Amenity::as_select())
        .load(conn)?;
    let classes = property_property_classes::table
        .inner_join(property_classes::table)
        .filter(property_property_classes::property_id.eq(id))
        .filter(property_classes::is_active.eq(true))
        .order(property_classes::name.asc())
        .select(PropertyClass::as_select())
        .load(conn)?;
    let nearby_places = property_nearby_places::table
        .filter(property_nearby_places::property_id.eq(id))
        .order((
            property_nearby_places::distance_km.asc(),
            property_nearby_places::id.asc(),
        ))
        .select(NearbyPlace::as_select())
        .load(conn)?;
    let house_rules = property_house_rules::table
        .filter(property_house_rules::property_id.eq(id))
        .order((property_house_rules::sort_order.asc(), property_house_rules::id.asc()))
        .select(HouseRule::as_select())
        .load(conn)?;
    let methods: Vec<String> = property_payment_methods::table
        .filter(property_payment_methods::property_id.eq(id))
        .order(property_payment_methods::method.asc())
        .select(property_payment_methods::method)
        .load(conn)?;
    let payment_methods = methods
        .iter()
        .filter_map(|method| match method.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(e) => {
                warn!("Skipping payment method on property {}: {}", id, e);
                None
            }
        })
        .collect();
    let availability = property_availability::table
        .filter(property_availability::property_id.eq(id))
        .order(property_availability::start_date.asc())
        .select(AvailabilityRange::as_select())
        .load(conn)?;

    Ok(Some(PropertyDetails {
        property,
        pricing,
        location,
        images,
        amenities,
        classes,
        nearby_places,
        house_rules,
        payment_methods,
        availability,
    }))
}

fn filtered(filter: &PropertyFilter) -> properties::BoxedQuery<'static, Pg> {
    let mut query = properties::table.into_boxed();

    if let Some(status) = filter.status {
        query = query.filter(properties::status.eq(status.as_str()));
    }
    if let Some(owner_id) = filter.owner_id {
        query = query.filter(properties::owner_id.eq(owner_id));
    }
    if let Some(min_guests) = filter.min_guests {
        query = query.filter(properties::max_guests.ge(min_guests));
    }
    if let Some(city) = filter.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        query = query.filter(
            properties::id.eq_any(
                property_locations::table
                    .filter(lower(property_locations::city).eq(lower(city.to_string())))
                    .select(property_locations::property_id),
            ),
        );
    }
    if let Some(class_id) = filter.class_id {
        query = query.filter(
            properties::id.eq_any(
                property_property_classes::table
                    .filter(property_property_classes::property_class_id.eq(class_id))
                    .select(property_property_classes::property_id),
            ),
        );
    }

    query
}

/// Newest-first page of listing cards.
pub fn list_properties(
    conn: &mut PgConnection,
    filter: &PropertyFilter,
    params: &PageParams,
) -> AppResult<Page<PropertySummary>> {
    let (_, per_page) = params.resolve();
    let total: i64 = filtered(filter).count().get_result(conn)?;
    let rows = filtered(filter)
        .order((properties::created_at.desc(), properties::id.asc()))
        .limit(per_page)
        .offset(params.offset())
        .select(Property::as_select())
        .load(conn)?;

    let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
    let (pricing, locations, images) = if ids.is_empty() {
        (Vec::new(), Vec::new(), Vec::new())
    } else {
        (
            property_pricing::table
                .filter(property_pricing::property_id.eq_any(&ids))
                .select(PropertyPricing::as_select())
                .load(conn)?,
            property_locations::table
                .filter(property_locations::property_id.eq_any(&ids))
                .select(PropertyLocation::as_select())
                .load(conn)?,
            property_images::table
                .filter(property_images::property_id.eq_any(&ids))
                .order((property_images::sort_order.asc(), property_images::id.asc()))
                .select(PropertyImage::as_select())
                .load(conn)?,
        )
    };

    Ok(Page::new(
        assemble_summaries(rows, pricing, locations, images),
        params,
        total,
    ))
}

/// Approved listings tagged with an active class.
pub fn list_class_properties(
    conn: &mut PgConnection,
    class_id: i32,
    params: &PageParams,
) -> AppResult<Page<PropertySummary>> {
    let active: bool = diesel::select(diesel::dsl::exists(
        property_classes::table
            .find(class_id)
            .filter(property_classes::is_active.eq(true)),
    ))
    .get_result(conn)?;
    if !active {
        return Err(AppError::not_found(format!("Property class {}", class_id)));
    }

    let filter = PropertyFilter {
        status: Some(PropertyStatus::Approved),
        class_id: Some(class_id),
        ..PropertyFilter::default()
    };
    list_properties(conn, &filter, params)
}

/// Listings for the homepage banner class, looked up by name.
pub fn list_featured(
    conn: &mut PgConnection,
    class_name: &str,
    params: &PageParams,
) -> AppResult<Page<PropertySummary>> {
    let class_id = property_classes::table
        .filter(lower(property_classes::name).eq(lower(class_name.to_string())))
        .filter(property_classes::is_active.eq(true))
        .select(property_classes::id)
        .first::<i32>(conn)
        .optional()?;

    match class_id {
        Some(class_id) => list_class_properties(conn, class_id, params),
        None => {
            warn!("Featured class '{}' is missing or inactive", class_name);
            Ok(Page::new(Vec::new(), params, 0))
        }
    }
}

/// Admin review step. Enforces the listing lifecycle.
pub fn set_property_status(
    conn: &mut PgConnection,
    id: Uuid,
    change: StatusChange,
) -> AppResult<Property> {
    conn.transaction::<_, AppError, _>(|conn| {
        let property = properties::table
            .find(id)
            .select(Property::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::not_found(format!("Property {}", id)))?;

        let current = property.status().map_err(AppError::Conflict)?;
        if !current.can_transition_to(change.status) {
            return Err(AppError::conflict(format!(
                "cannot move property from {} to {}",
                current, change.status
            )));
        }
        if let Some(reviewer) = change.reviewed_by {
            ensure_user(conn, reviewer)?;
        }

        let updated = diesel::update(properties::table.find(id))
            .set((
                properties::status.eq(change.status.as_str()),
                properties::reviewed_by.eq(change.reviewed_by.or(property.reviewed_by)),
                properties::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(Property::as_returning())
            .get_result(conn)?;

        info!(
            "Property {} moved from {} to {}",
            id, current, change.status
        );
        Ok(updated)
    })
}
