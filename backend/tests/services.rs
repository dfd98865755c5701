//! Service tests against a live Postgres. Set `TEST_DATABASE_URL` to run them;
//! each test works inside a transaction that is never committed.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::PgConnection;
use serde_json::json;
use std::sync::Once;
use uuid::Uuid;

use rental_listings::db;
use rental_listings::error::AppError;
use rental_listings::models::{
    AmenityInput, AvailabilityInput, OwnerInput, PageParams, PropertyClassInput, PropertyFilter,
    PropertyInput, PropertyStatus, ReservationRequest, ReservationStatus,
    ReservationStatusChange, StatusChange, UserInput, ValidatedProperty,
};
use rental_listings::models::validate_ranges;
use rental_listings::services::{
    availability, lookups, maintenance, owners, properties, reservations, users,
};

static MIGRATE: Once = Once::new();

fn database_url() -> Option<String> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return None;
        }
    };

    MIGRATE.call_once(|| {
        let mut conn = PgConnection::establish(&url).expect("connect for migrations");
        db::run_migrations(&mut conn).expect("migrations");
    });
    Some(url)
}

fn connection() -> Option<PgConnection> {
    let url = database_url()?;
    let mut conn = PgConnection::establish(&url).expect("connect");
    conn.begin_test_transaction().expect("test transaction");
    Some(conn)
}

fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

fn owner(conn: &mut PgConnection) -> Uuid {
    let input = OwnerInput {
        full_name: "Test Owner".into(),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        phone: None,
    };
    owners::create_owner(conn, input.validate().unwrap())
        .unwrap()
        .id
}

fn amenity(conn: &mut PgConnection) -> i32 {
    let record = AmenityInput {
        name: unique("Wifi"),
        icon: None,
        is_active: None,
    };
    lookups::create_amenity(conn, record.into_record().unwrap())
        .unwrap()
        .id
}

fn property_input(owner_id: Uuid, amenity_ids: Vec<i32>) -> ValidatedProperty {
    let input: PropertyInput = serde_json::from_value(json!({
        "owner_id": owner_id,
        "title": "Harbour flat",
        "description": "Bright flat above the harbour",
        "property_type": "apartment",
        "max_guests": 3,
        "bedrooms": 1,
        "pricing": {
            "currency": "eur",
            "nightly_rate_cents": 10000,
            "weekend_rate_cents": 15000,
            "cleaning_fee_cents": 2500,
            "minimum_stay_nights": 2
        },
        "location": { "address_line": "2 Quay St", "city": "Porto", "country": "PT" },
        "images": [
            { "url": "https://img.example.com/a.jpg" },
            { "url": "https://img.example.com/b.jpg", "is_primary": true }
        ],
        "amenity_ids": amenity_ids,
        "nearby_places": [{ "name": "Metro", "category": "transport", "distance_km": 0.4 }],
        "house_rules": ["No smoking", "  "],
        "payment_methods": ["card", "cash", "card"]
    }))
    .unwrap();
    input.validate().unwrap()
}

fn approve(conn: &mut PgConnection, id: Uuid) {
    properties::set_property_status(
        conn,
        id,
        StatusChange {
            status: PropertyStatus::Approved,
            reviewed_by: None,
        },
    )
    .unwrap();
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn booking(check_in: NaiveDate, check_out: NaiveDate) -> ReservationRequest {
    ReservationRequest {
        guest_name: "Guest".into(),
        guest_email: "guest@example.com".into(),
        guest_phone: None,
        check_in,
        check_out,
        guests: 2,
    }
}

#[test]
fn create_property_writes_whole_aggregate() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let amenity_id = amenity(&mut conn);

    let details =
        properties::create_property(&mut conn, property_input(owner_id, vec![amenity_id])).unwrap();

    assert_eq!(details.property.status, PropertyStatus::Pending.as_str());
    assert_eq!(details.pricing.as_ref().unwrap().currency, "EUR");
    assert_eq!(details.location.as_ref().unwrap().city, "Porto");
    assert_eq!(details.images.len(), 2);
    assert_eq!(
        details.images.iter().filter(|image| image.is_primary).count(),
        1
    );
    assert_eq!(details.amenities.len(), 1);
    assert_eq!(details.house_rules.len(), 1);
    assert_eq!(details.payment_methods.len(), 2);
    assert_eq!(details.nearby_places.len(), 1);
}

#[test]
fn create_property_rejects_unknown_owner_and_rolls_back() {
    let Some(mut conn) = connection() else { return };
    let missing_owner = Uuid::new_v4();

    let err = properties::create_property(&mut conn, property_input(missing_owner, vec![]))
        .unwrap_err();
    assert!(matches!(err, AppError::Unprocessable(_)));

    let filter = PropertyFilter {
        owner_id: Some(missing_owner),
        ..PropertyFilter::default()
    };
    let page = properties::list_properties(&mut conn, &filter, &PageParams::default()).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn create_property_rejects_inactive_amenity() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let amenity_id = amenity(&mut conn);
    lookups::deactivate_amenity(&mut conn, amenity_id).unwrap();

    let err = properties::create_property(&mut conn, property_input(owner_id, vec![amenity_id]))
        .unwrap_err();
    assert!(matches!(err, AppError::Unprocessable(_)));
}

#[test]
fn update_replaces_children_and_keeps_status() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let amenity_id = amenity(&mut conn);
    let created =
        properties::create_property(&mut conn, property_input(owner_id, vec![amenity_id])).unwrap();
    approve(&mut conn, created.property.id);

    let mut input = property_input(owner_id, vec![]);
    input.title = "Renamed flat".into();
    input.images.retain(|image| image.is_primary);
    input.house_rules.clear();

    let updated = properties::update_property(&mut conn, created.property.id, input).unwrap();
    assert_eq!(updated.property.title, "Renamed flat");
    assert_eq!(updated.property.status, PropertyStatus::Approved.as_str());
    assert!(updated.amenities.is_empty());
    assert!(updated.house_rules.is_empty());
    assert_eq!(updated.images.len(), 1);
}

#[test]
fn update_missing_property_is_not_found() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);

    let err = properties::update_property(&mut conn, Uuid::new_v4(), property_input(owner_id, vec![]))
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // A stale owner on a missing listing is still reported as missing.
    let err = properties::update_property(
        &mut conn,
        Uuid::new_v4(),
        property_input(Uuid::new_v4(), vec![]),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn delete_property_cascades_children() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let created = properties::create_property(&mut conn, property_input(owner_id, vec![])).unwrap();
    let id = created.property.id;

    properties::delete_property(&mut conn, id).unwrap();

    assert!(properties::get_property_by_id(&mut conn, id).unwrap().is_none());
    let images: i64 = rental_listings::schema::property_images::table
        .filter(rental_listings::schema::property_images::property_id.eq(id))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(images, 0);
    assert!(matches!(
        properties::delete_property(&mut conn, id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn status_transitions_follow_lifecycle() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let id = properties::create_property(&mut conn, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;

    let err = properties::set_property_status(
        &mut conn,
        id,
        StatusChange {
            status: PropertyStatus::Archived,
            reviewed_by: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let admin = users::create_user(
        &mut conn,
        UserInput {
            full_name: "Reviewer".into(),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            role: None,
        }
        .validate()
        .unwrap(),
    )
    .unwrap();
    let approved = properties::set_property_status(
        &mut conn,
        id,
        StatusChange {
            status: PropertyStatus::Approved,
            reviewed_by: Some(admin.id),
        },
    )
    .unwrap();
    assert_eq!(approved.status, "approved");
}

#[test]
fn public_listing_only_sees_filtered_rows() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let pending = properties::create_property(&mut conn, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;
    let approved = properties::create_property(&mut conn, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;
    approve(&mut conn, approved);

    let filter = PropertyFilter {
        status: Some(PropertyStatus::Approved),
        owner_id: Some(owner_id),
        ..PropertyFilter::default()
    };
    let page = properties::list_properties(&mut conn, &filter, &PageParams::default()).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, approved);
    assert_eq!(
        page.items[0].primary_image_url.as_deref(),
        Some("https://img.example.com/b.jpg")
    );

    let all = PropertyFilter {
        owner_id: Some(owner_id),
        ..PropertyFilter::default()
    };
    let page = properties::list_properties(&mut conn, &all, &PageParams::default()).unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().any(|item| item.id == pending));
}

#[test]
fn class_listing_requires_active_class() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let class = lookups::create_class(
        &mut conn,
        PropertyClassInput {
            name: unique("Beachfront"),
            description: None,
            is_active: None,
        }
        .into_record()
        .unwrap(),
    )
    .unwrap();

    let mut input = property_input(owner_id, vec![]);
    input.class_ids = vec![class.id];
    let id = properties::create_property(&mut conn, input).unwrap().property.id;
    approve(&mut conn, id);

    let page =
        properties::list_class_properties(&mut conn, class.id, &PageParams::default()).unwrap();
    assert_eq!(page.total, 1);

    let featured =
        properties::list_featured(&mut conn, &class.name, &PageParams::default()).unwrap();
    assert_eq!(featured.total, 1);

    lookups::deactivate_class(&mut conn, class.id).unwrap();
    assert!(matches!(
        properties::list_class_properties(&mut conn, class.id, &PageParams::default()),
        Err(AppError::NotFound(_))
    ));
    let featured =
        properties::list_featured(&mut conn, &class.name, &PageParams::default()).unwrap();
    assert_eq!(featured.total, 0);
}

#[test]
fn owner_with_properties_cannot_be_deleted() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let id = properties::create_property(&mut conn, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;

    assert!(matches!(
        owners::delete_owner(&mut conn, owner_id),
        Err(AppError::Conflict(_))
    ));

    properties::delete_property(&mut conn, id).unwrap();
    owners::delete_owner(&mut conn, owner_id).unwrap();
    assert!(matches!(
        owners::get_owner(&mut conn, owner_id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn duplicate_owner_email_conflicts() {
    let Some(mut conn) = connection() else { return };
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    let input = OwnerInput {
        full_name: "First".into(),
        email: email.clone(),
        phone: None,
    };
    owners::create_owner(&mut conn, input.clone()).unwrap();

    let err = owners::create_owner(&mut conn, input).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn reservations_price_and_block_overlaps() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let id = properties::create_property(&mut conn, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;

    // Pending listings are not bookable.
    assert!(matches!(
        reservations::create_reservation(&mut conn, id, booking(date(6, 3), date(6, 5))),
        Err(AppError::Conflict(_))
    ));
    approve(&mut conn, id);

    // Thu 6 June to Sun 9 June: Thursday plus Friday and Saturday nights.
    let quote = reservations::quote(&mut conn, id, date(6, 6), date(6, 9)).unwrap();
    assert_eq!(quote.weekend_nights, 2);
    assert_eq!(quote.total_cents, 10_000 + 2 * 15_000 + 2_500);

    let first = reservations::create_reservation(&mut conn, id, booking(date(6, 6), date(6, 9)))
        .unwrap();
    assert_eq!(first.status, ReservationStatus::Pending.as_str());
    assert_eq!(first.total_cents, quote.total_cents);

    assert!(matches!(
        reservations::create_reservation(&mut conn, id, booking(date(6, 8), date(6, 11))),
        Err(AppError::Conflict(_))
    ));
    // Back-to-back stays share the changeover day.
    reservations::create_reservation(&mut conn, id, booking(date(6, 9), date(6, 11))).unwrap();

    assert!(matches!(
        reservations::create_reservation(&mut conn, id, booking(date(6, 20), date(6, 21))),
        Err(AppError::Validation(_))
    ));

    let cancelled = reservations::set_reservation_status(
        &mut conn,
        first.id,
        ReservationStatusChange {
            status: ReservationStatus::Cancelled,
            confirmed_by: None,
        },
    )
    .unwrap();
    assert_eq!(cancelled.status, "cancelled");
    reservations::create_reservation(&mut conn, id, booking(date(6, 6), date(6, 8))).unwrap();

    assert_eq!(reservations::list_reservations(&mut conn, id).unwrap().len(), 3);
}

#[test]
fn blocked_ranges_stop_reservations() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let id = properties::create_property(&mut conn, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;
    approve(&mut conn, id);

    let ranges = validate_ranges(
        id,
        vec![AvailabilityInput {
            start_date: date(7, 1),
            end_date: date(7, 3),
            is_available: false,
            note: Some("Maintenance".into()),
        }],
    )
    .unwrap();
    let saved = availability::replace_availability(&mut conn, id, ranges).unwrap();
    assert_eq!(saved.len(), 1);

    assert!(matches!(
        reservations::create_reservation(&mut conn, id, booking(date(6, 29), date(7, 2))),
        Err(AppError::Conflict(_))
    ));
    reservations::create_reservation(&mut conn, id, booking(date(7, 4), date(7, 6))).unwrap();

    availability::replace_availability(&mut conn, id, Vec::new()).unwrap();
    assert!(availability::list_availability(&mut conn, id).unwrap().is_empty());
}

#[test]
fn seeding_is_idempotent() {
    let Some(mut conn) = connection() else { return };
    maintenance::seed_lookups(&mut conn).unwrap();
    let again = maintenance::seed_lookups(&mut conn).unwrap();
    assert_eq!(again.amenities_inserted, 0);
    assert_eq!(again.classes_inserted, 0);
    assert!(lookups::list_classes(&mut conn, false)
        .unwrap()
        .iter()
        .any(|class| class.name == "Featured"));
}

#[test]
fn incomplete_properties_report_is_empty_for_full_aggregates() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    let id = properties::create_property(&mut conn, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;

    let report = maintenance::incomplete_properties(&mut conn).unwrap();
    assert!(report.iter().all(|row| row.id != id));
}

#[test]
fn city_filter_matches_whole_names_only() {
    let Some(mut conn) = connection() else { return };
    let owner_id = owner(&mut conn);
    properties::create_property(&mut conn, property_input(owner_id, vec![])).unwrap();

    let by_city = |city: &str| PropertyFilter {
        owner_id: Some(owner_id),
        city: Some(city.to_string()),
        ..PropertyFilter::default()
    };
    let params = PageParams::default();

    let page = properties::list_properties(&mut conn, &by_city("pORTO"), &params).unwrap();
    assert_eq!(page.total, 1);
    for pattern in ["%", "P_rto", "Por%"] {
        let page = properties::list_properties(&mut conn, &by_city(pattern), &params).unwrap();
        assert_eq!(page.total, 0, "city {:?} should not match", pattern);
    }
}

#[test]
fn amenity_update_keeps_activity_unless_given() {
    let Some(mut conn) = connection() else { return };
    let id = amenity(&mut conn);
    lookups::deactivate_amenity(&mut conn, id).unwrap();

    let renamed = lookups::update_amenity(
        &mut conn,
        id,
        AmenityInput {
            name: unique("Sauna"),
            icon: Some("sauna".into()),
            is_active: None,
        }
        .into_changeset()
        .unwrap(),
    )
    .unwrap();
    assert!(!renamed.is_active);
    assert_eq!(renamed.icon.as_deref(), Some("sauna"));

    let reactivated = lookups::update_amenity(
        &mut conn,
        id,
        AmenityInput {
            name: renamed.name.clone(),
            icon: None,
            is_active: Some(true),
        }
        .into_changeset()
        .unwrap(),
    )
    .unwrap();
    assert!(reactivated.is_active);
    assert_eq!(reactivated.icon, None);
}

/// Commits its own fixture: row locks are only observable across sessions.
#[test]
fn bookings_of_one_property_wait_for_each_other() {
    let Some(url) = database_url() else { return };
    let mut setup = PgConnection::establish(&url).expect("connect");
    let owner_id = owner(&mut setup);
    let id = properties::create_property(&mut setup, property_input(owner_id, vec![]))
        .unwrap()
        .property
        .id;
    approve(&mut setup, id);

    let mut holder = PgConnection::establish(&url).expect("connect");
    let mut contender = PgConnection::establish(&url).expect("connect");
    diesel::sql_query("SET lock_timeout = '200ms'")
        .execute(&mut contender)
        .unwrap();

    let mut contended = None;
    let held = holder.transaction::<(), AppError, _>(|holder| {
        reservations::create_reservation(holder, id, booking(date(8, 1), date(8, 4)))?;
        // The first booking is uncommitted; the second must block on it.
        contended = Some(reservations::create_reservation(
            &mut contender,
            id,
            booking(date(8, 2), date(8, 5)),
        ));
        Err(AppError::conflict("rolled back"))
    });
    assert!(matches!(held, Err(AppError::Conflict(_))));
    assert!(matches!(contended, Some(Err(AppError::Database(_)))));

    properties::delete_property(&mut setup, id).unwrap();
    owners::delete_owner(&mut setup, owner_id).unwrap();
}
