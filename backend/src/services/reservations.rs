use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use log::info;
use uuid::Uuid;

use super::{ensure_property, ensure_user};
use crate::error::{AppError, AppResult};
use crate::models::{
    quote_stay, NewReservation, Property, PropertyPricing, PropertyStatus, Reservation,
    ReservationRequest, ReservationStatus, ReservationStatusChange, StayQuote,
};
use crate::schema::{properties, property_availability, property_pricing, reservations};

fn load_pricing(conn: &mut PgConnection, property_id: Uuid) -> AppResult<PropertyPricing> {
    property_pricing::table
        .find(property_id)
        .select(PropertyPricing::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::conflict(format!("property {} has no pricing", property_id)))
}

pub fn quote(
    conn: &mut PgConnection,
    property_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> AppResult<StayQuote> {
    ensure_property(conn, property_id)?;
    let pricing = load_pricing(conn, property_id)?;
    quote_stay(&pricing, check_in, check_out).map_err(AppError::Validation)
}

/// Books a stay on an approved listing. The stay must respect guest capacity,
/// the minimum stay, other live reservations and blocked calendar ranges.
pub fn create_reservation(
    conn: &mut PgConnection,
    property_id: Uuid,
    request: ReservationRequest,
) -> AppResult<Reservation> {
    conn.transaction::<_, AppError, _>(|conn| {
        // Row lock serializes bookings of one property until commit.
        let property = properties::table
            .find(property_id)
            .select(Property::as_select())
            .for_update()
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::not_found(format!("Property {}", property_id)))?;

        if property.status().ok() != Some(PropertyStatus::Approved) {
            return Err(AppError::conflict(format!(
                "property {} is not open for reservations",
                property_id
            )));
        }
        if request.guests > property.max_guests {
            return Err(AppError::validation(format!(
                "property sleeps at most {} guests",
                property.max_guests
            )));
        }

        let pricing = load_pricing(conn, property_id)?;
        let quote = quote_stay(&pricing, request.check_in, request.check_out)
            .map_err(AppError::Validation)?;
        if !quote.meets_minimum_stay() {
            return Err(AppError::validation(format!(
                "minimum stay is {} nights",
                pricing.minimum_stay_nights
            )));
        }

        let overlapping: bool = diesel::select(diesel::dsl::exists(
            reservations::table
                .filter(reservations::property_id.eq(property_id))
                .filter(reservations::status.ne(ReservationStatus::Cancelled.as_str()))
                .filter(reservations::check_in.lt(request.check_out))
                .filter(reservations::check_out.gt(request.check_in)),
        ))
        .get_result(conn)?;
        if overlapping {
            return Err(AppError::conflict("the requested dates are already booked"));
        }

        let blocked: bool = diesel::select(diesel::dsl::exists(
            property_availability::table
                .filter(property_availability::property_id.eq(property_id))
                .filter(property_availability::is_available.eq(false))
                .filter(property_availability::start_date.lt(request.check_out))
                .filter(property_availability::end_date.ge(request.check_in)),
        ))
        .get_result(conn)?;
        if blocked {
            return Err(AppError::conflict("the property is unavailable on the requested dates"));
        }

        let now = Utc::now().naive_utc();
        let reservation = diesel::insert_into(reservations::table)
            .values(&NewReservation {
                id: Uuid::new_v4(),
                property_id,
                guest_name: request.guest_name,
                guest_email: request.guest_email,
                guest_phone: request.guest_phone,
                check_in: request.check_in,
                check_out: request.check_out,
                guests: request.guests,
                total_cents: quote.total_cents,
                currency: quote.currency,
                status: ReservationStatus::Pending.as_str().to_string(),
                created_at: now,
                updated_at: now,
            })
            .returning(Reservation::as_returning())
            .get_result(conn)?;

        info!(
            "Reserved property {} from {} to {} ({})",
            property_id, reservation.check_in, reservation.check_out, reservation.id
        );
        Ok(reservation)
    })
}

pub fn list_reservations(
    conn: &mut PgConnection,
    property_id: Uuid,
) -> AppResult<Vec<Reservation>> {
    ensure_property(conn, property_id)?;
    let reservations = reservations::table
        .filter(reservations::property_id.eq(property_id))
        .order((reservations::check_in.asc(), reservations::created_at.asc()))
        .select(Reservation::as_select())
        .load(conn)?;
    Ok(reservations)
}

pub fn get_reservation(conn: &mut PgConnection, id: Uuid) -> AppResult<Reservation> {
    reservations::table
        .find(id)
        .select(Reservation::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found(format!("Reservation {}", id)))
}

pub fn set_reservation_status(
    conn: &mut PgConnection,
    id: Uuid,
    change: ReservationStatusChange,
) -> AppResult<Reservation> {
    conn.transaction::<_, AppError, _>(|conn| {
        let reservation = get_reservation(conn, id)?;
        let current = reservation.status().map_err(AppError::Conflict)?;
        if !current.can_transition_to(change.status) {
            return Err(AppError::conflict(format!(
                "cannot move reservation from {} to {}",
                current, change.status
            )));
        }
        if let Some(admin) = change.confirmed_by {
            ensure_user(conn, admin)?;
        }

        let updated = diesel::update(reservations::table.find(id))
            .set((
                reservations::status.eq(change.status.as_str()),
                reservations::confirmed_by.eq(change.confirmed_by.or(reservation.confirmed_by)),
                reservations::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(Reservation::as_returning())
            .get_result(conn)?;

        info!("Reservation {} moved from {} to {}", id, current, change.status);
        Ok(updated)
    })
}
