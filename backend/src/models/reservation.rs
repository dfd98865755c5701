use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{clean_optional, require_email, require_text, PropertyPricing};
use crate::schema::reservations;

text_enum! {
    ReservationStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
}

impl ReservationStatus {
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reservation {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub total_cents: i64,
    pub currency: String,
    pub status: String,
    pub confirmed_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Reservation {
    pub fn status(&self) -> Result<ReservationStatus, String> {
        self.status.parse()
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub total_cents: i64,
    pub currency: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationRequest {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

impl ReservationRequest {
    pub fn validate(self) -> Result<ReservationRequest, String> {
        if self.check_out <= self.check_in {
            return Err("check_out must be after check_in".to_string());
        }
        if self.guests < 1 {
            return Err("at least one guest is required".to_string());
        }
        Ok(ReservationRequest {
            guest_name: require_text("guest_name", &self.guest_name)?,
            guest_email: require_email(&self.guest_email)?,
            guest_phone: clean_optional(self.guest_phone),
            ..self
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationStatusChange {
    pub status: ReservationStatus,
    pub confirmed_by: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Price breakdown of a stay. The deposit is held separately and is not
/// part of `total_cents`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StayQuote {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub weekend_nights: i64,
    pub currency: String,
    pub lodging_cents: i64,
    pub cleaning_fee_cents: i64,
    pub total_cents: i64,
    pub security_deposit_cents: i64,
    pub minimum_stay_nights: i32,
}

impl StayQuote {
    pub fn meets_minimum_stay(&self) -> bool {
        self.nights >= i64::from(self.minimum_stay_nights)
    }
}

const STAY_TOO_EXPENSIVE: &str = "stay total is too large";

fn is_weekend_night(night: NaiveDate) -> bool {
    matches!(night.weekday(), Weekday::Fri | Weekday::Sat)
}

/// Prices each night between `check_in` (inclusive) and `check_out`
/// (exclusive). Friday and Saturday nights use the weekend rate when set.
pub fn quote_stay(
    pricing: &PropertyPricing,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<StayQuote, String> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err("check_out must be after check_in".to_string());
    }

    let mut weekend_nights = 0;
    let mut lodging_cents = 0i64;
    for night in check_in.iter_days().take(nights as usize) {
        let rate = match pricing.weekend_rate_cents {
            Some(weekend_rate) if is_weekend_night(night) => {
                weekend_nights += 1;
                weekend_rate
            }
            _ => pricing.nightly_rate_cents,
        };
        lodging_cents = lodging_cents
            .checked_add(rate)
            .ok_or_else(|| STAY_TOO_EXPENSIVE.to_string())?;
    }
    let total_cents = lodging_cents
        .checked_add(pricing.cleaning_fee_cents)
        .ok_or_else(|| STAY_TOO_EXPENSIVE.to_string())?;

    Ok(StayQuote {
        check_in,
        check_out,
        nights,
        weekend_nights,
        currency: pricing.currency.clone(),
        lodging_cents,
        cleaning_fee_cents: pricing.cleaning_fee_cents,
        total_cents,
        security_deposit_cents: pricing.security_deposit_cents,
        minimum_stay_nights: pricing.minimum_stay_nights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pricing(weekend: Option<i64>) -> PropertyPricing {
        PropertyPricing {
            property_id: Uuid::nil(),
            currency: "USD".into(),
            nightly_rate_cents: 10_000,
            weekend_rate_cents: weekend,
            cleaning_fee_cents: 2_500,
            security_deposit_cents: 50_000,
            minimum_stay_nights: 2,
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn weekday_stay_uses_nightly_rate() {
        // Mon 3 June to Thu 6 June: three weeknights.
        let quote = quote_stay(&pricing(Some(15_000)), date(6, 3), date(6, 6)).unwrap();
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.weekend_nights, 0);
        assert_eq!(quote.lodging_cents, 30_000);
        assert_eq!(quote.total_cents, 32_500);
        assert_eq!(quote.security_deposit_cents, 50_000);
        assert!(quote.meets_minimum_stay());
    }

    #[test]
    fn friday_and_saturday_use_weekend_rate() {
        // Thu 6 June to Mon 10 June: Thu, Fri, Sat, Sun nights.
        let quote = quote_stay(&pricing(Some(15_000)), date(6, 6), date(6, 10)).unwrap();
        assert_eq!(quote.nights, 4);
        assert_eq!(quote.weekend_nights, 2);
        assert_eq!(quote.lodging_cents, 2 * 10_000 + 2 * 15_000);
    }

    #[test]
    fn weekend_rate_is_optional() {
        let quote = quote_stay(&pricing(None), date(6, 7), date(6, 9)).unwrap();
        assert_eq!(quote.weekend_nights, 0);
        assert_eq!(quote.lodging_cents, 20_000);
    }

    #[test]
    fn single_night_is_below_minimum_stay() {
        let quote = quote_stay(&pricing(None), date(6, 3), date(6, 4)).unwrap();
        assert!(!quote.meets_minimum_stay());
    }

    #[test]
    fn rejects_empty_stays() {
        assert!(quote_stay(&pricing(None), date(6, 3), date(6, 3)).is_err());
        assert!(quote_stay(&pricing(None), date(6, 4), date(6, 3)).is_err());
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let mut expensive = pricing(None);
        expensive.nightly_rate_cents = i64::MAX / 2;
        let err = quote_stay(&expensive, date(6, 3), date(6, 6)).unwrap_err();
        assert_eq!(err, "stay total is too large");

        // Lodging fits, the cleaning fee tips it over.
        expensive.nightly_rate_cents = 10_000;
        expensive.cleaning_fee_cents = i64::MAX;
        assert!(quote_stay(&expensive, date(6, 3), date(6, 5)).is_err());
    }

    #[test]
    fn reservation_request_validation() {
        let request = ReservationRequest {
            guest_name: " Lee ".into(),
            guest_email: "LEE@example.com".into(),
            guest_phone: None,
            check_in: date(6, 3),
            check_out: date(6, 5),
            guests: 2,
        };
        let valid = request.clone().validate().unwrap();
        assert_eq!(valid.guest_name, "Lee");
        assert_eq!(valid.guest_email, "lee@example.com");

        let mut zero_guests = request.clone();
        zero_guests.guests = 0;
        assert!(zero_guests.validate().is_err());

        let mut inverted = request;
        inverted.check_out = date(6, 1);
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn reservation_transitions() {
        use ReservationStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Pending));
    }
}
