use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clean_optional;
use crate::schema::property_availability;

/// Inclusive date range. Unavailable ranges block reservations.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = property_availability)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AvailabilityRange {
    pub id: i32,
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,
    pub note: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_availability)]
pub struct NewAvailabilityRange {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_available: bool,
    pub note: Option<String>,
}

/// Checks a full replacement set: ranges must be well formed and disjoint.
pub fn validate_ranges(
    property_id: Uuid,
    ranges: Vec<AvailabilityInput>,
) -> Result<Vec<NewAvailabilityRange>, String> {
    let mut rows = ranges
        .into_iter()
        .map(|range| {
            if range.end_date < range.start_date {
                return Err(format!(
                    "range {} to {} ends before it starts",
                    range.start_date, range.end_date
                ));
            }
            Ok(NewAvailabilityRange {
                property_id,
                start_date: range.start_date,
                end_date: range.end_date,
                is_available: range.is_available,
                note: clean_optional(range.note),
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    rows.sort_by_key(|row| row.start_date);
    for pair in rows.windows(2) {
        if pair[1].start_date <= pair[0].end_date {
            return Err(format!(
                "ranges starting {} and {} overlap",
                pair[0].start_date, pair[1].start_date
            ));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn input(start: u32, end: u32) -> AvailabilityInput {
        AvailabilityInput {
            start_date: date(start),
            end_date: date(end),
            is_available: false,
            note: Some(" maintenance ".into()),
        }
    }

    #[test]
    fn sorts_and_accepts_disjoint_ranges() {
        let id = Uuid::new_v4();
        let rows = validate_ranges(id, vec![input(10, 12), input(1, 3), input(5, 5)]).unwrap();
        let starts: Vec<_> = rows.iter().map(|r| r.start_date).collect();
        assert_eq!(starts, vec![date(1), date(5), date(10)]);
        assert_eq!(rows[0].note.as_deref(), Some("maintenance"));
        assert!(rows.iter().all(|r| r.property_id == id));
    }

    #[test]
    fn rejects_inverted_and_overlapping_ranges() {
        let id = Uuid::new_v4();
        assert!(validate_ranges(id, vec![input(5, 4)]).is_err());
        assert!(validate_ranges(id, vec![input(1, 5), input(5, 8)]).is_err());
        assert!(validate_ranges(id, vec![]).unwrap().is_empty());
    }
}
