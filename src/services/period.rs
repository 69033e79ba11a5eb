//! Calendar-day bounds in station local time.

use crate::errors::ServiceError;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Half-open UTC interval `[start, end)` covering whole local days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UtcRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl UtcRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at < e)
    }
}

fn local_midnight_utc(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local: NaiveDateTime = date.and_time(NaiveTime::MIN);
    let utc = local - chrono::Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

/// Converts an inclusive `[start, end]` range of local dates into UTC bounds:
/// `start` at 00:00:00 and everything before the midnight that follows `end`.
/// Either side may be open.
pub fn day_bounds(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    offset: FixedOffset,
) -> Result<UtcRange, ServiceError> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ServiceError::BadRequest(format!(
                "startDate {} is after endDate {}",
                s, e
            )));
        }
    }

    let end = match end {
        Some(e) => {
            let next = e
                .checked_add_days(Days::new(1))
                .ok_or_else(|| ServiceError::BadRequest(format!("endDate {} out of range", e)))?;
            Some(local_midnight_utc(next, offset))
        }
        None => None,
    };

    Ok(UtcRange {
        start: start.map(|s| local_midnight_utc(s, offset)),
        end,
    })
}

/// Local calendar date of an instant.
pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_day_covers_until_next_midnight() {
        let range = day_bounds(Some(d(2025, 4, 1)), Some(d(2025, 4, 1)), FixedOffset::east_opt(0).unwrap())
            .unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2025, 4, 1, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2025, 4, 2, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn offset_moves_the_window() {
        let tunis = FixedOffset::east_opt(3600).unwrap();
        let range = day_bounds(Some(d(2025, 4, 1)), None, tunis).unwrap();
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2025, 3, 31, 23, 0, 0).unwrap()));
        assert_eq!(range.end, None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_matches!(
            day_bounds(Some(d(2025, 4, 2)), Some(d(2025, 4, 1)), FixedOffset::east_opt(0).unwrap()),
            Err(ServiceError::BadRequest(_))
        );
    }
}
