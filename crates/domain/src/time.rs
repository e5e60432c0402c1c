//! Clock readings and their wall-clock view in a schedule's timezone.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Instant at which a schedule is evaluated, always stored in UTC.
pub type Timestamp = DateTime<Utc>;

/// Read the system clock.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Wall-clock time of `at` as seen in `timezone`, daylight saving included.
#[must_use]
pub fn local_time(at: Timestamp, timezone: Tz) -> NaiveTime {
    timezone.from_utc_datetime(&at.naive_utc()).time()
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn should_shift_london_by_one_hour_in_summer() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 16, 30, 0).unwrap();
        let local = local_time(at, chrono_tz::Europe::London);
        assert_eq!((local.hour(), local.minute()), (17, 30));
    }

    #[test]
    fn should_match_utc_for_london_in_winter() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 16, 30, 0).unwrap();
        assert_eq!(local_time(at, chrono_tz::Europe::London).hour(), 16);
    }

    #[test]
    fn should_read_a_utc_clock() {
        assert_eq!(now().timezone(), Utc);
    }
}
