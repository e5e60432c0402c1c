//! The daily window in which the host should be powered on.

use chrono::{NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::error::ValidationError;
use crate::time::{Timestamp, local_time};

/// Daily window, evaluated in a fixed timezone.
///
/// Both edges are exclusive: at exactly `start_hour:00:00` the host is still
/// outside hours, and at exactly `end_hour:00:00` it is outside again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    timezone: Tz,
    start: NaiveTime,
    end: NaiveTime,
}

impl OperatingHours {
    /// Build a window from an IANA timezone name and whole hours.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimezone`] for an unknown zone and
    /// [`ValidationError::InvalidHour`] when an hour is out of range or the
    /// window is empty.
    pub fn new(timezone: &str, start_hour: u32, end_hour: u32) -> Result<Self, ValidationError> {
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| ValidationError::InvalidTimezone(timezone.to_string()))?;
        let start = NaiveTime::from_hms_opt(start_hour, 0, 0)
            .ok_or(ValidationError::InvalidHour(start_hour))?;
        let end =
            NaiveTime::from_hms_opt(end_hour, 0, 0).ok_or(ValidationError::InvalidHour(end_hour))?;
        if end <= start {
            return Err(ValidationError::InvalidHour(end_hour));
        }
        Ok(Self {
            timezone,
            start,
            end,
        })
    }

    /// Whether `at` falls strictly inside the window on its local day.
    #[must_use]
    pub fn contains(&self, at: Timestamp) -> bool {
        let local = local_time(at, self.timezone);
        local > self.start && local < self.end
    }

    /// Timezone the window is evaluated in.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First hour of the window.
    #[must_use]
    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }

    /// Hour the window closes.
    #[must_use]
    pub fn end_hour(&self) -> u32 {
        self.end.hour()
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::London,
            start: NaiveTime::MIN + chrono::Duration::hours(17),
            end: NaiveTime::MIN + chrono::Duration::hours(20),
        }
    }
}
