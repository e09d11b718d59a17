//! ISO 8601 UTC timestamps for response payloads and log lines.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Serialize, Serializer};

/// UTC timestamp rendered as `2024-01-15T10:30:00.123Z`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Iso8601Timestamp {
    year: i64,
    month: u8,
    day: u8,
    hours: u8,
    minutes: u8,
    seconds: u8,
    millis: u16,
}

impl Iso8601Timestamp {
    /// Create a timestamp for the current time.
    #[inline]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_duration(now)
    }

    /// Create from a Duration since UNIX_EPOCH.
    pub fn from_duration(duration: Duration) -> Self {
        let secs = duration.as_secs();
        let day_secs = secs % 86_400;
        let (year, month, day) = civil_from_days((secs / 86_400) as i64);

        Self {
            year,
            month,
            day,
            hours: (day_secs / 3600) as u8,
            minutes: ((day_secs % 3600) / 60) as u8,
            seconds: (day_secs % 60) as u8,
            millis: duration.subsec_millis() as u16,
        }
    }
}

/// Convert days since 1970-01-01 into a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

impl fmt::Display for Iso8601Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            self.year, self.month, self.day, self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

impl fmt::Debug for Iso8601Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Iso8601Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
