//! Calendar rules for the voting session.
//!
//! All day and week arithmetic happens in one reference time zone. A voting
//! week opens at Saturday 00:00 local time and is identified by the date of
//! that Saturday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default reference zone for day and week boundaries
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// Identifies one voting week by the Saturday it starts on.
///
/// Serialized as `YYYY-MM-DD`, which sorts chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekId(NaiveDate);

impl WeekId {
    /// The voting week that contains the given local date
    pub fn containing(date: NaiveDate) -> Self {
        // Saturday -> 0, Sunday -> 1, ..., Friday -> 6
        let days_back = (date.weekday().num_days_from_sunday() + 1) % 7;
        Self(date - Duration::days(i64::from(days_back)))
    }

    /// First day of the week (a Saturday)
    pub fn start(&self) -> NaiveDate {
        self.0
    }

    /// Last day of the week (a Friday)
    pub fn end(&self) -> NaiveDate {
        self.0 + Duration::days(6)
    }

    pub fn previous(&self) -> Self {
        Self(self.0 - Duration::days(7))
    }

    /// Human-readable label for archive listings, e.g. "October 17, 2026"
    pub fn start_label(&self) -> String {
        self.start().format("%B %d, %Y").to_string()
    }

    pub fn end_label(&self) -> String {
        self.end().format("%B %d, %Y").to_string()
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Converts event timestamps into days, weeks and display stamps
#[derive(Debug, Clone, Copy)]
pub struct VoteClock {
    tz: Tz,
}

impl Default for VoteClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl VoteClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Calendar day in the reference zone, used for the daily quota
    pub fn day_of(&self, time: DateTime<Utc>) -> NaiveDate {
        self.tz.from_utc_datetime(&time.naive_utc()).date_naive()
    }

    /// Voting week containing the given instant
    pub fn week_of(&self, time: DateTime<Utc>) -> WeekId {
        WeekId::containing(self.day_of(time))
    }

    /// Minute-precision stamp shown next to the last voter
    pub fn display_stamp(&self, time: DateTime<Utc>) -> String {
        self.tz
            .from_utc_datetime(&time.naive_utc())
            .format("%I:%M %p, %b %d")
            .to_string()
    }
}
