use time::OffsetDateTime;
use time_tz::{ToTimezone, timezones};

/// Current time in the kitchen's timezone.
///
/// The only place the wall clock is read. Unknown names fall back to UTC.
pub fn now_in(tz: &str) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();

    match timezones::get_by_name(tz) {
        Some(tz) => now.to_timezone(tz),
        None => {
            tracing::warn!(timezone = tz, "unknown kitchen timezone, using UTC");
            now
        }
    }
}

pub fn is_known_timezone(tz: &str) -> bool {
    timezones::get_by_name(tz).is_some()
}

/// Source of `now` for request handlers.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Wall clock converted to the named timezone.
    Kitchen(String),
    Fixed(OffsetDateTime),
}

impl Clock {
    pub fn now(&self) -> OffsetDateTime {
        match self {
            Clock::Kitchen(tz) => now_in(tz),
            Clock::Fixed(now) => *now,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::Kitchen("UTC".to_owned())
    }
}
