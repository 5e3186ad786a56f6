use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{
    Date, Duration, OffsetDateTime, Weekday, format_description::BorrowedFormatItem,
    macros::format_description,
};

const DATE_KEY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Canonical `YYYY-MM-DD` key of a local calendar day.
///
/// Built from the local date components only, so a key never drifts by a day
/// when the underlying instant is viewed from another offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(Date);

impl DateKey {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    /// Local calendar day of `now`, in `now`'s own offset.
    pub fn today(now: OffsetDateTime) -> Self {
        Self(now.date())
    }

    pub fn date(&self) -> Date {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0.saturating_add(Duration::days(days)))
    }
}

impl From<Date> for DateKey {
    fn from(value: Date) -> Self {
        Self(value)
    }
}

impl From<DateKey> for Date {
    fn from(value: DateKey) -> Self {
        value.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s.trim(), DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| crate::Error::InvalidDateKey(s.to_owned()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
