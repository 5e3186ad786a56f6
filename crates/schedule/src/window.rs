use mealsub_shared::{DateKey, View};
use serde::{Serialize, Serializer};
use time::Weekday;

/// A day shown in a calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date_key: DateKey,
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    pub is_today: bool,
}

impl CalendarDay {
    pub fn new(date_key: DateKey, today: DateKey) -> Self {
        Self {
            date_key,
            weekday: date_key.weekday(),
            is_today: date_key == today,
        }
    }
}

fn serialize_weekday<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(weekday)
}

/// Days in the rolling month window.
pub const MONTH_WINDOW_DAYS: i64 = 30;

/// Returns the ordered days of `view`.
///
/// - `Day`: the anchor (or today) alone.
/// - `Week`: Sunday to Saturday of the week containing the anchor (or today).
/// - `Month`: 30 days starting today; the anchor is ignored.
pub fn generate(view: View, today: DateKey, anchor: Option<DateKey>) -> Vec<CalendarDay> {
    let anchor = anchor.unwrap_or(today);

    match view {
        View::Day => vec![CalendarDay::new(anchor, today)],
        View::Week => {
            let sunday = week_start(anchor);
            (0..7)
                .map(|offset| CalendarDay::new(sunday.add_days(offset), today))
                .collect()
        }
        View::Month => (0..MONTH_WINDOW_DAYS)
            .map(|offset| CalendarDay::new(today.add_days(offset), today))
            .collect(),
    }
}

/// Sunday on or before `date`.
pub fn week_start(date: DateKey) -> DateKey {
    date.add_days(-i64::from(date.weekday().number_days_from_sunday()))
}

/// Moves a week anchor by whole weeks, negative to go back.
pub fn shift_week(anchor: DateKey, weeks: i64) -> DateKey {
    anchor.add_days(weeks * 7)
}

/// Parses a user supplied anchor, clamping anything unreadable to `today`.
pub fn resolve_anchor(raw: Option<&str>, today: DateKey) -> DateKey {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return today;
    };

    match raw.parse() {
        Ok(anchor) => anchor,
        Err(err) => {
            tracing::debug!(anchor = raw, err = %err, "invalid calendar anchor, using today");
            today
        }
    }
}
