use std::cmp::Ordering;

use mealsub_shared::{DateKey, Error, MealType, Result, Slot};
use time::{OffsetDateTime, Time, macros::time};

/// Same-day lunch orders close at 10:00 kitchen time.
pub const LUNCH_CUTOFF: Time = time!(10:00);

/// Same-day dinner orders close at 16:00 kitchen time.
pub const DINNER_CUTOFF: Time = time!(16:00);

pub fn cutoff_for(meal_type: MealType) -> Time {
    match meal_type {
        MealType::Lunch => LUNCH_CUTOFF,
        MealType::Dinner => DINNER_CUTOFF,
    }
}

/// Whether `meal_type` on `date` can still be ordered at `now`.
///
/// `now` must already be in the kitchen's local offset. Future days are always
/// open, past days never are, and today is open strictly before the cutoff.
/// The answer moves with `now`, never cache it.
pub fn is_orderable(date: DateKey, meal_type: MealType, now: OffsetDateTime) -> bool {
    match date.cmp(&DateKey::today(now)) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => now.time() < cutoff_for(meal_type),
    }
}

pub fn check_orderable(slot: Slot, now: OffsetDateTime) -> Result<()> {
    if is_orderable(slot.date, slot.meal_type, now) {
        return Ok(());
    }

    Err(Error::CutoffViolation {
        slot,
        cutoff: cutoff_for(slot.meal_type),
    })
}

/// First day on which `meal_type` is still orderable at `now`.
pub fn next_orderable_date(meal_type: MealType, now: OffsetDateTime) -> DateKey {
    let today = DateKey::today(now);

    if is_orderable(today, meal_type, now) {
        today
    } else {
        today.add_days(1)
    }
}
