use std::collections::BTreeMap;

use mealsub_shared::{DateKey, MealType, Slot};
use serde::{Deserialize, Serialize};

use crate::CalendarDay;

/// A restaurant's priced item for one meal slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealOffering {
    pub offering_id: String,
    pub restaurant_id: String,
    pub date_key: DateKey,
    pub meal_type: MealType,
    pub name: String,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MealOffering {
    pub fn slot(&self) -> Slot {
        Slot::new(self.date_key, self.meal_type)
    }
}

/// Where offerings come from. Read only.
pub trait OfferingSource {
    fn offerings(&self, restaurant_id: &str) -> Vec<MealOffering>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayMenu {
    pub lunch: Vec<MealOffering>,
    pub dinner: Vec<MealOffering>,
}

impl DayMenu {
    pub fn slot(&self, meal_type: MealType) -> &[MealOffering] {
        match meal_type {
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
        }
    }

    fn slot_mut(&mut self, meal_type: MealType) -> &mut Vec<MealOffering> {
        match meal_type {
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lunch.is_empty() && self.dinner.is_empty()
    }
}

/// Offerings bucketed by day and meal type for one calendar window.
///
/// Every day of the window has an entry, possibly empty. Offerings keep the
/// order they were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MenuIndex {
    days: BTreeMap<DateKey, DayMenu>,
}

impl MenuIndex {
    pub fn new(offerings: &[MealOffering], window: &[CalendarDay]) -> Self {
        let mut days = window
            .iter()
            .map(|day| (day.date_key, DayMenu::default()))
            .collect::<BTreeMap<_, _>>();

        for offering in offerings {
            // Outside the window, the view simply doesn't show it
            let Some(day) = days.get_mut(&offering.date_key) else {
                continue;
            };

            day.slot_mut(offering.meal_type).push(offering.clone());
        }

        Self { days }
    }

    pub fn day(&self, date: DateKey) -> Option<&DayMenu> {
        self.days.get(&date)
    }

    pub fn slot(&self, date: DateKey, meal_type: MealType) -> &[MealOffering] {
        self.days
            .get(&date)
            .map(|day| day.slot(meal_type))
            .unwrap_or_default()
    }

    pub fn first_offering(&self, date: DateKey, meal_type: MealType) -> Option<&MealOffering> {
        self.slot(date, meal_type).first()
    }

    pub fn find(&self, slot: Slot, offering_id: &str) -> Option<&MealOffering> {
        self.slot(slot.date, slot.meal_type)
            .iter()
            .find(|offering| offering.offering_id == offering_id)
    }

    /// Days in window order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &DayMenu)> {
        self.days.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

pub fn index(offerings: &[MealOffering], window: &[CalendarDay]) -> MenuIndex {
    MenuIndex::new(offerings, window)
}
