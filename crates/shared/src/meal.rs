use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::DateKey;

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[default]
    Lunch,
    Dinner,
}

/// Calendar view requested by a screen.
#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum View {
    Day,
    #[default]
    Week,
    /// Rolling 30 days starting today, not the calendar month.
    Month,
}

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Weekly,
    Monthly,
}

impl PlanType {
    /// Smallest total meal count a proposal must reach.
    pub fn minimum_quantity(&self) -> u32 {
        match self {
            PlanType::Weekly => 2,
            PlanType::Monthly => 4,
        }
    }

    pub fn discount_rate(&self) -> f64 {
        match self {
            PlanType::Weekly => 0.0,
            PlanType::Monthly => 0.10,
        }
    }

    /// Window a customer picks meals from for this plan.
    pub fn view(&self) -> View {
        match self {
            PlanType::Weekly => View::Week,
            PlanType::Monthly => View::Month,
        }
    }
}

#[derive(
    EnumString,
    Display,
    AsRefStr,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancelled,
}

/// One orderable window: a meal type on a given day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: DateKey,
    pub meal_type: MealType,
}

impl Slot {
    pub fn new(date: DateKey, meal_type: MealType) -> Self {
        Self { date, meal_type }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.meal_type, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::date;

    #[test]
    fn test_plan_policy_constants() {
        assert_eq!(PlanType::Weekly.minimum_quantity(), 2);
        assert_eq!(PlanType::Monthly.minimum_quantity(), 4);
        assert_eq!(PlanType::Weekly.discount_rate(), 0.0);
        assert_eq!(PlanType::Monthly.discount_rate(), 0.10);
        assert_eq!(PlanType::Monthly.view(), View::Month);
    }

    #[test]
    fn test_lowercase_names() {
        assert_eq!(MealType::Dinner.to_string(), "dinner");
        assert_eq!(MealType::from_str("lunch").unwrap(), MealType::Lunch);
        assert_eq!(View::from_str("month").unwrap(), View::Month);
        assert!(PlanType::from_str("yearly").is_err());

        let json = serde_json::to_string(&PlanType::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");
    }

    #[test]
    fn test_slot_display() {
        let slot = Slot::new(DateKey::new(date!(2024 - 03 - 04)), MealType::Lunch);
        assert_eq!(slot.to_string(), "lunch on 2024-03-04");
    }
}
