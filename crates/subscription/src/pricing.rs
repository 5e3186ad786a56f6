use mealsub_shared::PlanType;
use serde::{Deserialize, Serialize};

use crate::SelectionEntry;

/// Cost of a set of selections, kept at full precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

/// Whole-unit amounts for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPricing {
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
}

impl Pricing {
    /// Rounds each amount to the nearest whole unit. Only for display, never
    /// feed the result back into a calculation.
    pub fn rounded(&self) -> DisplayPricing {
        DisplayPricing {
            subtotal: self.subtotal.round() as i64,
            discount: self.discount.round() as i64,
            total: self.total.round() as i64,
        }
    }
}

pub fn price(entries: &[SelectionEntry], plan_type: PlanType) -> Pricing {
    let subtotal = entries.iter().map(SelectionEntry::line_total).sum::<f64>();
    let discount = subtotal * plan_type.discount_rate();

    Pricing {
        subtotal,
        discount,
        total: subtotal - discount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SelectionKey;
    use mealsub_shared::{DateKey, MealType};
    use time::macros::date;

    fn entry(id: &str, quantity: u32, unit_price: f64) -> SelectionEntry {
        SelectionEntry {
            key: SelectionKey::new(DateKey::new(date!(2024 - 03 - 05)), MealType::Dinner, id),
            quantity,
            unit_price,
            offering_name: id.to_owned(),
        }
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(price(&[], PlanType::Monthly), Pricing::default());
        assert_eq!(price(&[], PlanType::Weekly).rounded(), DisplayPricing::default());
    }

    #[test]
    fn test_monthly_discount() {
        let entries = vec![entry("a", 1, 100.0), entry("b", 1, 100.0), entry("c", 1, 100.0)];
        let pricing = price(&entries, PlanType::Monthly);

        assert_eq!(pricing.subtotal, 300.0);
        assert!((pricing.discount - 30.0).abs() < 1e-9);
        assert!((pricing.total - 270.0).abs() < 1e-9);
        assert_eq!(
            pricing.rounded(),
            DisplayPricing {
                subtotal: 300,
                discount: 30,
                total: 270
            }
        );
    }

    #[test]
    fn test_weekly_has_no_discount() {
        let entries = vec![entry("a", 2, 45.5), entry("b", 3, 10.0)];
        let pricing = price(&entries, PlanType::Weekly);

        assert_eq!(pricing.subtotal, 121.0);
        assert_eq!(pricing.discount, 0.0);
        assert_eq!(pricing.total, 121.0);
    }

    #[test]
    fn test_rounds_only_for_display() {
        // 3 x 33.4 = 100.2, a per-line rounding would give 99
        let entries = vec![entry("a", 1, 33.4), entry("b", 1, 33.4), entry("c", 1, 33.4)];
        let pricing = price(&entries, PlanType::Monthly);

        assert!((pricing.subtotal - 100.2).abs() < 1e-9);
        assert!((pricing.discount - 10.02).abs() < 1e-9);
        assert_eq!(pricing.rounded().subtotal, 100);
        assert_eq!(pricing.rounded().discount, 10);
        assert_eq!(pricing.rounded().total, 90);
    }
}
