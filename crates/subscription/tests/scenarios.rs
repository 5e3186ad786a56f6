use std::sync::Mutex;

use mealsub_schedule::{MealOffering, generate, index};
use mealsub_shared::{DateKey, Error, MealType, PlanType, SubscriptionStatus, View};
use mealsub_subscription::{
    CancellationOutcome, OrderMaterializer, SelectionKey, SelectionLedger, Subscription,
    SubscriptionLifecycle, SubscriptionProposal, cancellation_partition, price, validate,
};
use time::macros::datetime;

#[derive(Default)]
struct OrderBook {
    active: Mutex<Vec<String>>,
    voided: Mutex<Vec<SelectionKey>>,
}

impl OrderMaterializer for OrderBook {
    fn materialize(&self, subscription: &Subscription) -> anyhow::Result<()> {
        self.active
            .lock()
            .map_err(|e| anyhow::anyhow!("{e}"))?
            .push(subscription.id.to_owned());

        Ok(())
    }

    fn void(&self, _subscription: &Subscription, outcome: &CancellationOutcome) -> anyhow::Result<()> {
        self.voided
            .lock()
            .map_err(|e| anyhow::anyhow!("{e}"))?
            .extend(outcome.voided.iter().map(|entry| entry.key.clone()));

        Ok(())
    }
}

fn offering(id: &str, date_key: &str, meal_type: MealType, unit_price: f64) -> MealOffering {
    MealOffering {
        offering_id: id.to_owned(),
        restaurant_id: "kitchen-1".to_owned(),
        date_key: date_key.parse().unwrap(),
        meal_type,
        name: format!("meal {id}"),
        unit_price,
        description: None,
    }
}

#[test]
fn test_three_monthly_dinners_at_hundred() {
    let now = datetime!(2024-03-04 08:00:00 UTC);
    let mut ledger = SelectionLedger::new();

    for (id, date_key) in [("a", "2024-03-05"), ("b", "2024-03-06"), ("c", "2024-03-07")] {
        ledger
            .select(&offering(id, date_key, MealType::Dinner, 100.0), 1, now)
            .unwrap();
    }

    let pricing = price(&ledger.entries(), PlanType::Monthly);

    assert_eq!(pricing.subtotal, 300.0);
    assert!((pricing.discount - 30.0).abs() < 1e-9);
    assert!((pricing.total - 270.0).abs() < 1e-9);
}

#[test]
fn test_weekly_with_one_meal_misses_minimum() {
    let now = datetime!(2024-03-04 08:00:00 UTC);
    let mut ledger = SelectionLedger::new();
    ledger
        .select(&offering("a", "2024-03-05", MealType::Lunch, 100.0), 1, now)
        .unwrap();

    let draft = SubscriptionProposal::draft(PlanType::Weekly, "kitchen-1", &ledger, now);
    let err = validate(&draft, now).unwrap_err();

    assert!(matches!(err, Error::MinimumNotMet { minimum: 2, selected: 1, .. }));
    assert!(err.is_validation());
}

#[test]
fn test_cancel_keeps_today_billable_and_voids_future() {
    let book = OrderBook::default();
    let lifecycle = SubscriptionLifecycle::new(&book);
    let submitted_at = datetime!(2024-03-04 07:00:00 UTC);

    let mut ledger = SelectionLedger::new();
    ledger
        .select(&offering("a", "2024-03-04", MealType::Lunch, 100.0), 1, submitted_at)
        .unwrap();
    ledger
        .select(&offering("b", "2024-03-10", MealType::Dinner, 100.0), 2, submitted_at)
        .unwrap();

    let draft = SubscriptionProposal::draft(PlanType::Weekly, "kitchen-1", &ledger, submitted_at);
    let mut subscription = lifecycle.submit(&draft, submitted_at).unwrap();

    let outcome = lifecycle
        .cancel(&mut subscription, datetime!(2024-03-04 12:00:00 UTC))
        .unwrap();

    assert_eq!(
        outcome
            .still_billable
            .iter()
            .map(|e| e.key.date_key.to_string())
            .collect::<Vec<_>>(),
        vec!["2024-03-04"]
    );
    assert_eq!(
        outcome
            .voided
            .iter()
            .map(|e| e.key.date_key.to_string())
            .collect::<Vec<_>>(),
        vec!["2024-03-10"]
    );
    assert_eq!(subscription.status, SubscriptionStatus::Cancelled);
    assert_eq!(book.active.lock().unwrap().len(), 1);
    assert_eq!(book.voided.lock().unwrap().len(), 1);
}

#[test]
fn test_partition_is_complete_and_disjoint() {
    let submitted_at = datetime!(2024-03-01 07:00:00 UTC);
    let book = OrderBook::default();
    let lifecycle = SubscriptionLifecycle::new(&book);

    let today = DateKey::new(time::macros::date!(2024 - 03 - 01));
    let window = generate(View::Month, today, None);
    let offerings = window
        .iter()
        .enumerate()
        .flat_map(|(i, day)| {
            [
                offering(&format!("l{i}"), &day.date_key.to_string(), MealType::Lunch, 40.0),
                offering(&format!("d{i}"), &day.date_key.to_string(), MealType::Dinner, 60.0),
            ]
        })
        .collect::<Vec<_>>();
    let menu = index(&offerings, &window);

    let mut ledger = SelectionLedger::new();
    assert_eq!(ledger.select_all_of_type(MealType::Lunch, &menu, submitted_at), 30);
    assert_eq!(ledger.select_all_of_type(MealType::Dinner, &menu, submitted_at), 30);

    let draft = SubscriptionProposal::draft(PlanType::Monthly, "kitchen-1", &ledger, submitted_at);
    let subscription = lifecycle.submit(&draft, submitted_at).unwrap();

    for day in 0..30 {
        let now = datetime!(2024-03-01 13:00:00 UTC) + time::Duration::days(day);
        let today = DateKey::today(now);
        let outcome = cancellation_partition(&subscription, now);
        let remaining = subscription.remaining_selections(now).count();

        let mut keys = outcome
            .delivered
            .iter()
            .chain(&outcome.still_billable)
            .chain(&outcome.voided)
            .map(|e| e.key.clone())
            .collect::<Vec<_>>();
        assert_eq!(keys.len(), subscription.selections.len());
        keys.sort();
        keys.dedup();

        assert_eq!(keys.len(), subscription.selections.len());
        assert_eq!(outcome.still_billable.len() + outcome.voided.len(), remaining);
        assert!(outcome.delivered.iter().all(|e| e.key.date_key < today));
        assert!(outcome.still_billable.iter().all(|e| e.key.date_key == today));
        assert!(outcome.voided.iter().all(|e| e.key.date_key > today));
    }

    // on the first day every selection is still ahead
    let outcome = cancellation_partition(&subscription, datetime!(2024-03-01 13:00:00 UTC));
    assert!(outcome.delivered.is_empty());
    assert_eq!(
        outcome.still_billable.len() + outcome.voided.len(),
        subscription.selections.len()
    );
}

#[test]
fn test_repeated_selects_keep_one_entry_with_latest_values() {
    let now = datetime!(2024-03-04 08:00:00 UTC);
    let mut ledger = SelectionLedger::new();
    let mut soup = offering("soup", "2024-03-05", MealType::Lunch, 10.0);

    for quantity in 1..=5 {
        soup.unit_price = 10.0 * f64::from(quantity);
        soup.name = format!("soup v{quantity}");
        ledger.select(&soup, quantity, now).unwrap();
    }

    let entries = ledger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].quantity, 5);
    assert_eq!(entries[0].unit_price, 50.0);
    assert_eq!(entries[0].offering_name, "soup v5");
}

#[test]
fn test_pricing_matches_line_sums() {
    let now = datetime!(2024-03-04 08:00:00 UTC);
    let mut ledger = SelectionLedger::new();

    for i in 0..20u32 {
        let date_key = DateKey::today(now).add_days(i64::from(i % 6) + 1);
        let meal_type = if i % 2 == 0 { MealType::Lunch } else { MealType::Dinner };
        let unit_price = 7.35 * f64::from(i + 1);
        ledger
            .select(
                &offering(&format!("o{i}"), &date_key.to_string(), meal_type, unit_price),
                i % 3 + 1,
                now,
            )
            .unwrap();
    }

    let expected = ledger
        .iter()
        .map(|e| e.unit_price * f64::from(e.quantity))
        .sum::<f64>();

    let monthly = price(&ledger.entries(), PlanType::Monthly);
    assert_eq!(monthly.subtotal, expected);
    assert_eq!(monthly.discount, expected * 0.10);
    assert_eq!(monthly.total, monthly.subtotal - monthly.discount);

    let weekly = price(&ledger.entries(), PlanType::Weekly);
    assert_eq!(weekly.discount, 0.0);
    assert_eq!(weekly.total, expected);
}

#[test]
fn test_stale_session_cannot_submit() {
    let book = OrderBook::default();
    let lifecycle = SubscriptionLifecycle::new(&book);
    let started = datetime!(2024-03-04 09:30:00 UTC);

    let mut ledger = SelectionLedger::new();
    ledger
        .select(&offering("a", "2024-03-04", MealType::Lunch, 100.0), 2, started)
        .unwrap();

    let draft = SubscriptionProposal::draft(PlanType::Weekly, "kitchen-1", &ledger, started);
    let err = lifecycle
        .submit(&draft, datetime!(2024-03-04 10:15:00 UTC))
        .unwrap_err();

    assert!(matches!(err, Error::NoCutoffEligibleSelections { .. }));
    assert!(book.active.lock().unwrap().is_empty());
}
