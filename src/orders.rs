use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use mealsub_shared::Result;
use mealsub_subscription::{
    CancellationOutcome, OrderMaterializer, SelectionKey, Subscription, SubscriptionLifecycle,
};
use time::OffsetDateTime;

#[derive(Debug, Default)]
struct Orders {
    subscriptions: HashMap<String, Subscription>,
    voided: HashMap<String, Vec<SelectionKey>>,
}

impl Orders {
    fn materialize(&mut self, subscription: &Subscription) {
        self.subscriptions
            .insert(subscription.id.to_owned(), subscription.clone());

        tracing::debug!(
            subscription_id = %subscription.id,
            deliveries = subscription.selections.len(),
            "orders materialized"
        );
    }

    fn void(&mut self, subscription: &Subscription, outcome: &CancellationOutcome) -> anyhow::Result<()> {
        if !self.subscriptions.contains_key(&subscription.id) {
            anyhow::bail!("no orders for subscription {}", subscription.id);
        }

        self.voided
            .entry(subscription.id.to_owned())
            .or_default()
            .extend(outcome.voided.iter().map(|entry| entry.key.clone()));

        tracing::debug!(
            subscription_id = %subscription.id,
            voided = outcome.voided.len(),
            "orders voided"
        );

        Ok(())
    }
}

/// Materializer over an already held write guard.
struct Locked<'a>(RefCell<&'a mut Orders>);

impl OrderMaterializer for Locked<'_> {
    fn materialize(&self, subscription: &Subscription) -> anyhow::Result<()> {
        self.0.borrow_mut().materialize(subscription);
        Ok(())
    }

    fn void(&self, subscription: &Subscription, outcome: &CancellationOutcome) -> anyhow::Result<()> {
        self.0.borrow_mut().void(subscription, outcome)
    }
}

/// Stand-in for the order store: keeps materialized subscriptions and the
/// deliveries voided by cancellations.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Arc<RwLock<Orders>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, Orders>> {
        self.orders
            .read()
            .map_err(|e| anyhow::anyhow!("order book poisoned: {e}"))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, Orders>> {
        self.orders
            .write()
            .map_err(|e| anyhow::anyhow!("order book poisoned: {e}"))
    }

    pub fn get(&self, id: &str) -> anyhow::Result<Option<Subscription>> {
        Ok(self.read()?.subscriptions.get(id).cloned())
    }

    pub fn voided(&self, id: &str) -> anyhow::Result<Vec<SelectionKey>> {
        Ok(self.read()?.voided.get(id).cloned().unwrap_or_default())
    }

    /// Cancels a stored subscription.
    ///
    /// The status check, the voiding and the stored transition happen under a
    /// single write lock, so concurrent cancels of the same id void once and
    /// every other caller gets `InvalidTransition`. Returns `None` for an
    /// unknown id.
    pub fn cancel(&self, id: &str, now: OffsetDateTime) -> Result<Option<CancellationOutcome>> {
        let mut orders = self.write()?;

        let Some(mut subscription) = orders.subscriptions.get(id).cloned() else {
            return Ok(None);
        };

        let outcome = SubscriptionLifecycle::new(Locked(RefCell::new(&mut *orders)))
            .cancel(&mut subscription, now)?;

        orders
            .subscriptions
            .insert(subscription.id.to_owned(), subscription);

        Ok(Some(outcome))
    }
}

impl OrderMaterializer for OrderBook {
    fn materialize(&self, subscription: &Subscription) -> anyhow::Result<()> {
        self.write()?.materialize(subscription);
        Ok(())
    }

    fn void(&self, subscription: &Subscription, outcome: &CancellationOutcome) -> anyhow::Result<()> {
        self.write()?.void(subscription, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealsub_shared::{Error, MealType, PlanType, SubscriptionStatus};
    use mealsub_subscription::{SelectionEntry, SubscriptionProposal};
    use time::macros::datetime;

    fn proposal() -> SubscriptionProposal {
        let entry = |date_key: &str, id: &str| SelectionEntry {
            key: SelectionKey::new(date_key.parse().unwrap(), MealType::Dinner, id),
            quantity: 1,
            unit_price: 50.0,
            offering_name: id.to_owned(),
        };

        SubscriptionProposal::from_selections(
            PlanType::Weekly,
            "kitchen-1",
            vec![entry("2024-03-04", "a"), entry("2024-03-06", "b")],
            datetime!(2024-03-04 08:00:00 UTC),
        )
    }

    #[test]
    fn test_materialize_then_cancel() -> anyhow::Result<()> {
        let book = OrderBook::new();
        let subscription = SubscriptionLifecycle::new(&book)
            .submit(&proposal(), datetime!(2024-03-04 08:00:00 UTC))?;
        assert_eq!(book.get(&subscription.id)?, Some(subscription.clone()));

        let outcome = book
            .cancel(&subscription.id, datetime!(2024-03-04 12:00:00 UTC))?
            .unwrap();
        assert_eq!(outcome.still_billable.len(), 1);
        assert_eq!(outcome.voided.len(), 1);

        let stored = book.get(&subscription.id)?.unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);
        assert_eq!(stored.cancelled_at, Some(datetime!(2024-03-04 12:00:00 UTC)));
        assert_eq!(book.voided(&subscription.id)?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_cancel_unknown_id() -> anyhow::Result<()> {
        let book = OrderBook::new();

        assert!(book.cancel("01HNOPE", datetime!(2024-03-04 12:00:00 UTC))?.is_none());

        Ok(())
    }

    #[test]
    fn test_concurrent_cancels_void_once() -> anyhow::Result<()> {
        let book = OrderBook::new();
        let subscription = SubscriptionLifecycle::new(&book)
            .submit(&proposal(), datetime!(2024-03-04 08:00:00 UTC))?;
        let now = datetime!(2024-03-04 12:00:00 UTC);

        let results = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| {
                    let book = book.clone();
                    let id = subscription.id.clone();
                    scope.spawn(move || book.cancel(&id, now))
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });

        let cancelled = results
            .iter()
            .filter(|result| matches!(result, Ok(Some(_))))
            .count();
        let rejected = results
            .iter()
            .filter(|result| matches!(result, Err(Error::InvalidTransition { .. })))
            .count();

        assert_eq!(cancelled, 1);
        assert_eq!(rejected, 7);
        assert_eq!(book.voided(&subscription.id)?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_void_unknown_subscription_fails() -> anyhow::Result<()> {
        let book = OrderBook::new();
        let other = OrderBook::new();
        let mut subscription = SubscriptionLifecycle::new(&other)
            .submit(&proposal(), datetime!(2024-03-04 08:00:00 UTC))?;

        let result = SubscriptionLifecycle::new(&book)
            .cancel(&mut subscription, datetime!(2024-03-04 12:00:00 UTC));

        assert!(result.is_err());
        assert_eq!(subscription.status, SubscriptionStatus::Active);

        Ok(())
    }
}
