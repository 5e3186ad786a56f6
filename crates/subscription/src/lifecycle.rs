use std::{cmp::Ordering, collections::BTreeSet};

use mealsub_schedule::{cutoff_for, is_orderable};
use mealsub_shared::{DateKey, Error, PlanType, Result, Slot, SubscriptionStatus};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use ulid::Ulid;

use crate::{Pricing, SelectionEntry, SelectionLedger, price};

/// A priced subscription request that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionProposal {
    pub plan_type: PlanType,
    pub restaurant_id: String,
    pub selections: Vec<SelectionEntry>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SubscriptionProposal {
    pub fn draft(
        plan_type: PlanType,
        restaurant_id: impl Into<String>,
        ledger: &SelectionLedger,
        created_at: OffsetDateTime,
    ) -> Self {
        Self::from_selections(plan_type, restaurant_id, ledger.entries(), created_at)
    }

    pub fn from_selections(
        plan_type: PlanType,
        restaurant_id: impl Into<String>,
        selections: Vec<SelectionEntry>,
        created_at: OffsetDateTime,
    ) -> Self {
        let pricing = price(&selections, plan_type);

        Self {
            plan_type,
            restaurant_id: restaurant_id.into(),
            selections,
            subtotal: pricing.subtotal,
            discount: pricing.discount,
            total: pricing.total,
            created_at,
        }
    }

    pub fn pricing(&self) -> Pricing {
        Pricing {
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
        }
    }

    pub fn total_quantity(&self) -> u64 {
        self.selections
            .iter()
            .map(|entry| u64::from(entry.quantity))
            .sum()
    }
}

/// An accepted proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub plan_type: PlanType,
    pub restaurant_id: String,
    pub selections: Vec<SelectionEntry>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub status: SubscriptionStatus,
    pub start_date: DateKey,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub cancelled_at: Option<OffsetDateTime>,
}

impl Subscription {
    fn activate(draft: &SubscriptionProposal, pricing: Pricing, now: OffsetDateTime) -> Self {
        let start_date = draft
            .selections
            .iter()
            .map(|entry| entry.key.date_key)
            .min()
            .unwrap_or_else(|| DateKey::today(now));

        Self {
            id: Ulid::new().to_string(),
            plan_type: draft.plan_type,
            restaurant_id: draft.restaurant_id.to_owned(),
            selections: draft.selections.to_vec(),
            subtotal: pricing.subtotal,
            discount: pricing.discount,
            total: pricing.total,
            status: SubscriptionStatus::Active,
            start_date,
            created_at: now,
            cancelled_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Selections dated today or later at `now`.
    pub fn remaining_selections(&self, now: OffsetDateTime) -> impl Iterator<Item = &SelectionEntry> {
        let today = DateKey::today(now);

        self.selections
            .iter()
            .filter(move |entry| entry.key.date_key >= today)
    }
}

/// What a cancellation leaves to the fulfillment side.
///
/// Every selection of the subscription lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancellationOutcome {
    /// Deliveries before today, already fulfilled and untouched.
    #[serde(default)]
    pub delivered: Vec<SelectionEntry>,
    /// Deliveries for today, already committed: still charged and delivered.
    pub still_billable: Vec<SelectionEntry>,
    /// Future deliveries to void.
    pub voided: Vec<SelectionEntry>,
}

/// Splits the selections of `subscription` around today: past deliveries,
/// today's committed ones and future ones.
pub fn cancellation_partition(
    subscription: &Subscription,
    now: OffsetDateTime,
) -> CancellationOutcome {
    let today = DateKey::today(now);
    let mut outcome = CancellationOutcome::default();

    for entry in &subscription.selections {
        let bucket = match entry.key.date_key.cmp(&today) {
            Ordering::Less => &mut outcome.delivered,
            Ordering::Equal => &mut outcome.still_billable,
            Ordering::Greater => &mut outcome.voided,
        };

        bucket.push(entry.clone());
    }

    outcome
}

/// Checks a draft right before submission.
///
/// Time may have moved since the selections were made, so the cutoff is
/// evaluated again against `now`.
pub fn validate(draft: &SubscriptionProposal, now: OffsetDateTime) -> Result<()> {
    if draft.selections.is_empty() {
        return Err(Error::NoCutoffEligibleSelections { expired: vec![] });
    }

    let stale = draft
        .selections
        .iter()
        .filter(|entry| !is_orderable(entry.key.date_key, entry.key.meal_type, now))
        .collect::<Vec<_>>();

    if stale.len() == draft.selections.len() {
        let expired = stale
            .iter()
            .map(|entry| entry.key.slot())
            .collect::<BTreeSet<Slot>>();

        return Err(Error::NoCutoffEligibleSelections {
            expired: expired.into_iter().collect(),
        });
    }

    if let Some(entry) = stale.first() {
        let slot = entry.key.slot();

        return Err(Error::CutoffViolation {
            slot,
            cutoff: cutoff_for(slot.meal_type),
        });
    }

    let selected = draft.total_quantity();
    let minimum = draft.plan_type.minimum_quantity();

    if selected < u64::from(minimum) {
        return Err(Error::MinimumNotMet {
            plan_type: draft.plan_type,
            minimum,
            selected,
        });
    }

    Ok(())
}

/// Turns committed subscriptions into fulfillable orders.
///
/// Implemented by the application. Any failure is reported back untouched and
/// the engine keeps its previous state.
pub trait OrderMaterializer {
    fn materialize(&self, subscription: &Subscription) -> anyhow::Result<()>;

    fn void(
        &self,
        subscription: &Subscription,
        outcome: &CancellationOutcome,
    ) -> anyhow::Result<()>;
}

impl<M: OrderMaterializer + ?Sized> OrderMaterializer for &M {
    fn materialize(&self, subscription: &Subscription) -> anyhow::Result<()> {
        (**self).materialize(subscription)
    }

    fn void(
        &self,
        subscription: &Subscription,
        outcome: &CancellationOutcome,
    ) -> anyhow::Result<()> {
        (**self).void(subscription, outcome)
    }
}

/// Draft -> Active -> Cancelled.
pub struct SubscriptionLifecycle<M> {
    materializer: M,
}

impl<M: OrderMaterializer> SubscriptionLifecycle<M> {
    pub fn new(materializer: M) -> Self {
        Self { materializer }
    }

    pub fn materializer(&self) -> &M {
        &self.materializer
    }

    /// Validates `draft` at `now`, prices it again and hands it over for
    /// materialization. The draft is never modified.
    pub fn submit(&self, draft: &SubscriptionProposal, now: OffsetDateTime) -> Result<Subscription> {
        validate(draft, now)?;

        let pricing = price(&draft.selections, draft.plan_type);
        let subscription = Subscription::activate(draft, pricing, now);

        self.materializer.materialize(&subscription)?;

        tracing::info!(
            subscription_id = %subscription.id,
            restaurant_id = %subscription.restaurant_id,
            plan_type = %subscription.plan_type,
            quantity = draft.total_quantity(),
            total = subscription.total,
            "subscription activated"
        );

        Ok(subscription)
    }

    /// Cancels an active subscription.
    ///
    /// Today's deliveries stay billable, later ones are voided. The
    /// subscription only moves to cancelled once the materializer accepted
    /// the partition.
    pub fn cancel(
        &self,
        subscription: &mut Subscription,
        now: OffsetDateTime,
    ) -> Result<CancellationOutcome> {
        if !subscription.is_active() {
            return Err(Error::InvalidTransition {
                from: subscription.status,
                to: SubscriptionStatus::Cancelled,
            });
        }

        let outcome = cancellation_partition(subscription, now);

        self.materializer.void(subscription, &outcome)?;

        subscription.status = SubscriptionStatus::Cancelled;
        subscription.cancelled_at = Some(now);

        tracing::info!(
            subscription_id = %subscription.id,
            still_billable = outcome.still_billable.len(),
            voided = outcome.voided.len(),
            "subscription cancelled"
        );

        Ok(outcome)
    }
}
