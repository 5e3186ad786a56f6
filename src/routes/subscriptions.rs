use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mealsub_schedule::{OfferingSource, next_orderable_date};
use mealsub_shared::{DateKey, Error as EngineError, MealType, PlanType};
use mealsub_subscription::{
    CancellationOutcome, DisplayPricing, Pricing, SelectionEntry, SelectionKey, SelectionLedger,
    Subscription, SubscriptionLifecycle, SubscriptionProposal, validate,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{error::AppError, routes::AppState};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionInput {
    pub date_key: DateKey,
    pub meal_type: MealType,
    pub offering_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionRequest {
    pub plan_type: PlanType,
    pub restaurant_id: String,
    pub selections: Vec<SelectionInput>,
}

impl SubscriptionRequest {
    /// Prices the selections from the catalog, not from the client.
    ///
    /// Later duplicates of the same selection replace earlier ones and zero
    /// quantities are dropped.
    fn proposal(&self, app: &AppState, now: OffsetDateTime) -> Result<SubscriptionProposal, AppError> {
        if !app.catalog.contains(&self.restaurant_id) {
            return Err(AppError::RestaurantNotFound(self.restaurant_id.to_owned()));
        }

        let offerings = app.catalog.offerings(&self.restaurant_id);
        let mut entries = Vec::with_capacity(self.selections.len());

        for input in &self.selections {
            let offering = offerings
                .iter()
                .find(|offering| {
                    offering.offering_id == input.offering_id
                        && offering.date_key == input.date_key
                        && offering.meal_type == input.meal_type
                })
                .ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "{} is not offered for {} on {}",
                        input.offering_id, input.meal_type, input.date_key
                    ))
                })?;

            entries.push(SelectionEntry {
                key: SelectionKey::from(offering),
                quantity: input.quantity,
                unit_price: offering.unit_price,
                offering_name: offering.name.to_owned(),
            });
        }

        let ledger = SelectionLedger::restore(entries);

        Ok(SubscriptionProposal::draft(
            self.plan_type,
            self.restaurant_id.to_owned(),
            &ledger,
            now,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub plan_type: PlanType,
    pub selections: Vec<SelectionEntry>,
    pub pricing: Pricing,
    pub display: DisplayPricing,
    pub total_quantity: u64,
    pub minimum_quantity: u32,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<String>,
    /// Next date the rejected slot's meal type can still be ordered for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_orderable_date: Option<DateKey>,
}

#[tracing::instrument(skip(app))]
pub async fn quote(
    State(app): State<AppState>,
    Json(input): Json<SubscriptionRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let now = app.clock.now();
    let draft = input.proposal(&app, now)?;
    let pricing = draft.pricing();
    let outcome = validate(&draft, now);

    let next_orderable = match &outcome {
        Err(EngineError::CutoffViolation { slot, .. }) => {
            Some(next_orderable_date(slot.meal_type, now))
        }
        _ => None,
    };

    Ok(Json(QuoteResponse {
        plan_type: draft.plan_type,
        total_quantity: draft.total_quantity(),
        minimum_quantity: draft.plan_type.minimum_quantity(),
        display: pricing.rounded(),
        pricing,
        valid: outcome.is_ok(),
        violation: outcome.err().map(|err| err.to_string()),
        next_orderable_date: next_orderable,
        selections: draft.selections,
    }))
}

#[tracing::instrument(skip(app))]
pub async fn submit(
    State(app): State<AppState>,
    Json(input): Json<SubscriptionRequest>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let now = app.clock.now();
    let draft = input.proposal(&app, now)?;
    let subscription = SubscriptionLifecycle::new(&app.orders).submit(&draft, now)?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn show(
    State(app): State<AppState>,
    Path((id,)): Path<(String,)>,
) -> Result<Json<Subscription>, AppError> {
    app.orders
        .get(&id)?
        .map(Json)
        .ok_or(AppError::SubscriptionNotFound(id))
}

#[tracing::instrument(skip(app))]
pub async fn cancel(
    State(app): State<AppState>,
    Path((id,)): Path<(String,)>,
) -> Result<Json<CancellationOutcome>, AppError> {
    app.orders
        .cancel(&id, app.clock.now())?
        .map(Json)
        .ok_or(AppError::SubscriptionNotFound(id))
}
