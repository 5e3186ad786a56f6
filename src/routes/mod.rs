use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{catalog::InMemoryCatalog, clock::Clock, orders::OrderBook};

mod calendar;
mod health;
mod menu;
mod subscriptions;

pub use calendar::CalendarQuery;
pub use menu::{MenuDay, MenuSlot};
pub use subscriptions::{QuoteResponse, SelectionInput, SubscriptionRequest};

#[derive(Clone)]
pub struct AppState {
    pub clock: Clock,
    pub catalog: Arc<InMemoryCatalog>,
    pub orders: OrderBook,
}

impl AppState {
    pub fn new(clock: Clock, catalog: InMemoryCatalog) -> Self {
        Self {
            clock,
            catalog: Arc::new(catalog),
            orders: OrderBook::new(),
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/calendar", get(calendar::window))
        .route("/restaurants/{id}/menu", get(menu::menu))
        .route("/subscriptions", post(subscriptions::submit))
        .route("/subscriptions/quote", post(subscriptions::quote))
        .route("/subscriptions/{id}", get(subscriptions::show))
        .route("/subscriptions/{id}/cancel", post(subscriptions::cancel))
        .with_state(app_state)
}
