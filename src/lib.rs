pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod observability;
pub mod orders;
pub mod routes;

pub use routes::AppState;

/// Create app router for testing
///
/// Builds the router over the given catalog with a fixed clock, without
/// binding a listener.
pub fn create_app(catalog: catalog::InMemoryCatalog, now: time::OffsetDateTime) -> axum::Router {
    routes::router(AppState::new(clock::Clock::Fixed(now), catalog))
}
