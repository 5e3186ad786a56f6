use axum::{
    Json,
    extract::{Query, State},
};
use mealsub_schedule::{CalendarDay, generate, resolve_anchor};
use mealsub_shared::{DateKey, View};
use serde::Deserialize;

use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    pub view: View,
    /// Free text on purpose: anything unparsable falls back to today.
    pub anchor: Option<String>,
}

impl CalendarQuery {
    pub fn window(&self, today: DateKey) -> Vec<CalendarDay> {
        let anchor = resolve_anchor(self.anchor.as_deref(), today);

        generate(self.view, today, Some(anchor))
    }
}

#[tracing::instrument(skip(app))]
pub async fn window(
    State(app): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Json<Vec<CalendarDay>> {
    let today = DateKey::today(app.clock.now());

    Json(query.window(today))
}
