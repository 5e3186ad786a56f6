use axum::{
    Json,
    extract::{Path, Query, State},
};
use mealsub_schedule::{CalendarDay, MealOffering, MenuIndex, OfferingSource, cutoff_for, is_orderable};
use mealsub_shared::{DateKey, MealType};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    error::AppError,
    routes::{AppState, CalendarQuery},
};

#[derive(Debug, Serialize)]
pub struct MenuSlot {
    /// Evaluated when the response is built, never cached.
    pub orderable: bool,
    pub cutoff: String,
    pub offerings: Vec<MealOffering>,
}

impl MenuSlot {
    fn new(menu: &MenuIndex, date_key: DateKey, meal_type: MealType, now: OffsetDateTime) -> Self {
        let cutoff = cutoff_for(meal_type);

        Self {
            orderable: is_orderable(date_key, meal_type, now),
            cutoff: format!("{:02}:{:02}", cutoff.hour(), cutoff.minute()),
            offerings: menu.slot(date_key, meal_type).to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenuDay {
    #[serde(flatten)]
    pub day: CalendarDay,
    pub lunch: MenuSlot,
    pub dinner: MenuSlot,
}

#[tracing::instrument(skip(app))]
pub async fn menu(
    State(app): State<AppState>,
    Path((restaurant_id,)): Path<(String,)>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<MenuDay>>, AppError> {
    if !app.catalog.contains(&restaurant_id) {
        return Err(AppError::RestaurantNotFound(restaurant_id));
    }

    let now = app.clock.now();
    let window = query.window(DateKey::today(now));
    let menu = MenuIndex::new(&app.catalog.offerings(&restaurant_id), &window);

    let days = window
        .into_iter()
        .map(|day| MenuDay {
            lunch: MenuSlot::new(&menu, day.date_key, MealType::Lunch, now),
            dinner: MenuSlot::new(&menu, day.date_key, MealType::Dinner, now),
            day,
        })
        .collect();

    Ok(Json(days))
}
