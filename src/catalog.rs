use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use mealsub_schedule::{MealOffering, OfferingSource};

/// Offerings grouped per restaurant, kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    restaurants: HashMap<String, Vec<MealOffering>>,
}

impl InMemoryCatalog {
    pub fn new(offerings: impl IntoIterator<Item = MealOffering>) -> Self {
        let mut restaurants: HashMap<String, Vec<MealOffering>> = HashMap::new();

        for offering in offerings {
            restaurants
                .entry(offering.restaurant_id.to_owned())
                .or_default()
                .push(offering);
        }

        Self { restaurants }
    }

    /// Reads a JSON array of offerings.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let offerings: Vec<MealOffering> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing catalog {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            offerings = offerings.len(),
            "Catalog loaded"
        );

        Ok(Self::new(offerings))
    }

    pub fn contains(&self, restaurant_id: &str) -> bool {
        self.restaurants.contains_key(restaurant_id)
    }

    pub fn len(&self) -> usize {
        self.restaurants.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}

impl OfferingSource for InMemoryCatalog {
    fn offerings(&self, restaurant_id: &str) -> Vec<MealOffering> {
        self.restaurants
            .get(restaurant_id)
            .cloned()
            .unwrap_or_default()
    }
}
