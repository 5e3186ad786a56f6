use std::collections::{BTreeMap, BTreeSet};

use mealsub_schedule::{MealOffering, MenuIndex, check_orderable, is_orderable};
use mealsub_shared::{DateKey, MealType, Result, Slot};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identity of a selection: one offering in one meal slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub date_key: DateKey,
    pub meal_type: MealType,
    pub offering_id: String,
}

impl SelectionKey {
    pub fn new(date_key: DateKey, meal_type: MealType, offering_id: impl Into<String>) -> Self {
        Self {
            date_key,
            meal_type,
            offering_id: offering_id.into(),
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.date_key, self.meal_type)
    }
}

impl From<&MealOffering> for SelectionKey {
    fn from(value: &MealOffering) -> Self {
        Self::new(value.date_key, value.meal_type, value.offering_id.to_owned())
    }
}

/// A chosen offering with the price and name it had when it was picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub key: SelectionKey,
    pub quantity: u32,
    pub unit_price: f64,
    pub offering_name: String,
}

impl SelectionEntry {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// In-progress selections of one customer session.
///
/// Holds at most one entry per [`SelectionKey`] and never stores a zero
/// quantity. Serializes as the plain list of its entries so a session can be
/// saved and restored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SelectionEntry>", into = "Vec<SelectionEntry>")]
pub struct SelectionLedger {
    entries: BTreeMap<SelectionKey, SelectionEntry>,
}

impl SelectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from saved entries. A repeated key keeps its last
    /// entry, zero quantities are dropped.
    pub fn restore(entries: impl IntoIterator<Item = SelectionEntry>) -> Self {
        let mut ledger = Self::default();

        for entry in entries {
            if entry.quantity == 0 {
                ledger.entries.remove(&entry.key);
                continue;
            }

            ledger.entries.insert(entry.key.clone(), entry);
        }

        ledger
    }

    /// Picks `offering`, replacing any previous entry for the same key.
    ///
    /// The slot must pass the cutoff at `now`. Price and name are captured
    /// here and never re-read. A quantity of zero removes the entry.
    pub fn select(
        &mut self,
        offering: &MealOffering,
        quantity: u32,
        now: OffsetDateTime,
    ) -> Result<()> {
        let key = SelectionKey::from(offering);
        check_orderable(key.slot(), now)?;

        if quantity == 0 {
            self.entries.remove(&key);
            return Ok(());
        }

        tracing::debug!(
            slot = %key.slot(),
            offering_id = %key.offering_id,
            quantity,
            "meal selected"
        );

        self.entries.insert(
            key.clone(),
            SelectionEntry {
                key,
                quantity,
                unit_price: offering.unit_price,
                offering_name: offering.name.to_owned(),
            },
        );

        Ok(())
    }

    /// Changes the count of an existing entry, below one removes it and
    /// anything above `u32::MAX` is clamped to it.
    ///
    /// Not cutoff gated: only the first pick and the final submission are.
    /// Returns whether the key is still selected afterwards.
    pub fn set_quantity(&mut self, key: &SelectionKey, quantity: i64) -> bool {
        if quantity < 1 {
            self.entries.remove(key);
            return false;
        }

        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };

        entry.quantity = match u32::try_from(quantity) {
            Ok(quantity) => quantity,
            Err(_) => {
                tracing::warn!(
                    slot = %key.slot(),
                    offering_id = %key.offering_id,
                    requested = quantity,
                    "quantity clamped to {}",
                    u32::MAX
                );
                u32::MAX
            }
        };

        true
    }

    /// Always allowed, even past the cutoff.
    pub fn deselect(&mut self, key: &SelectionKey) -> Option<SelectionEntry> {
        self.entries.remove(key)
    }

    /// Selects one portion of the first offering on every still orderable `meal_type`
    /// slot of `menu`, replacing what was chosen there before.
    ///
    /// Returns the number of slots filled.
    pub fn select_all_of_type(
        &mut self,
        meal_type: MealType,
        menu: &MenuIndex,
        now: OffsetDateTime,
    ) -> usize {
        let mut filled = 0;

        for (date, day) in menu.iter() {
            if !is_orderable(*date, meal_type, now) {
                continue;
            }

            let Some(first) = day.slot(meal_type).first() else {
                continue;
            };

            self.clear(Some(*date), Some(meal_type));

            let key = SelectionKey::from(first);
            self.entries.insert(
                key.clone(),
                SelectionEntry {
                    key,
                    quantity: 1,
                    unit_price: first.unit_price,
                    offering_name: first.name.to_owned(),
                },
            );

            filled += 1;
        }

        tracing::debug!(%meal_type, filled, "selected all slots of meal type");

        filled
    }

    /// Removes every entry matching both filters, no filter clears everything.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self, date: Option<DateKey>, meal_type: Option<MealType>) -> usize {
        let before = self.entries.len();

        self.entries.retain(|key, _| {
            let date_matches = date.is_none_or(|date| key.date_key == date);
            let meal_matches = meal_type.is_none_or(|meal_type| key.meal_type == meal_type);

            !(date_matches && meal_matches)
        });

        before - self.entries.len()
    }

    pub fn get(&self, key: &SelectionKey) -> Option<&SelectionEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.values()
    }

    /// Snapshot of the entries, ordered by date, meal type then offering.
    pub fn entries(&self) -> Vec<SelectionEntry> {
        self.entries.values().cloned().collect()
    }

    /// Entries of `slot`.
    pub fn slot(&self, slot: Slot) -> Vec<&SelectionEntry> {
        self.entries
            .values()
            .filter(|entry| entry.key.slot() == slot)
            .collect()
    }

    pub fn by_day(&self) -> BTreeMap<DateKey, Vec<&SelectionEntry>> {
        let mut days: BTreeMap<DateKey, Vec<&SelectionEntry>> = BTreeMap::new();

        for entry in self.entries.values() {
            days.entry(entry.key.date_key).or_default().push(entry);
        }

        days
    }

    /// Sum of all quantities, widened so it cannot overflow.
    pub fn total_quantity(&self) -> u64 {
        self.entries
            .values()
            .map(|entry| u64::from(entry.quantity))
            .sum()
    }

    pub fn total_days(&self) -> usize {
        self.entries
            .keys()
            .map(|key| key.date_key)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Number of distinct (date, meal type, offering) entries.
    pub fn total_distinct_items(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<SelectionEntry>> for SelectionLedger {
    fn from(value: Vec<SelectionEntry>) -> Self {
        Self::restore(value)
    }
}

impl From<SelectionLedger> for Vec<SelectionEntry> {
    fn from(value: SelectionLedger) -> Self {
        value.entries.into_values().collect()
    }
}
