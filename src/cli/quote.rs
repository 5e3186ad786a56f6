use std::path::PathBuf;

use anyhow::Context;
use mealsub::{clock, config::Config};
use mealsub_shared::PlanType;
use mealsub_subscription::{SelectionLedger, price};

/// Prices a saved ledger snapshot, a JSON list of selection entries.
pub fn print(config: Config, plan_type: PlanType, file: PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading selections {}", file.display()))?;
    let ledger: SelectionLedger = serde_json::from_str(&raw)
        .with_context(|| format!("parsing selections {}", file.display()))?;

    let now = clock::now_in(&config.kitchen.timezone);
    let stale = ledger
        .iter()
        .filter(|entry| !mealsub_schedule::is_orderable(entry.key.date_key, entry.key.meal_type, now))
        .count();

    let display = price(&ledger.entries(), plan_type).rounded();
    let minimum = plan_type.minimum_quantity();

    println!(
        "{plan_type} plan, {} meals over {} days",
        ledger.total_quantity(),
        ledger.total_days()
    );
    println!("subtotal  {:>8}", display.subtotal);
    println!("discount  {:>8}", display.discount);
    println!("total     {:>8}", display.total);

    if ledger.total_quantity() < u64::from(minimum) {
        println!("needs at least {minimum} meals");
    }
    if stale > 0 {
        println!("{stale} selection(s) past their cutoff");
    }

    Ok(())
}
