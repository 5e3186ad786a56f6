use mealsub::{clock, config::Config};
use mealsub_schedule::{generate, resolve_anchor};
use mealsub_shared::{DateKey, View};

pub fn print(config: Config, view: View, anchor: Option<String>) -> anyhow::Result<()> {
    let today = DateKey::today(clock::now_in(&config.kitchen.timezone));
    let anchor = resolve_anchor(anchor.as_deref(), today);

    for day in generate(view, today, Some(anchor)) {
        let marker = if day.is_today { " (today)" } else { "" };
        println!("{} {}{marker}", day.date_key, day.weekday);
    }

    Ok(())
}
