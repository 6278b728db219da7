pub mod activity;
pub mod config;
pub mod session;

use std::sync::Arc;

use tracktime_core::{Activity, ActivityId, Config, Database, SystemClock, Tracker};

/// Open the tracker over the on-disk database with the user's configuration.
pub fn open_tracker() -> Result<Tracker, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    Ok(Tracker::open(&config, db, Arc::new(SystemClock)))
}

/// Resolve a 1-based list position, a full id, or a unique id prefix.
pub fn resolve(activities: &[Activity], reference: &str) -> Result<ActivityId, String> {
    let reference = reference.trim();
    if let Ok(position) = reference.parse::<usize>() {
        if let Some(activity) = position.checked_sub(1).and_then(|i| activities.get(i)) {
            return Ok(activity.id().clone());
        }
    }
    if let Some(activity) = activities.iter().find(|a| a.id().as_str() == reference) {
        return Ok(activity.id().clone());
    }

    let mut matches = activities
        .iter()
        .filter(|a| !reference.is_empty() && a.id().as_str().starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(activity), None) => Ok(activity.id().clone()),
        (Some(_), Some(_)) => Err(format!("ambiguous activity: {reference}")),
        _ => Err(format!("no activity matches '{reference}'")),
    }
}

/// Parse a manual time edit. Rounds to hundredths of a minute.
pub fn parse_minutes(input: &str) -> Result<f64, String> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid input: '{input}' is not a number of minutes"))?;
    if !value.is_finite() {
        return Err(format!("invalid input: '{input}' is not a number of minutes"));
    }
    Ok((value * 100.0).round() / 100.0)
}

pub fn format_minutes(minutes: f64) -> String {
    format!("{minutes:.2} min")
}

/// One line per activity, running marked with `*`.
pub fn render_list(activities: &[Activity], now_ms: u64) -> String {
    if activities.is_empty() {
        return "no activities".to_string();
    }
    activities
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let marker = if a.is_running() { '*' } else { ' ' };
            format!(
                "{:>3} {marker} {:<24} {:>12}  {}",
                i + 1,
                a.name(),
                format_minutes(a.live_minutes(now_ms)),
                short_id(a.id()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn short_id(id: &ActivityId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}
