//! One-shot intents against the persisted activity list.
//!
//! Each invocation loads, applies one intent, and exits. Timers only run
//! inside `tracktime session`, since a reload restores every activity stopped.

use tracktime_core::Event;

use super::{open_tracker, parse_minutes, render_list, resolve};

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    if json {
        print_event(&tracker.state_snapshot())?;
    } else {
        println!("{}", render_list(tracker.store().activities(), tracker.store().now_ms()));
    }
    Ok(())
}

pub fn add(name: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    let (_, event) = match name {
        Some(name) => tracker.add_named(name),
        None => tracker.add_activity(),
    };
    print_event(&event)
}

pub fn rename(reference: &str, name: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    let id = resolve(tracker.store().activities(), reference)?;
    print_event(&tracker.edit_name(&id, name)?)
}

pub fn set_time(reference: &str, minutes: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    let id = resolve(tracker.store().activities(), reference)?;
    let minutes = parse_minutes(minutes)?;
    print_event(&tracker.edit_time(&id, minutes)?)
}

pub fn clear(reference: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    let id = resolve(tracker.store().activities(), reference)?;
    print_event(&tracker.clear_time(&id)?)
}

pub fn delete(reference: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    let id = resolve(tracker.store().activities(), reference)?;
    print_event(&tracker.delete_activity(&id)?)
}
