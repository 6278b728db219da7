//! Interactive session: a single-threaded event loop that interleaves the
//! accrual tick with intents typed on stdin.
//!
//! The loop sleeps until the controller's next tick is due (only while an
//! activity runs) or until a line arrives, whichever comes first. Both arms
//! run on the same thread, so every intent sees the state left by the latest
//! tick.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracktime_core::{Event, Tracker};

use super::{format_minutes, open_tracker, parse_minutes, render_list, resolve};

const HELP: &str = "\
commands:
  add [name]            add an activity
  rename <n> <name>     rename activity n
  toggle <n>            start or stop activity n
  start <n> | stop <n>  start or stop activity n
  clear <n>             reset activity n to zero
  set <n> <minutes>     overwrite accrued minutes of a stopped activity
  delete <n>            delete a stopped activity
  list | status         show activities / full state as JSON
  quit                  stop any running timer and exit
<n> is a list position (1-based) or an id";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Add(Option<String>),
    Rename(String, String),
    Toggle(String),
    Start(String),
    Stop(String),
    Clear(String),
    Set(String, String),
    Delete(String),
    List,
    Status,
    Help,
    Quit,
}

/// What the loop should show after a command.
enum Outcome {
    Event(Event),
    Message(String),
    Quit,
}

pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let target = || {
        if rest.is_empty() {
            Err(format!("'{verb}' needs an activity"))
        } else {
            Ok(rest.to_string())
        }
    };
    let target_and_value = || match rest.split_once(char::is_whitespace) {
        Some((target, value)) if !value.trim().is_empty() => {
            Ok((target.to_string(), value.trim().to_string()))
        }
        _ => Err(format!("'{verb}' needs an activity and a value")),
    };

    match verb.to_lowercase().as_str() {
        "add" => Ok(SessionCommand::Add((!rest.is_empty()).then(|| rest.to_string()))),
        "rename" => target_and_value().map(|(t, v)| SessionCommand::Rename(t, v)),
        "toggle" | "t" => target().map(SessionCommand::Toggle),
        "start" => target().map(SessionCommand::Start),
        "stop" => target().map(SessionCommand::Stop),
        "clear" => target().map(SessionCommand::Clear),
        "set" => target_and_value().map(|(t, v)| SessionCommand::Set(t, v)),
        "delete" | "rm" => target().map(SessionCommand::Delete),
        "list" | "ls" | "" => Ok(SessionCommand::List),
        "status" => Ok(SessionCommand::Status),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn execute(tracker: &mut Tracker, command: SessionCommand) -> Result<Outcome, String> {
    let id_of = |tracker: &Tracker, reference: &str| resolve(tracker.store().activities(), reference);
    let event = match command {
        SessionCommand::Add(name) => match name {
            Some(name) => tracker.add_named(name).1,
            None => tracker.add_activity().1,
        },
        SessionCommand::Rename(reference, name) => {
            let id = id_of(tracker, &reference)?;
            tracker.edit_name(&id, name).map_err(|e| e.to_string())?
        }
        SessionCommand::Toggle(reference) => {
            let id = id_of(tracker, &reference)?;
            tracker.toggle_running(&id).map_err(|e| e.to_string())?
        }
        SessionCommand::Start(reference) => {
            let id = id_of(tracker, &reference)?;
            match tracker.start(&id).map_err(|e| e.to_string())? {
                Some(event) => event,
                None => return Ok(Outcome::Message("already running".into())),
            }
        }
        SessionCommand::Stop(reference) => {
            let id = id_of(tracker, &reference)?;
            match tracker.stop(&id).map_err(|e| e.to_string())? {
                Some(event) => event,
                None => return Ok(Outcome::Message("not running".into())),
            }
        }
        SessionCommand::Clear(reference) => {
            let id = id_of(tracker, &reference)?;
            tracker.clear_time(&id).map_err(|e| e.to_string())?
        }
        SessionCommand::Set(reference, minutes) => {
            let id = id_of(tracker, &reference)?;
            let minutes = parse_minutes(&minutes)?;
            tracker.edit_time(&id, minutes).map_err(|e| e.to_string())?
        }
        SessionCommand::Delete(reference) => {
            let id = id_of(tracker, &reference)?;
            tracker.delete_activity(&id).map_err(|e| e.to_string())?
        }
        SessionCommand::List => {
            let store = tracker.store();
            return Ok(Outcome::Message(render_list(store.activities(), store.now_ms())));
        }
        SessionCommand::Status => tracker.state_snapshot(),
        SessionCommand::Help => return Ok(Outcome::Message(HELP.to_string())),
        SessionCommand::Quit => return Ok(Outcome::Quit),
    };
    Ok(Outcome::Event(event))
}

/// Human-readable one-liner for an event.
fn describe(event: &Event) -> String {
    match event {
        Event::ActivityAdded { name, .. } => format!("added {name}"),
        Event::ActivityRenamed { name, .. } => format!("renamed to {name}"),
        Event::TimerStarted { name, .. } => format!("started {name}"),
        Event::TimerStopped {
            name,
            added_minutes,
            elapsed_minutes,
            ..
        } => format!(
            "stopped {name}: +{} (total {})",
            format_minutes(*added_minutes),
            format_minutes(*elapsed_minutes)
        ),
        Event::TimeCleared { running: true, .. } => "cleared; still running".to_string(),
        Event::TimeCleared { .. } => "cleared".to_string(),
        Event::TimeEdited { elapsed_minutes, .. } => {
            format!("time set to {}", format_minutes(*elapsed_minutes))
        }
        Event::ActivityDeleted { name, .. } => format!("deleted {name}"),
        Event::Ticked { elapsed_minutes, .. } => format_minutes(*elapsed_minutes),
        Event::TimerStateChanged { state, .. } => format!("timer {state:?}").to_lowercase(),
        Event::StateSnapshot { .. } => serde_json::to_string_pretty(event).unwrap_or_default(),
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn event(&self, event: &Event) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "failed to encode event"),
            }
        } else {
            println!("{}", describe(event));
        }
    }

    fn tick(&self, event: &Event) {
        if self.json {
            self.event(event);
        }
    }

    fn message(&self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "type": "Message", "message": message }));
        } else {
            println!("{message}");
        }
    }

    fn error(&self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "type": "Error", "message": message }));
        } else {
            eprintln!("error: {message}");
        }
    }
}

async fn event_loop(tracker: &mut Tracker, out: &Output) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let wait = tracker.next_tick_in_ms();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(wait.unwrap_or(0))), if wait.is_some() => {
                if let Some(event) = tracker.pump() {
                    out.tick(&event);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let outcome = parse_command(&line).and_then(|cmd| execute(tracker, cmd));
                match outcome {
                    Ok(Outcome::Event(event)) => out.event(&event),
                    Ok(Outcome::Message(message)) => out.message(&message),
                    Ok(Outcome::Quit) => break,
                    Err(message) => out.error(&message),
                }
            }
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}

pub fn run(start: Option<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;
    let out = Output { json };

    if let Some(reference) = start {
        match execute(&mut tracker, SessionCommand::Start(reference)) {
            Ok(Outcome::Event(event)) => out.event(&event),
            Ok(Outcome::Message(message)) => out.message(&message),
            Ok(Outcome::Quit) => {}
            Err(message) => return Err(message.into()),
        }
    }
    if !json {
        println!("{}", render_list(tracker.store().activities(), tracker.store().now_ms()));
        println!("type 'help' for commands");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;
    let result = runtime.block_on(event_loop(&mut tracker, &out));
    // A pending stdin read sits on a blocking thread; don't wait for it.
    runtime.shutdown_timeout(Duration::from_millis(100));

    if let Some(event) = tracker.shutdown() {
        out.event(&event);
    }
    result?;
    Ok(())
}
