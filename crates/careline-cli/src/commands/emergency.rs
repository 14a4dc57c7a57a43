use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use careline_core::{
    AlertView, Config, EmergencyAlertController, EmergencySession, Event, LoggingNotifier, Phase,
    COUNTDOWN_DURATION,
};
use clap::Subcommand;
use tokio::sync::broadcast::error::RecvError;

use super::CommandResult;

#[derive(Subcommand)]
pub enum EmergencyAction {
    /// Start a live countdown and print events until it settles
    Run {
        /// Declare "I'm safe" after this many seconds, cancelling the
        /// countdown or the active alert. Without it the command exits once
        /// contacts are notified. Ctrl-C cancels in either case.
        #[arg(long, value_name = "SECS")]
        safe_after: Option<u64>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Step the countdown by hand, without a timer
    Simulate {
        /// Number of ticks to apply after activation
        #[arg(long, default_value_t = COUNTDOWN_DURATION)]
        ticks: u32,
        /// Cancel once this many ticks have been applied
        #[arg(long, value_name = "K")]
        cancel_after: Option<u32>,
        /// Print events and final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the current (idle) state and view as JSON
    Status,
}

pub fn run(action: EmergencyAction, config_path: &Path) -> CommandResult {
    let config = Config::load_from(config_path)?;

    match action {
        EmergencyAction::Run { safe_after, json } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_live(&config, safe_after.map(Duration::from_secs), json))?;
        }
        EmergencyAction::Simulate {
            ticks,
            cancel_after,
            json,
        } => simulate(&config, ticks, cancel_after, json)?,
        EmergencyAction::Status => {
            let controller = controller_from(&config);
            let state = controller.state();
            let view = AlertView::from_state(&state);
            let out = serde_json::json!({
                "state": state,
                "view": view,
                "contacts": controller.directory().len(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn controller_from(config: &Config) -> EmergencyAlertController {
    let notifier = Arc::new(LoggingNotifier::new(config.emergency.share_location));
    EmergencyAlertController::new(config.contacts.clone(), notifier)
}

async fn run_live(config: &Config, safe_after: Option<Duration>, json: bool) -> CommandResult {
    let session = EmergencySession::from_config(config)?;
    let mut events = session.subscribe();
    session.activate();

    let safe_timer = async {
        match safe_after {
            Some(delay) => tokio::time::sleep(delay).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(safe_timer);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let waits_for_safe = safe_after.is_some();
    let mut ctrl_c_armed = true;
    let mut cancel_requested = false;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    print_event(&event, json)?;
                    if ends_live_run(&event, waits_for_safe) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut safe_timer, if !cancel_requested => {
                cancel_requested = true;
                session.cancel();
            }
            signal = &mut ctrl_c, if !cancel_requested && ctrl_c_armed => match signal {
                Ok(()) => {
                    cancel_requested = true;
                    session.cancel();
                }
                Err(e) => {
                    ctrl_c_armed = false;
                    tracing::warn!(error = %e, "Ctrl-C handler unavailable");
                }
            },
        }
    }

    if !json && session.phase() == Phase::Active {
        println!("Alert is active. Sharing location with your emergency contacts.");
    }
    Ok(())
}

fn simulate(config: &Config, ticks: u32, cancel_after: Option<u32>, json: bool) -> CommandResult {
    let mut controller = controller_from(config);
    let mut events: Vec<Event> = Vec::new();

    events.extend(controller.activate());
    let applied = cancel_after.map_or(ticks, |k| k.min(ticks));
    for _ in 0..applied {
        events.extend(controller.tick());
    }
    if cancel_after.is_some_and(|k| k <= ticks) {
        events.extend(controller.cancel());
    }

    let state = controller.state();
    if json {
        let view = AlertView::from_state(&state);
        let out = serde_json::json!({
            "events": events,
            "state": state,
            "view": view,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for event in &events {
            print_event(event, false)?;
        }
        println!(
            "Final state: {} ({}s remaining, {} contacts notified)",
            phase_label(state.phase),
            state.remaining_secs,
            state.notified_contacts.len()
        );
    }
    Ok(())
}

/// Cancel always ends the run. Escalation ends it only when nobody is going
/// to declare "I'm safe".
fn ends_live_run(event: &Event, waits_for_safe: bool) -> bool {
    match event {
        Event::EmergencyCancelled { .. } => true,
        Event::EmergencyEscalated { .. } => !waits_for_safe,
        _ => false,
    }
}

fn print_event(event: &Event, json: bool) -> CommandResult {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{}", describe(event));
    }
    Ok(())
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::CountingDown => "counting down",
        Phase::Active => "active",
    }
}

/// Human-readable line for an event.
fn describe(event: &Event) -> String {
    match event {
        Event::EmergencyActivated { countdown_secs, .. } => format!(
            "Emergency activated. Contacts will be notified in {countdown_secs} seconds"
        ),
        Event::CountdownTick { remaining_secs, .. } => format!("  {remaining_secs}..."),
        Event::EmergencyEscalated {
            notified_contacts, ..
        } => {
            let names: Vec<String> = notified_contacts
                .iter()
                .map(|c| format!("{} ({})", c.name, c.relationship))
                .collect();
            format!(
                "Help is on the way! Contacted: {}",
                if names.is_empty() {
                    "nobody (contact list is empty)".to_string()
                } else {
                    names.join(", ")
                }
            )
        }
        Event::EmergencyCancelled { from_phase, .. } => match from_phase {
            Phase::Active => "Alert cancelled. Glad you're safe.".to_string(),
            _ => "Emergency cancelled before contacts were notified.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careline_core::ContactDirectory;
    use chrono::Utc;

    #[test]
    fn describe_lists_contacts_on_escalation() {
        let event = Event::EmergencyEscalated {
            activation_id: 1,
            notified_contacts: ContactDirectory::mock().contacts()[..2].to_vec(),
            at: Utc::now(),
        };
        assert_eq!(
            describe(&event),
            "Help is on the way! Contacted: Sarah Johnson (Spouse), Dr. Michael Chen (Primary Physician)"
        );
    }

    #[test]
    fn describe_distinguishes_cancel_source() {
        let early = Event::EmergencyCancelled {
            activation_id: 1,
            from_phase: Phase::CountingDown,
            at: Utc::now(),
        };
        let late = Event::EmergencyCancelled {
            activation_id: 1,
            from_phase: Phase::Active,
            at: Utc::now(),
        };
        assert!(describe(&early).contains("before contacts were notified"));
        assert!(describe(&late).contains("safe"));
    }

    #[test]
    fn cancel_always_ends_the_live_run() {
        let tick = Event::CountdownTick {
            activation_id: 1,
            remaining_secs: 2,
            at: Utc::now(),
        };
        assert!(!ends_live_run(&tick, false));
        let cancelled = Event::EmergencyCancelled {
            activation_id: 1,
            from_phase: Phase::Active,
            at: Utc::now(),
        };
        assert!(ends_live_run(&cancelled, false));
        assert!(ends_live_run(&cancelled, true));
    }

    #[test]
    fn escalation_keeps_the_run_open_while_waiting_for_safe() {
        let escalated = Event::EmergencyEscalated {
            activation_id: 1,
            notified_contacts: ContactDirectory::mock().contacts().to_vec(),
            at: Utc::now(),
        };
        assert!(ends_live_run(&escalated, false));
        assert!(!ends_live_run(&escalated, true));
    }
}
