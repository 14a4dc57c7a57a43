//! Emergency alert state machine.
//!
//! Like the rest of the core, the controller owns no threads or timers: the
//! caller drives it by calling `tick()` once per second while it is counting
//! down. [`EmergencySession`](super::EmergencySession) does exactly that with
//! a tokio interval.
//!
//! ## State Transitions
//!
//! ```text
//!          activate()           tick() x COUNTDOWN_DURATION
//!  Idle ───────────────► CountingDown ───────────────────────► Active
//!   ▲                         │                                  │
//!   └──────── cancel() ───────┴──────────── cancel() ────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = EmergencyAlertController::new(directory, notifier);
//! controller.activate();
//! // Once per second:
//! controller.tick(); // Returns EmergencyEscalated on the last tick
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::notifier::Notifier;
use crate::contacts::{ContactDirectory, EmergencyContact};
use crate::events::Event;

/// Seconds between activation and automatic escalation. Also the value
/// `remaining_secs` resets to whenever the controller is idle.
pub const COUNTDOWN_DURATION: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    CountingDown,
    /// Contacts have been notified. Stays here until cancelled.
    Active,
}

/// Render-ready snapshot of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub phase: Phase,
    pub remaining_secs: u32,
    pub notified_contacts: Vec<EmergencyContact>,
}

impl AlertState {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            remaining_secs: COUNTDOWN_DURATION,
            notified_contacts: Vec::new(),
        }
    }
}

impl Default for AlertState {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Idle,
    CountingDown { remaining_secs: u32 },
    Active { notified: Vec<EmergencyContact> },
}

/// Drives an emergency activation from trigger through countdown to alert.
pub struct EmergencyAlertController {
    directory: ContactDirectory,
    notifier: Arc<dyn Notifier>,
    stage: Stage,
    /// Incremented on every accepted `activate()`; 0 before the first one.
    activation_id: u64,
}

impl EmergencyAlertController {
    /// Create an idle controller over a contact directory.
    pub fn new(directory: ContactDirectory, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            directory,
            notifier,
            stage: Stage::Idle,
            activation_id: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::CountingDown { .. } => Phase::CountingDown,
            Stage::Active { .. } => Phase::Active,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        match self.stage {
            Stage::Idle => COUNTDOWN_DURATION,
            Stage::CountingDown { remaining_secs } => remaining_secs,
            Stage::Active { .. } => 0,
        }
    }

    pub fn notified_contacts(&self) -> &[EmergencyContact] {
        match &self.stage {
            Stage::Active { notified } => notified,
            _ => &[],
        }
    }

    pub fn activation_id(&self) -> u64 {
        self.activation_id
    }

    pub fn directory(&self) -> &ContactDirectory {
        &self.directory
    }

    /// Current state for rendering. Pure read.
    pub fn state(&self) -> AlertState {
        AlertState {
            phase: self.phase(),
            remaining_secs: self.remaining_secs(),
            notified_contacts: self.notified_contacts().to_vec(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown. No-op unless idle.
    pub fn activate(&mut self) -> Option<Event> {
        if self.stage != Stage::Idle {
            return None;
        }
        self.activation_id += 1;
        self.stage = Stage::CountingDown {
            remaining_secs: COUNTDOWN_DURATION,
        };
        tracing::info!(
            activation_id = self.activation_id,
            countdown_secs = COUNTDOWN_DURATION,
            "Emergency activated"
        );
        Some(Event::EmergencyActivated {
            activation_id: self.activation_id,
            countdown_secs: COUNTDOWN_DURATION,
            at: Utc::now(),
        })
    }

    /// Return to idle from any phase. Returns `None` if already idle.
    pub fn cancel(&mut self) -> Option<Event> {
        let from_phase = self.phase();
        if from_phase == Phase::Idle {
            return None;
        }
        self.stage = Stage::Idle;
        tracing::info!(
            activation_id = self.activation_id,
            from_phase = ?from_phase,
            "Emergency cancelled"
        );
        Some(Event::EmergencyCancelled {
            activation_id: self.activation_id,
            from_phase,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// The tick that reaches zero moves to `Active` and fires the notifier
    /// with the whole directory. Ticks outside `CountingDown` do nothing.
    pub fn tick(&mut self) -> Option<Event> {
        let (event, pending) = self.advance()?;
        if let Some(pending) = pending {
            pending.dispatch();
        }
        Some(event)
    }

    /// Like [`tick`](Self::tick), but an escalation's notify call is handed
    /// back instead of made, so the caller can run it after releasing locks.
    pub(crate) fn tick_deferred(&mut self) -> Option<(Event, Option<PendingNotify>)> {
        self.advance()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) -> Option<(Event, Option<PendingNotify>)> {
        let Stage::CountingDown { remaining_secs } = &mut self.stage else {
            return None;
        };
        *remaining_secs = remaining_secs.saturating_sub(1);
        let remaining = *remaining_secs;
        if remaining > 0 {
            tracing::debug!(
                activation_id = self.activation_id,
                remaining_secs = remaining,
                "Emergency countdown tick"
            );
            let event = Event::CountdownTick {
                activation_id: self.activation_id,
                remaining_secs: remaining,
                at: Utc::now(),
            };
            return Some((event, None));
        }
        let (event, pending) = self.escalate();
        Some((event, Some(pending)))
    }

    fn escalate(&mut self) -> (Event, PendingNotify) {
        let notified = self.directory.contacts().to_vec();
        self.stage = Stage::Active {
            notified: notified.clone(),
        };
        tracing::info!(
            activation_id = self.activation_id,
            notifier = self.notifier.name(),
            contacts = notified.len(),
            "Emergency escalated, notifying contacts"
        );
        let pending = PendingNotify {
            notifier: Arc::clone(&self.notifier),
            contacts: notified.clone(),
        };
        let event = Event::EmergencyEscalated {
            activation_id: self.activation_id,
            notified_contacts: notified,
            at: Utc::now(),
        };
        (event, pending)
    }
}

/// The notify call owed by an escalation.
pub(crate) struct PendingNotify {
    notifier: Arc<dyn Notifier>,
    contacts: Vec<EmergencyContact>,
}

impl PendingNotify {
    pub(crate) fn dispatch(self) {
        self.notifier.notify(&self.contacts);
    }
}

impl fmt::Debug for EmergencyAlertController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmergencyAlertController")
            .field("stage", &self.stage)
            .field("activation_id", &self.activation_id)
            .field("contacts", &self.directory.len())
            .field("notifier", &self.notifier.name())
            .finish()
    }
}
