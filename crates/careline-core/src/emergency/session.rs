//! Timer-driven emergency session.
//!
//! [`EmergencySession`] owns an [`EmergencyAlertController`] together with
//! the recurring countdown timer. Both live behind one mutex shared with the
//! timer task, so a tick and a user action never interleave.
//!
//! The timer is a tokio task wrapped in [`CountdownTimer`]. It is created by
//! `activate()` and released on every way out of `CountingDown`:
//!
//! - `cancel()` drops the handle under the lock, which aborts the task.
//! - the escalating tick releases its own handle and exits.
//! - dropping the session drops the handle.
//!
//! A tick that was already waiting for the lock when `cancel()` ran finds a
//! different activation id or a non-counting phase and exits untouched, so
//! once `cancel()` returns nothing can advance the countdown any more.
//!
//! The escalating tick publishes `EmergencyEscalated`, drops the lock, then
//! calls the notifier. A notifier may therefore read or cancel the session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::controller::{AlertState, EmergencyAlertController, Phase};
use super::notifier::LoggingNotifier;
use super::view::AlertView;
use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Countdown step used by the product: one tick per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Owned handle to a running countdown task. Dropping it stops the task.
#[derive(Debug)]
struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Give up ownership without aborting; used by the task on itself.
    fn release(mut self) {
        self.handle.take();
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[derive(Debug)]
struct Shared {
    controller: EmergencyAlertController,
    timer: Option<CountdownTimer>,
}

/// Everything the timer task needs besides the shared state.
#[derive(Clone)]
struct Publisher {
    events: broadcast::Sender<Event>,
    state: watch::Sender<AlertState>,
}

impl Publisher {
    fn publish(&self, controller: &EmergencyAlertController, event: &Event) {
        // No subscribers is fine.
        let _ = self.events.send(event.clone());
        self.state.send_replace(controller.state());
    }
}

/// An emergency controller with its own countdown timer.
pub struct EmergencySession {
    shared: Arc<Mutex<Shared>>,
    publisher: Publisher,
    runtime: Handle,
    tick_interval: Duration,
}

impl EmergencySession {
    /// Wrap a controller. Must be called from within a tokio runtime; the
    /// countdown task is spawned onto it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] when no tokio runtime is running.
    pub fn new(controller: EmergencyAlertController, tick_interval: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state, _) = watch::channel(controller.state());
        Ok(Self {
            shared: Arc::new(Mutex::new(Shared {
                controller,
                timer: None,
            })),
            publisher: Publisher { events, state },
            runtime,
            tick_interval,
        })
    }

    /// Build a session from configuration: its contact directory, tick
    /// interval, and a [`LoggingNotifier`].
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let notifier = Arc::new(LoggingNotifier::new(config.emergency.share_location));
        let controller = EmergencyAlertController::new(config.contacts.clone(), notifier);
        Self::new(controller, config.tick_interval())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> AlertState {
        lock(&self.shared).controller.state()
    }

    pub fn phase(&self) -> Phase {
        lock(&self.shared).controller.phase()
    }

    pub fn view(&self) -> AlertView {
        AlertView::from_state(&self.state())
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Whether a countdown timer is currently owned by the session.
    pub fn is_timer_running(&self) -> bool {
        lock(&self.shared).timer.is_some()
    }

    /// Stream of events in the order they happened.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.publisher.events.subscribe()
    }

    /// Latest state, updated after every transition.
    pub fn watch_state(&self) -> watch::Receiver<AlertState> {
        self.publisher.state.subscribe()
    }

    /// Resolve once the session is not counting down (idle or active).
    pub async fn wait_until_settled(&self) -> AlertState {
        let mut rx = self.watch_state();
        let settled = rx
            .wait_for(|state| state.phase != Phase::CountingDown)
            .await
            .map(|state| AlertState::clone(&state));
        match settled {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown and its timer. No-op unless idle, so a second
    /// call never stacks another timer.
    pub fn activate(&self) -> Option<Event> {
        let mut shared = lock(&self.shared);
        let event = shared.controller.activate()?;
        let activation_id = shared.controller.activation_id();
        shared.timer = Some(self.spawn_timer(activation_id));
        self.publisher.publish(&shared.controller, &event);
        Some(event)
    }

    /// Stop the timer and return to idle. Idempotent.
    pub fn cancel(&self) -> Option<Event> {
        let mut shared = lock(&self.shared);
        drop(shared.timer.take());
        let event = shared.controller.cancel()?;
        self.publisher.publish(&shared.controller, &event);
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_timer(&self, activation_id: u64) -> CountdownTimer {
        let shared = Arc::clone(&self.shared);
        let publisher = self.publisher.clone();
        let period = self.tick_interval;
        let handle = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !tick_once(&shared, activation_id, &publisher) {
                    break;
                }
            }
        });
        CountdownTimer {
            handle: Some(handle),
        }
    }
}

impl Drop for EmergencySession {
    fn drop(&mut self) {
        drop(lock(&self.shared).timer.take());
    }
}

/// One timer tick. Returns whether the timer should keep running.
///
/// An escalating tick notifies contacts after the lock is released.
fn tick_once(shared: &Mutex<Shared>, activation_id: u64, publisher: &Publisher) -> bool {
    let pending = {
        let mut shared = lock(shared);
        if shared.controller.activation_id() != activation_id
            || shared.controller.phase() != Phase::CountingDown
        {
            tracing::debug!(activation_id, "Discarding tick from a stale countdown");
            return false;
        }
        let Some((event, pending)) = shared.controller.tick_deferred() else {
            return false;
        };
        publisher.publish(&shared.controller, &event);
        if shared.controller.phase() == Phase::CountingDown {
            return true;
        }
        if let Some(timer) = shared.timer.take() {
            timer.release();
        }
        pending
    };
    if let Some(pending) = pending {
        pending.dispatch();
    }
    false
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
