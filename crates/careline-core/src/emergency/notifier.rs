//! The notify side effect fired when an emergency escalates.
//!
//! Delivery (push, SMS, location sharing) belongs to the implementor. The
//! controller calls [`Notifier::notify`] exactly once per escalation and
//! never looks at the outcome.

use std::sync::{Mutex, PoisonError};

use crate::contacts::EmergencyContact;

/// Fire-and-forget sink for emergency escalations.
pub trait Notifier: Send + Sync {
    /// Identifier used in logs (e.g. "log", "recording").
    fn name(&self) -> &str;

    /// Alert every contact in `contacts`, in order.
    ///
    /// [`EmergencySession`](super::EmergencySession) calls this after
    /// releasing its lock and publishing the escalation, so implementations
    /// may query or cancel the session from here.
    fn notify(&self, contacts: &[EmergencyContact]);
}

/// Stub notifier: records the escalation in the log and nothing else.
#[derive(Debug, Clone)]
pub struct LoggingNotifier {
    share_location: bool,
}

impl LoggingNotifier {
    pub fn new(share_location: bool) -> Self {
        Self { share_location }
    }
}

impl Default for LoggingNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Notifier for LoggingNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, contacts: &[EmergencyContact]) {
        if contacts.is_empty() {
            tracing::warn!("Emergency escalated with an empty contact directory");
        }
        for contact in contacts {
            tracing::warn!(
                contact_id = %contact.id,
                name = %contact.name,
                relationship = %contact.relationship,
                phone = %contact.phone,
                "Notifying emergency contact"
            );
        }
        if self.share_location {
            tracing::warn!(recipients = contacts.len(), "Sharing location with emergency contacts");
        }
    }
}

/// Keeps every dispatch in memory, in call order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    dispatches: Mutex<Vec<Vec<EmergencyContact>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All contact lists passed to `notify`, oldest first.
    pub fn dispatches(&self) -> Vec<Vec<EmergencyContact>> {
        self.dispatches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn notify(&self, contacts: &[EmergencyContact]) {
        self.dispatches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(contacts.to_vec());
    }
}
