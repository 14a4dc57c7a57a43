//! What the presentation layer shows for each phase.

use serde::Serialize;

use super::controller::{AlertState, Phase};
use crate::contacts::EmergencyContact;

/// How many notified contacts the active-alert dialog lists.
pub const ACTIVE_DIALOG_CONTACT_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AlertView {
    /// The one-tap emergency button.
    Button { title: String, subtitle: String },
    /// Countdown dialog with a cancel action.
    Countdown {
        remaining_secs: u32,
        title: String,
        message: String,
        cancel_label: String,
    },
    /// Alert dialog shown after contacts were notified.
    Active {
        headline: String,
        message: String,
        location_notice: String,
        contacted: Vec<EmergencyContact>,
        safe_label: String,
    },
}

impl AlertView {
    pub fn from_state(state: &AlertState) -> Self {
        match state.phase {
            Phase::Idle => AlertView::Button {
                title: "Emergency".into(),
                subtitle: "One-tap assistance".into(),
            },
            Phase::CountingDown => AlertView::Countdown {
                remaining_secs: state.remaining_secs,
                title: "Emergency Alert".into(),
                message: format!(
                    "Your emergency contacts will be notified in {} seconds",
                    state.remaining_secs
                ),
                cancel_label: "Cancel Emergency".into(),
            },
            Phase::Active => AlertView::Active {
                headline: "Help is on the way!".into(),
                message: "Your emergency contacts have been notified".into(),
                location_notice: "Sharing your location...".into(),
                contacted: state
                    .notified_contacts
                    .iter()
                    .take(ACTIVE_DIALOG_CONTACT_LIMIT)
                    .cloned()
                    .collect(),
                safe_label: "I'm Safe - Cancel Alert".into(),
            },
        }
    }

    /// Whether the modal dialog is visible (any phase but idle).
    pub fn is_modal(&self) -> bool {
        !matches!(self, AlertView::Button { .. })
    }
}

impl From<&AlertState> for AlertView {
    fn from(state: &AlertState) -> Self {
        Self::from_state(state)
    }
}
