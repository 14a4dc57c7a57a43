use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contacts::EmergencyContact;
use crate::emergency::Phase;

/// Every state change of the emergency flow produces an Event.
/// The presentation layer renders from them; hosts may log or forward them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// User pressed the emergency button; countdown started.
    EmergencyActivated {
        activation_id: u64,
        countdown_secs: u32,
        at: DateTime<Utc>,
    },
    /// One second of the countdown elapsed.
    CountdownTick {
        activation_id: u64,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; contacts were notified.
    EmergencyEscalated {
        activation_id: u64,
        notified_contacts: Vec<EmergencyContact>,
        at: DateTime<Utc>,
    },
    /// User cancelled the countdown or declared themselves safe.
    EmergencyCancelled {
        activation_id: u64,
        from_phase: Phase,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-friendly name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::EmergencyActivated { .. } => "emergency_activated",
            Event::CountdownTick { .. } => "countdown_tick",
            Event::EmergencyEscalated { .. } => "emergency_escalated",
            Event::EmergencyCancelled { .. } => "emergency_cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_serialized_tag() {
        let events = [
            Event::EmergencyActivated {
                activation_id: 1,
                countdown_secs: 5,
                at: Utc::now(),
            },
            Event::CountdownTick {
                activation_id: 1,
                remaining_secs: 4,
                at: Utc::now(),
            },
            Event::EmergencyEscalated {
                activation_id: 1,
                notified_contacts: Vec::new(),
                at: Utc::now(),
            },
            Event::EmergencyCancelled {
                activation_id: 1,
                from_phase: Phase::Active,
                at: Utc::now(),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.kind());
        }
    }

    #[test]
    fn cancelled_event_serializes_phase_in_snake_case() {
        let event = Event::EmergencyCancelled {
            activation_id: 2,
            from_phase: Phase::CountingDown,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["from_phase"], "counting_down");
        assert_eq!(json["activation_id"], 2);
    }
}
