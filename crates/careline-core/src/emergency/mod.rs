mod controller;
mod notifier;
mod session;
mod view;

pub use controller::{AlertState, EmergencyAlertController, Phase, COUNTDOWN_DURATION};
pub use notifier::{LoggingNotifier, Notifier, RecordingNotifier};
pub use session::{EmergencySession, DEFAULT_TICK_INTERVAL};
pub use view::{AlertView, ACTIVE_DIALOG_CONTACT_LIMIT};
