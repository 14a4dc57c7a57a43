//! # Careline Core Library
//!
//! This library provides the core logic behind Careline's one-tap emergency
//! alert. Frontends (the bundled CLI, or a mobile/web shell) render from
//! the state exposed here and forward two user actions: activate and cancel.
//!
//! ## Architecture
//!
//! - **Emergency Controller**: A tick-driven state machine
//!   (`Idle -> CountingDown -> Active`) that notifies contacts when a
//!   five-second countdown runs out
//! - **Emergency Session**: Owns the controller plus the cancellable
//!   one-second countdown timer on a tokio runtime
//! - **Contacts**: The ordered emergency contact directory
//! - **Configuration**: TOML-based settings and contact list
//!
//! ## Key Components
//!
//! - [`EmergencyAlertController`]: Core state machine
//! - [`EmergencySession`]: Timer-owning wrapper for live use
//! - [`Notifier`]: Seam for the notify-contacts side effect
//! - [`Config`]: Application configuration management

pub mod config;
pub mod contacts;
pub mod emergency;
pub mod error;
pub mod events;

pub use config::{Config, EmergencyConfig};
pub use contacts::{ContactDirectory, EmergencyContact};
pub use emergency::{
    AlertState, AlertView, EmergencyAlertController, EmergencySession, LoggingNotifier, Notifier,
    Phase, RecordingNotifier, COUNTDOWN_DURATION,
};
pub use error::{ConfigError, CoreError, Result};
pub use events::Event;
