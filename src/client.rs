//! MQTT side of a Hermes app
//!
//! [`HermesApp`] owns the broker connection, the handler registry and the
//! publisher used for session responses and notifications.

/// App setup and connection
pub mod app;
pub mod config;
/// Client error types
pub mod error;
mod event_pump;
/// Outgoing messages
pub mod publisher;

pub use app::HermesApp;
pub use config::{AppSettings, HermesConfig};
pub use error::{ConnectionEstablishmentError, HermesAppError, PublishError};
pub use publisher::{HermesPublisher, MessageSink, MqttSink};
