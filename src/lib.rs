//! # Hermes App
//!
//! Build voice apps that speak the Hermes protocol over MQTT.
//!
//! An app registers async handlers for wake word detections, recognized
//! intents, unrecognized input and arbitrary MQTT topics. Once connected,
//! every inbound message is routed to its handlers and the value an intent
//! handler returns is turned into a dialogue manager response for the
//! session the intent came from.
//!
//! ## Features
//!
//! - **Domain events**: typed records for hotword, intent and
//!   intent-not-recognized messages
//! - **Session responses**: return [`EndSession`] or [`ContinueSession`]
//!   from a handler and the right message is published
//! - **Topic patterns**: `+`, `#` and named `{placeholder}` segments for
//!   custom topics
//! - **Isolation**: a failing or panicking handler never affects other
//!   handlers or the connection
//! - **Site filter**: serve only the sites an app is configured for
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hermes_app::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), HermesAppError> {
//!     let mut app = HermesApp::from_cli("TimeApp");
//!
//!     app.on_intent(["GetTime"], |_intent: NluIntent| async {
//!         Ok(EndSession::new().text("It's ten thirty"))
//!     })?;
//!
//!     app.run().await
//! }
//! ```
//!
//! ## Custom topics
//!
//! ```rust,no_run
//! # use hermes_app::prelude::*;
//! # fn register(app: &mut HermesApp) -> Result<(), HermesAppError> {
//! app.on_topic(["hermes/hotword/{hotword}/detected"], |message: TopicMessage| async move {
//!     let hotword = message.get("hotword");
//!     tracing::info!(hotword = ?hotword, "Wake word detected");
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Command-line options and logging setup
pub mod cli;
pub mod client;
pub mod connection;
/// Hermes protocol records and topic shapes
pub mod hermes;
pub mod routing;
pub mod session;
pub mod topic;

pub use cli::{HermesArgs, setup_logging};
pub use client::{
	AppSettings, HermesApp, HermesAppError, HermesConfig, HermesPublisher,
	PublishError,
};
pub use connection::HermesConnection;
pub use routing::{Dispatch, Dispatcher, Registry, TopicMessage};
pub use session::{ContinueSession, EndSession, Outcome, SessionError};

// Essential external types
pub use rumqttc::QoS;

/// Result type alias for operations that may fail with HermesAppError
pub type Result<T> = std::result::Result<T, HermesAppError>;

/// Prelude module for convenient imports
///
/// ```rust
/// use hermes_app::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most Hermes apps

	pub use crate::hermes::{
		DialogueIntentNotRecognized, HotwordDetected, NluIntent,
		NluIntentNotRecognized,
	};
	pub use crate::{
		ContinueSession, EndSession, HermesApp, HermesAppError, HermesArgs,
		HermesConfig, HermesConnection, HermesPublisher, Outcome, QoS,
		TopicMessage,
	};
}
