//! Handler registration and message dispatch
//!
//! Handlers are registered into a [`Registry`] before the app connects. A
//! [`Dispatcher`] then routes every inbound message: well-known Hermes
//! event shapes first, custom topic routes otherwise.

/// Dispatch of inbound messages
pub mod dispatcher;
/// Routing error types
pub mod error;
/// Type-erased handlers
pub mod handler;
pub mod registry;

pub use dispatcher::{
	Dispatch, Dispatcher, DispatcherActor, DispatcherController,
	DispatcherHandle,
};
pub use error::{HandlerError, IntentNameError, SendError};
pub use handler::{Handler, TopicMessage};
pub use registry::{
	DialogueIntentNotRecognizedHandler, HotwordHandler, IntentHandler,
	IntentNotRecognizedHandler, Registry, TopicHandler,
};
