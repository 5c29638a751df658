use thiserror::Error;

/// Errors when handing messages to the dispatcher
#[derive(Debug, Error)]
pub enum SendError {
	/// Channel has been closed
	#[error("Channel has been closed")]
	ChannelClosed,
}

/// An intent name that cannot be used as a topic level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid intent name {name:?}: {reason}")]
pub struct IntentNameError {
	/// The rejected name
	pub name: String,
	/// What is wrong with it
	pub reason: &'static str,
}

impl IntentNameError {
	/// Checks that `name` fills exactly one literal topic level.
	pub fn check(name: &str) -> Result<(), Self> {
		let reason = if name.is_empty() {
			"name is empty"
		} else if name.contains('/') {
			"name contains the topic level separator '/'"
		} else if name.contains(['+', '#']) {
			"name contains an MQTT wildcard"
		} else if name.contains('\0') {
			"name contains a NUL character"
		} else {
			return Ok(());
		};
		Err(Self {
			name: name.to_string(),
			reason,
		})
	}
}

/// A single handler invocation failed.
#[derive(Debug, Error)]
pub enum HandlerError {
	/// The handler returned an error
	#[error("Handler returned an error: {0:#}")]
	Failed(anyhow::Error),
	/// The handler panicked
	#[error("Handler panicked: {0}")]
	Panicked(String),
}

impl HandlerError {
	pub(crate) fn from_panic(panic: Box<dyn std::any::Any + Send>) -> Self {
		let message = panic
			.downcast_ref::<&str>()
			.map(|s| s.to_string())
			.or_else(|| panic.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "unknown panic payload".to_string());
		HandlerError::Panicked(message)
	}
}
