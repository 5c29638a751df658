use rumqttc::{ClientError, OptionError};

use crate::routing::IntentNameError;
use crate::topic::{TopicFormatError, TopicPatternError};

/// Errors while bringing up the broker connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionEstablishmentError {
	/// Transport-level failure before the broker answered
	#[error("Network connection failed: {0}")]
	Network(#[from] rumqttc::ConnectionError),

	/// Broker answered with a non-success return code
	#[error("Broker rejected connection: {code:?}")]
	BrokerRejected {
		/// Return code sent by the broker
		code: rumqttc::ConnectReturnCode,
	},

	/// No answer within the configured timeout
	#[error("Connection establishment timed out after {timeout_millis}ms")]
	Timeout {
		/// Configured timeout
		timeout_millis: u64,
	},
}

/// Errors that can occur while setting up or running a Hermes app
#[derive(Debug, thiserror::Error)]
pub enum HermesAppError {
	/// Connection-related errors from rumqttc
	#[error("Client operation failed: {0}")]
	ClientOperation(#[from] ClientError),

	/// Configuration errors when parsing MQTT options
	#[error("Configuration error: {0}")]
	Configuration(#[from] OptionError),

	/// Invalid configuration parameter values
	#[error("Invalid configuration value: {0}")]
	ConfigurationValue(String),

	/// A registered topic pattern does not compile
	#[error("Topic pattern error: {0}")]
	TopicPattern(#[from] TopicPatternError),

	/// A registered intent name cannot be used in a topic
	#[error("Intent registration error: {0}")]
	IntentName(#[from] IntentNameError),

	/// A subscription topic could not be built
	#[error("Topic format error: {0}")]
	TopicFormat(#[from] TopicFormatError),

	/// Connection establishment failed
	#[error("Failed to establish connection: {0}")]
	ConnectionEstablishment(#[from] ConnectionEstablishmentError),

	/// Waiting for the shutdown signal failed
	#[error("Failed to listen for shutdown signal: {0}")]
	Signal(#[from] std::io::Error),
}

impl HermesAppError {
	/// Create a ConfigurationValue error
	pub fn configuration_value(message: impl Into<String>) -> Self {
		HermesAppError::ConfigurationValue(message.into())
	}
}

/// Errors while publishing an outgoing message.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
	/// The MQTT client refused the request
	#[error("Publish failed: {0}")]
	Client(#[from] ClientError),

	/// The record could not be encoded
	#[error("Failed to encode message: {0}")]
	Encode(#[from] serde_json::Error),

	/// The sink no longer accepts messages
	#[error("Message sink closed")]
	Closed,
}
