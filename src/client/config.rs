//! Configuration for Hermes app initialization

use rumqttc::{MqttOptions, OptionError, QoS};

use super::error::HermesAppError;

/// App-level performance and behavior settings
#[derive(Debug, Clone)]
pub struct AppSettings {
	/// Capacity of the rumqttc request channel
	pub event_loop_capacity: usize,
	/// Time allowed for the broker to acknowledge the connection
	pub connection_timeout_millis: u64,
	/// QoS for subscriptions and published messages
	pub qos: QoS,
}

impl Default for AppSettings {
	fn default() -> Self {
		Self {
			event_loop_capacity: 10,
			connection_timeout_millis: 5000,
			qos: QoS::AtMostOnce,
		}
	}
}

impl AppSettings {
	/// Checks values the runtime cannot work with.
	pub fn validate(&self) -> Result<(), HermesAppError> {
		if self.event_loop_capacity == 0 {
			return Err(HermesAppError::configuration_value(
				"event_loop_capacity must be greater than zero",
			));
		}
		Ok(())
	}
}

/// Configuration for Hermes app creation
#[derive(Debug, Clone)]
pub struct HermesConfig {
	/// Underlying MQTT connection options (from rumqttc)
	pub connection: MqttOptions,
	/// App-level settings
	pub settings: AppSettings,
	/// Sites whose domain events are served; empty serves every site
	pub site_ids: Vec<String>,
}

impl HermesConfig {
	/// Create config with default settings
	pub fn new(client_id: &str, host: &str, port: u16) -> Self {
		Self {
			connection: MqttOptions::new(client_id, host, port),
			settings: AppSettings::default(),
			site_ids: Vec::new(),
		}
	}

	/// Parse connection options from an MQTT URL
	///
	/// Supports: tcp://, mqtt://, ssl://, mqtts://, ws://, wss://
	/// The URL must carry a `client_id` query parameter.
	pub fn from_url(url: &str) -> Result<Self, OptionError> {
		Ok(Self {
			connection: MqttOptions::parse_url(url)?,
			settings: AppSettings::default(),
			site_ids: Vec::new(),
		})
	}

	/// Create config for localhost:1883
	pub fn localhost(client_id: &str) -> Self {
		Self::new(client_id, "localhost", 1883)
	}

	/// Serve only domain events from these sites.
	pub fn with_site_ids<I, S>(mut self, site_ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.site_ids = site_ids.into_iter().map(Into::into).collect();
		self
	}
}
