//! Command-line bootstrap shared by Hermes apps

use clap::Parser;
use rumqttc::Transport;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::client::HermesConfig;

/// Options every Hermes app accepts.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Hermes protocol voice app", long_about = None)]
pub struct HermesArgs {
	/// MQTT broker host
	#[arg(long, env = "HERMES_HOST", default_value = "localhost")]
	pub host: String,

	/// MQTT broker port
	#[arg(long, env = "HERMES_PORT", default_value_t = 1883)]
	pub port: u16,

	/// MQTT username
	#[arg(long, env = "HERMES_USERNAME")]
	pub username: Option<String>,

	/// MQTT password
	#[arg(long, env = "HERMES_PASSWORD")]
	pub password: Option<String>,

	/// Connect over TLS
	#[arg(long, env = "HERMES_TLS")]
	pub tls: bool,

	/// Serve only these sites (repeatable)
	#[arg(long = "site-id", env = "HERMES_SITE_ID", value_delimiter = ',')]
	pub site_id: Vec<String>,

	/// MQTT client id, generated from the app name when omitted
	#[arg(long, env = "HERMES_CLIENT_ID")]
	pub client_id: Option<String>,

	/// Log at debug level
	#[arg(long, env = "HERMES_DEBUG")]
	pub debug: bool,
}

impl HermesArgs {
	/// Builds the app configuration.
	pub fn into_config(self, app_name: &str) -> HermesConfig {
		let client_id =
			self.client_id.unwrap_or_else(|| generate_client_id(app_name));
		let mut config = HermesConfig::new(&client_id, &self.host, self.port)
			.with_site_ids(self.site_id);

		if let Some(username) = self.username {
			config
				.connection
				.set_credentials(username, self.password.unwrap_or_default());
		}
		if self.tls {
			config
				.connection
				.set_transport(Transport::tls_with_default_config());
		}
		config
	}
}

/// `{prefix}_{8 hex chars}`, unique enough to run several copies of an app.
pub fn generate_client_id(prefix: &str) -> String {
	let uuid = Uuid::new_v4().to_string();
	let short_uuid = &uuid[..8];
	format!("{prefix}_{short_uuid}")
}

/// Loads `.env` and installs the global tracing subscriber.
///
/// `--debug` wins; otherwise `RUST_LOG` is used, falling back to `info`.
pub fn setup_logging(args: &HermesArgs) {
	dotenv::dotenv().ok();

	let filter = if args.debug {
		tracing_subscriber::EnvFilter::new("debug")
	} else {
		tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| "info".into())
	};

	let installed = tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_target(true)
				.with_thread_ids(false)
				.with_thread_names(false)
				.with_file(false)
				.with_line_number(false)
				.compact(),
		)
		.try_init();
	if installed.is_err() {
		debug!("Tracing subscriber already installed");
	}
	debug!(args = ?args, "Parsed command-line arguments");
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let args = HermesArgs::try_parse_from(["time_app"]).unwrap();
		assert_eq!(args.port, 1883);
		assert!(!args.tls);
		assert!(args.client_id.is_none());

		let config = args.into_config("time_app");
		let client_id = config.connection.client_id();
		assert!(client_id.starts_with("time_app_"));
		assert_eq!(client_id.len(), "time_app_".len() + 8);
		assert!(config.site_ids.is_empty());
	}

	#[test]
	fn test_repeated_site_ids() {
		let args = HermesArgs::try_parse_from([
			"time_app",
			"--site-id",
			"kitchen",
			"--site-id",
			"garage",
			"--client-id",
			"fixed",
			"--host",
			"broker",
			"--port",
			"1884",
		])
		.unwrap();

		let config = args.into_config("time_app");
		assert_eq!(config.site_ids, vec!["kitchen", "garage"]);
		assert_eq!(config.connection.client_id(), "fixed");
		assert_eq!(
			config.connection.broker_address(),
			("broker".to_string(), 1884)
		);
	}

	#[test]
	fn test_credentials() {
		let args = HermesArgs::try_parse_from([
			"time_app",
			"--username",
			"rhasspy",
			"--password",
			"secret",
		])
		.unwrap();

		let config = args.into_config("time_app");
		assert_eq!(
			config.connection.credentials(),
			Some(("rhasspy".to_string(), "secret".to_string()))
		);
	}

	#[test]
	fn test_rejects_bad_port() {
		assert!(HermesArgs::try_parse_from(["app", "--port", "huge"]).is_err());
	}
}
