//! # Time Notification App
//!
//! Speaks the time on one site every minute using dialogue notifications.
//! No handlers are registered, so the app only publishes.
//!
//! ```bash
//! cargo run --example time_app_notification -- --debug
//! ```

use std::time::Duration;

use chrono::Local;
use hermes_app::prelude::*;
use tracing::error;

const INTERVAL: Duration = Duration::from_secs(60);
const SITE_ID: &str = "laptop";

#[tokio::main]
async fn main() -> Result<(), HermesAppError> {
	let app = HermesApp::from_cli("TimeNotificationApp");
	let publisher = app.publisher();

	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(INTERVAL);
		// The first tick completes immediately
		ticker.tick().await;
		loop {
			ticker.tick().await;
			let text = format!("It's {}", Local::now().format("%H %M"));
			if let Err(err) = publisher.notify(text, SITE_ID).await {
				error!(error = %err, "Failed to send notification");
			}
		}
	});

	app.run().await
}
