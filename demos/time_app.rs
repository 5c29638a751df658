//! # Time App
//!
//! Answers the `GetTime` intent with the current time and ends the session.
//!
//! ```bash
//! cargo run --example time_app -- --host localhost --site-id default
//! ```

use chrono::Local;
use hermes_app::prelude::*;

#[tokio::main]
async fn main() -> Result<(), HermesAppError> {
	let mut app = HermesApp::from_cli("TimeApp");

	app.on_intent(["GetTime"], |_intent: NluIntent| async {
		let text = format!("It's {}", Local::now().format("%H %M"));
		Ok(EndSession::new().text(text))
	})?;

	app.run().await
}
