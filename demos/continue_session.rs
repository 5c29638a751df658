//! # Continue Session
//!
//! Asks for confirmation before switching a light. The intent that asks the
//! question keeps the session open and remembers the pending action in the
//! session's custom data; `Yes` or `No` then ends it.

use hermes_app::prelude::*;

#[tokio::main]
async fn main() -> Result<(), HermesAppError> {
	let mut app = HermesApp::from_cli("ContinueApp");

	app.on_intent(["Yes"], |intent: NluIntent| async move {
		let response = match intent.custom_data.as_deref() {
			| Some("TurnOffLight") => "OK, turning off the light",
			| Some("TurnOnLight") => "OK, turning on the light",
			| _ => "We can!",
		};
		Ok(EndSession::new().text(response))
	})?
	.on_intent(["No"], |_intent: NluIntent| async { Ok(EndSession::new()) })?
	.on_intent(["TurnOffLight"], |_intent: NluIntent| async {
		Ok(ContinueSession::new()
			.text("Do you really want to turn off the light?")
			.custom_data("TurnOffLight"))
	})?
	.on_intent(["TurnOnLight"], |_intent: NluIntent| async {
		Ok(ContinueSession::new()
			.text("Do you really want to turn on the light?")
			.custom_data("TurnOnLight"))
	})?;

	app.run().await
}
