//! # Raw Topic App
//!
//! Listens to arbitrary MQTT topics, one handler per pattern, and logs what
//! arrives. Run with `--debug` to see the output.

use hermes_app::prelude::*;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), HermesAppError> {
	let mut app = HermesApp::from_cli("RawTopicApp");

	app.on_topic(
		["hermes/hotword/{hotword}/detected"],
		|message: TopicMessage| async move {
			debug!(
				topic = %message.topic(),
				hotword = ?message.get("hotword"),
				payload = %String::from_utf8_lossy(message.payload()),
				"topic1"
			);
			Ok(())
		},
	)?;

	app.on_topic(
		["hermes/dialogueManager/sessionStarted"],
		|message: TopicMessage| async move {
			debug!(
				topic = %message.topic(),
				payload = %String::from_utf8_lossy(message.payload()),
				"topic2"
			);
			Ok(())
		},
	)?;

	app.on_topic(["hermes/tts/+"], |message: TopicMessage| async move {
		debug!(
			topic = %message.topic(),
			payload = %String::from_utf8_lossy(message.payload()),
			"topic3"
		);
		Ok(())
	})?;

	app.on_topic(
		["hermes/+/{site_id}/playBytes/#"],
		|message: TopicMessage| async move {
			debug!(
				topic = %message.topic(),
				site_id = ?message.get("site_id"),
				"topic4"
			);
			Ok(())
		},
	)?;

	app.run().await
}
