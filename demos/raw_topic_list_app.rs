//! # Raw Topic List App
//!
//! One handler bound to several topic patterns at once. The handler tells
//! the topics apart by the placeholders each pattern binds.

use hermes_app::prelude::*;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), HermesAppError> {
	let mut app = HermesApp::from_cli("RawTopicListApp");

	app.on_topic(
		[
			"hermes/dialogueManager/sessionStarted",
			"hermes/hotword/{hotword}/detected",
			"hermes/tts/+",
			"hermes/+/{site_id}/playBytes/#",
		],
		|message: TopicMessage| async move {
			if let Some(hotword) = message.get("hotword") {
				debug!(topic = %message.topic(), hotword = %hotword, "Hotword");
			} else if let Some(site_id) = message.get("site_id") {
				debug!(topic = %message.topic(), site_id = %site_id, "Audio");
			} else {
				debug!(
					topic = %message.topic(),
					payload = %String::from_utf8_lossy(message.payload()),
					"Message"
				);
			}
			Ok(())
		},
	)?;

	app.run().await
}
