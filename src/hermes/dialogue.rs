//! Dialogue manager messages.

use serde::{Deserialize, Serialize};

use super::{DomainEvent, EventKind, OutgoingMessage, default_site_id};

/// Topic for [`DialogueEndSession`]
pub const END_SESSION_TOPIC: &str = "hermes/dialogueManager/endSession";
/// Topic for [`DialogueContinueSession`]
pub const CONTINUE_SESSION_TOPIC: &str =
	"hermes/dialogueManager/continueSession";
/// Topic for [`DialogueStartSession`]
pub const START_SESSION_TOPIC: &str = "hermes/dialogueManager/startSession";

/// Intent not recognized inside a dialogue session.
///
/// Only sent when the session asked for it with `sendIntentNotRecognized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueIntentNotRecognized {
	/// Session the input belongs to
	pub session_id: String,
	/// Site the input came from
	#[serde(default = "default_site_id")]
	pub site_id: String,
	/// Text that was not recognized
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub input: Option<String>,
	/// Session custom data
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_data: Option<String>,
}

impl DomainEvent for DialogueIntentNotRecognized {
	const KIND: EventKind = EventKind::DialogueIntentNotRecognized;

	fn site_id(&self) -> &str {
		&self.site_id
	}

	fn session_id(&self) -> Option<&str> {
		Some(&self.session_id)
	}
}

/// Ends a session, optionally saying something first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueEndSession {
	/// Session to end
	pub session_id: String,
	/// Site of the session
	#[serde(default = "default_site_id")]
	pub site_id: String,
	/// Text to speak before ending
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	/// Custom data update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_data: Option<String>,
}

impl OutgoingMessage for DialogueEndSession {
	fn topic(&self) -> String {
		END_SESSION_TOPIC.to_string()
	}
}

/// Keeps a session open for another turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueContinueSession {
	/// Session to continue
	pub session_id: String,
	/// Site of the session
	#[serde(default = "default_site_id")]
	pub site_id: String,
	/// Custom data update
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_data: Option<String>,
	/// Text to speak before listening again
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	/// Intents the next turn is restricted to
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub intent_filter: Option<Vec<String>>,
	/// Forward unrecognized input instead of handling it in the dialogue manager
	#[serde(default)]
	pub send_intent_not_recognized: bool,
	/// Slot to fill in the next turn
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub slot: Option<String>,
	/// Language of the session
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lang: Option<String>,
}

impl OutgoingMessage for DialogueContinueSession {
	fn topic(&self) -> String {
		CONTINUE_SESSION_TOPIC.to_string()
	}
}

/// How a started session behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
	tag = "type",
	rename_all = "lowercase",
	rename_all_fields = "camelCase"
)]
pub enum DialogueAction {
	/// Wait for the user to speak
	Action {
		/// Text to speak before listening
		#[serde(default, skip_serializing_if = "Option::is_none")]
		text: Option<String>,
		/// Queue the session if the site is busy
		#[serde(default)]
		can_be_enqueued: bool,
		/// Intents the session is restricted to
		#[serde(default, skip_serializing_if = "Option::is_none")]
		intent_filter: Option<Vec<String>>,
		/// Forward unrecognized input
		#[serde(default)]
		send_intent_not_recognized: bool,
	},
	/// Speak the text and end the session
	Notification {
		/// Text to speak
		text: String,
	},
}

/// Starts a new session on a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueStartSession {
	/// Session behavior
	pub init: DialogueAction,
	/// Site to start the session on
	#[serde(default = "default_site_id")]
	pub site_id: String,
	/// Custom data carried through the session
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_data: Option<String>,
	/// Language of the session
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lang: Option<String>,
}

impl DialogueStartSession {
	/// A session that speaks `text` on `site_id` and ends immediately.
	pub fn notification(
		text: impl Into<String>,
		site_id: impl Into<String>,
	) -> Self {
		Self {
			init: DialogueAction::Notification { text: text.into() },
			site_id: site_id.into(),
			custom_data: None,
			lang: None,
		}
	}
}

impl OutgoingMessage for DialogueStartSession {
	fn topic(&self) -> String {
		START_SESSION_TOPIC.to_string()
	}
}
