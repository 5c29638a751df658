//! Hermes protocol records and the well-known topic shapes they arrive on.
//!
//! Incoming records implement [`DomainEvent`], outgoing ones
//! [`OutgoingMessage`]. Payloads are JSON with camelCase field names.

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::topic::{CompiledTopic, TopicFormatError, TopicMatch, TopicPath};

pub mod codec;
pub mod dialogue;
pub mod nlu;
pub mod wake;

pub use codec::DecodeError;
pub use dialogue::{
	DialogueAction, DialogueContinueSession, DialogueEndSession,
	DialogueIntentNotRecognized, DialogueStartSession,
};
pub use nlu::{Intent, NluIntent, NluIntentNotRecognized, Slot, SlotRange};
pub use wake::HotwordDetected;

/// Site id used when a payload does not name one.
pub const DEFAULT_SITE_ID: &str = "default";

pub(crate) fn default_site_id() -> String {
	DEFAULT_SITE_ID.to_string()
}

/// A record delivered on one of the well-known topic shapes.
pub trait DomainEvent: DeserializeOwned + Send + Sync + 'static {
	/// The shape this record arrives on
	const KIND: EventKind;

	/// Site the event originated from.
	fn site_id(&self) -> &str;

	/// Dialogue session the event belongs to, if any.
	fn session_id(&self) -> Option<&str>;
}

/// A record the app publishes.
pub trait OutgoingMessage: Serialize {
	/// Topic the record is published on.
	fn topic(&self) -> String;
}

/// Well-known domain event kinds, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// `hermes/hotword/<wakeword_id>/detected`
	Hotword,
	/// `hermes/intent/<intent_name>`
	Intent,
	/// `hermes/nlu/intentNotRecognized`
	IntentNotRecognized,
	/// `hermes/dialogueManager/intentNotRecognized`
	DialogueIntentNotRecognized,
}

static SHAPES: LazyLock<[CompiledTopic; 4]> = LazyLock::new(|| {
	EventKind::ALL.map(|kind| {
		CompiledTopic::compile(kind.pattern())
			.expect("Well-known topic shape should always be valid")
	})
});

impl EventKind {
	/// All kinds in the order topics are tested against them.
	pub const ALL: [EventKind; 4] = [
		EventKind::Hotword,
		EventKind::Intent,
		EventKind::IntentNotRecognized,
		EventKind::DialogueIntentNotRecognized,
	];

	/// Topic pattern of this kind.
	pub const fn pattern(self) -> &'static str {
		match self {
			| EventKind::Hotword => "hermes/hotword/{wakeword_id}/detected",
			| EventKind::Intent => "hermes/intent/{intent_name}",
			| EventKind::IntentNotRecognized => "hermes/nlu/intentNotRecognized",
			| EventKind::DialogueIntentNotRecognized => {
				"hermes/dialogueManager/intentNotRecognized"
			}
		}
	}

	fn index(self) -> usize {
		match self {
			| EventKind::Hotword => 0,
			| EventKind::Intent => 1,
			| EventKind::IntentNotRecognized => 2,
			| EventKind::DialogueIntentNotRecognized => 3,
		}
	}

	/// Compiled topic shape of this kind.
	pub fn shape(self) -> &'static CompiledTopic {
		&SHAPES[self.index()]
	}

	/// Finds the first kind whose shape matches the topic.
	pub fn classify(topic: &Arc<TopicPath>) -> Option<(EventKind, TopicMatch)> {
		Self::ALL.into_iter().find_map(|kind| {
			kind.shape().match_topic(topic).map(|matched| (kind, matched))
		})
	}

	/// Topic to subscribe to for this kind.
	///
	/// Intent topics are per intent name, see [`EventKind::intent_topic`];
	/// for [`EventKind::Intent`] this returns the topic covering every
	/// intent.
	pub fn subscription_topic(self) -> String {
		self.shape().subscription_topic().to_string()
	}

	/// Topic a single intent is published on.
	pub fn intent_topic(intent_name: &str) -> Result<String, TopicFormatError> {
		match EventKind::Intent.shape() {
			| CompiledTopic::Pattern(path) => path.format_topic(&[&intent_name]),
			| CompiledTopic::Exact(topic) => Ok(topic.to_string()),
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			| EventKind::Hotword => "hotword detected",
			| EventKind::Intent => "intent",
			| EventKind::IntentNotRecognized => "NLU intent not recognized",
			| EventKind::DialogueIntentNotRecognized => {
				"dialogue intent not recognized"
			}
		};
		f.write_str(label)
	}
}
