//! Session responses.
//!
//! Handlers bound to dialogue events return an [`Outcome`]. The
//! [`SessionResponder`] turns it into at most one outgoing dialogue manager
//! message addressed to the session the event came from.

use thiserror::Error;
use tracing::debug;

use crate::client::{HermesPublisher, PublishError};
use crate::hermes::{
	DialogueContinueSession, DialogueEndSession, DomainEvent, EventKind,
};

/// Keep the session open for another turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinueSession {
	/// Text to speak before listening again
	pub text: Option<String>,
	/// Intents the next turn is restricted to
	pub intent_filter: Option<Vec<String>>,
	/// Custom data update; the session keeps its data when `None`
	pub custom_data: Option<String>,
	/// Forward unrecognized input to the app
	pub send_intent_not_recognized: bool,
}

impl ContinueSession {
	/// Continues without saying anything.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the text to speak.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	/// Restricts the next turn to these intents.
	pub fn intent_filter<I, S>(mut self, intents: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.intent_filter = Some(intents.into_iter().map(Into::into).collect());
		self
	}

	/// Replaces the session custom data.
	pub fn custom_data(mut self, custom_data: impl Into<String>) -> Self {
		self.custom_data = Some(custom_data.into());
		self
	}

	/// Asks the dialogue manager to forward unrecognized input.
	pub fn send_intent_not_recognized(mut self, forward: bool) -> Self {
		self.send_intent_not_recognized = forward;
		self
	}
}

/// End the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndSession {
	/// Text to speak before ending
	pub text: Option<String>,
	/// Custom data update
	pub custom_data: Option<String>,
}

impl EndSession {
	/// Ends without saying anything.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the text to speak.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	/// Replaces the session custom data.
	pub fn custom_data(mut self, custom_data: impl Into<String>) -> Self {
		self.custom_data = Some(custom_data.into());
		self
	}
}

/// What a dialogue handler wants done with its session.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
	/// Continue the session
	Continue(ContinueSession),
	/// End the session
	End(EndSession),
	/// Leave the session alone
	#[default]
	NoResponse,
}

impl From<ContinueSession> for Outcome {
	fn from(value: ContinueSession) -> Self {
		Outcome::Continue(value)
	}
}

impl From<EndSession> for Outcome {
	fn from(value: EndSession) -> Self {
		Outcome::End(value)
	}
}

impl From<()> for Outcome {
	fn from(_: ()) -> Self {
		Outcome::NoResponse
	}
}

/// Identifies where a response goes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
	/// Session to respond to
	pub session_id: Option<String>,
	/// Site of the session
	pub site_id: String,
	/// Kind of event the outcome answers
	pub origin: EventKind,
}

impl SessionContext {
	/// Context of an incoming domain event.
	pub fn of<E: DomainEvent>(event: &E) -> Self {
		Self {
			session_id: event.session_id().map(str::to_string),
			site_id: event.site_id().to_string(),
			origin: E::KIND,
		}
	}
}

/// Reasons an outcome could not be sent.
#[derive(Debug, Error)]
pub enum SessionError {
	/// `End` for an event without session id
	#[error("Cannot end session of {origin} without session ID")]
	CannotEnd {
		/// Kind of the originating event
		origin: EventKind,
	},
	/// `Continue` for an event without session id
	#[error("Cannot continue session of {origin} without session ID")]
	CannotContinue {
		/// Kind of the originating event
		origin: EventKind,
	},
	/// The response was built but publishing failed
	#[error("Failed to publish session response: {0}")]
	Publish(#[from] PublishError),
}

/// The outgoing message an outcome maps to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResponse {
	/// `hermes/dialogueManager/endSession`
	End(DialogueEndSession),
	/// `hermes/dialogueManager/continueSession`
	Continue(DialogueContinueSession),
}

impl SessionResponse {
	/// Maps an outcome to its message.
	///
	/// `NoResponse` maps to `None`. `End` and `Continue` need a session id.
	pub fn from_outcome(
		outcome: Outcome,
		context: &SessionContext,
	) -> Result<Option<Self>, SessionError> {
		match outcome {
			| Outcome::NoResponse => Ok(None),
			| Outcome::End(end) => {
				let session_id = context.session_id.clone().ok_or(
					SessionError::CannotEnd {
						origin: context.origin,
					},
				)?;
				Ok(Some(SessionResponse::End(DialogueEndSession {
					session_id,
					site_id: context.site_id.clone(),
					text: end.text,
					custom_data: end.custom_data,
				})))
			}
			| Outcome::Continue(cont) => {
				let session_id = context.session_id.clone().ok_or(
					SessionError::CannotContinue {
						origin: context.origin,
					},
				)?;
				Ok(Some(SessionResponse::Continue(DialogueContinueSession {
					session_id,
					site_id: context.site_id.clone(),
					custom_data: cont.custom_data,
					text: cont.text,
					intent_filter: cont.intent_filter,
					send_intent_not_recognized: cont.send_intent_not_recognized,
					slot: None,
					lang: None,
				})))
			}
		}
	}
}

/// Publishes session responses.
#[derive(Clone, Debug)]
pub struct SessionResponder {
	publisher: HermesPublisher,
}

impl SessionResponder {
	/// Creates a responder publishing through `publisher`.
	pub fn new(publisher: HermesPublisher) -> Self {
		Self { publisher }
	}

	/// Sends the message for `outcome`, if any.
	pub async fn respond(
		&self,
		outcome: Outcome,
		context: &SessionContext,
	) -> Result<(), SessionError> {
		match SessionResponse::from_outcome(outcome, context)? {
			| Some(SessionResponse::End(message)) => {
				debug!(session_id = %message.session_id, "Ending session");
				self.publisher.publish(&message).await?;
			}
			| Some(SessionResponse::Continue(message)) => {
				debug!(session_id = %message.session_id, "Continuing session");
				self.publisher.publish(&message).await?;
			}
			| None => {}
		}
		Ok(())
	}
}
