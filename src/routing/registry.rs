//! Setup-time registration of handlers.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::error::IntentNameError;
use super::handler::{Handler, TopicMessage};
use crate::hermes::{
	DialogueIntentNotRecognized, EventKind, HotwordDetected, NluIntent,
	NluIntentNotRecognized,
};
use crate::session::Outcome;
use crate::topic::{
	CompiledTopic, RouteId, TopicFormatError, TopicMatch, TopicPath,
	TopicPatternError, TopicRouter,
};

/// Handler for wake word detections
pub type HotwordHandler = Handler<HotwordDetected, ()>;
/// Handler for recognized intents
pub type IntentHandler = Handler<NluIntent, Outcome>;
/// Handler for NLU-level unrecognized input
pub type IntentNotRecognizedHandler = Handler<NluIntentNotRecognized, Outcome>;
/// Handler for dialogue-level unrecognized input
pub type DialogueIntentNotRecognizedHandler =
	Handler<DialogueIntentNotRecognized, Outcome>;
/// Handler for custom topics
pub type TopicHandler = Handler<TopicMessage, ()>;

/// Every handler of an app, grouped by what it listens to.
///
/// Populated before the app connects and read-only afterwards. Handlers
/// in each group keep their registration order; registering the same
/// thing twice keeps both entries.
#[derive(Default)]
pub struct Registry {
	hotword: Vec<HotwordHandler>,
	intents: HashMap<String, Vec<IntentHandler>>,
	intent_order: Vec<String>,
	intent_not_recognized: Vec<IntentNotRecognizedHandler>,
	dialogue_intent_not_recognized: Vec<DialogueIntentNotRecognizedHandler>,
	topics: TopicRouter<TopicHandler>,
}

impl Registry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Calls `handler` for every detected wake word.
	pub fn on_hotword<F, Fut>(&mut self, handler: F) -> &mut Self
	where
		F: Fn(HotwordDetected) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
	{
		self.hotword.push(Handler::new(handler));
		self
	}

	/// Calls `handler` for each of the named intents.
	///
	/// Every name becomes one topic level, so names that are empty or
	/// contain `/`, `+` or `#` are rejected and nothing is registered.
	pub fn on_intent<I, S, F, Fut, O>(
		&mut self,
		intent_names: I,
		handler: F,
	) -> Result<&mut Self, IntentNameError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
		F: Fn(NluIntent) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
		O: Into<Outcome> + 'static,
	{
		let names = intent_names
			.into_iter()
			.map(Into::into)
			.collect::<Vec<String>>();
		for name in &names {
			IntentNameError::check(name)?;
		}

		let handler: IntentHandler = Handler::new(handler);
		for name in names {
			if !self.intents.contains_key(&name) {
				self.intent_order.push(name.clone());
			}
			self.intents.entry(name).or_default().push(handler.clone());
		}
		Ok(self)
	}

	/// Calls `handler` when the NLU does not recognize an input.
	pub fn on_intent_not_recognized<F, Fut, O>(&mut self, handler: F) -> &mut Self
	where
		F: Fn(NluIntentNotRecognized) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
		O: Into<Outcome> + 'static,
	{
		self.intent_not_recognized.push(Handler::new(handler));
		self
	}

	/// Calls `handler` when the dialogue manager forwards unrecognized input.
	pub fn on_dialogue_intent_not_recognized<F, Fut, O>(
		&mut self,
		handler: F,
	) -> &mut Self
	where
		F: Fn(DialogueIntentNotRecognized) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
		O: Into<Outcome> + 'static,
	{
		self.dialogue_intent_not_recognized
			.push(Handler::new(handler));
		self
	}

	/// Calls `handler` for messages on any of the topic patterns.
	///
	/// Patterns may use `+`, `#` and `{name}` placeholders. Fails on the
	/// first pattern that does not compile; nothing is registered then.
	pub fn on_topic<I, S, F, Fut>(
		&mut self,
		patterns: I,
		handler: F,
	) -> Result<&mut Self, TopicPatternError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
		F: Fn(TopicMessage) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
	{
		let compiled = patterns
			.into_iter()
			.map(|pattern| CompiledTopic::compile(pattern.as_ref()))
			.collect::<Result<Vec<_>, _>>()?;

		let handler: TopicHandler = Handler::new(handler);
		for topic in compiled {
			let source = topic.source();
			let (fresh, route_id) = self.topics.add_route(topic, handler.clone());
			debug!(
				pattern = %source,
				route_id = %route_id,
				new_subscription = fresh,
				"Registered topic handler"
			);
		}
		Ok(self)
	}

	/// Returns true if at least one handler of this kind is registered.
	pub fn handles(&self, kind: EventKind) -> bool {
		match kind {
			| EventKind::Hotword => !self.hotword.is_empty(),
			| EventKind::Intent => !self.intents.is_empty(),
			| EventKind::IntentNotRecognized => {
				!self.intent_not_recognized.is_empty()
			}
			| EventKind::DialogueIntentNotRecognized => {
				!self.dialogue_intent_not_recognized.is_empty()
			}
		}
	}

	/// Topics to subscribe to, each once.
	///
	/// Intent topics come first in registration order, then the other
	/// domain events, then custom topics with placeholders turned into `+`.
	pub fn resolve_subscriptions(&self) -> Result<Vec<String>, TopicFormatError> {
		let mut topics = Vec::new();
		for name in &self.intent_order {
			topics.push(EventKind::intent_topic(name)?);
		}
		for kind in [
			EventKind::Hotword,
			EventKind::IntentNotRecognized,
			EventKind::DialogueIntentNotRecognized,
		] {
			if self.handles(kind) {
				topics.push(kind.subscription_topic());
			}
		}
		topics.extend(
			self.topics
				.subscription_topics()
				.iter()
				.map(|topic| topic.to_string()),
		);

		let mut seen = HashSet::new();
		topics.retain(|topic| seen.insert(topic.clone()));
		Ok(topics)
	}

	/// Wake word handlers.
	pub fn hotword_handlers(&self) -> &[HotwordHandler] {
		&self.hotword
	}

	/// Handlers registered for one intent name.
	pub fn intent_handlers(&self, intent_name: &str) -> &[IntentHandler] {
		self.intents
			.get(intent_name)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	/// NLU-level intent not recognized handlers.
	pub fn intent_not_recognized_handlers(
		&self,
	) -> &[IntentNotRecognizedHandler] {
		&self.intent_not_recognized
	}

	/// Dialogue-level intent not recognized handlers.
	pub fn dialogue_intent_not_recognized_handlers(
		&self,
	) -> &[DialogueIntentNotRecognizedHandler] {
		&self.dialogue_intent_not_recognized
	}

	/// Custom topic handlers matching `topic`, exact routes first.
	pub fn topic_routes(
		&self,
		topic: &Arc<TopicPath>,
	) -> Vec<(RouteId, &TopicHandler, TopicMatch)> {
		self.topics.get_routes(topic)
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("hotword", &self.hotword.len())
			.field("intents", &self.intent_order)
			.field("intent_not_recognized", &self.intent_not_recognized.len())
			.field(
				"dialogue_intent_not_recognized",
				&self.dialogue_intent_not_recognized.len(),
			)
			.field("topic_routes", &self.topics.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::EndSession;

	#[test]
	fn test_empty_registry() {
		let registry = Registry::new();
		assert!(registry.resolve_subscriptions().unwrap().is_empty());
		for kind in EventKind::ALL {
			assert!(!registry.handles(kind));
		}
	}

	#[test]
	fn test_subscription_order_and_dedup() {
		let mut registry = Registry::new();
		registry
			.on_topic(["custom/+/state"], |_| async { Ok(()) })
			.unwrap();
		registry
			.on_intent(["GetTime"], |_| async { Ok(EndSession::new()) })
			.unwrap()
			.on_hotword(|_| async { Ok(()) })
			.on_intent(["GetTemperature", "GetTime"], |_| async { Ok(()) })
			.unwrap()
			.on_dialogue_intent_not_recognized(|_| async { Ok(()) });
		registry
			.on_topic(["custom/{room}/state", "hermes/tts/say"], |_| async {
				Ok(())
			})
			.unwrap();

		assert_eq!(registry.resolve_subscriptions().unwrap(), vec![
			"hermes/intent/GetTime",
			"hermes/intent/GetTemperature",
			"hermes/hotword/+/detected",
			"hermes/dialogueManager/intentNotRecognized",
			"custom/+/state",
			"hermes/tts/say",
		]);
	}

	#[test]
	fn test_intent_handlers_keep_list_semantics() {
		let mut registry = Registry::new();
		registry
			.on_intent(["GetTime"], |_| async { Ok(()) })
			.unwrap()
			.on_intent(["GetTime", "GetTime"], |_| async { Ok(()) })
			.unwrap();

		assert_eq!(registry.intent_handlers("GetTime").len(), 3);
		assert!(registry.intent_handlers("GetWeather").is_empty());
		assert!(registry.handles(EventKind::Intent));
		assert_eq!(registry.resolve_subscriptions().unwrap(), vec![
			"hermes/intent/GetTime"
		]);
	}

	#[test]
	fn test_bad_pattern_registers_nothing() {
		let mut registry = Registry::new();
		let result = registry
			.on_topic(["good/topic", "bad/#/topic"], |_| async { Ok(()) });

		assert!(matches!(result, Err(TopicPatternError::HashPosition { .. })));
		assert!(registry.resolve_subscriptions().unwrap().is_empty());
	}

	#[test]
	fn test_intent_names_must_fill_one_topic_level() {
		let mut registry = Registry::new();
		for bad in ["", "room/GetTime", "+", "#", "Get+Time"] {
			let result = registry.on_intent(["GetTime", bad], |_| async { Ok(()) });
			let err = result.err().expect("name should be rejected");
			assert_eq!(err.name, bad);
		}

		assert!(!registry.handles(EventKind::Intent));
		assert!(registry.resolve_subscriptions().unwrap().is_empty());
	}

	#[test]
	fn test_topic_routes() {
		let mut registry = Registry::new();
		registry
			.on_topic(["hermes/tts/say", "hermes/tts/say"], |_| async { Ok(()) })
			.unwrap();

		let topic = Arc::new(TopicPath::new("hermes/tts/say"));
		assert_eq!(registry.topic_routes(&topic).len(), 2);
		assert_eq!(registry.resolve_subscriptions().unwrap(), vec![
			"hermes/tts/say"
		]);
	}
}
