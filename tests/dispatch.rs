//! End-to-end routing tests
//!
//! Messages go through a real [`Dispatcher`] and every outgoing message is
//! captured by a recording sink, so no broker is needed.

use std::fmt;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::future::BoxFuture;
use hermes_app::client::{MessageSink, PublishError};
use hermes_app::hermes::{EventKind, NluIntent};
use hermes_app::{
	ContinueSession, Dispatch, Dispatcher, EndSession, HermesPublisher, Registry,
	TopicMessage,
};
use serde_json::{Value, json};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

type Published = Arc<Mutex<Vec<(String, Value)>>>;

#[derive(Clone, Default)]
struct RecordingSink {
	published: Published,
}

impl MessageSink for RecordingSink {
	fn publish(
		&self,
		topic: String,
		payload: Vec<u8>,
	) -> BoxFuture<'_, Result<(), PublishError>> {
		Box::pin(async move {
			let json = serde_json::from_slice(&payload)?;
			self.published.lock().unwrap().push((topic, json));
			Ok(())
		})
	}
}

/// Keeps every ERROR event as `field=value` pairs.
#[derive(Clone, Default)]
struct ErrorLog {
	lines: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for ErrorLog {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		if *event.metadata().level() != Level::ERROR {
			return;
		}
		let mut line = FieldText::default();
		event.record(&mut line);
		self.lines.lock().unwrap().push(line.0);
	}
}

#[derive(Default)]
struct FieldText(String);

impl Visit for FieldText {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if !self.0.is_empty() {
			self.0.push(' ');
		}
		self.0.push_str(&format!("{}={value:?}", field.name()));
	}
}

type Calls = Arc<Mutex<Vec<String>>>;

fn record(calls: &Calls, entry: impl Into<String>) {
	calls.lock().unwrap().push(entry.into());
}

fn dispatcher(registry: Registry) -> (Dispatcher, Published) {
	let sink = RecordingSink::default();
	let published = Arc::clone(&sink.published);
	(Dispatcher::new(registry, HermesPublisher::new(sink)), published)
}

fn intent_payload(intent_name: &str, session_id: Option<&str>) -> Bytes {
	let mut payload = json!({
		"input": "what time is it",
		"intent": {"intentName": intent_name, "confidenceScore": 1.0},
		"siteId": "kitchen",
	});
	if let Some(session_id) = session_id {
		payload["sessionId"] = json!(session_id);
	}
	Bytes::from(serde_json::to_vec(&payload).unwrap())
}

#[tokio::test]
async fn test_intent_handlers_run_in_registration_order() {
	let calls = Calls::default();
	let mut registry = Registry::new();
	for label in ["first", "second"] {
		let calls = Arc::clone(&calls);
		registry
			.on_intent(["GetTime"], move |intent: NluIntent| {
				let calls = Arc::clone(&calls);
				async move {
					record(&calls, format!("{label}:{}", intent.intent_name()));
					Ok(())
				}
			})
			.unwrap();
	}
	let (dispatcher, published) = dispatcher(registry);

	let result = dispatcher
		.dispatch("hermes/intent/GetTime", intent_payload("GetTime", Some("s1")))
		.await;

	assert_eq!(result, Dispatch::Domain {
		kind: EventKind::Intent,
		invoked: 2
	});
	assert_eq!(*calls.lock().unwrap(), vec![
		"first:GetTime",
		"second:GetTime"
	]);
	assert!(published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unregistered_intent_invokes_nothing() {
	let calls = Calls::default();
	let mut registry = Registry::new();
	let seen = Arc::clone(&calls);
	registry
		.on_intent(["GetTime"], move |_: NluIntent| {
			let seen = Arc::clone(&seen);
			async move {
				record(&seen, "GetTime");
				Ok(())
			}
		})
		.unwrap();
	let (dispatcher, _) = dispatcher(registry);

	let result = dispatcher
		.dispatch(
			"hermes/intent/GetWeather",
			intent_payload("GetWeather", Some("s1")),
		)
		.await;

	assert_eq!(result, Dispatch::Domain {
		kind: EventKind::Intent,
		invoked: 0
	});
	assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_end_session_response() {
	let mut registry = Registry::new();
	registry
		.on_intent(["GetTime"], |_: NluIntent| async {
			Ok(EndSession::new().text("It's 10 30"))
		})
		.unwrap();
	let (dispatcher, published) = dispatcher(registry);

	dispatcher
		.dispatch("hermes/intent/GetTime", intent_payload("GetTime", Some("s1")))
		.await;

	assert_eq!(*published.lock().unwrap(), vec![(
		"hermes/dialogueManager/endSession".to_string(),
		json!({"sessionId": "s1", "siteId": "kitchen", "text": "It's 10 30"})
	)]);
}

#[tokio::test]
async fn test_end_session_without_session_publishes_nothing() {
	let errors = ErrorLog::default();
	let _guard = tracing::subscriber::set_default(
		tracing_subscriber::registry().with(errors.clone()),
	);
	let mut registry = Registry::new();
	registry
		.on_intent(["GetTime"], |_: NluIntent| async {
			Ok(EndSession::new().text("It's 10 30"))
		})
		.unwrap();
	let (dispatcher, published) = dispatcher(registry);

	let result = dispatcher
		.dispatch("hermes/intent/GetTime", intent_payload("GetTime", None))
		.await;

	assert!(matches!(result, Dispatch::Domain { invoked: 1, .. }));
	assert!(published.lock().unwrap().is_empty());
	let errors = errors.lines.lock().unwrap();
	assert_eq!(errors.len(), 1, "{errors:?}");
	assert!(errors[0].contains("Failed to respond to session"));
	assert!(errors[0].contains("Cannot end session"));
}

#[tokio::test]
async fn test_continue_session_response() {
	let mut registry = Registry::new();
	registry
		.on_intent(["TurnOffLight"], |_: NluIntent| async {
			Ok(ContinueSession::new()
				.text("Do you really want to turn off the light?")
				.custom_data("TurnOffLight"))
		})
		.unwrap();
	let (dispatcher, published) = dispatcher(registry);

	dispatcher
		.dispatch(
			"hermes/intent/TurnOffLight",
			intent_payload("TurnOffLight", Some("s2")),
		)
		.await;

	assert_eq!(*published.lock().unwrap(), vec![(
		"hermes/dialogueManager/continueSession".to_string(),
		json!({
			"sessionId": "s2",
			"siteId": "kitchen",
			"customData": "TurnOffLight",
			"text": "Do you really want to turn off the light?",
			"sendIntentNotRecognized": false
		})
	)]);
}

#[tokio::test]
async fn test_duplicate_literal_topic() {
	let calls = Calls::default();
	let mut registry = Registry::new();
	for label in ["a", "b"] {
		let calls = Arc::clone(&calls);
		registry
			.on_topic(["hermes/tts/say"], move |message: TopicMessage| {
				let calls = Arc::clone(&calls);
				async move {
					record(&calls, format!("{label}:{}", message.topic()));
					Ok(())
				}
			})
			.unwrap();
	}

	assert_eq!(registry.resolve_subscriptions().unwrap(), vec![
		"hermes/tts/say"
	]);

	let (dispatcher, _) = dispatcher(registry);
	let result = dispatcher.dispatch("hermes/tts/say", Bytes::new()).await;

	assert_eq!(result, Dispatch::Custom { invoked: 2 });
	assert_eq!(*calls.lock().unwrap(), vec![
		"a:hermes/tts/say",
		"b:hermes/tts/say"
	]);
}

#[tokio::test]
async fn test_failing_handlers_do_not_stop_others() {
	let calls = Calls::default();
	let mut registry = Registry::new();
	registry
		.on_intent(["GetTime"], |_: NluIntent| async {
			Err::<(), _>(anyhow::anyhow!("clock unavailable"))
		})
		.unwrap();
	registry
		.on_intent(["GetTime"], |_: NluIntent| async {
			if true {
				panic!("handler bug");
			}
			Ok(())
		})
		.unwrap();
	let seen = Arc::clone(&calls);
	registry
		.on_intent(["GetTime"], move |_: NluIntent| {
			let seen = Arc::clone(&seen);
			async move {
				record(&seen, "survivor");
				Ok(EndSession::new())
			}
		})
		.unwrap();
	let (dispatcher, published) = dispatcher(registry);

	let result = dispatcher
		.dispatch("hermes/intent/GetTime", intent_payload("GetTime", Some("s1")))
		.await;

	assert!(matches!(result, Dispatch::Domain { invoked: 3, .. }));
	assert_eq!(*calls.lock().unwrap(), vec!["survivor"]);
	assert_eq!(published.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_intent_topic_never_reaches_custom_routes() {
	let calls = Calls::default();
	let mut registry = Registry::new();
	registry.on_intent(["GetTime"], |_: NluIntent| async { Ok(()) }).unwrap();
	let seen = Arc::clone(&calls);
	registry
		.on_topic(["hermes/intent/#"], move |_: TopicMessage| {
			let seen = Arc::clone(&seen);
			async move {
				record(&seen, "custom");
				Ok(())
			}
		})
		.unwrap();
	let (dispatcher, _) = dispatcher(registry);

	dispatcher
		.dispatch(
			"hermes/intent/GetWeather",
			intent_payload("GetWeather", Some("s1")),
		)
		.await;

	assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_intent_not_recognized() {
	let mut registry = Registry::new();
	registry.on_intent_not_recognized(|event| async move {
		Ok(EndSession::new().text(format!("I did not understand {}", event.input)))
	});
	let (dispatcher, published) = dispatcher(registry);

	let result = dispatcher
		.dispatch(
			"hermes/nlu/intentNotRecognized",
			Bytes::from_static(
				br#"{"input": "sing a song", "siteId": "default", "sessionId": "s3"}"#,
			),
		)
		.await;

	assert_eq!(result, Dispatch::Domain {
		kind: EventKind::IntentNotRecognized,
		invoked: 1
	});
	let published = published.lock().unwrap();
	assert_eq!(published.len(), 1);
	assert_eq!(published[0].0, "hermes/dialogueManager/endSession");
	assert_eq!(published[0].1["text"], "I did not understand sing a song");
}

#[tokio::test]
async fn test_dialogue_intent_not_recognized() {
	let mut registry = Registry::new();
	registry.on_dialogue_intent_not_recognized(|_| async {
		Ok(ContinueSession::new().text("Please say yes or no"))
	});
	let (dispatcher, published) = dispatcher(registry);

	dispatcher
		.dispatch(
			"hermes/dialogueManager/intentNotRecognized",
			Bytes::from_static(br#"{"sessionId": "s4", "siteId": "garage"}"#),
		)
		.await;

	let published = published.lock().unwrap();
	assert_eq!(published.len(), 1);
	assert_eq!(published[0].0, "hermes/dialogueManager/continueSession");
	assert_eq!(published[0].1["sessionId"], "s4");
	assert_eq!(published[0].1["siteId"], "garage");
}

#[tokio::test]
async fn test_missing_required_field_is_not_dispatched() {
	let calls = Calls::default();
	let mut registry = Registry::new();
	let seen = Arc::clone(&calls);
	registry
		.on_intent(["GetTime"], move |_: NluIntent| {
			let seen = Arc::clone(&seen);
			async move {
				record(&seen, "called");
				Ok(())
			}
		})
		.unwrap();
	let (dispatcher, _) = dispatcher(registry);

	let result = dispatcher
		.dispatch(
			"hermes/intent/GetTime",
			Bytes::from_static(br#"{"intent": {"intentName": "GetTime"}}"#),
		)
		.await;

	assert_eq!(result, Dispatch::Undecodable(EventKind::Intent));
	assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notify() {
	let sink = RecordingSink::default();
	let published = Arc::clone(&sink.published);
	let publisher = HermesPublisher::new(sink);

	publisher.notify("It's 10 30", "laptop").await.unwrap();

	assert_eq!(*published.lock().unwrap(), vec![(
		"hermes/dialogueManager/startSession".to_string(),
		json!({
			"init": {"type": "notification", "text": "It's 10 30"},
			"siteId": "laptop"
		})
	)]);
}
