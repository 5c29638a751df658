//! Natural language understanding messages.

use serde::{Deserialize, Serialize};

use super::{DomainEvent, EventKind, default_site_id};

fn default_confidence() -> f64 {
	1.0
}

/// Recognized intent name and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
	/// Name of the recognized intent
	pub intent_name: String,
	/// Confidence between 0 and 1
	pub confidence_score: f64,
}

impl Intent {
	/// Creates an intent with the given score.
	pub fn new(intent_name: impl Into<String>, confidence_score: f64) -> Self {
		Self {
			intent_name: intent_name.into(),
			confidence_score,
		}
	}
}

/// Character range of a slot value in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRange {
	/// Start index in the substituted input
	pub start: usize,
	/// End index in the substituted input
	pub end: usize,
	/// Start index in the raw input
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raw_start: Option<usize>,
	/// End index in the raw input
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raw_end: Option<usize>,
}

/// Named entity extracted from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
	/// Entity the slot belongs to
	pub entity: String,
	/// Resolved value, usually `{"kind": ..., "value": ...}`
	pub value: serde_json::Value,
	/// Name of the slot
	pub slot_name: String,
	/// Value as spoken
	#[serde(default)]
	pub raw_value: String,
	/// Confidence between 0 and 1
	#[serde(default = "default_confidence")]
	pub confidence: f64,
	/// Position in the input
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub range: Option<SlotRange>,
}

/// Intent recognized by the NLU, published on `hermes/intent/<intent_name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NluIntent {
	/// Text the intent was recognized from
	pub input: String,
	/// Recognized intent
	pub intent: Intent,
	/// Site the input came from
	#[serde(default = "default_site_id")]
	pub site_id: String,
	/// Request id
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Slots extracted from the input
	#[serde(default)]
	pub slots: Vec<Slot>,
	/// Dialogue session the intent belongs to
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	/// Session custom data
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_data: Option<String>,
	/// Confidence of the speech recognition
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub asr_confidence: Option<f64>,
	/// Input before substitutions
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raw_input: Option<String>,
	/// Wake word that started the session
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub wakeword_id: Option<String>,
	/// Language of the session
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lang: Option<String>,
}

impl NluIntent {
	/// Creates an intent message without session or slots.
	pub fn new(input: impl Into<String>, intent: Intent) -> Self {
		Self {
			input: input.into(),
			intent,
			site_id: default_site_id(),
			id: None,
			slots: Vec::new(),
			session_id: None,
			custom_data: None,
			asr_confidence: None,
			raw_input: None,
			wakeword_id: None,
			lang: None,
		}
	}

	/// Sets the dialogue session id.
	pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
		self.session_id = Some(session_id.into());
		self
	}

	/// Sets the site id.
	pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
		self.site_id = site_id.into();
		self
	}

	/// Name of the recognized intent.
	pub fn intent_name(&self) -> &str {
		&self.intent.intent_name
	}

	/// Finds a slot by name.
	pub fn slot(&self, slot_name: &str) -> Option<&Slot> {
		self.slots.iter().find(|slot| slot.slot_name == slot_name)
	}
}

impl DomainEvent for NluIntent {
	const KIND: EventKind = EventKind::Intent;

	fn site_id(&self) -> &str {
		&self.site_id
	}

	fn session_id(&self) -> Option<&str> {
		self.session_id.as_deref()
	}
}

/// Input the NLU could not match to any intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NluIntentNotRecognized {
	/// Text that was not recognized
	pub input: String,
	/// Site the input came from
	#[serde(default = "default_site_id")]
	pub site_id: String,
	/// Request id
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Session custom data
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_data: Option<String>,
	/// Dialogue session the input belongs to
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	/// Language of the session
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lang: Option<String>,
}

impl NluIntentNotRecognized {
	/// Creates a message for the given input.
	pub fn new(input: impl Into<String>) -> Self {
		Self {
			input: input.into(),
			site_id: default_site_id(),
			id: None,
			custom_data: None,
			session_id: None,
			lang: None,
		}
	}
}

impl DomainEvent for NluIntentNotRecognized {
	const KIND: EventKind = EventKind::IntentNotRecognized;

	fn site_id(&self) -> &str {
		&self.site_id
	}

	fn session_id(&self) -> Option<&str> {
		self.session_id.as_deref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hermes::codec;

	#[test]
	fn test_decode_intent_with_slots() {
		let payload = br#"{
			"input": "set the temperature to 21",
			"intent": {"intentName": "SetTemperature", "confidenceScore": 0.9},
			"siteId": "kitchen",
			"sessionId": "abc",
			"slots": [{
				"entity": "number",
				"value": {"kind": "Number", "value": 21},
				"slotName": "temperature",
				"rawValue": "twenty one",
				"range": {"start": 23, "end": 25}
			}]
		}"#;
		let intent: NluIntent = codec::decode(payload).unwrap();

		assert_eq!(intent.intent_name(), "SetTemperature");
		assert_eq!(intent.site_id, "kitchen");
		assert_eq!(intent.session_id.as_deref(), Some("abc"));

		let slot = intent.slot("temperature").unwrap();
		assert_eq!(slot.value["value"], 21);
		assert_eq!(slot.confidence, 1.0);
		assert_eq!(slot.range.as_ref().map(|r| r.end), Some(25));
		assert!(intent.slot("unit").is_none());
	}

	#[test]
	fn test_intent_requires_intent_field() {
		let result = codec::decode::<NluIntent>(br#"{"input": "hello"}"#);
		assert!(result.is_err());
	}

	#[test]
	fn test_encoded_intent_uses_camel_case() {
		let intent = NluIntent::new("what time is it", Intent::new("GetTime", 1.0))
			.with_session_id("s1");
		let json: serde_json::Value =
			serde_json::from_slice(&codec::encode(&intent).unwrap()).unwrap();

		assert_eq!(json["intent"]["intentName"], "GetTime");
		assert_eq!(json["sessionId"], "s1");
		assert_eq!(json["siteId"], "default");
		assert!(json.get("customData").is_none());
	}

	#[test]
	fn test_not_recognized_defaults() {
		let inr: NluIntentNotRecognized =
			codec::decode(br#"{"input": "covfefe"}"#).unwrap();
		assert_eq!(inr, NluIntentNotRecognized::new("covfefe"));
	}
}
