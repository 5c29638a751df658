//! Wake word messages.

use serde::{Deserialize, Serialize};

use super::{DomainEvent, EventKind, default_site_id};

fn default_model_type() -> String {
	"personal".to_string()
}

fn default_sensitivity() -> f64 {
	1.0
}

/// Wake word was detected on `hermes/hotword/<wakeword_id>/detected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotwordDetected {
	/// Name of the model that triggered the detection
	pub model_id: String,
	/// Version of the model
	#[serde(default)]
	pub model_version: String,
	/// `personal` or `universal`
	#[serde(default = "default_model_type")]
	pub model_type: String,
	/// Sensitivity the model ran with
	#[serde(default = "default_sensitivity")]
	pub current_sensitivity: f64,
	/// Site where the wake word was spoken
	#[serde(default = "default_site_id")]
	pub site_id: String,
	/// Session id of the dialogue this detection belongs to, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	/// Ask the ASR to publish the captured audio
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub send_audio_captured: Option<bool>,
	/// Language of the session
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lang: Option<String>,
	/// Entities passed on to the NLU
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_entities: Option<serde_json::Value>,
}

impl HotwordDetected {
	/// Creates a detection for the given model with protocol defaults.
	pub fn new(model_id: impl Into<String>) -> Self {
		Self {
			model_id: model_id.into(),
			model_version: String::new(),
			model_type: default_model_type(),
			current_sensitivity: default_sensitivity(),
			site_id: default_site_id(),
			session_id: None,
			send_audio_captured: None,
			lang: None,
			custom_entities: None,
		}
	}
}

impl DomainEvent for HotwordDetected {
	const KIND: EventKind = EventKind::Hotword;

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
	fn test_minimal_payload_uses_defaults() {
		let hotword: HotwordDetected =
			codec::decode(br#"{"modelId": "alexa"}"#).unwrap();

		assert_eq!(hotword.model_id, "alexa");
		assert_eq!(hotword.model_type, "personal");
		assert_eq!(hotword.current_sensitivity, 1.0);
		assert_eq!(hotword.site_id, "default");
		assert_eq!(hotword.session_id, None);
	}

	#[test]
	fn test_missing_model_id_fails() {
		let result = codec::decode::<HotwordDetected>(br#"{"siteId": "x"}"#);
		assert!(result.is_err());
	}
}
