//! JSON encoding of Hermes payloads.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Payload could not be decoded into the expected record.
#[derive(Debug, Error)]
#[error("Failed to decode {record} payload: {source}")]
pub struct DecodeError {
	/// Short name of the record type
	pub record: &'static str,
	/// Underlying JSON error, names the missing or malformed field
	#[source]
	pub source: serde_json::Error,
}

impl DecodeError {
	/// True when the payload is valid JSON but lacks or mistypes a field.
	pub fn is_missing_field(&self) -> bool {
		self.source.is_data()
	}
}

fn short_type_name<T>() -> &'static str {
	let full = std::any::type_name::<T>();
	full.rsplit("::").next().unwrap_or(full)
}

/// Decodes a JSON payload.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, DecodeError> {
	serde_json::from_slice(payload).map_err(|source| DecodeError {
		record: short_type_name::<T>(),
		source,
	})
}

/// Encodes a record as JSON.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, serde_json::Error> {
	serde_json::to_vec(message)
}
