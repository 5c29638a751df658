use std::sync::Arc;

use futures::future::BoxFuture;
use rumqttc::{AsyncClient, QoS};
use tracing::debug;

use super::error::PublishError;
use crate::hermes::{DialogueStartSession, OutgoingMessage, codec};

/// Destination of outgoing messages.
///
/// The MQTT client implements this through [`MqttSink`]; tests plug in a
/// recorder.
pub trait MessageSink: Send + Sync + 'static {
	/// Publishes a raw payload on a topic.
	fn publish(
		&self,
		topic: String,
		payload: Vec<u8>,
	) -> BoxFuture<'_, Result<(), PublishError>>;
}

/// Publishes through a rumqttc client.
pub struct MqttSink {
	client: AsyncClient,
	qos: QoS,
}

impl MqttSink {
	/// Wraps a client, publishing every message with `qos`.
	pub fn new(client: AsyncClient, qos: QoS) -> Self {
		Self { client, qos }
	}
}

impl MessageSink for MqttSink {
	fn publish(
		&self,
		topic: String,
		payload: Vec<u8>,
	) -> BoxFuture<'_, Result<(), PublishError>> {
		Box::pin(async move {
			self.client
				.publish(topic, self.qos, false, payload)
				.await
				.map_err(PublishError::from)
		})
	}
}

/// Publishes Hermes records.
///
/// Cheap to clone; handlers capture a clone to publish from inside their
/// futures.
#[derive(Clone)]
pub struct HermesPublisher {
	sink: Arc<dyn MessageSink>,
}

impl HermesPublisher {
	/// Creates a publisher over any sink.
	pub fn new(sink: impl MessageSink) -> Self {
		Self {
			sink: Arc::new(sink),
		}
	}

	/// Creates a publisher over a rumqttc client.
	pub fn mqtt(client: AsyncClient, qos: QoS) -> Self {
		Self::new(MqttSink::new(client, qos))
	}

	/// Encodes a record and publishes it on its topic.
	pub async fn publish<M>(&self, message: &M) -> Result<(), PublishError>
	where M: OutgoingMessage {
		let topic = message.topic();
		let payload = codec::encode(message)?;
		debug!(topic = %topic, payload_size = payload.len(), "Publishing message");
		self.sink.publish(topic, payload).await
	}

	/// Publishes a raw payload.
	pub async fn publish_raw(
		&self,
		topic: impl Into<String>,
		payload: impl Into<Vec<u8>>,
	) -> Result<(), PublishError> {
		self.sink.publish(topic.into(), payload.into()).await
	}

	/// Speaks `text` on `site_id` without a dialogue session.
	pub async fn notify(
		&self,
		text: impl Into<String>,
		site_id: impl Into<String>,
	) -> Result<(), PublishError> {
		self.publish(&DialogueStartSession::notification(text, site_id))
			.await
	}
}

impl std::fmt::Debug for HermesPublisher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HermesPublisher").finish_non_exhaustive()
	}
}
