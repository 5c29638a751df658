use std::time::Duration;

use rumqttc::{
	AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop,
	Outgoing, Packet, QoS, SubscribeFilter,
};
use tokio::time;
use tracing::{debug, error, info, trace, warn};

use super::error::ConnectionEstablishmentError;
use crate::routing::DispatcherHandle;

const FIRST_RETRY_DELAY: Duration = Duration::from_millis(100);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
/// Consecutive poll failures after which the pump gives up
const MAX_CONSECUTIVE_FAILURES: u32 = 10;

/// Polls until the broker answers the CONNECT packet.
pub(crate) async fn await_connack(
	event_loop: &mut EventLoop,
) -> Result<(), ConnectionEstablishmentError> {
	loop {
		let event = event_loop.poll().await?;
		let Event::Incoming(Packet::ConnAck(ack)) = event else {
			trace!(event = ?event, "Waiting for ConnAck");
			continue;
		};
		if ack.code != ConnectReturnCode::Success {
			return Err(ConnectionEstablishmentError::BrokerRejected {
				code: ack.code,
			});
		}
		debug!(session_present = ack.session_present, "Broker accepted connection");
		return Ok(());
	}
}

pub(crate) fn subscribe_filters(
	topics: &[String],
	qos: QoS,
) -> Vec<SubscribeFilter> {
	topics
		.iter()
		.map(|topic| SubscribeFilter::new(topic.clone(), qos))
		.collect()
}

/// Delay before polling again after `failures` consecutive errors.
fn retry_delay(failures: u32) -> Duration {
	let doublings = failures.saturating_sub(1).min(10);
	FIRST_RETRY_DELAY
		.saturating_mul(2_u32.pow(doublings))
		.min(MAX_RETRY_DELAY)
}

enum Step {
	Continue,
	Stop,
}

/// Keeps the MQTT connection alive and hands inbound publishes to the
/// dispatcher.
///
/// Requests from the client (publishes, subscribes, disconnect) only leave
/// while this pump polls, so nothing in here waits on the dispatcher or on
/// the client's request queue.
pub(crate) struct EventPump {
	event_loop: EventLoop,
	client: AsyncClient,
	dispatcher: DispatcherHandle,
	subscriptions: Vec<String>,
	qos: QoS,
	failures: u32,
}

impl EventPump {
	pub(crate) fn new(
		event_loop: EventLoop,
		client: AsyncClient,
		dispatcher: DispatcherHandle,
		subscriptions: Vec<String>,
		qos: QoS,
	) -> Self {
		Self {
			event_loop,
			client,
			dispatcher,
			subscriptions,
			qos,
			failures: 0,
		}
	}

	/// Runs until a Disconnect packet goes either way or polling fails too
	/// many times in a row.
	pub(crate) async fn run(mut self) {
		loop {
			let step = match self.event_loop.poll().await {
				| Ok(event) => {
					self.failures = 0;
					self.on_event(event)
				}
				| Err(err) => self.on_failure(err).await,
			};
			if let Step::Stop = step {
				break;
			}
		}
		info!("MQTT event loop stopped");
	}

	fn on_event(&self, event: Event) -> Step {
		match event {
			| Event::Incoming(Packet::Publish(publish)) => {
				debug!(
					topic = %publish.topic,
					payload_size = publish.payload.len(),
					"Received MQTT message"
				);
				if let Err(err) = self
					.dispatcher
					.dispatch_incoming_message(publish.topic, publish.payload)
				{
					error!(error = %err, "Dispatcher is gone, dropping message");
				}
				Step::Continue
			}
			| Event::Incoming(Packet::ConnAck(ack))
				if ack.code == ConnectReturnCode::Success =>
			{
				self.on_reconnect(ack.session_present);
				Step::Continue
			}
			| Event::Incoming(Packet::Disconnect) => {
				info!("Broker closed the session");
				Step::Stop
			}
			| Event::Outgoing(Outgoing::Disconnect) => {
				info!("Disconnect sent to broker");
				Step::Stop
			}
			| event => {
				trace!(event = ?event, "MQTT event");
				Step::Continue
			}
		}
	}

	fn on_reconnect(&self, session_present: bool) {
		if session_present {
			info!("Reconnected, broker kept the subscriptions");
			return;
		}
		if self.subscriptions.is_empty() {
			return;
		}
		info!(
			topics = self.subscriptions.len(),
			"Reconnected without a session, subscribing again"
		);
		// The request is queued on the client and only leaves once this pump
		// polls again, so it must not be awaited here.
		let client = self.client.clone();
		let filters = subscribe_filters(&self.subscriptions, self.qos);
		tokio::spawn(async move {
			if let Err(err) = client.subscribe_many(filters).await {
				error!(error = %err, "Failed to subscribe again");
			}
		});
	}

	async fn on_failure(&mut self, err: ConnectionError) -> Step {
		self.failures += 1;
		if self.failures >= MAX_CONSECUTIVE_FAILURES {
			error!(
				failures = self.failures,
				error = %err,
				"Too many consecutive MQTT errors, giving up"
			);
			return Step::Stop;
		}
		let delay = retry_delay(self.failures);
		warn!(
			failures = self.failures,
			delay = ?delay,
			error = %err,
			"MQTT connection error, retrying"
		);
		time::sleep(delay).await;
		Step::Continue
	}
}
