//! Connection lifecycle of a running Hermes app

use rumqttc::AsyncClient;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::client::HermesAppError;
use crate::routing::DispatcherController;

/// Tasks spawned by [`HermesApp::connect`](crate::HermesApp::connect).
struct Tasks {
	dispatcher: DispatcherController,
	event_pump: JoinHandle<()>,
}

/// Handle to a connected Hermes app.
///
/// Keep it alive while the app serves and finish with
/// [`shutdown`](HermesConnection::shutdown). Dropping it without shutting
/// down leaves both tasks running until the runtime stops.
pub struct HermesConnection {
	client: AsyncClient,
	tasks: Option<Tasks>,
}

impl HermesConnection {
	pub(crate) fn new(
		client: AsyncClient,
		dispatcher: DispatcherController,
		event_pump: JoinHandle<()>,
	) -> Self {
		Self {
			client,
			tasks: Some(Tasks {
				dispatcher,
				event_pump,
			}),
		}
	}

	/// True once the MQTT event loop has stopped, after a broker
	/// disconnect or too many consecutive errors.
	pub fn is_closed(&self) -> bool {
		self.tasks
			.as_ref()
			.is_none_or(|tasks| tasks.event_pump.is_finished())
	}

	/// Stops the app.
	///
	/// The dispatcher finishes the message it is handling and stops first,
	/// so its last responses are queued before the Disconnect packet. The
	/// event loop then flushes them, sends Disconnect and ends.
	pub async fn shutdown(mut self) -> Result<(), HermesAppError> {
		let Some(Tasks {
			dispatcher,
			event_pump,
		}) = self.tasks.take()
		else {
			return Ok(());
		};

		if let Err(err) = dispatcher.shutdown().await {
			warn!(error = %err, "Dispatcher task failed");
		}
		if !event_pump.is_finished() {
			if let Err(err) = self.client.disconnect().await {
				warn!(error = %err, "Could not request MQTT disconnect");
			}
		}
		if let Err(err) = event_pump.await {
			warn!(error = %err, "MQTT event loop task failed");
		}
		info!("Hermes app stopped");
		Ok(())
	}
}

impl Drop for HermesConnection {
	fn drop(&mut self) {
		if self.tasks.is_some() {
			error!(
				"HermesConnection dropped while running; await shutdown() \
				 before dropping it"
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use rumqttc::{MqttOptions, QoS};

	use super::*;
	use crate::client::HermesPublisher;
	use crate::routing::{Dispatcher, DispatcherActor, Registry};

	#[tokio::test]
	async fn test_shutdown_after_event_loop_stopped() {
		let (client, _event_loop) =
			AsyncClient::new(MqttOptions::new("test", "localhost", 1883), 10);
		let publisher = HermesPublisher::mqtt(client.clone(), QoS::AtMostOnce);
		let (controller, _handle) =
			DispatcherActor::spawn(Dispatcher::new(Registry::new(), publisher));
		let connection =
			HermesConnection::new(client, controller, tokio::spawn(async {}));

		while !connection.is_closed() {
			tokio::task::yield_now().await;
		}
		connection.shutdown().await.unwrap();
	}
}
