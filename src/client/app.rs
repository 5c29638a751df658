use std::future::Future;
use std::time::Duration;

use clap::Parser;
use rumqttc::{AsyncClient, EventLoop, QoS};
use tokio::time;
use tracing::{debug, info, warn};

use super::config::HermesConfig;
use super::error::{ConnectionEstablishmentError, HermesAppError};
use super::event_pump::{EventPump, await_connack, subscribe_filters};
use super::publisher::HermesPublisher;
use crate::cli::{HermesArgs, setup_logging};
use crate::connection::HermesConnection;
use crate::hermes::{
	DialogueIntentNotRecognized, HotwordDetected, NluIntent,
	NluIntentNotRecognized,
};
use crate::routing::{Dispatcher, DispatcherActor, Registry, TopicMessage};
use crate::session::Outcome;

/// A Hermes voice app.
///
/// Register handlers first, then [`connect`](HermesApp::connect) or
/// [`run`](HermesApp::run). The publisher is available before connecting
/// so handlers can capture it.
pub struct HermesApp {
	name: String,
	config: HermesConfig,
	client: AsyncClient,
	event_loop: EventLoop,
	registry: Registry,
	publisher: HermesPublisher,
}

impl HermesApp {
	/// Creates an app. Nothing touches the network until it connects.
	pub fn new(name: impl Into<String>, config: HermesConfig) -> Self {
		let name = name.into();
		let (client, event_loop) = AsyncClient::new(
			config.connection.clone(),
			config.settings.event_loop_capacity,
		);
		let publisher =
			HermesPublisher::mqtt(client.clone(), config.settings.qos);
		debug!(app = %name, config = ?config, "Created Hermes app");
		Self {
			name,
			config,
			client,
			event_loop,
			registry: Registry::new(),
			publisher,
		}
	}

	/// Creates an app from parsed command-line options.
	pub fn from_args(name: impl Into<String>, args: HermesArgs) -> Self {
		let name = name.into();
		let config = args.into_config(&name);
		Self::new(name, config)
	}

	/// Parses the process arguments, sets up logging and creates the app.
	///
	/// Exits the process on invalid arguments or `--help`.
	pub fn from_cli(name: impl Into<String>) -> Self {
		let args = HermesArgs::parse();
		setup_logging(&args);
		Self::from_args(name, args)
	}

	/// App name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Publisher for notifications and other outgoing messages.
	pub fn publisher(&self) -> HermesPublisher {
		self.publisher.clone()
	}

	/// The handler registry.
	pub fn registry(&mut self) -> &mut Registry {
		&mut self.registry
	}

	/// See [`Registry::on_hotword`].
	pub fn on_hotword<F, Fut>(&mut self, handler: F) -> &mut Self
	where
		F: Fn(HotwordDetected) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
	{
		self.registry.on_hotword(handler);
		self
	}

	/// See [`Registry::on_intent`].
	pub fn on_intent<I, S, F, Fut, O>(
		&mut self,
		intent_names: I,
		handler: F,
	) -> Result<&mut Self, HermesAppError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
		F: Fn(NluIntent) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
		O: Into<Outcome> + 'static,
	{
		self.registry.on_intent(intent_names, handler)?;
		Ok(self)
	}

	/// See [`Registry::on_intent_not_recognized`].
	pub fn on_intent_not_recognized<F, Fut, O>(&mut self, handler: F) -> &mut Self
	where
		F: Fn(NluIntentNotRecognized) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
		O: Into<Outcome> + 'static,
	{
		self.registry.on_intent_not_recognized(handler);
		self
	}

	/// See [`Registry::on_dialogue_intent_not_recognized`].
	pub fn on_dialogue_intent_not_recognized<F, Fut, O>(
		&mut self,
		handler: F,
	) -> &mut Self
	where
		F: Fn(DialogueIntentNotRecognized) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
		O: Into<Outcome> + 'static,
	{
		self.registry.on_dialogue_intent_not_recognized(handler);
		self
	}

	/// See [`Registry::on_topic`].
	pub fn on_topic<I, S, F, Fut>(
		&mut self,
		patterns: I,
		handler: F,
	) -> Result<&mut Self, HermesAppError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
		F: Fn(TopicMessage) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
	{
		self.registry.on_topic(patterns, handler)?;
		Ok(self)
	}

	/// Connects, subscribes and starts dispatching.
	///
	/// Keep the returned connection alive and call
	/// [`HermesConnection::shutdown`] when done.
	pub async fn connect(self) -> Result<HermesConnection, HermesAppError> {
		let Self {
			name,
			config,
			client,
			mut event_loop,
			registry,
			publisher,
		} = self;

		config.settings.validate()?;
		let subscriptions = registry.resolve_subscriptions()?;
		let qos = config.settings.qos;

		let timeout_millis = config.settings.connection_timeout_millis;
		time::timeout(
			Duration::from_millis(timeout_millis),
			await_connack(&mut event_loop),
		)
		.await
		.map_err(|_| ConnectionEstablishmentError::Timeout { timeout_millis })??;

		subscribe_all(&client, &subscriptions, qos).await?;
		info!(app = %name, topics = ?subscriptions, "Subscribed to topics");

		let dispatcher =
			Dispatcher::new(registry, publisher).with_site_ids(config.site_ids);
		let (controller, handle) = DispatcherActor::spawn(dispatcher);

		let pump =
			EventPump::new(event_loop, client.clone(), handle, subscriptions, qos);
		let event_loop_handle = tokio::spawn(pump.run());

		Ok(HermesConnection::new(client, controller, event_loop_handle))
	}

	/// Connects and serves until Ctrl-C, then shuts down.
	pub async fn run(self) -> Result<(), HermesAppError> {
		let name = self.name.clone();
		let connection = self.connect().await?;
		info!(app = %name, "Hermes app running, press Ctrl-C to stop");

		let signal = tokio::signal::ctrl_c().await;
		info!(app = %name, "Shutting down");
		connection.shutdown().await?;
		signal.map_err(HermesAppError::from)
	}
}

impl std::fmt::Debug for HermesApp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HermesApp")
			.field("name", &self.name)
			.field("registry", &self.registry)
			.finish_non_exhaustive()
	}
}

async fn subscribe_all(
	client: &AsyncClient,
	topics: &[String],
	qos: QoS,
) -> Result<(), rumqttc::ClientError> {
	if topics.is_empty() {
		warn!("No handlers registered, nothing to subscribe to");
		return Ok(());
	}
	client.subscribe_many(subscribe_filters(topics, qos)).await
}
