//! Routes inbound messages to handlers.

use std::sync::Arc;

use arcstr::ArcStr;
use bytes::Bytes;
use tokio::sync::mpsc::{
	UnboundedReceiver, UnboundedSender, unbounded_channel,
};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use super::error::SendError;
use super::handler::{Handler, TopicMessage};
use super::registry::Registry;
use crate::client::HermesPublisher;
use crate::hermes::{
	DialogueIntentNotRecognized, DomainEvent, EventKind, HotwordDetected,
	NluIntent, NluIntentNotRecognized, codec,
};
use crate::session::{Outcome, SessionContext, SessionResponder};
use crate::topic::TopicPath;

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
	/// A domain event shape claimed the topic
	Domain {
		/// Kind of the event
		kind: EventKind,
		/// Number of handlers invoked, failed ones included
		invoked: usize,
	},
	/// Custom topic routes matched
	Custom {
		/// Number of handlers invoked, failed ones included
		invoked: usize,
	},
	/// The payload of a domain event did not decode
	Undecodable(EventKind),
	/// The event came from a site this app does not serve
	SiteFiltered(EventKind),
	/// Nothing wanted the topic
	Unexpected,
}

/// Routes one message at a time through the registry.
///
/// Handlers of one message run sequentially in registration order. Their
/// errors and panics are logged and never stop the remaining handlers.
pub struct Dispatcher {
	registry: Registry,
	responder: SessionResponder,
	site_ids: Vec<String>,
}

impl Dispatcher {
	/// Creates a dispatcher answering sessions through `publisher`.
	pub fn new(registry: Registry, publisher: HermesPublisher) -> Self {
		Self {
			registry,
			responder: SessionResponder::new(publisher),
			site_ids: Vec::new(),
		}
	}

	/// Only serve domain events from these sites. Empty means all sites.
	pub fn with_site_ids(mut self, site_ids: Vec<String>) -> Self {
		self.site_ids = site_ids;
		self
	}

	/// The registry this dispatcher routes through.
	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Routes one message and waits for every handler it reaches.
	pub async fn dispatch(
		&self,
		topic: impl Into<ArcStr>,
		payload: Bytes,
	) -> Dispatch {
		let topic = Arc::new(TopicPath::new(topic));

		if let Some((kind, _)) = EventKind::classify(&topic) {
			if self.registry.handles(kind) {
				return self.dispatch_domain(kind, &topic, &payload).await;
			}
		}

		let routes = self.registry.topic_routes(&topic);
		if routes.is_empty() {
			warn!(topic = %topic, "Unexpected topic");
			return Dispatch::Unexpected;
		}

		let invoked = routes.len();
		for (route_id, handler, topic_match) in routes {
			debug!(topic = %topic, route_id = %route_id, "Invoking topic handler");
			let message = TopicMessage::new(topic_match, payload.clone());
			self.invoke(handler, message, &topic).await;
		}
		Dispatch::Custom { invoked }
	}

	async fn dispatch_domain(
		&self,
		kind: EventKind,
		topic: &TopicPath,
		payload: &[u8],
	) -> Dispatch {
		match kind {
			| EventKind::Hotword => {
				let Some(event) = self.decode::<HotwordDetected>(topic, payload)
				else {
					return Dispatch::Undecodable(kind);
				};
				if !self.serves_site(&event) {
					return Dispatch::SiteFiltered(kind);
				}
				let handlers = self.registry.hotword_handlers();
				for handler in handlers {
					self.invoke(handler, event.clone(), topic).await;
				}
				Dispatch::Domain {
					kind,
					invoked: handlers.len(),
				}
			}
			| EventKind::Intent => {
				let Some(event) = self.decode::<NluIntent>(topic, payload) else {
					return Dispatch::Undecodable(kind);
				};
				if !self.serves_site(&event) {
					return Dispatch::SiteFiltered(kind);
				}
				let handlers = self.registry.intent_handlers(event.intent_name());
				if handlers.is_empty() {
					debug!(
						topic = %topic,
						intent_name = event.intent_name(),
						"No handler for intent"
					);
				}
				self.run_session_handlers(handlers, event, topic).await
			}
			| EventKind::IntentNotRecognized => {
				let Some(event) =
					self.decode::<NluIntentNotRecognized>(topic, payload)
				else {
					return Dispatch::Undecodable(kind);
				};
				if !self.serves_site(&event) {
					return Dispatch::SiteFiltered(kind);
				}
				let handlers = self.registry.intent_not_recognized_handlers();
				self.run_session_handlers(handlers, event, topic).await
			}
			| EventKind::DialogueIntentNotRecognized => {
				let Some(event) =
					self.decode::<DialogueIntentNotRecognized>(topic, payload)
				else {
					return Dispatch::Undecodable(kind);
				};
				if !self.serves_site(&event) {
					return Dispatch::SiteFiltered(kind);
				}
				let handlers =
					self.registry.dialogue_intent_not_recognized_handlers();
				self.run_session_handlers(handlers, event, topic).await
			}
		}
	}

	async fn run_session_handlers<E>(
		&self,
		handlers: &[Handler<E, Outcome>],
		event: E,
		topic: &TopicPath,
	) -> Dispatch
	where
		E: DomainEvent + Clone,
	{
		let context = SessionContext::of(&event);
		for handler in handlers {
			let Some(outcome) = self.invoke(handler, event.clone(), topic).await
			else {
				continue;
			};
			if let Err(err) = self.responder.respond(outcome, &context).await {
				error!(
					topic = %topic,
					handler = handler.name(),
					site_id = %context.site_id,
					error = %err,
					"Failed to respond to session"
				);
			}
		}
		Dispatch::Domain {
			kind: E::KIND,
			invoked: handlers.len(),
		}
	}

	async fn invoke<A, R>(
		&self,
		handler: &Handler<A, R>,
		arg: A,
		topic: &TopicPath,
	) -> Option<R>
	where
		A: Send + 'static,
		R: Send + 'static,
	{
		match handler.call(arg).await {
			| Ok(result) => Some(result),
			| Err(err) => {
				error!(
					topic = %topic,
					handler = handler.name(),
					error = %err,
					"Handler failed"
				);
				None
			}
		}
	}

	fn decode<E: DomainEvent>(
		&self,
		topic: &TopicPath,
		payload: &[u8],
	) -> Option<E> {
		codec::decode::<E>(payload)
			.inspect_err(|err| {
				error!(
					topic = %topic,
					kind = %E::KIND,
					error = %err,
					payload = %String::from_utf8_lossy(payload),
					"Failed to decode payload"
				);
			})
			.ok()
	}

	fn serves_site<E: DomainEvent>(&self, event: &E) -> bool {
		let serves = self.site_ids.is_empty()
			|| self.site_ids.iter().any(|id| id == event.site_id());
		if !serves {
			debug!(
				kind = %E::KIND,
				site_id = event.site_id(),
				"Ignoring event from other site"
			);
		}
		serves
	}
}

/// Runs a [`Dispatcher`] on its own task, one message at a time.
///
/// The queue in front of it is unbounded. Session responses go out through
/// the same MQTT event loop that feeds the queue, so that loop must never
/// wait on the dispatcher.
pub struct DispatcherActor {
	dispatcher: Dispatcher,
	message_rx: UnboundedReceiver<(String, Bytes)>,
	shutdown_rx: oneshot::Receiver<()>,
}

impl DispatcherActor {
	/// Spawns the actor on the current runtime.
	pub fn spawn(
		dispatcher: Dispatcher,
	) -> (DispatcherController, DispatcherHandle) {
		let (message_tx, message_rx) = unbounded_channel();
		let (shutdown_tx, shutdown_rx) = oneshot::channel();
		let actor = Self {
			dispatcher,
			message_rx,
			shutdown_rx,
		};
		let join_handle = tokio::spawn(async move { actor.run().await });

		let controller = DispatcherController {
			shutdown_tx,
			join_handle,
		};
		let handle = DispatcherHandle { message_tx };
		(controller, handle)
	}

	async fn run(mut self) {
		loop {
			tokio::select! {
				_ = &mut self.shutdown_rx => {
					info!("DispatcherActor: Shutdown signal received");
					break;
				}
				message = self.message_rx.recv() => {
					let Some((topic, payload)) = message else {
						info!("DispatcherActor: Message channel closed, exiting");
						break;
					};
					self.dispatcher.dispatch(topic, payload).await;
				}
			}
		}
		info!("DispatcherActor: Exiting run loop");
	}
}

/// Stops the dispatcher task.
pub struct DispatcherController {
	shutdown_tx: oneshot::Sender<()>,
	join_handle: JoinHandle<()>,
}

impl DispatcherController {
	/// Lets the in-flight message finish, then stops the task.
	pub async fn shutdown(self) -> Result<(), JoinError> {
		let _ = self.shutdown_tx.send(()).inspect_err(|_| {
			warn!("DispatcherController: Dispatcher already stopped");
		});
		self.join_handle.await.inspect_err(|e| {
			warn!(error = ?e, "DispatcherController: Actor run failed");
		})
	}
}

/// Feeds inbound messages to the dispatcher task.
#[derive(Clone, Debug)]
pub struct DispatcherHandle {
	message_tx: UnboundedSender<(String, Bytes)>,
}

impl DispatcherHandle {
	/// Queues a message without waiting.
	pub fn dispatch_incoming_message(
		&self,
		topic: String,
		payload: Bytes,
	) -> Result<(), SendError> {
		self.message_tx
			.send((topic, payload))
			.map_err(|_| SendError::ChannelClosed)
	}
}
