//! Type-erased async handlers.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use arcstr::{ArcStr, Substr};
use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;

use super::error::HandlerError;
use crate::topic::TopicMatch;

type HandlerFn<A, R> =
	dyn Fn(A) -> BoxFuture<'static, anyhow::Result<R>> + Send + Sync;

/// An application callback taking `A` and producing `R`.
///
/// The name is the closure's type name and only shows up in logs.
pub struct Handler<A, R> {
	name: &'static str,
	func: Arc<HandlerFn<A, R>>,
}

impl<A, R> Clone for Handler<A, R> {
	fn clone(&self) -> Self {
		Self {
			name: self.name,
			func: Arc::clone(&self.func),
		}
	}
}

impl<A, R> std::fmt::Debug for Handler<A, R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Handler").field("name", &self.name).finish()
	}
}

impl<A, R> Handler<A, R>
where
	A: Send + 'static,
	R: Send + 'static,
{
	/// Wraps an async closure whose result converts into `R`.
	pub fn new<F, Fut, O>(func: F) -> Self
	where
		F: Fn(A) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
		O: Into<R> + 'static,
	{
		let erased: Arc<HandlerFn<A, R>> = Arc::new(
			move |arg: A| -> BoxFuture<'static, anyhow::Result<R>> {
				func(arg).map(|result| result.map(Into::into)).boxed()
			},
		);
		Self {
			name: std::any::type_name::<F>(),
			func: erased,
		}
	}

	/// Handler name for logs.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Runs the handler to completion.
	///
	/// Errors and panics are both returned as [`HandlerError`].
	pub async fn call(&self, arg: A) -> Result<R, HandlerError> {
		let invocation = AssertUnwindSafe(async { (self.func)(arg).await });
		match invocation.catch_unwind().await {
			| Ok(Ok(value)) => Ok(value),
			| Ok(Err(err)) => Err(HandlerError::Failed(err)),
			| Err(panic) => Err(HandlerError::from_panic(panic)),
		}
	}
}

/// A message delivered to a custom topic handler.
#[derive(Debug, Clone)]
pub struct TopicMessage {
	matched: TopicMatch,
	payload: Bytes,
}

impl TopicMessage {
	/// Pairs a topic match with its payload.
	pub fn new(matched: TopicMatch, payload: Bytes) -> Self {
		Self { matched, payload }
	}

	/// The concrete topic.
	pub fn topic(&self) -> &ArcStr {
		self.matched.topic()
	}

	/// Value bound to the placeholder `{name}`.
	pub fn get(&self, name: &str) -> Option<Substr> {
		self.matched.get(name)
	}

	/// All placeholder bindings in pattern order.
	pub fn bindings(&self) -> impl Iterator<Item = (&str, Substr)> + '_ {
		self.matched.bindings()
	}

	/// The full match, including anonymous wildcard captures.
	pub fn topic_match(&self) -> &TopicMatch {
		&self.matched
	}

	/// Raw payload.
	pub fn payload(&self) -> &Bytes {
		&self.payload
	}

	/// Payload decoded as JSON.
	pub fn json<T: serde::de::DeserializeOwned>(
		&self,
	) -> Result<T, crate::hermes::DecodeError> {
		crate::hermes::codec::decode(&self.payload)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::{EndSession, Outcome};

	#[tokio::test]
	async fn test_result_converts_into_output() {
		let handler: Handler<u32, Outcome> =
			Handler::new(|n: u32| async move { Ok(EndSession::new().text(n.to_string())) });

		let outcome = handler.call(7).await.unwrap();
		assert_eq!(outcome, Outcome::End(EndSession::new().text("7")));
	}

	#[tokio::test]
	async fn test_error_is_returned() {
		let handler: Handler<(), ()> =
			Handler::new(|_| async { Err::<(), _>(anyhow::anyhow!("boom")) });

		let err = handler.call(()).await.unwrap_err();
		assert!(matches!(err, HandlerError::Failed(_)));
		assert!(err.to_string().contains("boom"));
	}

	#[tokio::test]
	async fn test_panic_is_contained() {
		let handler: Handler<(), ()> = Handler::new(|_| async {
			if true {
				panic!("handler exploded");
			}
			Ok(())
		});

		let err = handler.call(()).await.unwrap_err();
		match err {
			| HandlerError::Panicked(message) => {
				assert_eq!(message, "handler exploded")
			}
			| other => panic!("Expected a panic, got {other:?}"),
		}
	}

	#[test]
	fn test_clone_keeps_name() {
		let handler: Handler<(), ()> = Handler::new(|_| async { Ok(()) });
		assert_eq!(handler.clone().name(), handler.name());
	}
}
