//! Ordered routing table for custom topic routes.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::sync::Arc;

use arcstr::ArcStr;
use tracing::trace;

use super::compiled_topic::CompiledTopic;
use super::topic_matcher::TopicMatcherNode;
use super::topic_pattern_path::TopicPatternPath;
use crate::topic::topic_match::{TopicMatch, TopicPath};

/// A route identifier.
///
/// Identifiers grow with every added route, so sorting by id restores
/// registration order.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub struct RouteId(usize);

impl Display for RouteId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "RouteId({})", self.0)
	}
}

struct PatternRoute<T> {
	pattern: TopicPatternPath,
	target: T,
}

/// Routing table mapping compiled topics to targets.
///
/// Exact topics are looked up in a hash map; patterns are indexed in a
/// segment trie and confirmed by their compiled matcher. Lookups return
/// exact routes first, then pattern routes, each group in the order the
/// routes were added.
pub struct TopicRouter<T> {
	exact_routes: HashMap<ArcStr, Vec<(RouteId, T)>>,
	topic_matcher: TopicMatcherNode<Vec<RouteId>>,
	pattern_routes: HashMap<RouteId, PatternRoute<T>>,
	subscriptions: Vec<ArcStr>,
	subscribed: HashSet<ArcStr>,
	next_id: usize,
}

impl<T> Default for TopicRouter<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> TopicRouter<T> {
	/// Creates an empty router.
	pub fn new() -> Self {
		Self {
			exact_routes: HashMap::new(),
			topic_matcher: TopicMatcherNode::new(),
			pattern_routes: HashMap::new(),
			subscriptions: Vec::new(),
			subscribed: HashSet::new(),
			next_id: 0,
		}
	}

	/// Adds a route.
	///
	/// Returns whether the route introduced a subscription topic that was
	/// not needed before, together with the new route id.
	pub fn add_route(
		&mut self,
		topic: CompiledTopic,
		target: T,
	) -> (bool, RouteId) {
		let id = RouteId(self.next_id);
		self.next_id += 1;

		let subscription = topic.subscription_topic();
		let needs_subscribe = self.subscribed.insert(subscription.clone());
		if needs_subscribe {
			self.subscriptions.push(subscription);
		}

		match topic {
			| CompiledTopic::Exact(literal) => {
				self.exact_routes
					.entry(literal)
					.or_default()
					.push((id, target));
			}
			| CompiledTopic::Pattern(pattern) => {
				self.topic_matcher.slot_mut(&pattern).push(id);
				self.pattern_routes
					.insert(id, PatternRoute { pattern, target });
			}
		}

		(needs_subscribe, id)
	}

	/// Returns every route matching the topic with its placeholder bindings.
	pub fn get_routes<'a>(
		&'a self,
		topic: &Arc<TopicPath>,
	) -> Vec<(RouteId, &'a T, TopicMatch)> {
		let mut routes: Vec<(RouteId, &'a T, TopicMatch)> = self
			.exact_routes
			.get(topic.path.as_str())
			.into_iter()
			.flatten()
			.map(|(id, target)| (*id, target, TopicMatch::exact(topic.clone())))
			.collect();

		let mut candidates: Vec<RouteId> = self
			.topic_matcher
			.candidates(topic)
			.into_iter()
			.flatten()
			.copied()
			.collect();
		candidates.sort_unstable();
		candidates.dedup();

		for id in candidates {
			let Some(route) = self.pattern_routes.get(&id) else {
				continue;
			};
			match route.pattern.try_match(topic.clone()) {
				| Ok(topic_match) => routes.push((id, &route.target, topic_match)),
				| Err(err) => {
					trace!(
						route_id = %id,
						pattern = %route.pattern,
						topic = %topic,
						reason = %err,
						"Index candidate rejected by pattern"
					);
				}
			}
		}
		routes
	}

	/// Deduplicated subscription topics in first-registration order.
	pub fn subscription_topics(&self) -> &[ArcStr] {
		&self.subscriptions
	}

	/// Number of routes.
	pub fn len(&self) -> usize {
		self.next_id
	}

	/// Returns true if no route was added.
	pub fn is_empty(&self) -> bool {
		self.next_id == 0
	}
}
