//! Compiled form of a topic pattern.

use std::fmt;
use std::sync::Arc;

use arcstr::ArcStr;

use super::topic_match::{TopicMatch, TopicPath};
use super::topic_pattern_item::TopicPatternError;
use super::topic_pattern_path::TopicPatternPath;

/// A topic pattern ready for routing.
///
/// Patterns without any wildcard or placeholder compile to [`Exact`], which
/// is compared by string equality. Everything else compiles to
/// [`Pattern`], a segment-wise matcher that also records where each
/// placeholder sits.
///
/// [`Exact`]: CompiledTopic::Exact
/// [`Pattern`]: CompiledTopic::Pattern
#[derive(Debug, Clone)]
pub enum CompiledTopic {
	/// Literal topic, matched by equality
	Exact(ArcStr),
	/// Wildcard or placeholder pattern
	Pattern(TopicPatternPath),
}

impl CompiledTopic {
	/// Compiles a pattern string.
	pub fn compile(
		pattern: impl Into<ArcStr>,
	) -> Result<Self, TopicPatternError> {
		let path = TopicPatternPath::new_from_string(pattern)?;
		if path.is_exact() {
			Ok(Self::Exact(path.topic_pattern()))
		} else {
			Ok(Self::Pattern(path))
		}
	}

	/// Returns true for the exact-literal fast path.
	pub fn is_exact(&self) -> bool {
		matches!(self, Self::Exact(_))
	}

	/// The topic filter handed to the broker.
	pub fn subscription_topic(&self) -> ArcStr {
		match self {
			| Self::Exact(topic) => topic.clone(),
			| Self::Pattern(path) => path.mqtt_pattern(),
		}
	}

	/// The pattern as written by the application.
	pub fn source(&self) -> ArcStr {
		match self {
			| Self::Exact(topic) => topic.clone(),
			| Self::Pattern(path) => path.topic_pattern(),
		}
	}

	/// Matches a concrete topic, returning the placeholder bindings.
	pub fn match_topic(&self, topic: &Arc<TopicPath>) -> Option<TopicMatch> {
		match self {
			| Self::Exact(literal) if *literal == topic.path => {
				Some(TopicMatch::exact(Arc::clone(topic)))
			}
			| Self::Exact(_) => None,
			| Self::Pattern(path) => path.try_match(Arc::clone(topic)).ok(),
		}
	}

	/// Returns true if the concrete topic matches.
	pub fn matches(&self, topic: &str) -> bool {
		match self {
			| Self::Exact(literal) => literal.as_str() == topic,
			| Self::Pattern(path) => path.matches(&TopicPath::new(topic)),
		}
	}
}

impl fmt::Display for CompiledTopic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.source())
	}
}
