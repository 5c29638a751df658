use std::collections::HashSet;
use std::fmt::{self, Display, Write};
use std::ops::Range;
use std::slice::Iter;
use std::sync::Arc;

use arcstr::ArcStr;
use smallvec::SmallVec;
use thiserror::Error;

use super::limits;
use super::topic_pattern_item::{TopicPatternError, TopicPatternItem};
use crate::topic::topic_match::{TopicMatch, TopicMatchError, TopicPath};

/// Reasons a concrete topic cannot be built from a pattern
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicFormatError {
	/// Patterns ending in `#` describe many topics, not one
	#[error("Cannot format topic with # wildcard for publishing")]
	HashWildcardNotSupported,

	/// Wrong number of values for the pattern's wildcards
	#[error(
		"Parameter count mismatch: expected {expected}, provided {provided}"
	)]
	ParameterCountMismatch {
		/// Wildcards in the pattern
		expected: usize,
		/// Values given
		provided: usize,
	},

	/// A value's `Display` implementation failed
	#[error("Failed to write topic parameter")]
	Write(#[from] fmt::Error),
}

/// A compiled topic pattern.
///
/// Keeps the source text (placeholders included), the transport form with
/// every placeholder replaced by `+`, and the parsed segments.
#[derive(Debug, Clone)]
pub struct TopicPatternPath {
	source: ArcStr,
	subscription: ArcStr,
	segments: Vec<TopicPatternItem>,
}

impl TopicPatternPath {
	/// Compiles a topic pattern string.
	///
	/// Fails when `#` is not the last segment, when a placeholder name is
	/// empty or repeated, or when a wildcard character is mixed into a
	/// literal segment.
	pub fn new_from_string(
		topic_pattern: impl Into<ArcStr>,
	) -> Result<Self, TopicPatternError> {
		let source = topic_pattern.into();
		limits::check(&source)?;

		let segments = source
			.split('/')
			.map(|segment| TopicPatternItem::try_from(source.substr_from(segment)))
			.collect::<Result<Vec<_>, _>>()?;

		let last = segments.len() - 1;
		let mut names = HashSet::new();
		for (index, segment) in segments.iter().enumerate() {
			match segment {
				| TopicPatternItem::Hash if index != last => {
					return Err(TopicPatternError::hash_position(source.as_str()));
				}
				| TopicPatternItem::Plus(Some(name))
					if !names.insert(name.as_str()) =>
				{
					return Err(TopicPatternError::duplicate_parameter(
						name.as_str(),
						source.as_str(),
					));
				}
				| _ => {}
			}
		}

		let subscription = segments
			.iter()
			.map(TopicPatternItem::as_str)
			.collect::<Vec<_>>()
			.join("/");

		Ok(Self {
			subscription: ArcStr::from(subscription),
			source,
			segments,
		})
	}

	/// Returns MQTT pattern with wildcards for broker subscription.
	///
	/// Placeholders are replaced by `+`.
	pub fn mqtt_pattern(&self) -> ArcStr {
		self.subscription.clone()
	}

	/// Returns original pattern with named parameters.
	pub fn topic_pattern(&self) -> ArcStr {
		self.source.clone()
	}

	/// Returns true if no segment is a wildcard or placeholder.
	pub fn is_exact(&self) -> bool {
		self.wildcard_count() == 0
	}

	/// Returns true if the pattern ends with `#`.
	pub fn contains_hash(&self) -> bool {
		matches!(self.segments.last(), Some(TopicPatternItem::Hash))
	}

	/// Pattern segments in order.
	pub fn iter(&self) -> Iter<'_, TopicPatternItem> {
		self.segments.iter()
	}

	/// Number of segments.
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Always false for a compiled pattern.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Placeholder names with the index of the segment each one binds.
	pub fn parameter_positions(
		&self,
	) -> impl Iterator<Item = (&str, usize)> + '_ {
		self.segments.iter().enumerate().filter_map(|(i, s)| match s {
			| TopicPatternItem::Plus(Some(name)) => Some((name.as_str(), i)),
			| _ => None,
		})
	}

	fn wildcard_count(&self) -> usize {
		self.segments.iter().filter(|s| s.is_wildcard()).count()
	}

	/// Builds a concrete topic, filling wildcards with `params` in order.
	pub fn format_topic(
		&self,
		params: &[&dyn Display],
	) -> Result<String, TopicFormatError> {
		if self.contains_hash() {
			return Err(TopicFormatError::HashWildcardNotSupported);
		}
		let expected = self.wildcard_count();
		if params.len() != expected {
			return Err(TopicFormatError::ParameterCountMismatch {
				expected,
				provided: params.len(),
			});
		}

		let mut topic = String::with_capacity(self.source.len());
		let mut values = params.iter();
		for (i, segment) in self.segments.iter().enumerate() {
			if i > 0 {
				topic.push('/');
			}
			if !segment.is_wildcard() {
				topic.push_str(segment.as_str());
			} else if let Some(value) = values.next() {
				write!(topic, "{value}")?;
			}
		}
		Ok(topic)
	}

	/// Returns true if the topic matches this pattern.
	pub fn matches(&self, topic: &TopicPath) -> bool {
		self.walk(topic, |_, _| {}).is_ok()
	}

	/// Matches a topic and collects what each wildcard captured.
	pub fn try_match(
		&self,
		topic: Arc<TopicPath>,
	) -> Result<TopicMatch, TopicMatchError> {
		let mut captures = SmallVec::new();
		let mut bindings = SmallVec::new();
		self.walk(&topic, |item, range| {
			if let TopicPatternItem::Plus(Some(name)) = item {
				bindings.push((name.clone(), range.clone()));
			}
			captures.push(range);
		})?;
		Ok(TopicMatch::from_match_result(topic, captures, bindings))
	}

	/// Steps through pattern and topic together. Every wildcard reports the
	/// range of topic segments it covers.
	fn walk<F>(
		&self,
		topic: &TopicPath,
		mut capture: F,
	) -> Result<(), TopicMatchError>
	where
		F: FnMut(&TopicPatternItem, Range<usize>),
	{
		let segments = &topic.segments;
		for (position, item) in self.segments.iter().enumerate() {
			let found = segments
				.get(position)
				.ok_or(TopicMatchError::UnexpectedEndOfTopic)?;
			match item {
				| TopicPatternItem::Str(expected) if found != expected => {
					return Err(TopicMatchError::SegmentMismatch {
						expected: expected.to_string(),
						found: found.to_string(),
						position,
					});
				}
				| TopicPatternItem::Str(_) => {}
				| TopicPatternItem::Plus(_) => {
					accept_wildcard(found, position)?;
					capture(item, position .. position + 1);
				}
				| TopicPatternItem::Hash => {
					accept_wildcard(found, position)?;
					capture(item, position .. segments.len());
					return Ok(());
				}
			}
		}
		if segments.len() > self.segments.len() {
			return Err(TopicMatchError::UnexpectedEndOfPattern);
		}
		Ok(())
	}
}

/// Wildcards never bind an empty segment, and a leading wildcard never
/// reaches into `$`-prefixed roots.
fn accept_wildcard(segment: &str, position: usize) -> Result<(), TopicMatchError> {
	if segment.is_empty() {
		Err(TopicMatchError::EmptySegment { position })
	} else if position == 0 && segment.starts_with('$') {
		Err(TopicMatchError::ReservedRoot {
			root: segment.to_string(),
		})
	} else {
		Ok(())
	}
}

impl Display for TopicPatternPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

impl TryFrom<&str> for TopicPatternPath {
	type Error = TopicPatternError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new_from_string(value)
	}
}
