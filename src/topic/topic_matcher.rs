//! Segment trie indexing many topic patterns at once.

use std::collections::HashMap;

use arcstr::Substr;

use super::topic_pattern_item::TopicPatternItem;
use super::topic_pattern_path::TopicPatternPath;
use crate::topic::topic_match::TopicPath;

/// One level of the route index.
///
/// Lookups are a coarse filter: `+` nodes accept any segment here, the
/// compiled pattern makes the final decision.
#[derive(Debug)]
pub struct TopicMatcherNode<T> {
	/// Slot of patterns ending at this node
	terminal: Option<T>,

	/// Literal next segments
	literals: HashMap<Substr, TopicMatcherNode<T>>,

	/// Shared child for `+` and `{name}` segments
	any_segment: Option<Box<TopicMatcherNode<T>>>,

	/// Slot of patterns ending with `#` after this node
	remainder: Option<T>,
}

impl<T: Default> Default for TopicMatcherNode<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Default> TopicMatcherNode<T> {
	/// Creates an empty node
	pub fn new() -> Self {
		Self {
			terminal: None,
			literals: HashMap::new(),
			any_segment: None,
			remainder: None,
		}
	}

	/// Returns true if no pattern has been stored below this node.
	pub fn is_empty(&self) -> bool {
		self.terminal.is_none()
			&& self.literals.is_empty()
			&& self.any_segment.is_none()
			&& self.remainder.is_none()
	}

	/// Slot for `pattern`, created on first use.
	///
	/// Patterns that differ only in placeholder names share a slot.
	pub fn slot_mut(&mut self, pattern: &TopicPatternPath) -> &mut T {
		let mut node = self;
		for item in pattern.iter() {
			node = match item {
				| TopicPatternItem::Str(literal) => {
					node.literals.entry(literal.clone()).or_default()
				}
				| TopicPatternItem::Plus(_) => node
					.any_segment
					.get_or_insert_with(|| Box::new(TopicMatcherNode::new())),
				| TopicPatternItem::Hash => {
					return node.remainder.get_or_insert_with(T::default);
				}
			};
		}
		node.terminal.get_or_insert_with(T::default)
	}

	fn collect<'a>(&'a self, segments: &[Substr], found: &mut Vec<&'a T>) {
		let Some((segment, rest)) = segments.split_first() else {
			found.extend(self.terminal.as_ref());
			return;
		};
		if let Some(child) = self.literals.get(segment) {
			child.collect(rest, found);
		}
		if let Some(child) = &self.any_segment {
			child.collect(rest, found);
		}
		// `#` needs at least one segment, and there is one here
		found.extend(self.remainder.as_ref());
	}

	/// Slots whose patterns may match `topic`.
	pub fn candidates<'a>(&'a self, topic: &TopicPath) -> Vec<&'a T> {
		let mut found = Vec::new();
		self.collect(&topic.segments, &mut found);
		found
	}
}
