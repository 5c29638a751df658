//! Concrete topics and the result of matching one against a pattern.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use arcstr::{ArcStr, Substr};
use smallvec::SmallVec;
use thiserror::Error;

/// A concrete topic split into its `/`-separated segments.
///
/// Segments are zero-copy slices of the original topic string.
#[derive(Debug, Clone)]
pub struct TopicPath {
	/// The full topic string
	pub path: ArcStr,
	/// The topic split on `/`
	pub segments: Vec<Substr>,
}

impl TopicPath {
	/// Splits a topic into segments.
	pub fn new(path: impl Into<ArcStr>) -> Self {
		let path = path.into();
		let segments: Vec<Substr> =
			path.split('/').map(|s| path.substr_from(s)).collect();
		Self { path, segments }
	}

	/// Returns the full topic string.
	pub fn path(&self) -> ArcStr {
		self.path.clone()
	}
}

impl fmt::Display for TopicPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.path)
	}
}

/// Reasons a concrete topic does not match a pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicMatchError {
	/// Topic has more segments than the pattern accepts
	#[error("Topic is longer than the pattern")]
	UnexpectedEndOfPattern,
	/// Topic has fewer segments than the pattern requires
	#[error("Topic is shorter than the pattern")]
	UnexpectedEndOfTopic,
	/// A literal segment differs
	#[error(
		"Segment mismatch at position {position}: expected '{expected}', \
		 found '{found}'"
	)]
	SegmentMismatch {
		/// Literal expected by the pattern
		expected: String,
		/// Segment found in the topic
		found: String,
		/// Segment index
		position: usize,
	},
	/// A wildcard met an empty segment
	#[error("Wildcard cannot match the empty segment at position {position}")]
	EmptySegment {
		/// Segment index
		position: usize,
	},
	/// A leading wildcard met a `$`-prefixed topic root
	#[error("Leading wildcard cannot match reserved topic root '{root}'")]
	ReservedRoot {
		/// The reserved first segment
		root: String,
	},
}

/// Successful match of a topic against a pattern.
///
/// Holds every wildcard capture positionally and the named placeholder
/// captures by name. Captured values are slices of the matched topic.
#[derive(Clone)]
pub struct TopicMatch {
	topic: Arc<TopicPath>,
	params: SmallVec<[Range<usize>; 3]>,
	named_params: SmallVec<[(Substr, Range<usize>); 3]>,
}

impl TopicMatch {
	pub(crate) fn from_match_result(
		topic: Arc<TopicPath>,
		params: SmallVec<[Range<usize>; 3]>,
		named_params: SmallVec<[(Substr, Range<usize>); 3]>,
	) -> Self {
		Self {
			topic,
			params,
			named_params,
		}
	}

	/// A match without captures, produced by exact topic routes.
	pub fn exact(topic: Arc<TopicPath>) -> Self {
		Self::from_match_result(topic, SmallVec::new(), SmallVec::new())
	}

	/// The matched topic string.
	pub fn topic(&self) -> &ArcStr {
		&self.topic.path
	}

	/// The matched topic.
	pub fn topic_path(&self) -> &TopicPath {
		&self.topic
	}

	/// The matched topic split into segments.
	pub fn path_segments(&self) -> &[Substr] {
		&self.topic.segments
	}

	fn get_param_range(&self, range: &Range<usize>) -> Substr {
		if range.is_empty() {
			self.topic.path.substr(0 .. 0)
		} else if range.len() == 1 {
			self.topic.segments[range.start].clone()
		} else {
			let start_segment = &self.topic.segments[range.start];
			let end_segment = &self.topic.segments[range.end - 1];

			let start_pos = start_segment.as_ptr() as usize
				- self.topic.path.as_ptr() as usize;
			let end_pos = end_segment.as_ptr() as usize
				- self.topic.path.as_ptr() as usize
				+ end_segment.len();

			self.topic.path.substr(start_pos .. end_pos)
		}
	}

	/// Value captured by the `index`-th wildcard of the pattern.
	///
	/// A trailing `#` captures the whole remainder, slashes included.
	pub fn get_param(&self, index: usize) -> Option<Substr> {
		self.params
			.get(index)
			.map(|range| self.get_param_range(range))
	}

	/// Value bound to the placeholder `{name}`.
	pub fn get(&self, name: &str) -> Option<Substr> {
		self.named_params
			.iter()
			.find(|(n, _)| n.as_str() == name)
			.map(|(_, range)| self.get_param_range(range))
	}

	/// Number of wildcard captures.
	pub fn param_count(&self) -> usize {
		self.params.len()
	}

	/// All placeholder bindings in pattern order.
	pub fn bindings(&self) -> impl Iterator<Item = (&str, Substr)> + '_ {
		self.named_params
			.iter()
			.map(|(name, range)| (name.as_str(), self.get_param_range(range)))
	}
}

impl fmt::Debug for TopicMatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TopicMatch {{ topic: {}, params: [", self.topic.path)?;
		for (i, param) in self.params.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{}", self.get_param_range(param))?;
		}
		write!(f, "]")?;

		if !self.named_params.is_empty() {
			write!(f, ", named_params: {{")?;
			for (name, range) in &self.named_params {
				write!(f, "{}: {}, ", name, self.get_param_range(range))?;
			}
			write!(f, "}}")?;
		}

		write!(f, " }}")
	}
}

impl fmt::Display for TopicMatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Match({})", self.topic.path)?;

		if !self.params.is_empty() {
			write!(f, " with {} params", self.params.len())?;
		}

		Ok(())
	}
}
