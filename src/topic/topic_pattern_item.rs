//! Single segments of a topic pattern

use std::borrow::Cow;
use std::fmt;

use arcstr::Substr;
use thiserror::Error;

/// Reasons a topic pattern does not compile
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicPatternError {
	/// `#` somewhere other than the last segment
	#[error("Invalid topic pattern '{pattern}': '#' must be the last segment")]
	HashPosition {
		/// The offending pattern
		pattern: String,
	},

	/// `+`, `#` or braces inside a segment that is not a wildcard
	#[error("Invalid wildcard usage in segment '{usage}'")]
	WildcardUsage {
		/// The offending segment
		usage: String,
	},

	/// Placeholder written as `{}`
	#[error("Invalid topic pattern '{pattern}': placeholder name is empty")]
	EmptyParameterName {
		/// The offending segment
		pattern: String,
	},

	/// The same placeholder name bound twice in one pattern
	#[error(
		"Invalid topic pattern '{pattern}': placeholder '{{{name}}}' is used \
		 more than once"
	)]
	DuplicateParameter {
		/// Placeholder name
		name: String,
		/// The offending pattern
		pattern: String,
	},

	/// Blank pattern
	#[error("Topic pattern cannot be empty")]
	EmptyTopic,

	/// Pattern longer than [`MAX_TOPIC_LENGTH`](super::limits::MAX_TOPIC_LENGTH)
	#[error("Topic pattern is {length} bytes long, the limit is {max}")]
	TooLong {
		/// Pattern length in bytes
		length: usize,
		/// Allowed length
		max: usize,
	},

	/// Pattern with more segments than [`MAX_TOPIC_DEPTH`](super::limits::MAX_TOPIC_DEPTH)
	#[error("Topic pattern has {depth} segments, the limit is {max}")]
	TooDeep {
		/// Number of segments
		depth: usize,
		/// Allowed number of segments
		max: usize,
	},
}

impl TopicPatternError {
	/// Creates a HashPosition error
	pub fn hash_position(pattern: impl Into<String>) -> Self {
		Self::HashPosition {
			pattern: pattern.into(),
		}
	}

	/// Creates a WildcardUsage error
	pub fn wildcard_usage(usage: impl Into<String>) -> Self {
		Self::WildcardUsage {
			usage: usage.into(),
		}
	}

	/// Creates an EmptyParameterName error
	pub fn empty_parameter_name(pattern: impl Into<String>) -> Self {
		Self::EmptyParameterName {
			pattern: pattern.into(),
		}
	}

	/// Creates a DuplicateParameter error
	pub fn duplicate_parameter(
		name: impl Into<String>,
		pattern: impl Into<String>,
	) -> Self {
		Self::DuplicateParameter {
			name: name.into(),
			pattern: pattern.into(),
		}
	}
}

/// One `/`-separated segment of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPatternItem {
	/// Literal segment, compared byte for byte
	Str(Substr),
	/// `+` (`None`) or a `{name}` placeholder; matches one segment
	Plus(Option<Substr>),
	/// `#`; matches the rest of the topic
	Hash,
}

impl TopicPatternItem {
	/// Transport form: literals as written, `+` for every placeholder.
	pub fn as_str(&self) -> &str {
		match self {
			| TopicPatternItem::Str(literal) => literal,
			| TopicPatternItem::Plus(_) => "+",
			| TopicPatternItem::Hash => "#",
		}
	}

	/// Source form, with placeholders in braces.
	pub fn as_source(&self) -> Cow<'_, str> {
		match self {
			| TopicPatternItem::Plus(Some(name)) => {
				Cow::Owned(format!("{{{name}}}"))
			}
			| other => Cow::Borrowed(other.as_str()),
		}
	}

	/// Placeholder name, if this is a named placeholder.
	pub fn param_name(&self) -> Option<Substr> {
		match self {
			| TopicPatternItem::Plus(name) => name.clone(),
			| _ => None,
		}
	}

	/// True for `+`, `#` and placeholders.
	pub fn is_wildcard(&self) -> bool {
		!matches!(self, TopicPatternItem::Str(_))
	}
}

impl fmt::Display for TopicPatternItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl TryFrom<Substr> for TopicPatternItem {
	type Error = TopicPatternError;

	fn try_from(segment: Substr) -> Result<Self, Self::Error> {
		match segment.as_str() {
			| "+" => return Ok(TopicPatternItem::Plus(None)),
			| "#" => return Ok(TopicPatternItem::Hash),
			| _ => {}
		}

		let name = segment
			.strip_prefix('{')
			.and_then(|rest| rest.strip_suffix('}'));
		match name {
			| Some("") => Err(TopicPatternError::empty_parameter_name(
				segment.as_str(),
			)),
			| Some(name) if name.contains(['{', '}', '+', '#']) => {
				Err(TopicPatternError::wildcard_usage(segment.as_str()))
			}
			| Some(name) => {
				Ok(TopicPatternItem::Plus(Some(segment.substr_from(name))))
			}
			| None if segment.contains(['+', '#']) => {
				Err(TopicPatternError::wildcard_usage(segment.as_str()))
			}
			| None => Ok(TopicPatternItem::Str(segment)),
		}
	}
}
