//! Structural limits applied to every topic pattern before it is parsed.

use super::topic_pattern_item::TopicPatternError;

/// Maximum number of `/`-separated segments
pub const MAX_TOPIC_DEPTH: usize = 32;

/// Maximum pattern length in bytes
pub const MAX_TOPIC_LENGTH: usize = 1024;

/// Rejects blank, oversized and NUL-carrying patterns.
pub fn check(pattern: &str) -> Result<(), TopicPatternError> {
	if pattern.trim().is_empty() {
		return Err(TopicPatternError::EmptyTopic);
	}
	if pattern.len() > MAX_TOPIC_LENGTH {
		return Err(TopicPatternError::TooLong {
			length: pattern.len(),
			max: MAX_TOPIC_LENGTH,
		});
	}
	let depth = pattern.split('/').count();
	if depth > MAX_TOPIC_DEPTH {
		return Err(TopicPatternError::TooDeep {
			depth,
			max: MAX_TOPIC_DEPTH,
		});
	}
	if pattern.contains('\0') {
		return Err(TopicPatternError::wildcard_usage(
			"NUL character in topic pattern",
		));
	}
	Ok(())
}
