//! Topic handling module
//!
//! This module provides components for working with MQTT topic patterns:
//! compiling human-friendly patterns into matchers, extracting named
//! placeholder values, and indexing many patterns for fast lookup.

// Submodules
pub mod compiled_topic;
pub mod limits;
pub mod topic_match;
pub mod topic_matcher;
pub mod topic_pattern_item;
/// Topic pattern parsing and matching
pub mod topic_pattern_path;
pub mod topic_router;

#[cfg(test)]
mod topic_matcher_tests;
#[cfg(test)]
mod topic_pattern_item_tests;


// Re-export commonly used types for convenience
pub use compiled_topic::CompiledTopic;
pub use topic_match::{TopicMatch, TopicMatchError, TopicPath};
pub use topic_pattern_item::{TopicPatternError, TopicPatternItem};
pub use topic_pattern_path::{TopicFormatError, TopicPatternPath};
pub use topic_router::{RouteId, TopicRouter};
