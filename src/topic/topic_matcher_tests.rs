use std::collections::HashSet;

use arcstr::ArcStr;

use super::topic_matcher::TopicMatcherNode;
use super::topic_pattern_path::TopicPatternPath;
use crate::topic::topic_match::TopicPath;

fn new_from_string(pattern: &str) -> TopicPatternPath {
	TopicPatternPath::new_from_string(pattern).unwrap()
}

fn build_index(routes: &[(&str, usize)]) -> TopicMatcherNode<HashSet<usize>> {
	let mut root = TopicMatcherNode::<HashSet<usize>>::new();
	for (pattern_str, route_id) in routes {
		let pattern = new_from_string(pattern_str);
		root.slot_mut(&pattern)
			.insert(*route_id);
	}
	root
}

fn collect_ids(matches: &[&HashSet<usize>]) -> HashSet<usize> {
	matches.iter().flat_map(|set| set.iter().copied()).collect()
}

// Every candidate the index returns for each topic, compared as a set
fn test_candidates(
	routes: &[(&str, usize)],
	expected_matches: &[(&str, Vec<usize>)],
) {
	let root = build_index(routes);

	for (path, expected_ids) in expected_matches {
		let expected: HashSet<usize> = expected_ids.iter().copied().collect();

		let topic = TopicPath::new(ArcStr::from(*path));
		let actual = collect_ids(&root.candidates(&topic));

		assert_eq!(
			actual, expected,
			"Path '{path}' matched routes {actual:?}, expected {expected:?}"
		);
	}
}

#[test]
fn test_literal_patterns() {
	let routes = [
		("hermes/nlu/intentNotRecognized", 1),
		("hermes/dialogueManager/intentNotRecognized", 2),
		("hermes/intent/GetTime", 3),
	];

	let expected_matches = [
		("hermes/nlu/intentNotRecognized", vec![1]),
		("hermes/dialogueManager/intentNotRecognized", vec![2]),
		("hermes/intent/GetTime", vec![3]),
		("hermes/intent/GetWeather", vec![]),
		("hermes/nlu", vec![]),
	];

	test_candidates(&routes, &expected_matches);
}

#[test]
fn test_plus_and_placeholders() {
	let routes = [
		("hermes/hotword/+/detected", 1),
		("hermes/intent/{intent_name}", 2),
		("hermes/{component}/{site_id}/status", 3),
	];

	let expected_matches = [
		("hermes/hotword/alexa/detected", vec![1]),
		("hermes/hotword/porcupine/detected", vec![1]),
		("hermes/hotword/alexa/toggleOn", vec![]),
		("hermes/hotword/detected", vec![]),
		("hermes/intent/GetTime", vec![2]),
		("hermes/intent/GetTime/extra", vec![]),
		("hermes/tts/default/status", vec![3]),
	];

	test_candidates(&routes, &expected_matches);
}

#[test]
fn test_hash_needs_one_more_segment() {
	let routes = [
		("hermes/audioServer/#", 1),
		("hermes/#", 2),
		("#", 3),
	];

	let expected_matches = [
		("hermes", vec![3]),
		("hermes/audioServer", vec![2, 3]),
		("hermes/audioServer/default", vec![1, 2, 3]),
		("hermes/audioServer/default/playBytes/req", vec![1, 2, 3]),
		("other/topic", vec![3]),
	];

	test_candidates(&routes, &expected_matches);
}

#[test]
fn test_overlapping_patterns() {
	let routes = [
		("hermes/tts/say", 1),
		("hermes/+/say", 2),
		("hermes/tts/+", 3),
		("hermes/#", 4),
		("+/tts/#", 5),
	];

	let expected_matches = [
		("hermes/tts/say", vec![1, 2, 3, 4, 5]),
		("hermes/asr/say", vec![2, 4]),
		("hermes/tts/stop", vec![3, 4, 5]),
		("hermes/tts/say/finished", vec![4, 5]),
		("rhasspy/tts/say", vec![5]),
		("hermes", vec![]),
	];

	test_candidates(&routes, &expected_matches);
}

#[test]
fn test_root_wildcards() {
	let routes = [("#", 1), ("+", 2), ("+/+", 3), ("+/#", 4)];

	let expected_matches = [
		("segment", vec![1, 2]),
		("segment1/segment2", vec![1, 3, 4]),
		("segment1/segment2/segment3", vec![1, 4]),
	];

	test_candidates(&routes, &expected_matches);
}

#[test]
fn test_index_is_coarse_about_reserved_roots() {
	// The index accepts these; the compiled pattern rejects them later
	let routes = [("+/status", 1)];

	let expected_matches = [
		("device/status", vec![1]),
		("$SYS/status", vec![1]),
		("/status", vec![1]),
	];

	test_candidates(&routes, &expected_matches);
}

#[test]
fn test_multiple_ids_share_a_slot() {
	let mut root = TopicMatcherNode::<HashSet<usize>>::new();
	let pattern = new_from_string("hermes/hotword/{wakeword_id}/detected");

	let slot = root.slot_mut(&pattern);
	slot.insert(1);
	slot.insert(2);

	// Same shape with an anonymous wildcard lands in the same slot
	let anonymous = new_from_string("hermes/hotword/+/detected");
	root.slot_mut(&anonymous).insert(3);

	let topic = TopicPath::new("hermes/hotword/alexa/detected");
	let matches = root.candidates(&topic);
	assert_eq!(matches.len(), 1);
	assert_eq!(collect_ids(&matches), HashSet::from([1, 2, 3]));
}

#[test]
fn test_empty_index() {
	let root = TopicMatcherNode::<HashSet<usize>>::new();
	assert!(root.is_empty());
	assert!(root
		.candidates(&TopicPath::new("hermes/tts/say"))
		.is_empty());

	let root = build_index(&[("hermes/tts/say", 1)]);
	assert!(!root.is_empty());
}
