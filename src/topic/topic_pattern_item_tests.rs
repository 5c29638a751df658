use arcstr::Substr;

use super::{TopicPatternError, TopicPatternItem};

fn parse(segment: &str) -> Result<TopicPatternItem, TopicPatternError> {
	TopicPatternItem::try_from(Substr::from(segment))
}

#[test]
fn test_literals() {
	for segment in ["hermes", "device-123@home.local", "", "{param", "param}", "{"]
	{
		let item = parse(segment).unwrap();
		assert_eq!(item, TopicPatternItem::Str(Substr::from(segment)));
		assert_eq!(item.as_str(), segment);
		assert_eq!(item.as_source(), segment);
		assert_eq!(item.param_name(), None);
		assert!(!item.is_wildcard(), "'{segment}' is a literal");
	}
}

#[test]
fn test_wildcards() {
	let plus = parse("+").unwrap();
	assert_eq!(plus, TopicPatternItem::Plus(None));
	assert!(plus.is_wildcard());
	assert_eq!(plus.param_name(), None);

	let hash = parse("#").unwrap();
	assert_eq!(hash, TopicPatternItem::Hash);
	assert!(hash.is_wildcard());
	assert_eq!(hash.as_source(), "#");
}

#[test]
fn test_named_placeholder() {
	let item = parse("{site_id}").unwrap();

	assert_eq!(item, TopicPatternItem::Plus(Some(Substr::from("site_id"))));
	assert_eq!(item.as_str(), "+");
	assert_eq!(item.as_source(), "{site_id}");
	assert_eq!(item.param_name().as_deref(), Some("site_id"));
	assert_eq!(item.to_string(), "+");
}

#[test]
fn test_empty_placeholder() {
	assert_eq!(
		parse("{}"),
		Err(TopicPatternError::EmptyParameterName {
			pattern: "{}".to_string()
		})
	);
}

#[test]
fn test_misplaced_wildcard_characters() {
	for segment in ["a+b", "a#b", "++", "##", "+#", "{details:#}", "{a+b}", "{{param}}"]
	{
		assert_eq!(
			parse(segment),
			Err(TopicPatternError::WildcardUsage {
				usage: segment.to_string()
			}),
			"'{segment}' should be rejected"
		);
	}
}
