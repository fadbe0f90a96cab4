//! Attribute access for custom elements.

use std::str::FromStr;

use crate::tree::{AttributeItem, AttributeValue, Element};

/// Read a named property attribute from an element.
///
/// Returns `None` when the attribute is missing, has no value, or its value
/// is empty. Literal values are returned as-is; wrapped expressions return
/// their inner source text. `true` reads as `"true"` and `false` as absent.
pub fn get_attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    let value = element.attributes.iter().find_map(|item| match item {
        AttributeItem::Property(attr) if attr.name == name => Some(attr.value.as_ref()),
        _ => None,
    })??;

    let value = match value {
        AttributeValue::Literal(s) => s.as_str(),
        AttributeValue::Expression(source) => source.as_str(),
        AttributeValue::Bool(true) => "true",
        AttributeValue::Bool(false) => return None,
    };

    if value.is_empty() { None } else { Some(value) }
}

/// Read an attribute, falling back to `default` when it is absent.
pub fn get_attribute_or<'a>(element: &'a Element, name: &str, default: &'a str) -> &'a str {
    get_attribute(element, name).unwrap_or(default)
}

/// Read an attribute and parse it; unparsable values count as absent.
pub fn get_attribute_parsed<T: FromStr>(element: &Element, name: &str) -> Option<T> {
    let raw = get_attribute(element, name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(attribute = name, value = raw, "ignoring unparsable attribute");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Attribute;

    fn element() -> Element {
        Element::new("CodeEmbed")
            .with_attribute("url", "https://example.com/a.rs")
            .with_attribute("height", AttributeValue::Expression("\"500px\"".into()))
            .with_attribute("empty", "")
            .with_attribute("hidden", true)
            .with_attribute("shown", false)
            .with_attribute("start", "12")
    }

    #[test]
    fn test_literal_and_expression() {
        let e = element();
        assert_eq!(get_attribute(&e, "url"), Some("https://example.com/a.rs"));
        assert_eq!(get_attribute(&e, "height"), Some("\"500px\""));
    }

    #[test]
    fn test_missing_and_empty_are_absent() {
        let e = element();
        assert_eq!(get_attribute(&e, "language"), None);
        assert_eq!(get_attribute(&e, "empty"), None);
        assert_eq!(get_attribute_or(&e, "language", "ts"), "ts");
    }

    #[test]
    fn test_booleans_and_bare_attributes() {
        let mut e = element();
        e.attributes.push(AttributeItem::Property(Attribute {
            name: "bare".into(),
            value: None,
        }));
        e.attributes.push(AttributeItem::Spread("...props".into()));
        assert_eq!(get_attribute(&e, "hidden"), Some("true"));
        assert_eq!(get_attribute(&e, "shown"), None);
        assert_eq!(get_attribute(&e, "bare"), None);
    }

    #[test]
    fn test_parsed() {
        let e = element();
        assert_eq!(get_attribute_parsed::<usize>(&e, "start"), Some(12));
        assert_eq!(get_attribute_parsed::<usize>(&e, "url"), None);
    }
}
