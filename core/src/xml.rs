//! Minimal element tree over quick-xml plus root validation.
//!
//! # Design
//! The API's responses are tiny attribute-driven documents, so instead of a
//! full DOM we build an owned `Element` tree from `quick_xml::Reader` events.
//! Text nodes, comments and the XML declaration are skipped; only element
//! names, attributes and child order matter here. `expect_root` is the single
//! structural-validity gate every parser goes through before touching the
//! payload.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Error;

/// An owned XML element: name, attributes and child elements in document
/// order. Text content is intentionally not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`attr`](Self::attr) but a missing attribute is a structural
    /// error naming both the element and the attribute.
    pub fn require_attr(&self, name: &str) -> Result<&str, Error> {
        self.attr(name).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "element `{}` is missing the `{name}` attribute",
                self.name
            ))
        })
    }
}

/// Parse a raw response body into its root element.
///
/// Tokenization failures map to [`Error::Xml`]; a body that contains no
/// element at all is [`Error::MalformedResponse`].
pub fn parse(raw: &str) -> Result<Element, Error> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(|e| Error::Xml(e.to_string()))? {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                attach(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                // quick-xml rejects mismatched end tags before we get here,
                // so the stack cannot be empty.
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| Error::MalformedResponse("document has no root element".to_string()))
}

/// Assert that `doc` is rooted at `expected`, passing the document through
/// unchanged. The error message names the expected root element so callers
/// can tell which operation received a foreign response.
pub fn expect_root<'a>(doc: &'a Element, expected: &'static str) -> Result<&'a Element, Error> {
    if doc.name == expected {
        Ok(doc)
    } else {
        Err(Error::UnexpectedRoot { expected })
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn attach(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // Only the first top-level element counts; the well-formedness rules
        // of XML guarantee there is exactly one.
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_element_root() {
        let doc = parse(r#"<?xml version="1.0" encoding="utf-8"?><update time="2008-03-12T08:41:20Z"/>"#).unwrap();
        assert_eq!(doc.name, "update");
        assert_eq!(doc.attr("time"), Some("2008-03-12T08:41:20Z"));
        assert!(doc.children.is_empty());
    }

    #[test]
    fn parses_nested_children_in_document_order() {
        let doc = parse(
            r#"<bundles>
                 <bundle name="music" tags="ipod mp3 music"/>
                 <bundle name="pc" tags="computer software hardware"/>
               </bundles>"#,
        )
        .unwrap();
        assert_eq!(doc.name, "bundles");
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.children[0].attr("name"), Some("music"));
        assert_eq!(doc.children[1].attr("name"), Some("pc"));
    }

    #[test]
    fn text_content_is_ignored() {
        let doc = parse("<result>done</result>").unwrap();
        assert_eq!(doc.name, "result");
        assert!(doc.children.is_empty());
    }

    #[test]
    fn attribute_values_are_unescaped() {
        let doc = parse(r#"<tag name="rock &amp; roll"/>"#).unwrap();
        assert_eq!(doc.attr("name"), Some("rock & roll"));
    }

    #[test]
    fn expect_root_passes_matching_document_through() {
        let doc = parse("<tags></tags>").unwrap();
        let same = expect_root(&doc, "tags").unwrap();
        assert_eq!(same, &doc);
    }

    #[test]
    fn expect_root_is_case_sensitive() {
        let doc = parse("<Tags></Tags>").unwrap();
        let err = expect_root(&doc, "tags").unwrap_err();
        assert!(matches!(err, Error::UnexpectedRoot { expected: "tags" }));
    }

    #[test]
    fn require_attr_names_element_and_attribute() {
        let doc = parse(r#"<bundle name="music"/>"#).unwrap();
        let err = doc.require_attr("tags").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`bundle`"));
        assert!(msg.contains("`tags`"));
    }

    #[test]
    fn truncated_document_is_an_xml_error() {
        let err = parse("<bundles><bundle name=").unwrap_err();
        assert!(matches!(err, Error::Xml(_) | Error::MalformedResponse(_)));
    }

    #[test]
    fn empty_body_has_no_root() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
