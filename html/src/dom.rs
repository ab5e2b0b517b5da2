use indexmap::IndexMap;
use std::fmt::Display;

use crate::entities::{escape_text, unescape};

/// A parsed page: the nodes found at the top level of the input
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Document {
    pub contents: Vec<DOMContent>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DOMContent {
    Element(DOMElement),
    /// Source-form text (entity references are not decoded)
    Text(String),
    Comment(String),
    /// Any `<!...>` markup declaration other than a comment, e.g. `DOCTYPE html`
    Doctype(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DOMElement {
    pub name: String,
    pub attributes: DOMAttributes,
    pub contents: Vec<DOMContent>,
    /// Inserted content whose text must not be rewritten. Not serialized.
    pub verbatim: bool,
}

/// Attribute name -> source-form value, in document order
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DOMAttributes(pub IndexMap<String, String>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(IndexMap::new())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DOMAttributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl DOMElement {
    pub fn new(name: impl Display, attributes: Option<DOMAttributes>, contents: Vec<DOMContent>) -> Self {
        Self {
            name: name.to_string(),
            attributes: attributes.unwrap_or_default(),
            contents,
            verbatim: false,
        }
    }

    /// Mark this element so that text rewriting passes leave its subtree alone
    pub fn into_verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    pub fn get_attribute(&self, name: &str) -> Option<&String> {
        self.attributes.0.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.0.contains_key(name)
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.0.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.0.shift_remove(name)
    }

    /// Iterate over the direct children which are elements
    pub fn children(&self) -> impl Iterator<Item = &DOMElement> {
        self.contents.iter().filter_map(|c| match c {
            DOMContent::Element(e) => Some(e),
            _ => None,
        })
    }

    /// The decoded text of every descendant text node, concatenated in document order
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, buf: &mut String) {
        let raw = is_raw_text_element(&self.name);
        for content in &self.contents {
            match content {
                DOMContent::Text(t) if raw => buf.push_str(t),
                DOMContent::Text(t) => buf.push_str(&unescape(t)),
                DOMContent::Element(e) => e.collect_text(buf),
                _ => {}
            }
        }
    }

    /// The source-form text of every descendant text node, concatenated in
    /// document order. Entity references are kept as written, so the result can
    /// be handed back to [`DOMElement::set_source_text`] without loss.
    pub fn source_text(&self) -> String {
        let mut text = String::new();
        self.collect_source_text(&mut text);
        text
    }

    fn collect_source_text(&self, buf: &mut String) {
        let raw = is_raw_text_element(&self.name);
        for content in &self.contents {
            match content {
                DOMContent::Text(t) if raw => buf.push_str(&escape_text(t)),
                DOMContent::Text(t) => buf.push_str(t),
                DOMContent::Element(e) => e.collect_source_text(buf),
                _ => {}
            }
        }
    }

    /// Replace all contents with a single text node holding source-form `text`
    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.contents.clear();
        let text = text.into();
        if !text.is_empty() {
            self.contents.push(DOMContent::Text(text));
        }
    }

    /// Replace all contents with a single text node holding `text`
    pub fn set_text(&mut self, text: &str) {
        self.contents.clear();
        if text.is_empty() {
            return;
        }
        let text = if is_raw_text_element(&self.name) {
            text.to_string()
        } else {
            escape_text(text).into_owned()
        };
        self.contents.push(DOMContent::Text(text));
    }
}

impl From<DOMElement> for DOMContent {
    fn from(element: DOMElement) -> Self {
        DOMContent::Element(element)
    }
}

impl From<&str> for DOMContent {
    fn from(text: &str) -> Self {
        DOMContent::Text(text.to_string())
    }
}

impl From<String> for DOMContent {
    fn from(text: String) -> Self {
        DOMContent::Text(text)
    }
}

// https://html.spec.whatwg.org/multipage/syntax.html#void-elements
static VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

static RAW_TEXT: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

static ESCAPABLE_RAW_TEXT: &[&str] = &["textarea", "title"];

/// Elements that never have contents or an end tag
pub fn is_void_element(name: &str) -> bool {
    VOID.contains(&name)
}

/// Elements whose contents are neither markup nor entity-encoded
pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT.contains(&name)
}

/// Elements whose contents are not markup, but may contain entity references
pub fn is_escapable_raw_text_element(name: &str) -> bool {
    ESCAPABLE_RAW_TEXT.contains(&name)
}
