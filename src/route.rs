use std::error::Error as StdError;

use html::{attributes, DOMContent, DOMElement, Document};

use crate::UPSTREAM_HOST;

/// Join path segments into the single upstream path they name. No segments is `/`.
pub fn path_from_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let path: String = segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .flat_map(|s| ["/", s])
        .collect();
    if path.is_empty() {
        "/".to_string()
    } else {
        path
    }
}

/// The upstream path for a request target such as `/buzeni/x?page=2`.
/// The query and fragment are dropped, as are empty segments.
pub fn path_from_request(target: &str) -> String {
    let end = target.find(&['?', '#'][..]).unwrap_or(target.len());
    let segments: Vec<&str> = target[..end].split('/').collect();
    path_from_segments(&segments)
}

/// The page shown instead of `path` when it could not be loaded. It is not
/// rewritten, and all text in it is escaped.
pub fn error_page(path: &str, error: &dyn StdError) -> String {
    const HEADING: &str = "Error Loading Page";

    let text = |name: &str, text: &str| -> DOMContent {
        let mut element = DOMElement::new(name, None, vec![]);
        element.set_text(text);
        element.into()
    };
    let head = DOMElement::new(
        "head",
        None,
        vec![
            DOMElement::new("meta", Some(attributes!("charset" => "utf-8")), vec![]).into(),
            text("title", HEADING),
        ],
    );
    let body = DOMElement::new(
        "body",
        None,
        vec![
            text("h1", HEADING),
            text("p", &format!("Failed to load content from {}{}", UPSTREAM_HOST, path)),
            text("p", &error.to_string()),
        ],
    );
    let document = Document {
        contents: vec![
            DOMContent::Doctype("DOCTYPE html".to_string()),
            DOMElement::new("html", None, vec![head.into(), body.into()]).into(),
        ],
    };
    document.to_string()
}
