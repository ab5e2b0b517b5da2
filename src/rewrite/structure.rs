use css::SelectorList;
use html::Document;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use super::{compile, Context};

/// Listing pages. These get the masthead layout, everything else is an article.
pub const INDEX_PATHS: [&str; 5] = ["/", "/buzeni", "/vulvar", "/podsunuto", "/brichomluveni"];

lazy_static! {
    static ref DIV_SPANS: SelectorList = compile("div span");
    static ref HEADERS: SelectorList = compile("header");
    static ref HEADER_FOLLOWERS: SelectorList = compile("header + div");
    // Matched against source-form text, so the glyph may be written as a
    // reference. Whitespace on both sides of it goes too.
    static ref TRAILING_SEPARATOR: Regex =
        Regex::new(r"(?i)(?:\s|&nbsp;)*(?:·|&middot;|&#0*183;|&#x0*b7;)(?:\s|&nbsp;)*$")
            .expect("separator pattern is valid");
}

pub fn is_index_path(path: &str) -> bool {
    INDEX_PATHS.contains(&path)
}

/// Drop the dangling `·` from the last span of a list. Replacing the text
/// flattens any markup inside that span, but character references are kept
/// as written.
pub fn trim_separators(document: &mut Document, _: &Context) {
    for path in document.select(&DIV_SPANS) {
        if document.next_element_sibling(&path).is_some() {
            continue;
        }
        // Gone if an enclosing span was rewritten first
        let span = match document.element_mut(&path) {
            Some(span) => span,
            None => continue,
        };
        let text = span.source_text();
        if let Some(separator) = TRAILING_SEPARATOR.find(&text) {
            trace!(%text, "Trimming separator");
            span.set_source_text(&text[..separator.start()]);
        }
    }
}

/// Class the page header for the listing or the article layout
pub fn class_headers(document: &mut Document, context: &Context) {
    if is_index_path(context.path) {
        debug!(path = context.path, "Index layout");
        set_class(document, &HEADERS, "main-header");
        set_class(document, &HEADER_FOLLOWERS, "tags");
    } else {
        debug!(path = context.path, "Article layout");
        set_class(document, &HEADERS, "art-header");
    }
}

fn set_class(document: &mut Document, selector: &SelectorList, class: &str) {
    for path in document.select(selector) {
        if let Some(element) = document.element_mut(&path) {
            element.set_attribute("class", class);
        }
    }
}
