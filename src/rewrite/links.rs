use css::SelectorList;
use html::Document;
use lazy_static::lazy_static;
use tracing::trace;

use super::{compile, Context};
use crate::{UPSTREAM_HOST, UPSTREAM_ORIGIN};

lazy_static! {
    static ref ANCHORS: SelectorList = compile("a[href]");
    static ref IMAGES: SelectorList = compile("img[src]");
    static ref SCRIPTS: SelectorList = compile("script[src]");
}

/// Where a link points, as far as the proxy is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Href<'a> {
    /// `http://` or `https://` on the upstream host; holds what follows the host
    Upstream(&'a str),
    /// `//` on the upstream host; holds what follows the host
    ProtocolRelative(&'a str),
    /// Relative references, fragments, other hosts, other schemes
    Other,
}

pub fn classify_href(href: &str) -> Href<'_> {
    let (rest, protocol_relative) = if let Some(rest) =
        strip_prefix_ignore_case(href, "https://").or_else(|| strip_prefix_ignore_case(href, "http://"))
    {
        (rest, false)
    } else if let Some(rest) = href.strip_prefix("//") {
        (rest, true)
    } else {
        return Href::Other;
    };
    let tail = match strip_prefix_ignore_case(rest, UPSTREAM_HOST) {
        Some(tail) => tail,
        None => return Href::Other,
    };
    // Ports and longer host names, e.g. `buzerant.com.example.org`
    if !tail.is_empty() && !tail.starts_with(&['/', '?', '#'][..]) {
        return Href::Other;
    }
    if protocol_relative {
        Href::ProtocolRelative(tail)
    } else {
        Href::Upstream(tail)
    }
}

/// The origin-relative form of a link to the upstream site, or `None` if the
/// link should be left alone
pub fn rewrite_href(href: &str) -> Option<String> {
    match classify_href(href) {
        Href::Upstream(tail) | Href::ProtocolRelative(tail) => Some(match tail.chars().next() {
            None => "/".to_string(),
            Some('/') => tail.to_string(),
            Some(_) => format!("/{}", tail),
        }),
        Href::Other => None,
    }
}

/// How an asset reference has to change to load from the upstream site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source<'a> {
    /// `http...`, or any other explicit scheme such as `data:`
    Absolute,
    /// `//host/path`
    ProtocolRelative(&'a str),
    /// A path on the upstream site, with or without a leading `/`
    Relative(&'a str),
    Empty,
}

pub fn classify_source(src: &str) -> Source<'_> {
    if src.is_empty() {
        Source::Empty
    } else if src.starts_with("http") || has_scheme(src) {
        Source::Absolute
    } else if src.starts_with("//") {
        Source::ProtocolRelative(src)
    } else {
        Source::Relative(src)
    }
}

/// The absolute form of an asset reference, or `None` if it already is absolute
pub fn absolutize_source(src: &str) -> Option<String> {
    match classify_source(src) {
        Source::Relative(path) if path.starts_with('/') => Some(format!("{}{}", UPSTREAM_ORIGIN, path)),
        Source::Relative(path) => Some(format!("{}/{}", UPSTREAM_ORIGIN, path)),
        Source::ProtocolRelative(src) => Some(format!("https:{}", src)),
        Source::Absolute | Source::Empty => None,
    }
}

pub fn rewrite_anchors(document: &mut Document, _: &Context) {
    rewrite_attribute(document, &ANCHORS, "href", rewrite_href);
}

pub fn absolutize_images(document: &mut Document, _: &Context) {
    rewrite_attribute(document, &IMAGES, "src", absolutize_source);
}

pub fn absolutize_scripts(document: &mut Document, _: &Context) {
    rewrite_attribute(document, &SCRIPTS, "src", absolutize_source);
}

fn rewrite_attribute(
    document: &mut Document,
    selector: &SelectorList,
    attribute: &str,
    rewrite: fn(&str) -> Option<String>,
) {
    for path in document.select(selector) {
        let element = match document.element_mut(&path) {
            Some(element) => element,
            None => continue,
        };
        if let Some(value) = element.get_attribute(attribute).map(String::as_str).and_then(rewrite) {
            trace!(attribute, to = %value, "Rewriting");
            element.set_attribute(attribute, value);
        }
    }
}

/// `scheme:` per RFC 3986, e.g. `data:`, `mailto:`
fn has_scheme(s: &str) -> bool {
    match s.split_once(':') {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_href() {
        assert_eq!(classify_href("https://buzerant.com/buzeni"), Href::Upstream("/buzeni"));
        assert_eq!(classify_href("HTTP://Buzerant.com"), Href::Upstream(""));
        assert_eq!(classify_href("//buzerant.com/a?b"), Href::ProtocolRelative("/a?b"));
        assert_eq!(classify_href("https://buzerant.com.example.org/"), Href::Other);
        assert_eq!(classify_href("https://example.org/buzerant.com"), Href::Other);
        assert_eq!(classify_href("/relative"), Href::Other);
        assert_eq!(classify_href("mailto:x@buzerant.com"), Href::Other);
    }

    #[test]
    fn test_rewrite_href() {
        assert_eq!(rewrite_href("https://buzerant.com/vulvar/x").as_deref(), Some("/vulvar/x"));
        assert_eq!(rewrite_href("https://buzerant.com").as_deref(), Some("/"));
        assert_eq!(rewrite_href("http://buzerant.com/").as_deref(), Some("/"));
        assert_eq!(rewrite_href("//buzerant.com").as_deref(), Some("/"));
        assert_eq!(rewrite_href("https://buzerant.com?page=2").as_deref(), Some("/?page=2"));
        assert_eq!(rewrite_href("https://buzerant.com#top").as_deref(), Some("/#top"));
        assert_eq!(rewrite_href("https://google.com/"), None);
        assert_eq!(rewrite_href("podsunuto"), None);
        assert_eq!(rewrite_href("#comments"), None);
    }

    #[test]
    fn test_absolutize_source() {
        assert_eq!(
            absolutize_source("/img/a.png").as_deref(),
            Some("https://buzerant.com/img/a.png")
        );
        assert_eq!(
            absolutize_source("img/a.png").as_deref(),
            Some("https://buzerant.com/img/a.png")
        );
        assert_eq!(
            absolutize_source("//cdn.example.org/a.js").as_deref(),
            Some("https://cdn.example.org/a.js")
        );
        assert_eq!(absolutize_source("https://example.org/a.png"), None);
        assert_eq!(absolutize_source("http://example.org/a.png"), None);
        assert_eq!(absolutize_source("data:image/png;base64,AAAA"), None);
        assert_eq!(absolutize_source(""), None);
        assert_eq!(classify_source("a:b/c.png"), Source::Absolute);
        assert_eq!(classify_source("dir/a:b.png"), Source::Relative("dir/a:b.png"));
    }

    #[test]
    fn test_rewrite_steps() {
        let mut doc = html::document(
            r#"<a href="https://buzerant.com/brichomluveni">x</a><a href="https://example.org">y</a><a>z</a><img src="a.png"><script src="/s.js"></script><script>inline()</script>"#,
        );
        let context = Context { path: "/" };
        rewrite_anchors(&mut doc, &context);
        absolutize_images(&mut doc, &context);
        absolutize_scripts(&mut doc, &context);
        assert_eq!(
            doc.to_string(),
            r#"<a href="/brichomluveni">x</a><a href="https://example.org">y</a><a>z</a><img src="https://buzerant.com/a.png"><script src="https://buzerant.com/s.js"></script><script>inline()</script>"#
        );
    }
}
