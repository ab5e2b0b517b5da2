use css::SelectorList;
use html::{DOMElement, Document};
use lazy_static::lazy_static;
use tracing::debug;

use super::{compile, Context};

/// The only styling a rewritten page has
pub static STYLESHEET: &str = include_str!("../../resources/restyle.css");

lazy_static! {
    static ref NATIVE_STYLESHEETS: SelectorList = compile(r#"style, link[rel="stylesheet"]"#);
    static ref STYLED: SelectorList = compile("[style]");
    static ref CLASSED: SelectorList = compile("[class]");
    static ref HEAD: SelectorList = compile("head");
}

/// Remove `style` elements, stylesheet links and every `style` and `class` attribute
pub fn strip_presentation(document: &mut Document, _: &Context) {
    let removed = document.remove(document.select(&NATIVE_STYLESHEETS));
    debug!(removed, "Removed stylesheets");
    for (selector, attribute) in [(&*STYLED, "style"), (&*CLASSED, "class")] {
        let paths = document.select(selector);
        debug!(attribute, count = paths.len(), "Removing attribute");
        for path in paths {
            if let Some(element) = document.element_mut(&path) {
                element.remove_attribute(attribute);
            }
        }
    }
}

/// Append [`STYLESHEET`] to the first `head`. A document without one is left unstyled.
pub fn inject_stylesheet(document: &mut Document, _: &Context) {
    let head = match document.select(&HEAD).into_iter().next() {
        Some(path) => path,
        None => {
            debug!("No head, stylesheet not injected");
            return;
        }
    };
    if let Some(head) = document.element_mut(&head) {
        let style = DOMElement::new("style", None, vec![STYLESHEET.into()]);
        head.contents.push(style.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(step: fn(&mut Document, &Context), input: &str) -> String {
        let mut doc = html::document(input);
        step(&mut doc, &Context { path: "/" });
        doc.to_string()
    }

    #[test]
    fn test_strip_presentation() {
        let input = r#"<head><link rel="stylesheet" href="a.css"><link rel="preload" href="f.woff"><style>p{}</style></head><body><p class="lead" style="color: red" id="p">x</p><div CLASS=""></div></body>"#;
        assert_eq!(
            run(strip_presentation, input),
            r#"<head><link rel="preload" href="f.woff"></head><body><p id="p">x</p><div></div></body>"#
        );
    }

    #[test]
    fn test_inject_stylesheet_once() {
        let out = run(inject_stylesheet, "<html><head><title>t</title></head><body><head></head></body></html>");
        assert_eq!(out.matches("<style>").count(), 1);
        assert!(out.starts_with(&format!(
            "<html><head><title>t</title><style>{}</style></head>",
            STYLESHEET
        )));
    }

    #[test]
    fn test_inject_into_unclosed_head() {
        let out = run(inject_stylesheet, "<html><head><title>t</title><body><p>x</p></body></html>");
        assert_eq!(
            out,
            format!(
                "<html><head><title>t</title><style>{}</style></head><body><p>x</p></body></html>",
                STYLESHEET
            )
        );
    }

    #[test]
    fn test_rel_is_case_insensitive() {
        assert_eq!(
            run(strip_presentation, r#"<head><link rel="StyleSheet" href="a.css"><link REL="ICON" href="i.png"></head>"#),
            r#"<head><link rel="ICON" href="i.png"></head>"#
        );
    }

    #[test]
    fn test_inject_without_head() {
        assert_eq!(run(inject_stylesheet, "<p>no head</p>"), "<p>no head</p>");
    }

    #[test]
    fn test_reinjection_after_strip() {
        let once = run(inject_stylesheet, "<head></head>");
        let mut doc = html::document(&once);
        strip_presentation(&mut doc, &Context { path: "/" });
        inject_stylesheet(&mut doc, &Context { path: "/" });
        assert_eq!(doc.to_string(), once);
    }
}
