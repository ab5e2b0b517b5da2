use css::SelectorList;
use html::Document;
use tracing::{span, Level};

mod branding;
mod links;
mod presentation;
mod structure;

pub use branding::{CENSORED, MASTHEAD};
pub use links::{absolutize_source, classify_href, classify_source, rewrite_href, Href, Source};
pub use presentation::STYLESHEET;
pub use structure::{is_index_path, INDEX_PATHS};

/// What a step knows about the request besides the document itself
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// The requested path, e.g. `/` or `/buzeni/some-article`
    pub path: &'a str,
}

/// A named, in-place document mutation
pub struct Step {
    pub name: &'static str,
    pub apply: fn(&mut Document, &Context),
}

/// Every step, in the order they must run. Selectors are evaluated against the
/// document as the previous steps left it, so:
/// - native stylesheets are stripped before the replacement is injected
/// - the logo is replaced before images are absolutized
/// - the masthead exists before text is censored, and is exempt from it
pub const PIPELINE: [Step; 9] = [
    Step {
        name: "strip-presentation",
        apply: presentation::strip_presentation,
    },
    Step {
        name: "inject-stylesheet",
        apply: presentation::inject_stylesheet,
    },
    Step {
        name: "rewrite-anchors",
        apply: links::rewrite_anchors,
    },
    Step {
        name: "substitute-logo",
        apply: branding::substitute_logo,
    },
    Step {
        name: "absolutize-images",
        apply: links::absolutize_images,
    },
    Step {
        name: "absolutize-scripts",
        apply: links::absolutize_scripts,
    },
    Step {
        name: "trim-separators",
        apply: structure::trim_separators,
    },
    Step {
        name: "class-headers",
        apply: structure::class_headers,
    },
    Step {
        name: "censor-brand",
        apply: branding::censor_brand,
    },
];

/// Rewrite a page fetched for `path`. Total: any input produces a document.
pub fn transform(path: &str, html: &str) -> String {
    let mut document = html::document(html);
    apply(&mut document, &Context { path });
    document.to_string()
}

/// Run every step of [`PIPELINE`] over `document`
pub fn apply(document: &mut Document, context: &Context) {
    for step in &PIPELINE {
        let span = span!(Level::DEBUG, "Rewriting", step = step.name);
        let _enter = span.enter();
        (step.apply)(document, context);
    }
}

/// Parse one of the built-in selectors
fn compile(selector: &str) -> SelectorList {
    selector.parse().expect("built-in selectors are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Buzerant</title>
<link rel="stylesheet" href="/css/site.css">
<link rel="icon" href="/favicon.ico">
<style>body { color: red }</style>
<script src="js/app.js"></script>
</head>
<body class="home" style="margin: 0">
<header class="top"><a href="https://buzerant.com/"><img src="/img/logo.svg" alt="Buzerant"></a><span>vtipy</span></header>
<div class="nav"><span><a href="//buzerant.com/buzeni">buzeni</a> · </span><span><a href="http://buzerant.com">vse</a> · </span></div>
<main><p>Welcome to buzerant, the BUZERANT place.</p><img src="//cdn.example.org/x.png"><img src="pics/a.jpg"></main>
<footer><a href="https://example.org/about">about</a></footer>
</body>
</html>"#;

    #[test]
    fn test_steps_are_unique_and_ordered() {
        let names: Vec<_> = PIPELINE.iter().map(|s| s.name).collect();
        assert_eq!(names.first(), Some(&"strip-presentation"));
        assert_eq!(names.last(), Some(&"censor-brand"));
        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_transform_index_page() {
        let out = transform("/", PAGE);
        let doc = html::document(&out);
        let count = |s: &str| doc.select(&compile(s)).len();

        assert_eq!(count("[style]"), 0);
        assert_eq!(count(r#"link[rel="stylesheet"]"#), 0);
        assert_eq!(count("[class]"), 2);
        assert_eq!(count("header.main-header"), 1);
        assert_eq!(count("header + div.tags"), 1);
        assert_eq!(count("head > style"), 1);
        assert_eq!(count(r#"link[rel="icon"]"#), 1);

        assert!(out.contains(r#"<script src="https://buzerant.com/js/app.js"></script>"#));
        assert!(out.contains(r#"<a href="/"><h1>Buzerant</h1></a>"#));
        assert!(out.contains(r#"<a href="/buzeni">buzeni</a> · </span>"#));
        // The last separator goes, and with it the markup of that span
        assert!(out.contains("<span>vse</span></div>"));
        assert!(out.contains(r#"<img src="https://cdn.example.org/x.png">"#));
        assert!(out.contains(r#"<img src="https://buzerant.com/pics/a.jpg">"#));
        assert!(out.contains(r#"<a href="https://example.org/about">"#));
        assert!(out.contains("<title>Bu*erant</title>"));
        assert!(out.contains("Welcome to Bu*erant, the Bu*erant place."));
        assert!(out.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_transform_article_page() {
        let out = transform("/buzeni/nejaky-vtip", PAGE);
        let doc = html::document(&out);
        assert_eq!(doc.select(&compile("header.art-header")).len(), 1);
        assert!(doc.select(&compile(".tags, .main-header")).is_empty());
    }

    #[test]
    fn test_transform_is_near_fixed_point() {
        let once = transform("/", PAGE);
        let twice = transform("/", &once);
        let doc = html::document(&twice);
        assert_eq!(doc.select(&compile("style")).len(), 1);
        assert_eq!(doc.select(&compile("header.main-header")).len(), 1);
        // Only the masthead differs: it is plain text the second time around
        assert_eq!(
            twice,
            once.replace("<h1>Buzerant</h1>", &format!("<h1>{}</h1>", CENSORED))
        );
    }

    #[test]
    fn test_transform_survives_deep_nesting() {
        let input = format!("{}buzerant{}", "<div>".repeat(20_000), "</div>".repeat(20_000));
        let out = transform("/", &input);
        assert!(out.contains("Bu*erant"));
        assert!(!out.contains("buzerant"));
    }

    #[test]
    fn test_transform_tolerates_fragments() {
        assert_eq!(transform("/", ""), "");
        assert_eq!(transform("/x", "just text"), "just text");
        let out = transform("/", "<div><span>a · <b>");
        assert_eq!(out, "<div><span>a</span></div>");
    }
}
