use super::*;
use css::SelectorList;

fn selector(s: &str) -> SelectorList {
    s.parse().unwrap()
}

#[test]
fn test_document() {
    let i = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <title>The minimal, valid HTML5 document</title>
    </head>
    <body>
        <!-- User-visible content goes in the body -->
        <p>Some paragraph</p>
        Some untagged text
    </body>
</html>"#;
    let doc = document(i);
    assert_eq!(doc.contents[0], DOMContent::Doctype("DOCTYPE html".to_string()));
    let html = doc.element(&[2]).unwrap();
    assert_eq!(html.name, "html");
    assert_eq!(html.attributes, attributes!("lang" => "en"));
    let names: Vec<_> = html.children().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["head", "body"]);
    let title = &doc.select(&selector("head title"))[0];
    assert_eq!(doc.element(title).unwrap().text(), "The minimal, valid HTML5 document");
}

#[test]
fn test_serialize_untouched() {
    let i = r#"<!DOCTYPE html><html><head><script>if (a < b && c) {}</script></head><body><!-- note --><p id="x">Fish &amp; chips</p><br><img src="a.png" alt=""></body></html>"#;
    assert_eq!(document(i).to_string(), i);
}

#[test]
fn test_serialize_normalizes_quoting() {
    let i = r#"<div data-x='say "hi"' hidden class=a>x</div>"#;
    assert_eq!(
        document(i).to_string(),
        r#"<div data-x="say &quot;hi&quot;" hidden="" class="a">x</div>"#
    );
}

#[test]
fn test_select_attribute_operators() {
    let doc = document(
        r#"<head><link rel="stylesheet" href="a.css"><link rel="icon" href="i.png"></head>
<body><style>p {}</style><img src="/static/logo.svg"><img src="photo.jpg"></body>"#,
    );
    let sheets = doc.select(&selector(r#"style, link[rel="stylesheet"]"#));
    assert_eq!(sheets, vec![vec![0, 0], vec![2, 0]]);
    let logos = doc.select(&selector(r#"img[src*="logo.svg"]"#));
    assert_eq!(logos, vec![vec![2, 1]]);
}

#[test]
fn test_select_combinators() {
    let doc = document("<div><p><span>a</span></p></div><span>b</span><header></header>\n<div>c</div><div>d</div>");
    let spans = doc.select(&selector("div span"));
    assert_eq!(spans, vec![vec![0, 0, 0]]);
    assert!(doc.select(&selector("div > span")).is_empty());
    // Text between siblings does not break adjacency
    let tags = doc.select(&selector("header + div"));
    assert_eq!(tags, vec![vec![4]]);
    let later = doc.select(&selector("header ~ div"));
    assert_eq!(later, vec![vec![4], vec![5]]);
}

#[test]
fn test_next_element_sibling() {
    let doc = document("<div><span>a</span> <span>b</span> </div>");
    assert_eq!(doc.next_element_sibling(&[0, 0]), Some(vec![0, 2]));
    assert_eq!(doc.next_element_sibling(&[0, 2]), None);
    assert_eq!(doc.next_element_sibling(&[0]), None);
}

#[test]
fn test_remove_nested_and_siblings() {
    let mut doc = document("<div><style>a</style><div><style>b</style></div><style>c</style></div>");
    let removed = doc.remove(doc.select(&selector("style")));
    assert_eq!(removed, 3);
    assert_eq!(doc.to_string(), "<div><div></div></div>");

    let mut doc = document("<a><b></b></a><c></c>");
    let removed = doc.remove(doc.select(&selector("a, b")));
    assert_eq!(removed, 2);
    assert_eq!(doc.to_string(), "<c></c>");
}

#[test]
fn test_replace() {
    let mut doc = document(r#"<p><img src="logo.svg"></p>"#);
    let heading = DOMElement::new("h1", None, vec!["Title".into()]);
    let old = doc.replace(&[0, 0], heading.into());
    assert!(matches!(old, Some(DOMContent::Element(e)) if e.name == "img"));
    assert_eq!(doc.to_string(), "<p><h1>Title</h1></p>");
    assert!(doc.replace(&[3], "x".into()).is_none());
}

#[test]
fn test_text_and_set_text() {
    let mut doc = document("<span>Fish &amp; <b>chips</b> &middot; </span>");
    let span = doc.element_mut(&[0]).unwrap();
    assert_eq!(span.text(), "Fish & chips \u{b7} ");
    span.set_text("Fish & chips");
    assert_eq!(doc.to_string(), "<span>Fish &amp; chips</span>");
}

#[test]
fn test_source_text_keeps_references() {
    let mut doc = document("<span>Kr&aacute;sn&eacute; <b>&amp;</b> <script>a<b</script>x</span>");
    let span = doc.element_mut(&[0]).unwrap();
    let text = span.source_text();
    assert_eq!(text, "Kr&aacute;sn&eacute; &amp; a&lt;bx");
    span.set_source_text(text);
    assert_eq!(doc.to_string(), "<span>Kr&aacute;sn&eacute; &amp; a&lt;bx</span>");
}

#[test]
fn test_text_visitor_skips_verbatim() {
    let mut doc = document("<p>one</p>");
    let kept = DOMElement::new("h1", None, vec!["two".into()]).into_verbatim();
    doc.contents.push(kept.into());
    doc.for_each_text_mut(|t| *t = t.to_uppercase());
    assert_eq!(doc.to_string(), "<p>ONE</p><h1>two</h1>");
}

#[test]
fn test_attribute_mutation_keeps_order() {
    let mut doc = document(r#"<a class="x" href="/a" style="y" id="z"></a>"#);
    let a = doc.element_mut(&[0]).unwrap();
    a.remove_attribute("style");
    a.set_attribute("class", "main-header");
    a.set_attribute("title", "t");
    assert_eq!(
        doc.to_string(),
        r#"<a class="main-header" href="/a" id="z" title="t"></a>"#
    );
}
