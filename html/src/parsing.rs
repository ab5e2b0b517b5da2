use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_till1, take_until, take_while},
    character::complete::{char, multispace0, satisfy},
    combinator::{map, opt, recognize, rest},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use tracing::{span, trace, Level};

use super::dom::*;

/// A lexical unit of HTML source
#[derive(Debug, PartialEq)]
enum Token<'a> {
    Doctype(&'a str),
    Comment(&'a str),
    Open {
        name: String,
        attributes: Vec<(&'a str, &'a str)>,
        self_closing: bool,
    },
    Close(String),
    Text(&'a str),
}

/// Parse a complete document. Never fails: anything that does not look like markup
/// is kept as text, unclosed elements are closed at the end of input and stray
/// end tags are dropped.
pub fn document(input: &str) -> Document {
    let span = span!(Level::DEBUG, "Parsing document", bytes = input.len());
    let _enter = span.enter();
    let mut builder = TreeBuilder::default();
    let mut remaining = input;
    while !remaining.is_empty() {
        let (r, token) = match parse_token(remaining) {
            Ok(parsed) => parsed,
            // `parse_token` always accepts at least one character
            Err(_) => (&remaining[remaining.len()..], Token::Text(remaining)),
        };
        remaining = r;
        let raw = match &token {
            Token::Open { name, .. }
                if is_raw_text_element(name) || is_escapable_raw_text_element(name) =>
            {
                Some(name.clone())
            }
            _ => None,
        };
        builder.push(token);
        if let Some(name) = raw.filter(|name| builder.is_current(name)) {
            let (r, text) = parse_raw_text(remaining, &name);
            if !text.is_empty() {
                builder.push(Token::Text(text));
            }
            remaining = r;
        }
    }
    builder.finish()
}

fn parse_token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        parse_comment,
        parse_declaration,
        parse_close_tag,
        parse_open_tag,
        parse_text,
        // A `<` which does not start a tag is just text
        map(recognize(char('<')), Token::Text),
    ))(input)
}

/// Attempt to parse a string as a valid tag name
fn parse_tag_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphabetic()),
            take_while(|c: char| c.is_alphanumeric() || c == '-' || c == '_' || c == ':'),
        )),
        |name: &str| name.to_ascii_lowercase(),
    )(input)
}

/// Parse `<!-- ... -->`. An unterminated comment runs to the end of input
fn parse_comment(input: &str) -> IResult<&str, Token<'_>> {
    map(
        preceded(
            tag("<!--"),
            alt((terminated(take_until("-->"), tag("-->")), rest)),
        ),
        Token::Comment,
    )(input)
}

/// Parse `<!DOCTYPE ...>` and any other `<!...>` declaration
fn parse_declaration(input: &str) -> IResult<&str, Token<'_>> {
    map(
        delimited(tag("<!"), take_until(">"), char('>')),
        Token::Doctype,
    )(input)
}

/// Parse a tag in the form `</name ...>`, returning `name`
fn parse_close_tag(input: &str) -> IResult<&str, Token<'_>> {
    let (remaining, (_, name, _, _)) =
        tuple((tag("</"), parse_tag_name, take_until(">"), char('>')))(input)?;
    Ok((remaining, Token::Close(name)))
}

/// Parse a tag in the form `<name attr=value ...>`. Anything after the attributes up
/// to the closing `>` is ignored, except a trailing `/`
fn parse_open_tag(input: &str) -> IResult<&str, Token<'_>> {
    let (remaining, (_, name, attributes, junk, _)) = tuple((
        char('<'),
        parse_tag_name,
        all_attr_parser,
        take_until(">"),
        char('>'),
    ))(input)?;
    Ok((
        remaining,
        Token::Open {
            name,
            attributes,
            self_closing: junk.trim_end().ends_with('/'),
        },
    ))
}

/// Parse the content up to the next `<`
fn parse_text(input: &str) -> IResult<&str, Token<'_>> {
    map(take_till1(|c: char| c == '<'), Token::Text)(input)
}

/// Consume the contents of a raw text element up to (not including) its end tag
fn parse_raw_text<'a>(input: &'a str, name: &str) -> (&'a str, &'a str) {
    let end_tag = format!("</{}", name);
    // ASCII lowercasing keeps byte offsets intact
    match input.to_ascii_lowercase().find(&end_tag) {
        Some(end) => (&input[end..], &input[..end]),
        None => (&input[input.len()..], input),
    }
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    let data = r#"<div>"#;
    let target = Token::Open {
        name: "div".to_string(),
        attributes: vec![],
        self_closing: false,
    };
    assert_eq!(parse_open_tag(data).unwrap(), ("", target));

    let data = r#"<DIV class=nothing>"#;
    let target = Token::Open {
        name: "div".to_string(),
        attributes: vec![("class", "nothing")],
        self_closing: false,
    };
    assert_eq!(parse_open_tag(data).unwrap(), ("", target));

    let data = r#"<div attr1 attr2=two attr3='three' attr4="number four">"#;
    let target = Token::Open {
        name: "div".to_string(),
        attributes: vec![
            ("attr1", ""),
            ("attr2", "two"),
            ("attr3", "three"),
            ("attr4", "number four"),
        ],
        self_closing: false,
    };
    assert_eq!(parse_open_tag(data).unwrap(), ("", target));

    let data = "<img\n  src = \"a.png\"\n  alt=\"\" />";
    let target = Token::Open {
        name: "img".to_string(),
        attributes: vec![("src", "a.png"), ("alt", "")],
        self_closing: true,
    };
    assert_eq!(parse_open_tag(data).unwrap(), ("", target));
}

#[cfg(test)]
#[test]
fn test_token_fallbacks() {
    assert_eq!(parse_token("< 3").unwrap(), (" 3", Token::Text("<")));
    assert_eq!(parse_token("<3").unwrap(), ("3", Token::Text("<")));
    assert_eq!(
        parse_token("<!-- open").unwrap(),
        ("", Token::Comment(" open"))
    );
    assert_eq!(
        parse_token("<!DOCTYPE html><html>").unwrap(),
        ("<html>", Token::Doctype("DOCTYPE html"))
    );
    assert_eq!(
        parse_token("</p class=x>").unwrap(),
        ("", Token::Close("p".to_string()))
    );
    // Unterminated quote: the broken value is dropped, the tag survives
    assert_eq!(
        parse_token(r#"<a href="oops>text"#).unwrap().1,
        Token::Open {
            name: "a".to_string(),
            attributes: vec![("href", "")],
            self_closing: false,
        }
    );
}

#[cfg(test)]
#[test]
fn test_raw_text() {
    assert_eq!(
        parse_raw_text("if (a < b) {}</SCRIPT>", "script"),
        ("</SCRIPT>", "if (a < b) {}")
    );
    assert_eq!(parse_raw_text("never closed", "style"), ("", "never closed"));
}

// Attribute parsing below

fn parse_single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_while(|c: char| c != '\''), char('\''))(input)
}

fn parse_double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"'))(input)
}

fn parse_unquoted(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'=<>`")(input)
}

fn value_parser(input: &str) -> IResult<&str, &str> {
    alt((parse_single_quoted, parse_double_quoted, parse_unquoted))(input)
}

fn name_parser(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'>/=")(input)
}

fn single_attr_parser(input: &str) -> IResult<&str, (&str, &str)> {
    let (r, (name, value)) = pair(
        name_parser,
        opt(preceded(
            tuple((multispace0, char('='), multispace0)),
            value_parser,
        )),
    )(input)?;
    Ok((r, (name, value.unwrap_or(""))))
}

fn all_attr_parser(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    many0(preceded(multispace0, single_attr_parser))(input)
}

/// Elements which are implicitly closed when an element named `next` is opened
/// while `open` is the current element
fn closes_implicitly(open: &str, next: &str) -> bool {
    match open {
        "head" => !METADATA.contains(&next),
        "p" => BLOCK.contains(&next),
        "li" => next == "li",
        "dt" | "dd" => next == "dt" || next == "dd",
        "option" => next == "option" || next == "optgroup",
        "tr" => next == "tr" || next == "tbody" || next == "tfoot",
        "td" | "th" => ["td", "th", "tr", "tbody", "tfoot"].contains(&next),
        "thead" | "tbody" => next == "tbody" || next == "tfoot",
        _ => false,
    }
}

/// Elements which may appear in `head`
static METADATA: &[&str] = &[
    "base", "link", "meta", "noscript", "script", "style", "template", "title",
];

static BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Open elements nested deeper than this are appended empty to the current
/// element, which bounds the recursion of everything that walks the tree
const MAX_DEPTH: usize = 512;

/// Assembles tokens into a tree using a stack of open elements
#[derive(Default)]
struct TreeBuilder {
    open: Vec<DOMElement>,
    document: Document,
}

impl TreeBuilder {
    fn push(&mut self, token: Token<'_>) {
        match token {
            Token::Doctype(d) => self.append(DOMContent::Doctype(d.to_string())),
            Token::Comment(c) => self.append(DOMContent::Comment(c.to_string())),
            Token::Text(t) => self.append_text(t),
            Token::Open {
                name,
                attributes,
                self_closing,
            } => self.open(name, attributes, self_closing),
            Token::Close(name) => self.close(&name),
        }
    }

    fn open(&mut self, name: String, attributes: Vec<(&str, &str)>, self_closing: bool) {
        while let Some(current) = self.open.last() {
            if !closes_implicitly(&current.name, &name) {
                break;
            }
            trace!(closed = %current.name, by = %name, "Implicit end tag");
            self.pop();
        }
        let mut attrs = DOMAttributes::empty();
        for (k, v) in attributes {
            // The first occurrence of a duplicated attribute wins
            attrs
                .0
                .entry(k.to_ascii_lowercase())
                .or_insert_with(|| v.to_string());
        }
        let element = DOMElement::new(&name, Some(attrs), vec![]);
        // `/>` only means something inside SVG and MathML
        let foreign = self.in_foreign_content() || name == "svg" || name == "math";
        if is_void_element(&name) || (self_closing && foreign) {
            self.append(element.into());
        } else if self.open.len() + 1 >= MAX_DEPTH {
            // Its contents end up next to it instead of inside it
            trace!(%name, "Nesting too deep, not opening");
            self.append(element.into());
        } else {
            self.open.push(element);
        }
    }

    fn close(&mut self, name: &str) {
        match self.open.iter().rposition(|e| e.name == name) {
            Some(index) => {
                while self.open.len() > index {
                    self.pop();
                }
            }
            None => trace!(name, "Dropping stray end tag"),
        }
    }

    fn is_current(&self, name: &str) -> bool {
        self.open.last().map_or(false, |e| e.name == name)
    }

    fn in_foreign_content(&self) -> bool {
        self.open.iter().any(|e| e.name == "svg" || e.name == "math")
    }

    /// Close the current element, attaching it to its parent
    fn pop(&mut self) {
        if let Some(element) = self.open.pop() {
            self.append(element.into());
        }
    }

    fn contents(&mut self) -> &mut Vec<DOMContent> {
        match self.open.last_mut() {
            Some(parent) => &mut parent.contents,
            None => &mut self.document.contents,
        }
    }

    fn append(&mut self, content: DOMContent) {
        self.contents().push(content);
    }

    /// Append text, merging with a preceding text node
    fn append_text(&mut self, text: &str) {
        let contents = self.contents();
        if let Some(DOMContent::Text(last)) = contents.last_mut() {
            last.push_str(text);
        } else {
            contents.push(DOMContent::Text(text.to_string()));
        }
    }

    fn finish(mut self) -> Document {
        while !self.open.is_empty() {
            self.pop();
        }
        self.document
    }
}

#[cfg(test)]
#[test]
fn test_node_parse() {
    let data = r#"<html><div class=nothing><h1></h1></div></html>"#;
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new(
            "div",
            Some(crate::attributes!("class" => "nothing")),
            vec![DOMElement::new("h1", None, vec![]).into()],
        )
        .into()],
    );
    assert_eq!(document(data).contents, vec![target.into()]);

    let data = r#"<html><h1>Hello, world</h1></html>"#;
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new("h1", None, vec!["Hello, world".into()]).into()],
    );
    assert_eq!(document(data).contents, vec![target.into()]);
}

#[cfg(test)]
#[test]
fn test_parse_malformed() {
    // Stray end tag is dropped, unclosed element is closed at the end
    let data = r#"<html></closing><opening></html>"#;
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new("opening", None, vec![]).into()],
    );
    assert_eq!(document(data).contents, vec![target.into()]);

    let data = r#"<---></--->"#;
    assert_eq!(document(data).contents, vec!["<---></--->".into()]);
}

#[cfg(test)]
#[test]
fn test_implicit_end_tags() {
    let data = "<ul><li>one<li>two</ul><p>para<div>block</div>";
    let target = vec![
        DOMElement::new(
            "ul",
            None,
            vec![
                DOMElement::new("li", None, vec!["one".into()]).into(),
                DOMElement::new("li", None, vec!["two".into()]).into(),
            ],
        )
        .into(),
        DOMElement::new("p", None, vec!["para".into()]).into(),
        DOMElement::new("div", None, vec!["block".into()]).into(),
    ];
    assert_eq!(document(data).contents, target);
}

#[cfg(test)]
#[test]
fn test_void_and_foreign() {
    let data = r#"<p><img src=a.png><br/>x</p><svg><path d="M0"/><circle/></svg>"#;
    let doc = document(data);
    let p = match &doc.contents[0] {
        DOMContent::Element(e) => e,
        other => panic!("expected element, got {:?}", other),
    };
    assert_eq!(p.contents.len(), 3);
    let svg = match &doc.contents[1] {
        DOMContent::Element(e) => e,
        other => panic!("expected element, got {:?}", other),
    };
    assert_eq!(svg.children().map(|e| e.name.as_str()).collect::<Vec<_>>(), ["path", "circle"]);
}

#[cfg(test)]
#[test]
fn test_head_ends_at_body() {
    let data = "<html><head><title>t</title><body><p>x</p></body></html>";
    let target = DOMElement::new(
        "html",
        None,
        vec![
            DOMElement::new(
                "head",
                None,
                vec![DOMElement::new("title", None, vec!["t".into()]).into()],
            )
            .into(),
            DOMElement::new(
                "body",
                None,
                vec![DOMElement::new("p", None, vec!["x".into()]).into()],
            )
            .into(),
        ],
    );
    assert_eq!(document(data).contents, vec![target.into()]);

    // Flow content ends it too, and the late end tag is dropped
    let doc = document("<head><meta charset=utf-8><div>a</div></head>");
    assert_eq!(doc.to_string(), r#"<head><meta charset="utf-8"></head><div>a</div>"#);
}

#[cfg(test)]
#[test]
fn test_nesting_is_bounded() {
    fn depth(contents: &[DOMContent]) -> usize {
        contents
            .iter()
            .map(|c| match c {
                DOMContent::Element(e) => 1 + depth(&e.contents),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }

    let data = format!("{}x{}", "<div>".repeat(20_000), "</div>".repeat(20_000));
    let doc = document(&data);
    assert_eq!(depth(&doc.contents), MAX_DEPTH);
    assert!(doc.to_string().contains("x"));
}
