//! Character reference handling.
//!
//! The DOM stores text in source form; these helpers convert between source form
//! and plain text at the edges.

use std::borrow::Cow;

/// Escape text content so it can be stored as source-form text
pub fn escape_text(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Quote a source-form attribute value for writing between double quotes.
/// Entity references already present are left as they are.
pub(crate) fn quote_attribute(s: &str) -> Cow<'_, str> {
    escape_with(s, |c| match c {
        '"' => Some("&quot;"),
        _ => None,
    })
}

fn escape_with(s: &str, entity: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    if !s.chars().any(|c| entity(c).is_some()) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match entity(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Decode character references. Unknown or malformed references are kept literally.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        rest = &rest[start..];
        match decode_reference(rest) {
            Some((decoded, len)) => {
                result.push(decoded);
                rest = &rest[len..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

/// Decode a reference at the start of `s` (which begins with `&`), returning the
/// character and the number of bytes consumed
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let end = s[1..].find(';')? + 1;
    // Longest reference we understand is `&#x10FFFF;`
    if end > 10 {
        return None;
    }
    let entity = &s[1..end];
    let decoded = match entity.strip_prefix('#') {
        Some(num) => {
            let code = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
        None => named(entity)?,
    };
    Some((decoded, end + 1))
}

fn named(entity: &str) -> Option<char> {
    let c = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "middot" => '\u{00B7}',
        "bull" => '\u{2022}',
        "hellip" => '\u{2026}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "sbquo" => '\u{201A}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "bdquo" => '\u{201E}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "deg" => '\u{00B0}',
        "times" => '\u{00D7}',
        "shy" => '\u{00AD}',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[test]
fn test_unescape() {
    assert_eq!(unescape("plain"), Cow::Borrowed("plain"));
    assert_eq!(unescape("a &amp; b"), "a & b");
    assert_eq!(unescape("foo &middot; "), "foo \u{b7} ");
    assert_eq!(unescape("&#183;&#xB7;"), "\u{b7}\u{b7}");
    assert_eq!(unescape("&unknown; & &;"), "&unknown; & &;");
    assert_eq!(unescape("R&D"), "R&D");
    assert_eq!(unescape("&#xFFFFFFFF;"), "&#xFFFFFFFF;");
}

#[cfg(test)]
#[test]
fn test_escape() {
    assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
    assert_eq!(escape_text("\"quoted\""), Cow::Borrowed("\"quoted\""));
    assert_eq!(quote_attribute(r#"say "hi" &amp;"#), "say &quot;hi&quot; &amp;");
}
