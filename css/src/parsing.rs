use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use super::{AttributeSelector, Combinator, Selector, SelectorList, SimpleSelector};

/// Parse a complete, comma-separated selector list such as `style, link[rel="stylesheet"]`
pub fn selector_list(input: &str) -> IResult<&str, SelectorList> {
    let (r, selectors) = all_consuming(delimited(
        multispace0,
        separated_list1(tuple((multispace0, char(','), multispace0)), parse_complex),
        multispace0,
    ))(input)?;
    Ok((r, SelectorList(selectors)))
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

/// A chain of compound selectors joined by combinators, folded left so that the
/// rightmost compound is the subject
fn parse_complex(input: &str) -> IResult<&str, Selector> {
    let (r, (first, rest)) = pair(parse_compound, many0(pair(parse_combinator, parse_compound)))(input)?;
    let selector = rest.into_iter().fold(first, |left, (combinator, right)| {
        Selector::Combinator(Box::new(left), combinator, Box::new(right))
    });
    Ok((r, selector))
}

#[cfg(test)]
#[test]
fn test_parse_complex() {
    use crate::{combinator_selector, simple_selector};
    let target = combinator_selector!(
        combinator_selector!(
            Selector::Simple(simple_selector!(div)),
            Combinator::Child,
            Selector::Simple(simple_selector!(p))
        ),
        Combinator::Descendant,
        Selector::Simple(simple_selector!(span))
    );
    assert_eq!(parse_complex("div > p span").unwrap(), ("", target));

    let target = combinator_selector!(
        Selector::Simple(simple_selector!(header)),
        Combinator::NextSibling,
        Selector::Simple(simple_selector!(div))
    );
    assert_eq!(parse_complex("header+div").unwrap(), ("", target));
    // Trailing whitespace is not a descendant combinator
    assert_eq!(parse_complex("a ").unwrap().0, " ");
}

fn parse_combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        delimited(
            multispace0,
            alt((
                value(Combinator::Child, char('>')),
                value(Combinator::NextSibling, char('+')),
                value(Combinator::SubsequentSibling, char('~')),
            )),
            multispace0,
        ),
        value(Combinator::Descendant, multispace1),
    ))(input)
}

/// A type or universal selector followed by any number of class, ID and attribute selectors
fn parse_compound(input: &str) -> IResult<&str, Selector> {
    let (r, (head, mut tail)) = pair(
        opt(alt((parse_universal_selector, parse_type_selector))),
        many0(alt((parse_class_selector, parse_id_selector, parse_attribute_selector))),
    )(input)?;
    if let Some(head) = head {
        tail.insert(0, head);
    }
    let selector = match tail.len() {
        0 => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )))
        }
        1 => Selector::Simple(tail.remove(0)),
        _ => Selector::Compound(tail),
    };
    Ok((r, selector))
}

#[cfg(test)]
#[test]
fn test_parse_compound() {
    use crate::{compound_selector, simple_selector};
    assert_eq!(
        parse_compound("*").unwrap(),
        ("", Selector::Simple(SimpleSelector::Universal))
    );
    assert_eq!(
        parse_compound("DIV").unwrap(),
        ("", Selector::Simple(simple_selector!(div)))
    );
    let target = compound_selector!(
        simple_selector!(a),
        simple_selector!(.external),
        simple_selector!(#home)
    );
    assert_eq!(parse_compound("a.external#home").unwrap(), ("", target));
    assert!(parse_compound(",").is_err());
}

fn parse_universal_selector(input: &str) -> IResult<&str, SimpleSelector> {
    value(SimpleSelector::Universal, char('*'))(input)
}

fn parse_type_selector(input: &str) -> IResult<&str, SimpleSelector> {
    map(parse_identifier, |name| {
        SimpleSelector::Type(name.to_ascii_lowercase())
    })(input)
}

fn parse_class_selector(input: &str) -> IResult<&str, SimpleSelector> {
    map(preceded(char('.'), parse_identifier), |name| {
        SimpleSelector::Class(name.to_string())
    })(input)
}

fn parse_id_selector(input: &str) -> IResult<&str, SimpleSelector> {
    map(preceded(char('#'), parse_identifier), |name| {
        SimpleSelector::ID(name.to_string())
    })(input)
}

// Attribute parsing below

fn parse_single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_while(|c: char| c != '\''), char('\''))(input)
}

fn parse_double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"'))(input)
}

fn parse_unquoted(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'[]")(input)
}

fn value_parser(input: &str) -> IResult<&str, &str> {
    alt((parse_single_quoted, parse_double_quoted, parse_unquoted))(input)
}

fn operator_parser(input: &str) -> IResult<&str, &str> {
    alt((tag("~="), tag("|="), tag("^="), tag("$="), tag("*="), tag("=")))(input)
}

fn parse_attribute_selector(input: &str) -> IResult<&str, SimpleSelector> {
    let (r, (_, name, _, operation, _)) = delimited(
        char('['),
        tuple((
            multispace0,
            parse_identifier,
            multispace0,
            opt(tuple((operator_parser, multispace0, value_parser))),
            multispace0,
        )),
        char(']'),
    )(input)?;
    let name = name.to_ascii_lowercase();
    let attribute = match operation {
        None => AttributeSelector::Has(name),
        Some((op, _, value)) => {
            let value = value.to_string();
            match op {
                "~=" => AttributeSelector::Includes(name, value),
                "|=" => AttributeSelector::Begins(name, value),
                "^=" => AttributeSelector::Prefix(name, value),
                "$=" => AttributeSelector::Suffix(name, value),
                "*=" => AttributeSelector::Contains(name, value),
                _ => AttributeSelector::Equals(name, value),
            }
        }
    };
    Ok((r, SimpleSelector::Attribute(attribute)))
}

#[cfg(test)]
#[test]
fn test_attribute_parse() {
    let data = r#"[style]"#;
    let target = SimpleSelector::Attribute(AttributeSelector::Has("style".to_string()));
    assert_eq!(parse_attribute_selector(data).unwrap(), ("", target));

    let data = r#"[rel="stylesheet"]"#;
    let target = SimpleSelector::Attribute(AttributeSelector::Equals(
        "rel".to_string(),
        "stylesheet".to_string(),
    ));
    assert_eq!(parse_attribute_selector(data).unwrap(), ("", target));

    let data = r#"[ src *= 'logo.svg' ]"#;
    let target = SimpleSelector::Attribute(AttributeSelector::Contains(
        "src".to_string(),
        "logo.svg".to_string(),
    ));
    assert_eq!(parse_attribute_selector(data).unwrap(), ("", target));

    let data = r#"[lang|=en]"#;
    let target = SimpleSelector::Attribute(AttributeSelector::Begins(
        "lang".to_string(),
        "en".to_string(),
    ));
    assert_eq!(parse_attribute_selector(data).unwrap(), ("", target));

    let data = r##"[href="#top"]"##;
    let target = SimpleSelector::Attribute(AttributeSelector::Equals(
        "href".to_string(),
        "#top".to_string(),
    ));
    assert_eq!(parse_attribute_selector(data).unwrap(), ("", target));
}
