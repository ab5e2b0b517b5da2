use super::*;

#[test]
fn test_selector_list() {
    let list: SelectorList = r#"style, link[rel="stylesheet"]"#.parse().unwrap();
    let target = SelectorList(vec![
        Selector::Simple(simple_selector!(style)),
        compound_selector!(
            simple_selector!(link),
            SimpleSelector::Attribute(AttributeSelector::Equals(
                "rel".to_string(),
                "stylesheet".to_string()
            ))
        ),
    ]);
    assert_eq!(list, target);
}

#[test]
fn test_descendant_list() {
    let list: SelectorList = "  div span ".parse().unwrap();
    let target = SelectorList(vec![combinator_selector!(
        Selector::Simple(simple_selector!(div)),
        Combinator::Descendant,
        Selector::Simple(simple_selector!(span))
    )]);
    assert_eq!(list, target);
}

#[test]
fn test_invalid_selectors() {
    assert_eq!("".parse::<SelectorList>(), Err(SelectorError::Empty));
    assert!("div >".parse::<SelectorList>().is_err());
    assert!("a[href".parse::<SelectorList>().is_err());
    assert!("a,,b".parse::<SelectorList>().is_err());
    assert!("a:hover".parse::<SelectorList>().is_err());
}

#[test]
fn test_display_round_trip() {
    let text = r#"header + div, img[src*="logo.svg"], ul > li ~ li"#;
    let list: SelectorList = text.parse().unwrap();
    assert_eq!(list.to_string(), text);
}

#[test]
fn test_attribute_accepts() {
    let includes = AttributeSelector::Includes("rel".into(), "icon".into());
    assert!(includes.accepts(Some("shortcut icon")));
    assert!(!includes.accepts(Some("iconic")));
    assert!(!includes.accepts(None));

    let begins = AttributeSelector::Begins("lang".into(), "en".into());
    assert!(begins.accepts(Some("en")));
    assert!(begins.accepts(Some("en-GB")));
    assert!(!begins.accepts(Some("english")));

    let contains = AttributeSelector::Contains("src".into(), "logo.svg".into());
    assert!(contains.accepts(Some("/static/logo.svg?v=2")));
    assert!(!contains.accepts(Some("/static/logo.png")));
    assert!(!AttributeSelector::Contains("src".into(), "".into()).accepts(Some("x")));

    assert!(AttributeSelector::Has("style".into()).accepts(Some("")));
}

#[test]
fn test_attribute_value_case() {
    let rel = AttributeSelector::Equals("rel".into(), "stylesheet".into());
    assert!(rel.accepts(Some("StyleSheet")));
    assert!(rel.accepts(Some("STYLESHEET")));
    assert!(AttributeSelector::Includes("rel".into(), "Icon".into()).accepts(Some("shortcut ICON")));

    let href = AttributeSelector::Equals("href".into(), "/a".into());
    assert!(!href.accepts(Some("/A")));
    let src = AttributeSelector::Contains("src".into(), "logo.svg".into());
    assert!(!src.accepts(Some("/LOGO.SVG")));
}
