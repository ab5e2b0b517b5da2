use css::SelectorList;
use html::{DOMElement, Document};
use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use tracing::debug;

use super::{compile, Context};

/// Text of the heading that replaces the site logo
pub const MASTHEAD: &str = "Buzerant";
/// What the brand name becomes in page text
pub const CENSORED: &str = "Bu*erant";

lazy_static! {
    static ref LOGOS: SelectorList = compile(r#"img[src*="logo.svg"]"#);
    static ref BRAND: Regex = Regex::new("(?i)buzerant").expect("brand pattern is valid");
}

/// Replace every logo image with a plain-text masthead. The masthead is
/// verbatim so the censoring step leaves it as it is.
pub fn substitute_logo(document: &mut Document, _: &Context) {
    for path in document.select(&LOGOS) {
        let masthead = DOMElement::new("h1", None, vec![MASTHEAD.into()]).into_verbatim();
        document.replace(&path, masthead.into());
    }
}

/// Replace the brand name, in any case, in every text node
pub fn censor_brand(document: &mut Document, _: &Context) {
    let mut censored = 0;
    document.for_each_text_mut(|text| {
        if BRAND.is_match(text) {
            *text = BRAND.replace_all(text, NoExpand(CENSORED)).into_owned();
            censored += 1;
        }
    });
    debug!(censored, "Censored text nodes");
}
