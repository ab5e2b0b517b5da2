use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A comma-separated group of selectors. An element matches the list if it
/// matches any member.
#[derive(PartialEq, Clone, Debug)]
pub struct SelectorList(pub Vec<Selector>);

#[derive(PartialEq, Clone, Debug)]
pub enum Selector {
    Simple(SimpleSelector),
    Compound(Vec<SimpleSelector>),
    // The right hand side is always a simple or compound selector
    Combinator(Box<Selector>, Combinator, Box<Selector>),
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Combinator {
    // ( )
    Descendant,
    // (>)
    Child,
    // (+)
    NextSibling,
    // (~)
    SubsequentSibling,
}

#[derive(PartialEq, Clone, Debug)]
pub enum SimpleSelector {
    Type(String),
    Universal,
    Attribute(AttributeSelector),
    Class(String),
    ID(String),
}

#[derive(PartialEq, Clone, Debug)]
pub enum AttributeSelector {
    // [att]
    Has(String),
    // [att=val]
    Equals(String, String),
    // [att~=val]
    // whitespace-separated list containing `val`
    Includes(String, String),
    // [att|=val]
    // `att` is `val` or begins with `val-`
    Begins(String, String),
    // [att^=val]
    Prefix(String, String),
    // [att$=val]
    Suffix(String, String),
    // [att*=val]
    Contains(String, String),
}

impl AttributeSelector {
    /// The attribute name this selector inspects
    pub fn name(&self) -> &str {
        match self {
            AttributeSelector::Has(name)
            | AttributeSelector::Equals(name, _)
            | AttributeSelector::Includes(name, _)
            | AttributeSelector::Begins(name, _)
            | AttributeSelector::Prefix(name, _)
            | AttributeSelector::Suffix(name, _)
            | AttributeSelector::Contains(name, _) => name,
        }
    }

    /// The value this selector compares against, if it has one
    pub fn operand(&self) -> Option<&str> {
        match self {
            AttributeSelector::Has(_) => None,
            AttributeSelector::Equals(_, value)
            | AttributeSelector::Includes(_, value)
            | AttributeSelector::Begins(_, value)
            | AttributeSelector::Prefix(_, value)
            | AttributeSelector::Suffix(_, value)
            | AttributeSelector::Contains(_, value) => Some(value),
        }
    }

    /// Check an attribute value (`None` if the attribute is absent) against this selector.
    /// Values of attributes such as `rel` and `type` compare ASCII case-insensitively.
    pub fn accepts(&self, value: Option<&str>) -> bool {
        let (value, expected) = match (value, self.operand()) {
            (None, _) => return false,
            (Some(_), None) => return true,
            (Some(value), Some(expected)) => (value, expected),
        };
        let (value, expected): (Cow<str>, Cow<str>) = if is_case_insensitive_attribute(self.name()) {
            (value.to_ascii_lowercase().into(), expected.to_ascii_lowercase().into())
        } else {
            (value.into(), expected.into())
        };
        let (value, expected) = (&*value, &*expected);
        match self {
            AttributeSelector::Has(_) => true,
            AttributeSelector::Equals(..) => value == expected,
            AttributeSelector::Includes(..) => value.split_whitespace().any(|word| word == expected),
            AttributeSelector::Begins(..) => {
                value == expected
                    || value
                        .strip_prefix(expected)
                        .map_or(false, |rest| rest.starts_with('-'))
            }
            // An empty operand never matches for the substring operators
            AttributeSelector::Prefix(..) => !expected.is_empty() && value.starts_with(expected),
            AttributeSelector::Suffix(..) => !expected.is_empty() && value.ends_with(expected),
            AttributeSelector::Contains(..) => !expected.is_empty() && value.contains(expected),
        }
    }
}

// https://html.spec.whatwg.org/multipage/semantics-other.html#case-sensitivity-of-selectors
static CASE_INSENSITIVE_ATTRIBUTES: &[&str] = &[
    "accept", "accept-charset", "align", "alink", "axis", "bgcolor", "charset", "checked",
    "clear", "codetype", "color", "compact", "declare", "defer", "dir", "direction", "disabled",
    "enctype", "face", "frame", "hreflang", "http-equiv", "lang", "language", "link", "media",
    "method", "multiple", "nohref", "noresize", "noshade", "nowrap", "readonly", "rel", "rev",
    "rules", "scope", "scrolling", "selected", "shape", "target", "text", "type", "valign",
    "valuetype", "vlink",
];

/// HTML attributes whose values selectors match regardless of ASCII case
pub fn is_case_insensitive_attribute(name: &str) -> bool {
    CASE_INSENSITIVE_ATTRIBUTES.contains(&name)
}

#[macro_export]
macro_rules! simple_selector {
    (#$x:expr) => {
        $crate::SimpleSelector::ID(stringify!($x).to_string())
    };
    (.$x:expr) => {
        $crate::SimpleSelector::Class(stringify!($x).to_string())
    };
    (*) => {
        $crate::SimpleSelector::Universal
    };
    ($x:expr) => {
        $crate::SimpleSelector::Type(stringify!($x).to_string())
    };
}

#[macro_export]
macro_rules! compound_selector {
    ($($sel:expr),*) => {$crate::Selector::Compound(vec![$($sel),*])}
}

#[macro_export]
macro_rules! combinator_selector {
    ($l:expr,$c:expr,$r:expr) => {
        $crate::Selector::Combinator(Box::new($l), $c, Box::new($r))
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected input at `{0}`")]
    Unexpected(String),
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        match selector_list(s) {
            Ok(("", list)) => Ok(list),
            Ok((rest, _)) => Err(SelectorError::Unexpected(rest.to_string())),
            Err(_) => Err(SelectorError::Unexpected(s.to_string())),
        }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Simple(s) => write!(f, "{}", s),
            Selector::Compound(sels) => sels.iter().try_for_each(|s| write!(f, "{}", s)),
            Selector::Combinator(l, c, r) => {
                let c = match c {
                    Combinator::Descendant => " ",
                    Combinator::Child => " > ",
                    Combinator::NextSibling => " + ",
                    Combinator::SubsequentSibling => " ~ ",
                };
                write!(f, "{}{}{}", l, c, r)
            }
        }
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Type(name) => f.write_str(name),
            SimpleSelector::Universal => f.write_str("*"),
            SimpleSelector::Class(name) => write!(f, ".{}", name),
            SimpleSelector::ID(name) => write!(f, "#{}", name),
            SimpleSelector::Attribute(attr) => {
                let (op, value) = match attr {
                    AttributeSelector::Has(name) => return write!(f, "[{}]", name),
                    AttributeSelector::Equals(_, v) => ("=", v),
                    AttributeSelector::Includes(_, v) => ("~=", v),
                    AttributeSelector::Begins(_, v) => ("|=", v),
                    AttributeSelector::Prefix(_, v) => ("^=", v),
                    AttributeSelector::Suffix(_, v) => ("$=", v),
                    AttributeSelector::Contains(_, v) => ("*=", v),
                };
                write!(f, "[{}{}\"{}\"]", attr.name(), op, value)
            }
        }
    }
}

mod parsing;
#[cfg(test)]
mod tests;

pub use parsing::selector_list;
