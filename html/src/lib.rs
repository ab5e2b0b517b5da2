//! A small, forgiving HTML document model.
//!
//! Documents are parsed with [`document`], which never fails: malformed markup
//! is absorbed the way a browser would (mostly). Text and attribute values are
//! kept in their source form so that serializing an untouched document gives
//! back the original markup; use [`DOMElement::text`] for decoded text.

mod dom;
mod entities;
mod parsing;
mod query;
mod serialize;
#[cfg(test)]
mod tests;

pub use dom::*;
pub use entities::{escape_text, unescape};
pub use parsing::document;
pub use query::NodePath;

#[macro_export]
macro_rules! attributes {
    () => {
        $crate::DOMAttributes::empty()
    };
    ($($k:expr => $v:expr),+ $(,)?) => {
        [$(($k, $v)),+].into_iter().collect::<$crate::DOMAttributes>()
    };
}
