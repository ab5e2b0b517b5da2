use std::fmt::{self, Display, Formatter};

use super::dom::*;
use super::entities::quote_attribute;

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.contents.iter().try_for_each(|c| c.fmt(f))
    }
}

impl Display for DOMContent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DOMContent::Element(e) => e.fmt(f),
            DOMContent::Text(t) => f.write_str(t),
            DOMContent::Comment(c) => write!(f, "<!--{}-->", c),
            DOMContent::Doctype(d) => write!(f, "<!{}>", d),
        }
    }
}

impl Display for DOMAttributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.0 {
            write!(f, " {}=\"{}\"", name, quote_attribute(value))?;
        }
        Ok(())
    }
}

impl Display for DOMElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}{}>", self.name, self.attributes)?;
        if is_void_element(&self.name) {
            return Ok(());
        }
        self.contents.iter().try_for_each(|c| c.fmt(f))?;
        write!(f, "</{}>", self.name)
    }
}
