//! Selector matching and path-addressed mutation.
//!
//! Queries return [`NodePath`]s rather than references so that the caller can go
//! on to mutate the matched nodes. A path is only valid until the next structural
//! change to the document; [`Document::remove`] accounts for this itself.

use css::{Combinator, Selector, SelectorList, SimpleSelector};
use tracing::trace;

use super::dom::*;

/// Child indices leading from the top level of a [`Document`] to a node
pub type NodePath = Vec<usize>;

/// An element on the way down to the element being matched, with its index
/// among its parent's contents
#[derive(Clone, Copy)]
struct Frame<'a> {
    element: &'a DOMElement,
    index: usize,
}

struct Matcher<'a> {
    top: &'a [DOMContent],
}

impl<'a> Matcher<'a> {
    /// Does the last frame match `selector`? Earlier frames are its ancestors.
    fn matches(&self, selector: &Selector, frames: &[Frame<'a>]) -> bool {
        let element = match frames.last() {
            Some(frame) => frame.element,
            None => return false,
        };
        match selector {
            Selector::Simple(s) => does_simple_selector_apply(element, s),
            Selector::Compound(sels) => sels.iter().all(|s| does_simple_selector_apply(element, s)),
            Selector::Combinator(left, combinator, right) => {
                if !self.matches(right, frames) {
                    return false;
                }
                let parent = frames.len() - 1;
                match combinator {
                    Combinator::Descendant => {
                        (1..=parent).rev().any(|depth| self.matches(left, &frames[..depth]))
                    }
                    Combinator::Child => parent > 0 && self.matches(left, &frames[..parent]),
                    Combinator::NextSibling => self
                        .preceding_siblings(frames)
                        .next()
                        .map_or(false, |sibling| self.matches_sibling(left, frames, sibling)),
                    Combinator::SubsequentSibling => self
                        .preceding_siblings(frames)
                        .any(|sibling| self.matches_sibling(left, frames, sibling)),
                }
            }
        }
    }

    /// Match `selector` against a sibling of the last frame
    fn matches_sibling(&self, selector: &Selector, frames: &[Frame<'a>], sibling: Frame<'a>) -> bool {
        let mut frames = frames.to_vec();
        if let Some(last) = frames.last_mut() {
            *last = sibling;
        }
        self.matches(selector, &frames)
    }

    /// Element siblings before the last frame, nearest first
    fn preceding_siblings(&self, frames: &[Frame<'a>]) -> impl Iterator<Item = Frame<'a>> {
        let (siblings, index) = match frames {
            [.., parent, last] => {
                let parent: &'a DOMElement = parent.element;
                (parent.contents.as_slice(), last.index)
            }
            [last] => (self.top, last.index),
            [] => (self.top, 0),
        };
        siblings[..index].iter().enumerate().rev().filter_map(|(index, c)| match c {
            DOMContent::Element(element) => Some(Frame { element, index }),
            _ => None,
        })
    }

    /// Walk `contents` in document order, recording the path of every matching element
    fn collect(
        &self,
        selectors: &SelectorList,
        contents: &'a [DOMContent],
        frames: &mut Vec<Frame<'a>>,
        path: &mut NodePath,
        found: &mut Vec<NodePath>,
    ) {
        for (index, content) in contents.iter().enumerate() {
            if let DOMContent::Element(element) = content {
                frames.push(Frame { element, index });
                path.push(index);
                if selectors.0.iter().any(|s| self.matches(s, frames)) {
                    found.push(path.clone());
                }
                self.collect(selectors, &element.contents, frames, path, found);
                path.pop();
                frames.pop();
            }
        }
    }
}

/// Check if the provided [`SimpleSelector`] selects this element
fn does_simple_selector_apply(element: &DOMElement, selector: &SimpleSelector) -> bool {
    match selector {
        SimpleSelector::Type(name) => &element.name == name,
        SimpleSelector::Universal => true,
        SimpleSelector::Attribute(attr) => {
            attr.accepts(element.get_attribute(attr.name()).map(String::as_str))
        }
        SimpleSelector::Class(name) => element
            .get_attribute("class")
            .map_or(false, |c| c.split_whitespace().any(|c| c == name)),
        SimpleSelector::ID(id) => element.get_attribute("id").map_or(false, |c| c == id),
    }
}

fn content_at<'a>(contents: &'a [DOMContent], path: &[usize]) -> Option<&'a DOMContent> {
    let (first, rest) = path.split_first()?;
    let content = contents.get(*first)?;
    match (rest.is_empty(), content) {
        (true, _) => Some(content),
        (false, DOMContent::Element(e)) => content_at(&e.contents, rest),
        (false, _) => None,
    }
}

fn content_at_mut<'a>(contents: &'a mut [DOMContent], path: &[usize]) -> Option<&'a mut DOMContent> {
    let (first, rest) = path.split_first()?;
    let content = contents.get_mut(*first)?;
    if rest.is_empty() {
        return Some(content);
    }
    match content {
        DOMContent::Element(e) => content_at_mut(&mut e.contents, rest),
        _ => None,
    }
}

impl Document {
    /// Paths of every element matching any selector in the list, in document order
    pub fn select(&self, selectors: &SelectorList) -> Vec<NodePath> {
        let matcher = Matcher {
            top: &self.contents,
        };
        let mut found = Vec::new();
        matcher.collect(selectors, &self.contents, &mut Vec::new(), &mut Vec::new(), &mut found);
        trace!(selector = %selectors, matched = found.len(), "Selected");
        found
    }

    pub fn element(&self, path: &[usize]) -> Option<&DOMElement> {
        match content_at(&self.contents, path)? {
            DOMContent::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut DOMElement> {
        match content_at_mut(&mut self.contents, path)? {
            DOMContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Path of the first element following the node at `path` among its siblings
    pub fn next_element_sibling(&self, path: &[usize]) -> Option<NodePath> {
        let (index, parent) = path.split_last()?;
        let siblings = if parent.is_empty() {
            &self.contents
        } else {
            &self.element(parent)?.contents
        };
        let next = siblings
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, c)| matches!(c, DOMContent::Element(_)))?
            .0;
        let mut path = parent.to_vec();
        path.push(next);
        Some(path)
    }

    /// Remove the subtrees at `paths`, returning how many were removed. Later
    /// nodes are removed first so that the remaining paths stay valid.
    pub fn remove(&mut self, mut paths: Vec<NodePath>) -> usize {
        paths.sort_unstable();
        paths.dedup();
        paths
            .iter()
            .rev()
            .filter(|path| self.remove_at(path).is_some())
            .count()
    }

    fn remove_at(&mut self, path: &[usize]) -> Option<DOMContent> {
        let (index, parent) = path.split_last()?;
        let siblings = if parent.is_empty() {
            &mut self.contents
        } else {
            &mut self.element_mut(parent)?.contents
        };
        (*index < siblings.len()).then(|| siblings.remove(*index))
    }

    /// Replace the node at `path`, returning the node that was there
    pub fn replace(&mut self, path: &[usize], content: DOMContent) -> Option<DOMContent> {
        let slot = content_at_mut(&mut self.contents, path)?;
        Some(std::mem::replace(slot, content))
    }

    /// Visit every text node, skipping the subtrees of verbatim elements
    pub fn for_each_text_mut(&mut self, mut f: impl FnMut(&mut String)) {
        fn visit(contents: &mut [DOMContent], f: &mut impl FnMut(&mut String)) {
            for content in contents {
                match content {
                    DOMContent::Text(text) => f(text),
                    DOMContent::Element(e) if !e.verbatim => visit(&mut e.contents, f),
                    _ => {}
                }
            }
        }
        visit(&mut self.contents, &mut f);
    }
}
