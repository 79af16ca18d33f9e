//! Pre-order traversal over a finished tree.
//!
//! The iterator keeps no stack of its own: it descends through `children`
//! and climbs back up through `parent` links, so a traversal costs O(1)
//! memory no matter how deep the instantiation chain is.

use super::entry::EntryRef;
use std::iter::FusedIterator;

/// Lazy depth-first (parent before children) walk of a subtree
///
/// Two iterators compare equal when they point at the same current entry,
/// or when both are exhausted.
#[derive(Debug, Clone)]
pub struct DepthFirstIter<'a> {
    current: Option<EntryRef<'a>>,
    root: EntryRef<'a>,
}

impl<'a> DepthFirstIter<'a> {
    pub fn new(root: EntryRef<'a>) -> Self {
        Self {
            current: Some(root),
            root,
        }
    }

    /// Entry the next call to `next` will yield
    pub fn current(&self) -> Option<EntryRef<'a>> {
        self.current
    }

    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    fn successor(&self, entry: EntryRef<'a>) -> Option<EntryRef<'a>> {
        if let Some(first) = entry.child(0) {
            return Some(first);
        }

        let mut node = entry;
        loop {
            if node == self.root {
                return None;
            }
            if let Some(sibling) = node.next_sibling() {
                return Some(sibling);
            }
            node = node.parent()?;
        }
    }
}

impl<'a> Iterator for DepthFirstIter<'a> {
    type Item = EntryRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.successor(current);
        Some(current)
    }
}

impl FusedIterator for DepthFirstIter<'_> {}

impl PartialEq for DepthFirstIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl Eq for DepthFirstIter<'_> {}
