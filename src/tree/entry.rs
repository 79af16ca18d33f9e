//! Instantiation entries and the tree that owns them.
//!
//! All entries of a trace live in one arena owned by [`TraceTree`], indexed
//! by their [`EntryId`]. Ids are handed out in begin-event order, so an
//! entry's id is also its arena slot. Children are stored as ordered id
//! lists and `parent` is a plain id used only to navigate upwards.

use super::iter::DepthFirstIter;
use crate::parser::{EntryKind, FileId, SourceLocation};
use crate::utils::error::TraceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Identifier of an entry, unique within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl EntryId {
    /// Id for arena slot `index`, if it fits in 32 bits
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reconstructed begin/end pair
#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub context: String,
    pub instantiation: Option<SourceLocation>,
    pub instantiation_begin: Option<SourceLocation>,
    pub instantiation_end: Option<SourceLocation>,
    /// Reserved, never filled by the reader
    pub declaration_begin: Option<SourceLocation>,
    /// Reserved, never filled by the reader
    pub declaration_end: Option<SourceLocation>,
    pub source_file_id: Option<FileId>,
    /// Seconds between the begin and end timestamps
    pub duration: f64,
    /// Bytes reported by the end event
    pub memory_usage: i64,
    parent: Option<EntryId>,
    children: Vec<EntryId>,
    index_in_parent: usize,
}

impl TraceEntry {
    fn new(id: EntryId, parent: Option<EntryId>) -> Self {
        Self {
            id,
            kind: EntryKind::Unknown,
            context: String::new(),
            instantiation: None,
            instantiation_begin: None,
            instantiation_end: None,
            declaration_begin: None,
            declaration_end: None,
            source_file_id: None,
            duration: 0.0,
            memory_usage: 0,
            parent,
            children: Vec::new(),
            index_in_parent: 0,
        }
    }

    /// Record the point of instantiation and its aliases
    pub(crate) fn set_instantiation(&mut self, location: SourceLocation) {
        self.instantiation = Some(location);
        self.instantiation_begin = Some(location);
        self.instantiation_end = Some(location);
        self.source_file_id = Some(location.file_id);
    }

    pub fn parent_id(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn child_ids(&self) -> &[EntryId] {
        &self.children
    }
}

/// Owner of every entry of one trace
///
/// Read-only once the reader hands it out.
#[derive(Debug, Clone)]
pub struct TraceTree {
    entries: Vec<TraceEntry>,
    top_level: Vec<EntryId>,
}

impl TraceTree {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            top_level: Vec::new(),
        }
    }

    /// Allocate the next entry under `parent`. It stays detached until
    /// [`TraceTree::attach`] is called for it.
    pub(crate) fn open(&mut self, parent: Option<EntryId>) -> Result<EntryId, TraceError> {
        let id = EntryId::from_index(self.entries.len())
            .ok_or(TraceError::TooManyIds { what: "entries" })?;
        self.entries.push(TraceEntry::new(id, parent));
        Ok(id)
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut TraceEntry {
        &mut self.entries[id.index()]
    }

    /// Append a closed entry to its parent's children, or to the top level
    pub(crate) fn attach(&mut self, id: EntryId) {
        let siblings = match self.entries[id.index()].parent {
            Some(parent) => &mut self.entries[parent.index()].children,
            None => &mut self.top_level,
        };
        let index = siblings.len();
        siblings.push(id);
        self.entries[id.index()].index_in_parent = index;
    }

    /// The first top-level entry
    ///
    /// Trees produced by the reader always hold at least one closed entry.
    pub fn root(&self) -> EntryRef<'_> {
        self.entry_ref(self.top_level[0])
    }

    /// Every entry closed with an empty stack, in close order
    pub fn top_level(&self) -> impl ExactSizeIterator<Item = EntryRef<'_>> + '_ {
        self.top_level.iter().map(move |id| self.entry_ref(*id))
    }

    pub fn get(&self, id: EntryId) -> Option<EntryRef<'_>> {
        self.entries.get(id.index()).map(|entry| EntryRef { tree: self, entry })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in id order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = EntryRef<'_>> + '_ {
        self.entries.iter().map(move |entry| EntryRef { tree: self, entry })
    }

    /// Pre-order walk of the root's subtree
    pub fn depth_first(&self) -> DepthFirstIter<'_> {
        self.root().depth_first()
    }

    /// Pre-order walk of every top-level subtree, one after the other
    ///
    /// Visits all `len()` entries, including those under the second and
    /// later top-level entries that [`TraceTree::depth_first`] leaves out.
    pub fn depth_first_all(&self) -> impl Iterator<Item = EntryRef<'_>> + '_ {
        self.top_level().flat_map(|top| top.depth_first())
    }

    pub(crate) fn entry_ref(&self, id: EntryId) -> EntryRef<'_> {
        EntryRef {
            tree: self,
            entry: &self.entries[id.index()],
        }
    }

    pub(crate) fn raw_top_level(&self) -> &[EntryId] {
        &self.top_level
    }
}

/// Borrowed view of an entry that can navigate the tree
#[derive(Clone, Copy)]
pub struct EntryRef<'a> {
    tree: &'a TraceTree,
    entry: &'a TraceEntry,
}

impl<'a> EntryRef<'a> {
    pub fn id(&self) -> EntryId {
        self.entry.id
    }

    pub fn entry(&self) -> &'a TraceEntry {
        self.entry
    }

    pub fn tree(&self) -> &'a TraceTree {
        self.tree
    }

    pub fn parent(&self) -> Option<EntryRef<'a>> {
        self.entry.parent.map(|id| self.tree.entry_ref(id))
    }

    pub fn children(
        &self,
    ) -> impl DoubleEndedIterator<Item = EntryRef<'a>> + ExactSizeIterator + 'a {
        let (tree, entry) = (self.tree, self.entry);
        entry.children.iter().map(move |id| tree.entry_ref(*id))
    }

    pub fn child(&self, index: usize) -> Option<EntryRef<'a>> {
        self.entry
            .children
            .get(index)
            .map(|id| self.tree.entry_ref(*id))
    }

    pub fn child_count(&self) -> usize {
        self.entry.children.len()
    }

    /// Position among the parent's children (or among top-level entries)
    pub fn index_in_parent(&self) -> usize {
        self.entry.index_in_parent
    }

    /// The entry following this one under the same parent
    pub fn next_sibling(&self) -> Option<EntryRef<'a>> {
        let tree: &'a TraceTree = self.tree;
        let siblings = match self.entry.parent {
            Some(parent) => tree.entries[parent.index()].child_ids(),
            None => tree.raw_top_level(),
        };
        siblings
            .get(self.entry.index_in_parent + 1)
            .map(|id| tree.entry_ref(*id))
    }

    /// Number of ancestors
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |entry| entry.parent()).count()
    }

    /// Pre-order walk of this entry's subtree, starting with the entry itself
    pub fn depth_first(&self) -> DepthFirstIter<'a> {
        DepthFirstIter::new(*self)
    }
}

impl<'a> Deref for EntryRef<'a> {
    type Target = TraceEntry;

    fn deref(&self) -> &Self::Target {
        self.entry
    }
}

impl PartialEq for EntryRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.entry, other.entry)
    }
}

impl Eq for EntryRef<'_> {}

impl fmt::Debug for EntryRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRef")
            .field("id", &self.entry.id)
            .field("kind", &self.entry.kind)
            .field("context", &self.entry.context)
            .finish()
    }
}
