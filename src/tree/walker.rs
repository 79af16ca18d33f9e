//! Visitor-style walks that thread state from parents down to children.

use super::entry::EntryRef;

/// Callback invoked for every parent/child edge of a walk
pub trait EntryVisitor {
    /// Value derived for a node and handed to each of its children
    type State;

    fn visit(
        &mut self,
        parent_state: &Self::State,
        parent: EntryRef<'_>,
        child: EntryRef<'_>,
    ) -> Self::State;
}

/// Walk `root`'s subtree in pre-order, calling `visitor` for every edge
///
/// `initial` is the state of `root` itself. Uses a worklist rather than
/// recursion so deep instantiation chains cannot overflow the stack. Only
/// the states along the current root-to-node path are kept alive.
pub fn walk_tree<V: EntryVisitor>(root: EntryRef<'_>, initial: V::State, visitor: &mut V) {
    // path[d] is the state of the most recently visited node at depth d
    let mut path: Vec<V::State> = vec![initial];
    let mut pending: Vec<(EntryRef<'_>, usize, EntryRef<'_>)> =
        root.children().rev().map(|child| (root, 0, child)).collect();

    while let Some((parent, parent_depth, child)) = pending.pop() {
        path.truncate(parent_depth + 1);
        let state = visitor.visit(&path[parent_depth], parent, child);
        path.push(state);
        pending.extend(
            child
                .children()
                .rev()
                .map(|grandchild| (child, parent_depth + 1, grandchild)),
        );
    }
}
