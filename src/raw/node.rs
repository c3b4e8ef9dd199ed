use smallvec::SmallVec;

use super::handle::Handle;

/// Minimum number of children of a non-root internal node.
pub const MIN_CHILDREN: usize = 3;
/// Maximum number of children of any node.
pub const MAX_CHILDREN: usize = 5;
/// Minimum number of elements held by a non-root node.
pub const MIN_VALUES: usize = MIN_CHILDREN - 1;
/// Maximum number of elements held by any node.
pub const MAX_VALUES: usize = MAX_CHILDREN - 1;

pub(crate) type NodeId<T> = Handle<TreeNode<T>>;
pub(crate) type EntryId<T> = Handle<Entry<T>>;

/// One stored element together with the tree-node that currently holds it.
///
/// Entries never move in their arena; when the engine shifts an element between tree-nodes only
/// `owner` is rewritten. That keeps [`EntryId`]s valid as cursor positions across rebalancing.
pub(crate) struct Entry<T> {
    pub(crate) value: T,
    pub(crate) owner: NodeId<T>,
    /// Distinguishes this element from earlier occupants of the same slot.
    pub(crate) stamp: u32,
}

/// A B-tree node: sorted entry handles, child handles and the parent link.
///
/// Both vectors carry one spare slot so a node can overflow by a single entry before it is
/// split.
pub(crate) struct TreeNode<T> {
    parent: Option<NodeId<T>>,
    entries: SmallVec<[EntryId<T>; MAX_VALUES + 1]>,
    children: SmallVec<[NodeId<T>; MAX_CHILDREN + 1]>,
}

/// Result of searching a node for an element.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// An equal element sits at the given index.
    Found(usize),
    /// No equal element; the index is where it would be inserted (and the child to descend into).
    NotFound(usize),
}

impl<T> TreeNode<T> {
    pub(crate) fn new(parent: Option<NodeId<T>>) -> Self {
        Self {
            parent,
            entries: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    pub(crate) fn parent(&self) -> Option<NodeId<T>> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId<T>>) {
        self.parent = parent;
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of elements held by this node.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn is_overfull(&self) -> bool {
        self.entries.len() > MAX_VALUES
    }

    pub(crate) fn is_underfull(&self) -> bool {
        self.entries.len() < MIN_VALUES
    }

    /// A sibling may give up one element without underflowing.
    pub(crate) fn can_lend(&self) -> bool {
        self.entries.len() > MIN_VALUES
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> EntryId<T> {
        self.entries[index]
    }

    pub(crate) fn first_entry(&self) -> Option<EntryId<T>> {
        self.entries.first().copied()
    }

    pub(crate) fn last_entry(&self) -> Option<EntryId<T>> {
        self.entries.last().copied()
    }

    pub(crate) fn entries(&self) -> impl DoubleEndedIterator<Item = EntryId<T>> + '_ {
        self.entries.iter().copied()
    }

    /// Index of `entry` within this node, if it is held here.
    pub(crate) fn entry_position(&self, entry: EntryId<T>) -> Option<usize> {
        self.entries.iter().position(|&e| e == entry)
    }

    pub(crate) fn insert_entry(&mut self, index: usize, entry: EntryId<T>) {
        self.entries.insert(index, entry);
    }

    pub(crate) fn push_entry(&mut self, entry: EntryId<T>) {
        self.entries.push(entry);
    }

    pub(crate) fn remove_entry(&mut self, index: usize) -> EntryId<T> {
        self.entries.remove(index)
    }

    pub(crate) fn pop_entry(&mut self) -> Option<EntryId<T>> {
        self.entries.pop()
    }

    /// Replaces the entry at `index`, returning the previous one.
    pub(crate) fn replace_entry(&mut self, index: usize, entry: EntryId<T>) -> EntryId<T> {
        core::mem::replace(&mut self.entries[index], entry)
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> NodeId<T> {
        self.children[index]
    }

    pub(crate) fn first_child(&self) -> Option<NodeId<T>> {
        self.children.first().copied()
    }

    pub(crate) fn last_child(&self) -> Option<NodeId<T>> {
        self.children.last().copied()
    }

    pub(crate) fn children(&self) -> &[NodeId<T>] {
        &self.children
    }

    /// Index of `child` among this node's children.
    pub(crate) fn child_position(&self, child: NodeId<T>) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    pub(crate) fn insert_child(&mut self, index: usize, child: NodeId<T>) {
        self.children.insert(index, child);
    }

    pub(crate) fn push_child(&mut self, child: NodeId<T>) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, index: usize) -> NodeId<T> {
        self.children.remove(index)
    }

    pub(crate) fn pop_child(&mut self) -> Option<NodeId<T>> {
        self.children.pop()
    }

    /// Searches this node's elements with `compare`, which orders a stored entry against the
    /// target (`Less` when the entry sorts first).
    #[inline]
    pub(crate) fn search<F>(&self, mut compare: F) -> SearchResult
    where
        F: FnMut(EntryId<T>) -> core::cmp::Ordering,
    {
        match self.entries.binary_search_by(|&e| compare(e)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Splits an overfull node around its median.
    ///
    /// `self` keeps the lower half; the returned node takes the upper half of the entries (and of
    /// the children, for internal nodes) and shares `self`'s parent. Both halves end up with
    /// `len / 2` elements. The caller must re-point the moved entries' owners and the moved
    /// children's parents at the new node once it has a handle.
    pub(crate) fn split(&mut self) -> (EntryId<T>, TreeNode<T>) {
        let half = self.entries.len() / 2;

        let mut right = TreeNode::new(self.parent);
        right.entries = self.entries.drain(half + 1..).collect();
        if !self.is_leaf() {
            right.children = self.children.drain(half + 1..).collect();
        }

        let median = self.entries.pop().expect("`TreeNode::split()` - node is empty!");
        (median, right)
    }

    /// Appends a separator followed by every entry and child of `right`.
    pub(crate) fn absorb(&mut self, separator: EntryId<T>, mut right: TreeNode<T>) {
        self.entries.push(separator);
        self.entries.append(&mut right.entries);
        self.children.append(&mut right.children);
    }

    /// Empties the node, handing back its children and entries (for teardown).
    pub(crate) fn into_parts(self) -> (SmallVec<[NodeId<T>; MAX_CHILDREN + 1]>, SmallVec<[EntryId<T>; MAX_VALUES + 1]>) {
        (self.children, self.entries)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn entry(index: usize) -> EntryId<i32> {
        Handle::from_index(index)
    }

    fn node(index: usize) -> NodeId<i32> {
        Handle::from_index(index)
    }

    fn entry_indices(n: &TreeNode<i32>) -> Vec<usize> {
        n.entries().map(Handle::to_index).collect()
    }

    #[test]
    fn capacity_constants() {
        assert_eq!(MIN_VALUES, 2);
        assert_eq!(MAX_VALUES, 4);
    }

    #[test]
    fn insert_and_remove_shift_entries() {
        let mut n: TreeNode<i32> = TreeNode::new(None);
        n.push_entry(entry(10));
        n.push_entry(entry(30));
        n.insert_entry(1, entry(20));
        n.insert_entry(0, entry(5));
        assert_eq!(entry_indices(&n), [5, 10, 20, 30]);

        assert_eq!(n.remove_entry(1).to_index(), 10);
        assert_eq!(entry_indices(&n), [5, 20, 30]);
        assert_eq!(n.entry_position(entry(30)), Some(2));
        assert_eq!(n.entry_position(entry(10)), None);
        assert!(n.is_leaf());
        assert!(n.is_root());
    }

    #[test]
    fn search_reports_insertion_point() {
        let mut n: TreeNode<i32> = TreeNode::new(None);
        for i in [2, 4, 6] {
            n.push_entry(entry(i));
        }
        let probe = |target: usize| n.search(|e| e.to_index().cmp(&target));
        assert_eq!(probe(4), SearchResult::Found(1));
        assert_eq!(probe(1), SearchResult::NotFound(0));
        assert_eq!(probe(5), SearchResult::NotFound(2));
        assert_eq!(probe(9), SearchResult::NotFound(3));
    }

    #[test]
    fn split_leaf_promotes_median() {
        let mut n: TreeNode<i32> = TreeNode::new(Some(node(99)));
        for i in 1..=5 {
            n.push_entry(entry(i));
        }
        assert!(n.is_overfull());

        let (median, right) = n.split();
        assert_eq!(median.to_index(), 3);
        assert_eq!(entry_indices(&n), [1, 2]);
        assert_eq!(entry_indices(&right), [4, 5]);
        assert_eq!(right.parent(), Some(node(99)));
        assert!(right.is_leaf());
    }

    #[test]
    fn split_internal_moves_upper_children() {
        let mut n: TreeNode<i32> = TreeNode::new(None);
        for i in 1..=5 {
            n.push_entry(entry(i));
        }
        for c in 10..16 {
            n.push_child(node(c));
        }

        let (_, right) = n.split();
        assert_eq!(n.children(), [node(10), node(11), node(12)]);
        assert_eq!(right.children(), [node(13), node(14), node(15)]);
        assert_eq!(n.child_count(), n.len() + 1);
        assert_eq!(right.child_count(), right.len() + 1);
    }

    #[test]
    fn absorb_concatenates_around_separator() {
        let mut left: TreeNode<i32> = TreeNode::new(None);
        left.push_entry(entry(1));
        left.push_child(node(10));
        left.push_child(node(11));

        let mut right: TreeNode<i32> = TreeNode::new(None);
        right.push_entry(entry(3));
        right.push_child(node(12));
        right.push_child(node(13));

        left.absorb(entry(2), right);
        assert_eq!(entry_indices(&left), [1, 2, 3]);
        assert_eq!(left.children(), [node(10), node(11), node(12), node(13)]);
        assert_eq!(left.child_position(node(12)), Some(2));
    }
}
