use core::mem;
use core::sync::atomic::{AtomicU32, Ordering};

use smallvec::SmallVec;

use super::arena::Arena;
use super::node::{Entry, EntryId, MAX_CHILDREN, MIN_VALUES, NodeId, SearchResult, TreeNode};
use crate::compare::Comparator;
use crate::tracing_helpers::{debug_log, trace_log};

/// The B-tree engine behind [`Set`](crate::Set).
///
/// Tree-nodes and entries live in two arenas. Tree-nodes refer to each other and to their entries
/// by handle, entries point back at their owning tree-node, and only `root` anchors the
/// structure. The comparator is owned by the facade and passed into every operation that needs
/// to order elements.
pub(crate) struct RawSet<T> {
    /// Arena storing all tree-nodes.
    nodes: Arena<TreeNode<T>>,
    /// Arena storing every element with its owner link.
    entries: Arena<Entry<T>>,
    /// Handle to the root tree-node, if the set is non-empty.
    root: Option<NodeId<T>>,
    /// Identity of this tree, distinct from every other tree in the process.
    id: u32,
    /// Stamp for the next allocated entry. A recycled entry slot never repeats a stamp.
    next_stamp: u32,
}

/// Source of tree identities. Zero is never handed out.
static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(1);

fn next_tree_id() -> u32 {
    NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Result of an insertion.
pub(crate) enum InsertResult<T> {
    /// A new element was stored.
    Inserted,
    /// An equal element was already present; its value was overwritten in place and the old one
    /// handed back.
    Replaced(T),
}

impl<T> RawSet<T> {
    /// Creates a new, empty tree.
    pub(crate) fn new() -> Self {
        Self {
            nodes: Arena::new(),
            entries: Arena::new(),
            root: None,
            id: next_tree_id(),
            next_stamp: 0,
        }
    }

    /// Creates a new tree with room for `capacity` elements before either arena reallocates.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            // Every non-root node holds at least `MIN_VALUES` elements.
            nodes: Arena::with_capacity(capacity.div_ceil(MIN_VALUES)),
            entries: Arena::with_capacity(capacity),
            root: None,
            id: next_tree_id(),
            next_stamp: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Number of stored elements, counted by the entry arena.
    pub(crate) const fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn root(&self) -> Option<NodeId<T>> {
        self.root
    }

    pub(crate) fn node(&self, handle: NodeId<T>) -> &TreeNode<T> {
        self.nodes.get(handle)
    }

    pub(crate) fn value(&self, entry: EntryId<T>) -> &T {
        &self.entries.get(entry).value
    }

    pub(crate) fn owner(&self, entry: EntryId<T>) -> NodeId<T> {
        self.entries.get(entry).owner
    }

    pub(crate) const fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn stamp(&self, entry: EntryId<T>) -> u32 {
        self.entries.get(entry).stamp
    }

    /// Returns `true` if `entry` is a live element of this tree and still carries `stamp`.
    pub(crate) fn holds(&self, entry: EntryId<T>, stamp: u32) -> bool {
        self.entries.contains(entry) && self.entries.get(entry).stamp == stamp
    }

    fn alloc_entry(&mut self, value: T, owner: NodeId<T>) -> EntryId<T> {
        let stamp = self.next_stamp;
        self.next_stamp = stamp.wrapping_add(1);
        self.entries.alloc(Entry { value, owner, stamp })
    }

    /// Number of levels, 0 for an empty tree.
    pub(crate) fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.root;
        while let Some(node) = current {
            depth += 1;
            current = self.nodes.get(node).first_child();
        }
        depth
    }

    /// Finds the tree-node holding `entry` and its index there.
    fn locate(&self, entry: EntryId<T>) -> (NodeId<T>, usize) {
        let owner = self.entries.get(entry).owner;
        let index = self
            .nodes
            .get(owner)
            .entry_position(entry)
            .expect("`RawSet::locate()` - entry is missing from its owner!");
        (owner, index)
    }

    /// Index of `child` in its parent's child list.
    fn child_index(&self, parent: NodeId<T>, child: NodeId<T>) -> usize {
        self.nodes
            .get(parent)
            .child_position(child)
            .expect("`RawSet::child_index()` - child is missing from its parent!")
    }

    /// Re-points the owner of every entry and the parent of every child of `node` at `node`.
    fn adopt(&mut self, node: NodeId<T>) {
        let n = self.nodes.get(node);
        for entry in n.entries() {
            self.entries.get_mut(entry).owner = node;
        }

        let children: SmallVec<[NodeId<T>; MAX_CHILDREN + 1]> = SmallVec::from_slice(n.children());
        for child in children {
            self.nodes.get_mut(child).set_parent(Some(node));
        }
    }

    // ─── Traversal ───────────────────────────────────────────────────────────

    /// Smallest entry of the subtree rooted at `node`.
    fn min_entry(&self, mut node: NodeId<T>) -> EntryId<T> {
        while let Some(child) = self.nodes.get(node).first_child() {
            node = child;
        }
        self.nodes.get(node).first_entry().expect("`RawSet::min_entry()` - empty node!")
    }

    /// Largest entry of the subtree rooted at `node`.
    fn max_entry(&self, mut node: NodeId<T>) -> EntryId<T> {
        while let Some(child) = self.nodes.get(node).last_child() {
            node = child;
        }
        self.nodes.get(node).last_entry().expect("`RawSet::max_entry()` - empty node!")
    }

    pub(crate) fn first(&self) -> Option<EntryId<T>> {
        self.root.map(|root| self.min_entry(root))
    }

    pub(crate) fn last(&self) -> Option<EntryId<T>> {
        self.root.map(|root| self.max_entry(root))
    }

    /// The entry that follows `entry` in order, or `None` if `entry` is the largest.
    pub(crate) fn successor(&self, entry: EntryId<T>) -> Option<EntryId<T>> {
        let (owner, index) = self.locate(entry);
        let node = self.nodes.get(owner);

        if !node.is_leaf() {
            return Some(self.min_entry(node.child(index + 1)));
        }
        if index + 1 < node.len() {
            return Some(node.entry(index + 1));
        }

        // Last in its leaf: the answer is the separator right of the first ancestor reached
        // from a child that is not its parent's last.
        let mut child = owner;
        while let Some(parent) = self.nodes.get(child).parent() {
            let position = self.child_index(parent, child);
            let p = self.nodes.get(parent);
            if position < p.len() {
                return Some(p.entry(position));
            }
            child = parent;
        }
        None
    }

    /// The entry that precedes `entry` in order, or `None` if `entry` is the smallest.
    pub(crate) fn predecessor(&self, entry: EntryId<T>) -> Option<EntryId<T>> {
        let (owner, index) = self.locate(entry);
        let node = self.nodes.get(owner);

        if !node.is_leaf() {
            return Some(self.max_entry(node.child(index)));
        }
        if index > 0 {
            return Some(node.entry(index - 1));
        }

        let mut child = owner;
        while let Some(parent) = self.nodes.get(child).parent() {
            let position = self.child_index(parent, child);
            if position > 0 {
                return Some(self.nodes.get(parent).entry(position - 1));
            }
            child = parent;
        }
        None
    }

    /// Calls `f` on every element in ascending order.
    pub(crate) fn visit<F: FnMut(&T)>(&self, f: &mut F) {
        if let Some(root) = self.root {
            self.visit_node(root, f);
        }
    }

    fn visit_node<F: FnMut(&T)>(&self, node: NodeId<T>, f: &mut F) {
        let n = self.nodes.get(node);
        for (i, entry) in n.entries().enumerate() {
            if !n.is_leaf() {
                self.visit_node(n.child(i), f);
            }
            f(&self.entries.get(entry).value);
        }
        if let Some(last) = n.last_child() {
            self.visit_node(last, f);
        }
    }

    // ─── Teardown ────────────────────────────────────────────────────────────

    /// Frees the whole tree post-order (children before their parent), handing every element to
    /// `release`.
    pub(crate) fn teardown<F: FnMut(T)>(&mut self, mut release: F) {
        if let Some(root) = self.root.take() {
            trace_log!(elements = self.entries.len(), nodes = self.nodes.len(), "teardown");
            self.teardown_node(root, &mut release);
        }
        self.nodes.clear();
        self.entries.clear();
    }

    fn teardown_node<F: FnMut(T)>(&mut self, node: NodeId<T>, release: &mut F) {
        let (children, entries) = self.nodes.take(node).into_parts();
        for child in children {
            self.teardown_node(child, release);
        }
        for entry in entries {
            release(self.entries.take(entry).value);
        }
    }

    // ─── Removal ─────────────────────────────────────────────────────────────

    /// Removes `entry` from the tree and returns its element.
    ///
    /// A leaf element is deleted in place. An internal element is a separator: it is replaced by
    /// the largest element of its left subtree, which is taken out of its leaf instead. Either
    /// way the leaf that lost an element is repaired upward, and an emptied root is collapsed.
    pub(crate) fn remove_entry(&mut self, entry: EntryId<T>) -> T {
        let (node, index) = self.locate(entry);
        let n = self.nodes.get(node);

        let shrunk = if n.is_leaf() {
            self.nodes.get_mut(node).remove_entry(index);
            node
        } else {
            let replacement = self.max_entry(n.child(index));
            let leaf = self.entries.get(replacement).owner;
            self.nodes.get_mut(leaf).pop_entry();
            self.nodes.get_mut(node).replace_entry(index, replacement);
            self.entries.get_mut(replacement).owner = node;
            leaf
        };

        self.repair_underflow(shrunk);
        self.collapse_root();
        self.entries.take(entry).value
    }

    /// Restores minimum occupancy from `node` upward.
    fn repair_underflow(&mut self, mut node: NodeId<T>) {
        loop {
            let n = self.nodes.get(node);
            let Some(parent) = n.parent() else {
                return;
            };
            if !n.is_underfull() {
                return;
            }

            let position = self.child_index(parent, node);
            let p = self.nodes.get(parent);
            let left = position.checked_sub(1).map(|i| p.child(i));
            let right = (position < p.len()).then(|| p.child(position + 1));

            if right.is_some_and(|r| self.nodes.get(r).can_lend()) {
                self.rotate_from_right(parent, position);
                return;
            }
            if left.is_some_and(|l| self.nodes.get(l).can_lend()) {
                self.rotate_from_left(parent, position);
                return;
            }

            if left.is_some() {
                self.merge(parent, position - 1);
            } else {
                self.merge(parent, position);
            }
            // The parent lost a separator and may now be short itself.
            node = parent;
        }
    }

    /// Moves the separator right of child `position` down into that child and lifts the right
    /// sibling's smallest element into its place, carrying the sibling's first child across.
    fn rotate_from_right(&mut self, parent: NodeId<T>, position: usize) {
        let p = self.nodes.get(parent);
        let node = p.child(position);
        let sibling = p.child(position + 1);
        let separator = p.entry(position);

        let s = self.nodes.get_mut(sibling);
        let lifted = s.remove_entry(0);
        let moved_child = (!s.is_leaf()).then(|| s.remove_child(0));

        self.nodes.get_mut(parent).replace_entry(position, lifted);
        self.entries.get_mut(lifted).owner = parent;

        let n = self.nodes.get_mut(node);
        n.push_entry(separator);
        if let Some(child) = moved_child {
            n.push_child(child);
            self.nodes.get_mut(child).set_parent(Some(node));
        }
        self.entries.get_mut(separator).owner = node;

        trace_log!(parent = ?parent, node = ?node, sibling = ?sibling, "rotated from right sibling");
    }

    /// Mirror of [`rotate_from_right`](Self::rotate_from_right) using the left sibling's largest
    /// element and last child.
    fn rotate_from_left(&mut self, parent: NodeId<T>, position: usize) {
        let p = self.nodes.get(parent);
        let node = p.child(position);
        let sibling = p.child(position - 1);
        let separator = p.entry(position - 1);

        let s = self.nodes.get_mut(sibling);
        let lifted = s.pop_entry().expect("`RawSet::rotate_from_left()` - sibling is empty!");
        let moved_child = s.pop_child();

        self.nodes.get_mut(parent).replace_entry(position - 1, lifted);
        self.entries.get_mut(lifted).owner = parent;

        let n = self.nodes.get_mut(node);
        n.insert_entry(0, separator);
        if let Some(child) = moved_child {
            n.insert_child(0, child);
            self.nodes.get_mut(child).set_parent(Some(node));
        }
        self.entries.get_mut(separator).owner = node;

        trace_log!(parent = ?parent, node = ?node, sibling = ?sibling, "rotated from left sibling");
    }

    /// Merges child `separator + 1` of `parent` into child `separator`, pulling the separator
    /// element down between them. The right child is freed.
    fn merge(&mut self, parent: NodeId<T>, separator: usize) {
        let p = self.nodes.get_mut(parent);
        let middle = p.remove_entry(separator);
        let victim = p.remove_child(separator + 1);
        let survivor = p.child(separator);

        let victim_node = self.nodes.take(victim);
        self.nodes.get_mut(survivor).absorb(middle, victim_node);
        self.adopt(survivor);

        trace_log!(parent = ?parent, survivor = ?survivor, victim = ?victim, "merged siblings");
    }

    /// Drops an empty root, promoting its only child (if any).
    fn collapse_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let r = self.nodes.get(root);
        if !r.is_empty() {
            return;
        }

        let child = r.first_child();
        self.nodes.free(root);
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(None);
        }
        self.root = child;

        debug_log!(old_root = ?root, new_root = ?child, "tree shrank a level");
    }
}

impl<T> RawSet<T> {
    /// Descends from the root to the tree-node where `value` resides or would be inserted.
    ///
    /// Returns `None` only for an empty tree. A `NotFound` result always names a leaf.
    pub(crate) fn search<C>(&self, value: &T, compare: &C) -> Option<(NodeId<T>, SearchResult)>
    where
        C: Comparator<T> + ?Sized,
    {
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            let result = node.search(|entry| compare.compare(&self.entries.get(entry).value, value));
            match result {
                SearchResult::NotFound(child) if !node.is_leaf() => current = node.child(child),
                _ => return Some((current, result)),
            }
        }
    }

    /// Returns the entry holding an element equal to `value`.
    pub(crate) fn find<C>(&self, value: &T, compare: &C) -> Option<EntryId<T>>
    where
        C: Comparator<T> + ?Sized,
    {
        match self.search(value, compare)? {
            (node, SearchResult::Found(index)) => Some(self.nodes.get(node).entry(index)),
            (_, SearchResult::NotFound(_)) => None,
        }
    }

    /// Inserts `value`, or overwrites the equal element already present.
    pub(crate) fn insert<C>(&mut self, value: T, compare: &C) -> InsertResult<T>
    where
        C: Comparator<T> + ?Sized,
    {
        let Some((node, result)) = self.search(&value, compare) else {
            let leaf = self.nodes.alloc(TreeNode::new(None));
            let entry = self.alloc_entry(value, leaf);
            self.nodes.get_mut(leaf).push_entry(entry);
            self.root = Some(leaf);
            debug_log!(root = ?leaf, "created root");
            return InsertResult::Inserted;
        };

        match result {
            SearchResult::Found(index) => {
                let entry = self.nodes.get(node).entry(index);
                let old = mem::replace(&mut self.entries.get_mut(entry).value, value);
                InsertResult::Replaced(old)
            }
            SearchResult::NotFound(index) => {
                let entry = self.alloc_entry(value, node);
                self.nodes.get_mut(node).insert_entry(index, entry);
                self.split_upward(node);
                InsertResult::Inserted
            }
        }
    }

    /// Splits `node` while it is overfull, promoting medians until an ancestor has room or a new
    /// root is created.
    fn split_upward(&mut self, mut node: NodeId<T>) {
        while self.nodes.get(node).is_overfull() {
            let (median, right) = self.nodes.get_mut(node).split();
            let parent = right.parent();
            let right = self.nodes.alloc(right);
            self.adopt(right);

            trace_log!(node = ?node, right = ?right, "split node");

            let Some(parent) = parent else {
                let mut root = TreeNode::new(None);
                root.push_entry(median);
                root.push_child(node);
                root.push_child(right);
                let root = self.nodes.alloc(root);
                self.adopt(root);
                self.root = Some(root);

                debug_log!(root = ?root, depth = self.depth(), "tree grew a level");
                return;
            };

            let position = self.child_index(parent, node);
            let p = self.nodes.get_mut(parent);
            p.insert_entry(position, median);
            p.insert_child(position + 1, right);
            self.entries.get_mut(median).owner = parent;

            node = parent;
        }
    }

    /// Removes the element equal to `value`, if any.
    pub(crate) fn remove<C>(&mut self, value: &T, compare: &C) -> Option<T>
    where
        C: Comparator<T> + ?Sized,
    {
        let entry = self.find(value, compare)?;
        Some(self.remove_entry(entry))
    }
}
