//! The error produced by [`Set::validate`](crate::Set::validate).
//!
//! Nothing in normal operation returns an error: absent elements and traversal past either end
//! are ordinary results. A `Violation` only appears when the tree's shape invariants are broken,
//! which points at a comparator that is not a total order or an element whose ordering changed
//! while it was a member.

use core::fmt;

/// A broken B-tree invariant, located by the depth of the offending tree-node (root = 0).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Violation {
    /// The root exists but holds no elements.
    EmptyRoot,
    /// A node holds more than the maximum number of elements.
    Overfull { depth: usize, len: usize },
    /// A non-root node holds fewer than the minimum number of elements.
    Underfull { depth: usize, len: usize },
    /// An internal node whose child count is not its element count plus one.
    ChildCount { depth: usize, len: usize, children: usize },
    /// Elements within a node are not strictly ascending.
    Unsorted { depth: usize, index: usize },
    /// A separator does not lie strictly between its flanking subtrees.
    SeparatorOrder { depth: usize, index: usize },
    /// Leaves were found at different depths.
    UnevenLeaves { expected: usize, found: usize },
    /// A child's parent link does not point at the node that holds it.
    ParentLink { depth: usize, index: usize },
    /// An element's owner link does not point at the node that holds it.
    OwnerLink { depth: usize, index: usize },
    /// The cached size disagrees with the number of stored elements.
    LenMismatch { cached: usize, actual: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Violation::EmptyRoot => write!(f, "root node holds no elements"),
            Violation::Overfull { depth, len } => {
                write!(f, "node at depth {depth} holds {len} elements (maximum {})", crate::MAX_VALUES)
            }
            Violation::Underfull { depth, len } => {
                write!(f, "node at depth {depth} holds {len} elements (minimum {})", crate::MIN_VALUES)
            }
            Violation::ChildCount { depth, len, children } => {
                write!(f, "node at depth {depth} has {len} elements but {children} children")
            }
            Violation::Unsorted { depth, index } => {
                write!(f, "elements at depth {depth} are out of order at index {index}")
            }
            Violation::SeparatorOrder { depth, index } => {
                write!(f, "separator {index} at depth {depth} does not partition its subtrees")
            }
            Violation::UnevenLeaves { expected, found } => {
                write!(f, "leaf at depth {found}, expected all leaves at depth {expected}")
            }
            Violation::ParentLink { depth, index } => {
                write!(f, "child {index} of a node at depth {depth} has a stale parent link")
            }
            Violation::OwnerLink { depth, index } => {
                write!(f, "element {index} of a node at depth {depth} has a stale owner link")
            }
            Violation::LenMismatch { cached, actual } => {
                write!(f, "cached size {cached} but {actual} elements are stored")
            }
        }
    }
}

impl core::error::Error for Violation {}
