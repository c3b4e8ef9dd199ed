use core::cmp::Ordering;

use super::node::{EntryId, MAX_VALUES, MIN_VALUES, NodeId};
use super::raw_set::RawSet;
use crate::compare::Comparator;
use crate::error::Violation;

/// Extremes of a checked subtree, used to verify the separators above it.
struct Span<T> {
    min: EntryId<T>,
    max: EntryId<T>,
    count: usize,
}

impl<T> RawSet<T> {
    /// Checks every B-tree invariant and that `cached_len` matches the stored elements.
    ///
    /// Reports the first violation found in a depth-first walk.
    pub(crate) fn validate<C>(&self, compare: &C, cached_len: usize) -> Result<(), Violation>
    where
        C: Comparator<T> + ?Sized,
    {
        let Some(root) = self.root() else {
            return check_len(cached_len, self.len());
        };

        let node = self.node(root);
        if !node.is_root() {
            return Err(Violation::ParentLink { depth: 0, index: 0 });
        }
        if node.is_empty() {
            return Err(Violation::EmptyRoot);
        }

        let mut leaf_depth = None;
        let span = self.check_node(root, 0, &mut leaf_depth, compare)?;

        check_len(cached_len, span.count)?;
        // Entries unreachable from the root would still be counted by the arena.
        check_len(self.len(), span.count)
    }

    fn check_node<C>(
        &self,
        handle: NodeId<T>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        compare: &C,
    ) -> Result<Span<T>, Violation>
    where
        C: Comparator<T> + ?Sized,
    {
        let node = self.node(handle);
        let len = node.len();

        if len > MAX_VALUES {
            return Err(Violation::Overfull { depth, len });
        }
        if depth > 0 && len < MIN_VALUES {
            return Err(Violation::Underfull { depth, len });
        }

        for (index, entry) in node.entries().enumerate() {
            if self.owner(entry) != handle {
                return Err(Violation::OwnerLink { depth, index });
            }
        }
        for index in 1..len {
            if self.order(node.entry(index - 1), node.entry(index), compare) != Ordering::Less {
                return Err(Violation::Unsorted { depth, index });
            }
        }

        if node.is_leaf() {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(Violation::UnevenLeaves { expected, found: depth });
                }
                Some(_) => {}
            }
            return Ok(Span {
                min: node.entry(0),
                max: node.entry(len - 1),
                count: len,
            });
        }

        if node.child_count() != len + 1 {
            return Err(Violation::ChildCount {
                depth,
                len,
                children: node.child_count(),
            });
        }

        let mut count = len;
        let mut min = None;
        let mut max = None;
        for (index, &child) in node.children().iter().enumerate() {
            if self.node(child).parent() != Some(handle) {
                return Err(Violation::ParentLink { depth, index });
            }

            let span = self.check_node(child, depth + 1, leaf_depth, compare)?;
            // Child `index` lies strictly between separators `index - 1` and `index`.
            if index > 0 && self.order(node.entry(index - 1), span.min, compare) != Ordering::Less {
                return Err(Violation::SeparatorOrder { depth, index: index - 1 });
            }
            if index < len && self.order(span.max, node.entry(index), compare) != Ordering::Less {
                return Err(Violation::SeparatorOrder { depth, index });
            }

            count += span.count;
            if index == 0 {
                min = Some(span.min);
            }
            max = Some(span.max);
        }

        Ok(Span {
            min: min.unwrap_or_else(|| node.entry(0)),
            max: max.unwrap_or_else(|| node.entry(len - 1)),
            count,
        })
    }

    fn order<C>(&self, a: EntryId<T>, b: EntryId<T>, compare: &C) -> Ordering
    where
        C: Comparator<T> + ?Sized,
    {
        compare.compare(self.value(a), self.value(b))
    }
}

fn check_len(cached: usize, actual: usize) -> Result<(), Violation> {
    if cached == actual {
        Ok(())
    } else {
        Err(Violation::LenMismatch { cached, actual })
    }
}
