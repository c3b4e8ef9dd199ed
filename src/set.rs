use alloc::boxed::Box;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::Violation;
use crate::raw::{EntryId, InsertResult, RawSet};

mod capacity;

/// Cleanup callback applied to elements the set releases: a value displaced by an equal insert,
/// a removed member, or every member at teardown.
///
/// The callback is owned by the set, so it must be `'static` and cannot borrow local state.
/// `Send` keeps the set itself `Send`. To collect released elements somewhere the caller can
/// read, share the destination through an `Arc`:
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use cmpset::{NaturalOrder, Set};
///
/// let released = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&released);
///
/// let mut set = Set::with_destroy(NaturalOrder, move |v: i32| sink.lock().unwrap().push(v));
/// set.extend([1, 2, 3]);
/// set.remove(&2);
/// drop(set);
///
/// let mut released = released.lock().unwrap().clone();
/// released.sort_unstable();
/// assert_eq!(released, [1, 2, 3]);
/// ```
pub type DestroyFn<T> = Box<dyn FnMut(T) + Send>;

/// An ordered set of unique elements backed by a B-tree, ordered by a caller-supplied
/// [`Comparator`].
///
/// Two elements that compare `Equal` are the same member: inserting one while the other is
/// present overwrites the stored element. An optional destructor receives every element the set
/// lets go of, so resources tied to elements can be released at the right time.
///
/// It is a logic error for an element to be modified in such a way that its ordering relative to
/// any other element changes while it is in the set, or for the comparator to not be a total
/// order. The behavior resulting from such a logic error is not specified, but will be
/// encapsulated to the `Set` that observed it and not result in undefined behavior. This could
/// include panics, incorrect results, and memory leaks. [`Set::validate`] detects the damage.
///
/// # Examples
///
/// ```
/// use cmpset::{Position, Set};
///
/// let mut names = Set::new(|a: &&str, b: &&str| a.to_lowercase().cmp(&b.to_lowercase()));
/// names.insert("walrus");
/// names.insert("Aardvark");
/// names.insert("moose");
///
/// assert!(names.contains(&"MOOSE"));
///
/// // Walk the set with a cursor.
/// let mut pos = names.first();
/// while let Position::At(node) = pos {
///     println!("{}", names.node_value(pos));
///     pos = names.next(Position::At(node));
/// }
///
/// // Or with an iterator.
/// assert_eq!(names.iter().copied().collect::<Vec<_>>(), ["Aardvark", "moose", "walrus"]);
/// ```
///
/// A destructor sees every element the set releases:
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use cmpset::{NaturalOrder, Set};
///
/// let released = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&released);
///
/// let mut set = Set::with_destroy(NaturalOrder, move |_: u32| {
///     counter.fetch_add(1, Ordering::Relaxed);
/// });
/// set.extend([1, 2, 3]);
/// set.insert(2); // displaces the stored 2
/// set.remove(&1);
/// assert_eq!(released.load(Ordering::Relaxed), 2);
///
/// set.destroy();
/// assert_eq!(released.load(Ordering::Relaxed), 4);
/// ```
pub struct Set<T, C = NaturalOrder> {
    raw: RawSet<T>,
    len: usize,
    compare: C,
    destroy: Option<DestroyFn<T>>,
}

/// An opaque reference to one member of a [`Set`].
///
/// A `SetNode` stays valid while its element remains in the set, however the tree rebalances
/// around it. Using it after the element was removed, or with a different set, panics; this
/// holds even when a later insert has reused the removed element's storage.
pub struct SetNode<T> {
    entry: EntryId<T>,
    /// Identity of the set that issued this node.
    set: u32,
    /// Stamp of the element at the time the node was issued.
    stamp: u32,
}

/// A cursor into a [`Set`]: a member, or one of the two boundaries around the members.
///
/// # Examples
///
/// ```
/// use cmpset::{Position, Set};
///
/// let set = Set::from([10, 20]);
///
/// let first = set.first();
/// assert_eq!(set.get(first), Some(&10));
/// assert_eq!(set.previous(first), Position::BeforeFirst);
///
/// let last = set.next(first);
/// assert_eq!(set.get(last), Some(&20));
/// assert_eq!(set.next(last), Position::AfterLast);
/// ```
pub enum Position<T> {
    /// Before the smallest member. Stepping forward reaches [`Set::first`].
    BeforeFirst,
    /// A member of the set.
    At(SetNode<T>),
    /// After the largest member. Stepping backward reaches [`Set::last`].
    AfterLast,
}

impl<T> Position<T> {
    /// Returns `true` for [`Position::BeforeFirst`] and [`Position::AfterLast`].
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        !matches!(self, Position::At(_))
    }

    /// The member this position refers to, if any.
    #[must_use]
    pub const fn node(&self) -> Option<SetNode<T>> {
        match *self {
            Position::At(node) => Some(node),
            Position::BeforeFirst | Position::AfterLast => None,
        }
    }
}

impl<T, C> Set<T, C> {
    /// Makes a new, empty `Set` ordered by `compare`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::{NaturalOrder, Set};
    ///
    /// let set: Set<i32> = Set::new(NaturalOrder);
    /// assert!(set.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn new(compare: C) -> Self {
        Set {
            raw: RawSet::new(),
            len: 0,
            compare,
            destroy: None,
        }
    }

    /// Makes a new, empty `Set` ordered by `compare` that hands every released element to
    /// `destroy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::{NaturalOrder, Set};
    ///
    /// let set = Set::with_destroy(NaturalOrder, |v: String| println!("releasing {v}"));
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub fn with_destroy<F>(compare: C, destroy: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Set {
            raw: RawSet::new(),
            len: 0,
            compare,
            destroy: Some(Box::new(destroy)),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut a = Set::from([1]);
    /// assert_eq!(a.len(), 1);
    /// a.insert(2);
    /// assert_eq!(a.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[doc(alias = "size")]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The comparator that orders this set.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.compare
    }

    /// Number of tree levels; 0 when empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.raw.depth()
    }

    /// Replaces the destructor, returning the previous one. `None` disables it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::{DestroyFn, NaturalOrder, Set};
    ///
    /// let mut set = Set::with_destroy(NaturalOrder, |_: i32| {});
    /// let previous = set.set_destroy_value(None);
    /// assert!(previous.is_some());
    ///
    /// let logger: DestroyFn<i32> = Box::new(|v| println!("dropping {v}"));
    /// assert!(set.set_destroy_value(Some(logger)).is_none());
    /// ```
    pub fn set_destroy_value(&mut self, destroy: Option<DestroyFn<T>>) -> Option<DestroyFn<T>> {
        core::mem::replace(&mut self.destroy, destroy)
    }

    /// Hands `value` to the destructor, or drops it if there is none.
    fn release(&mut self, value: T) {
        match self.destroy.as_mut() {
            Some(destroy) => destroy(value),
            None => drop(value),
        }
    }

    /// Resolves a cursor to its entry, panicking on a boundary or a dead element.
    fn entry(&self, position: Position<T>, caller: &str) -> EntryId<T> {
        let Position::At(node) = position else {
            panic!("`Set::{caller}()` - `position` is a boundary!");
        };
        self.check(node, caller)
    }

    /// Panics unless `node` was issued by this set for an element it still holds.
    fn check(&self, node: SetNode<T>, caller: &str) -> EntryId<T> {
        assert!(
            node.set == self.raw.id() && self.raw.holds(node.entry, node.stamp),
            "`Set::{caller}()` - `position` does not refer to a member of this set!"
        );
        node.entry
    }

    fn at(&self, entry: EntryId<T>) -> Position<T> {
        Position::At(SetNode {
            entry,
            set: self.raw.id(),
            stamp: self.raw.stamp(entry),
        })
    }

    /// Returns a cursor at the smallest element, or [`Position::AfterLast`] if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::{NaturalOrder, Position, Set};
    ///
    /// let mut set: Set<i32> = Set::new(NaturalOrder);
    /// assert_eq!(set.first(), Position::AfterLast);
    /// set.extend([3, 1, 2]);
    /// assert_eq!(set.node_value(set.first()), &1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Position<T> {
        self.raw
            .first()
            .map_or(Position::AfterLast, |entry| self.at(entry))
    }

    /// Returns a cursor at the largest element, or [`Position::BeforeFirst`] if the set is
    /// empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Position<T> {
        self.raw
            .last()
            .map_or(Position::BeforeFirst, |entry| self.at(entry))
    }

    /// Steps a cursor forward.
    ///
    /// From a member this is its in-order successor, or [`Position::AfterLast`] past the largest
    /// element. [`Position::BeforeFirst`] steps to [`first`](Set::first), and
    /// [`Position::AfterLast`] stays put.
    ///
    /// # Panics
    ///
    /// Panics if `position` names an element that is no longer in the set, or comes from
    /// another set.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) across a full traversal.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self, position: Position<T>) -> Position<T> {
        match position {
            Position::BeforeFirst => self.first(),
            Position::AfterLast => Position::AfterLast,
            Position::At(node) => {
                let entry = self.check(node, "next");
                self.raw
                    .successor(entry)
                    .map_or(Position::AfterLast, |next| self.at(next))
            }
        }
    }

    /// Steps a cursor backward; the mirror image of [`next`](Set::next).
    ///
    /// # Panics
    ///
    /// Panics if `position` names an element that is no longer in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let set = Set::from([1, 2, 3]);
    /// let mut pos = set.last();
    /// let mut seen = Vec::new();
    /// while let Some(v) = set.get(pos) {
    ///     seen.push(*v);
    ///     pos = set.previous(pos);
    /// }
    /// assert_eq!(seen, [3, 2, 1]);
    /// ```
    #[must_use]
    pub fn previous(&self, position: Position<T>) -> Position<T> {
        match position {
            Position::AfterLast => self.last(),
            Position::BeforeFirst => Position::BeforeFirst,
            Position::At(node) => {
                let entry = self.check(node, "previous");
                self.raw
                    .predecessor(entry)
                    .map_or(Position::BeforeFirst, |prev| self.at(prev))
            }
        }
    }

    /// Returns the element at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is a boundary, names an element that is no longer in the set, or
    /// comes from another set.
    /// Use [`get`](Set::get) to treat boundaries as `None`.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn node_value(&self, position: Position<T>) -> &T {
        let entry = self.entry(position, "node_value");
        self.raw.value(entry)
    }

    /// Returns the element at `position`, or `None` for a boundary.
    ///
    /// # Panics
    ///
    /// Panics if `position` names an element that is no longer in the set.
    #[must_use]
    pub fn get(&self, position: Position<T>) -> Option<&T> {
        let entry = self.check(position.node()?, "get");
        Some(self.raw.value(entry))
    }

    /// Removes the element at `position`, handing it to the destructor.
    ///
    /// Returns `false` for a boundary. Cursors to other elements stay valid.
    ///
    /// # Panics
    ///
    /// Panics if `position` names an element that is no longer in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut set = Set::from([1, 2, 3, 4]);
    /// let three = set.find_node(&3);
    /// let two = set.previous(three);
    ///
    /// assert!(set.remove_node(two));
    /// assert_eq!(set.previous(three), set.first());
    /// assert!(!set.remove_node(set.next(set.last())));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_node(&mut self, position: Position<T>) -> bool {
        let Some(node) = position.node() else {
            return false;
        };
        let entry = self.check(node, "remove_node");

        let value = self.raw.remove_entry(entry);
        self.len -= 1;
        self.release(value);
        true
    }

    /// Removes and returns the smallest element, bypassing the destructor.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut set = Set::from([2, 1]);
    /// while let Some(n) = set.pop_first() {
    ///     assert!(set.iter().all(|&k| k > n));
    /// }
    /// assert!(set.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<T> {
        let entry = self.raw.first()?;
        self.len -= 1;
        Some(self.raw.remove_entry(entry))
    }

    /// Removes and returns the largest element, bypassing the destructor.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<T> {
        let entry = self.raw.last()?;
        self.len -= 1;
        Some(self.raw.remove_entry(entry))
    }

    /// Calls `f` on every element in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let set = Set::from([5, 1, 3]);
    /// let mut sum = 0;
    /// set.visit(|v| sum += v);
    /// assert_eq!(sum, 9);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn visit<F: FnMut(&T)>(&self, mut f: F) {
        self.raw.visit(&mut f);
    }

    /// Gets an iterator that visits the elements in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let set = Set::from([3, 1, 2]);
    /// let mut iter = set.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next_back(), Some(&3));
    /// assert_eq!(iter.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; amortized O(1) per step.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            raw: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.len,
        }
    }

    /// Removes every element, handing each to the destructor. The set stays usable.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut set = Set::from([1, 2]);
    /// set.clear();
    /// assert!(set.is_empty());
    /// set.insert(3);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        match self.destroy.as_mut() {
            Some(destroy) => self.raw.teardown(destroy),
            None => self.raw.teardown(drop),
        }
        self.len = 0;
    }

    /// Tears the set down, handing every element to the destructor.
    ///
    /// Dropping the set does the same; this spells it out.
    pub fn destroy(self) {
        drop(self);
    }

    /// Checks the tree's shape invariants and the cached size.
    ///
    /// Always `Ok` for a set whose comparator is a total order and whose elements never changed
    /// order while stored.
    ///
    /// # Errors
    ///
    /// Returns the first [`Violation`] found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn validate(&self) -> Result<(), Violation>
    where
        C: Comparator<T>,
    {
        self.raw.validate(&self.compare, self.len)
    }

    /// Returns `true` if [`validate`](Set::validate) finds nothing wrong.
    #[must_use]
    pub fn is_proper(&self) -> bool
    where
        C: Comparator<T>,
    {
        self.validate().is_ok()
    }
}

impl<T, C: Comparator<T>> Set<T, C> {
    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. If the set already held an equal element,
    /// `value` takes its place and the displaced element goes to the destructor.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut set = Set::from([1]);
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        match self.raw.insert(value, &self.compare) {
            InsertResult::Inserted => {
                self.len += 1;
                true
            }
            InsertResult::Replaced(old) => {
                self.release(old);
                false
            }
        }
    }

    /// Removes the element equal to `value`, handing it to the destructor.
    ///
    /// Returns whether such an element was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut set = Set::from([1, 2]);
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, value: &T) -> bool {
        match self.take(value) {
            Some(old) => {
                self.release(old);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the element equal to `value`, bypassing the destructor.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut set = Set::from([1, 2]);
    /// assert_eq!(set.take(&2), Some(2));
    /// assert_eq!(set.take(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn take(&mut self, value: &T) -> Option<T> {
        let old = self.raw.remove(value, &self.compare)?;
        self.len -= 1;
        Some(old)
    }

    /// Returns the stored element equal to `value`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let mut set = Set::new(|a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0));
    /// set.insert((1, 'a'));
    /// assert_eq!(set.find(&(1, '?')), Some(&(1, 'a')));
    /// assert_eq!(set.find(&(2, '?')), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find(&self, value: &T) -> Option<&T> {
        self.raw.find(value, &self.compare).map(|entry| self.raw.value(entry))
    }

    /// Returns `true` if the set holds an element equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.raw.find(value, &self.compare).is_some()
    }

    /// Returns a cursor at the element equal to `value`, or [`Position::AfterLast`] if there is
    /// none.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::{Position, Set};
    ///
    /// let set = Set::from([10, 20, 30]);
    /// let pos = set.find_node(&20);
    /// assert_eq!(set.get(set.next(pos)), Some(&30));
    /// assert_eq!(set.find_node(&25), Position::AfterLast);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_node(&self, value: &T) -> Position<T> {
        self.raw
            .find(value, &self.compare)
            .map_or(Position::AfterLast, |entry| self.at(entry))
    }
}

impl<T, C> Drop for Set<T, C> {
    fn drop(&mut self) {
        // Without a destructor the arenas drop their contents on their own.
        if self.destroy.is_some() {
            self.clear();
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Set<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Sets are equal when they hold equal elements in the same order.
impl<T: PartialEq, C> PartialEq for Set<T, C> {
    fn eq(&self, other: &Set<T, C>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for Set<T, C> {}

impl<T, C: Default> Default for Set<T, C> {
    fn default() -> Self {
        Set::new(C::default())
    }
}

impl<T, C: Comparator<T> + Default> FromIterator<T> for Set<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Set::new(C::default());
        set.extend(iter);
        set
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for Set<T> {
    /// Builds a naturally ordered set from an array.
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let set = Set::from([3, 1, 2, 1]);
    /// assert_eq!(set.len(), 3);
    /// ```
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T, C: Comparator<T>> Extend<T> for Set<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |value| {
            self.insert(value);
        });
    }
}

impl<'a, T: 'a + Copy, C: Comparator<T>> Extend<&'a T> for Set<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T, C> IntoIterator for &'a Set<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for Set<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the set's contents in ascending order.
    ///
    /// The destructor is not called on elements moved out this way.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::Set;
    ///
    /// let set = Set::from([1, 2, 3, 4]);
    ///
    /// let v: Vec<_> = set.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3, 4]);
    /// ```
    fn into_iter(mut self) -> IntoIter<T> {
        let remaining = core::mem::replace(&mut self.len, 0);
        IntoIter {
            raw: core::mem::replace(&mut self.raw, RawSet::new()),
            remaining,
        }
    }
}

// ─── Positions ───────────────────────────────────────────────────────────────

// Manual impls: derives would bound `T`, which is never stored here.
impl<T> Clone for SetNode<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SetNode<T> {}

impl<T> PartialEq for SetNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry && self.set == other.set && self.stamp == other.stamp
    }
}

impl<T> Eq for SetNode<T> {}

impl<T> Hash for SetNode<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entry.hash(state);
        self.set.hash(state);
        self.stamp.hash(state);
    }
}

impl<T> fmt::Debug for SetNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetNode")
            .field("entry", &self.entry)
            .field("set", &self.set)
            .field("stamp", &self.stamp)
            .finish()
    }
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<T> {}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Position::At(a), Position::At(b)) => a == b,
            (Position::BeforeFirst, Position::BeforeFirst) | (Position::AfterLast, Position::AfterLast) => true,
            _ => false,
        }
    }
}

impl<T> Eq for Position<T> {}

impl<T> Hash for Position<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        if let Position::At(node) = self {
            node.hash(state);
        }
    }
}

impl<T> fmt::Debug for Position<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::BeforeFirst => f.write_str("BeforeFirst"),
            Position::At(node) => f.debug_tuple("At").field(node).finish(),
            Position::AfterLast => f.write_str("AfterLast"),
        }
    }
}

// ─── Iterators ───────────────────────────────────────────────────────────────

/// An iterator over the elements of a [`Set`] in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`Set`].
///
/// [`iter`]: Set::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    raw: &'a RawSet<T>,
    front: Option<EntryId<T>>,
    back: Option<EntryId<T>>,
    remaining: usize,
}

/// An owning iterator over the elements of a [`Set`] in ascending order.
///
/// This `struct` is created by the `into_iter` method on [`Set`] (provided by the
/// [`IntoIterator`] trait). Elements are taken out of the tree one at a time as the iterator
/// advances; any left when it is dropped are dropped without the destructor.
pub struct IntoIter<T> {
    raw: RawSet<T>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.front?;
        self.remaining -= 1;
        self.front = self.raw.successor(entry);
        Some(self.raw.value(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.back?;
        self.remaining -= 1;
        self.back = self.raw.predecessor(entry);
        Some(self.raw.value(entry))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let entry = self.raw.first()?;
        self.remaining -= 1;
        Some(self.raw.remove_entry(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        let entry = self.raw.last()?;
        self.remaining -= 1;
        Some(self.raw.remove_entry(entry))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining = Iter {
            raw: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.remaining,
        };
        f.debug_tuple("IntoIter").field(&remaining).finish()
    }
}

impl<T> Default for IntoIter<T> {
    /// Creates an empty `set::IntoIter`.
    ///
    /// ```
    /// # use cmpset::set;
    /// let iter: set::IntoIter<u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter {
            raw: RawSet::new(),
            remaining: 0,
        }
    }
}
