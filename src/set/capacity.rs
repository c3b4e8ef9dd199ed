use alloc::boxed::Box;

use super::Set;
use crate::raw::RawSet;

impl<T, C> Set<T, C> {
    /// Creates an empty set with room for at least `capacity` elements before any storage is
    /// reallocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::{NaturalOrder, Set};
    ///
    /// let set: Set<i32> = Set::with_capacity(NaturalOrder, 16);
    /// assert!(set.is_empty());
    /// assert!(set.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(compare: C, capacity: usize) -> Self {
        Set {
            raw: RawSet::with_capacity(capacity),
            len: 0,
            compare,
            destroy: None,
        }
    }

    /// Like [`with_capacity`](Set::with_capacity), with a destructor for released elements.
    #[must_use]
    pub fn with_capacity_and_destroy<F>(compare: C, capacity: usize, destroy: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Set {
            raw: RawSet::with_capacity(capacity),
            len: 0,
            compare,
            destroy: Some(Box::new(destroy)),
        }
    }

    /// Returns how many elements the set can hold without reallocating its element storage.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmpset::{NaturalOrder, Set};
    ///
    /// let set: Set<i32> = Set::with_capacity(NaturalOrder, 32);
    /// assert_eq!(set.capacity(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
