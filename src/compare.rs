use core::cmp::Ordering;

/// A total order over `T`, supplied by the caller when a [`Set`](crate::Set) is created.
///
/// Any `Fn(&T, &T) -> Ordering` closure or function is a comparator, so most callers never name
/// this trait:
///
/// ```
/// use cmpset::Set;
///
/// let mut by_len = Set::new(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// by_len.insert("pear");
/// by_len.insert("fig");
/// by_len.insert("plum"); // same length as "pear", so it replaces it
///
/// assert_eq!(by_len.len(), 2);
/// assert_eq!(by_len.find(&"kiwi"), Some(&"plum"));
/// ```
///
/// The order must be total and must not change while elements are in the set. Two elements that
/// compare `Equal` are the same member as far as the set is concerned.
pub trait Comparator<T: ?Sized> {
    /// Orders `a` relative to `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Orders elements by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Orders elements by the reverse of their [`Ord`] implementation.
///
/// ```
/// use cmpset::{ReverseOrder, Set};
///
/// let mut set: Set<i32, _> = Set::new(ReverseOrder);
/// set.extend([1, 3, 2]);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ReverseOrder;

impl<T: Ord + ?Sized> Comparator<T> for ReverseOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        b.cmp(a)
    }
}
