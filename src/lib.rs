//! An ordered set of unique elements kept in a B-tree and ordered by a caller-supplied
//! comparator.
//!
//! [`Set`] stores any `T`, ordered by any [`Comparator`]: a closure, a function, or one of the
//! provided [`NaturalOrder`] and [`ReverseOrder`]. Elements that compare equal are the same
//! member. Besides the usual insert, remove and lookup, the set offers bidirectional cursors
//! ([`Position`]) that stay valid while the tree rebalances, and an optional destructor that
//! receives every element the set releases.
//!
//! # Example
//!
//! ```
//! use cmpset::{Position, Set};
//!
//! let mut set = Set::from([50, 10, 40, 20, 30]);
//! set.remove(&30);
//!
//! let mut pos = set.first();
//! let mut seen = Vec::new();
//! while let Some(&v) = set.get(pos) {
//!     seen.push(v);
//!     pos = set.next(pos);
//! }
//! assert_eq!(seen, [10, 20, 40, 50]);
//! assert_eq!(pos, Position::AfterLast);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **`tracing`** - Emits `tracing` events for splits, rotations, merges and changes in tree
//!   height (off by default)
//!
//! # Implementation
//!
//! The tree has order 5: every node except the root holds between [`MIN_VALUES`] and
//! [`MAX_VALUES`] elements, and internal nodes have one child more than they have elements.
//! Nodes and elements live in two arenas and refer to each other by index. Elements never move
//! between arena slots, which is what keeps a [`SetNode`] valid across splits and merges.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod tracing_helpers;

mod compare;
mod error;
mod raw;

pub mod set;

pub use compare::{Comparator, NaturalOrder, ReverseOrder};
pub use error::Violation;
pub use raw::{MAX_CHILDREN, MAX_VALUES, MIN_CHILDREN, MIN_VALUES};
pub use set::{DestroyFn, IntoIter, Iter, Position, Set, SetNode};
