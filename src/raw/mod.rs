mod arena;
mod handle;
mod node;
mod raw_set;
mod validate;

pub use node::{MAX_CHILDREN, MAX_VALUES, MIN_CHILDREN, MIN_VALUES};
pub(crate) use node::EntryId;
pub(crate) use raw_set::{InsertResult, RawSet};
