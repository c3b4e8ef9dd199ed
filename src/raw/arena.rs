use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage addressed by [`Handle<T>`]. Freed slots are recycled before the backing vector
/// grows, so handles stay small and dense.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle<T>>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle<T> {
        if let Some(h) = self.free.pop() {
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            // Strict less-than keeps the live count within `Handle::MAX`.
            assert!(
                self.slots.len() < Handle::<T>::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::<T>::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    /// Returns `true` if `handle` refers to a live slot.
    pub(crate) fn contains(&self, handle: Handle<T>) -> bool {
        matches!(self.slots.get(handle.to_index()), Some(Some(_)))
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle<T>) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle<T>) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn free(&mut self, handle: Handle<T>) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
