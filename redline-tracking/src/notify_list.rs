//! A list that reports its own structural mutations.

use crate::entity::{Trackable, TrackableList};
use crate::state::ChangeHandler;
use std::fmt;
use std::ops::Deref;

/// A `Vec` wrapper that invokes registered change handlers whenever the
/// list itself is mutated (push, insert, remove, replace, clear).
///
/// Useful as a collection member on entities whose screens need to redraw
/// when items come and go, without polling. Handlers observe structural
/// changes only; element edits go through the tracker as usual.
pub struct NotifyList<T> {
    items: Vec<T>,
    handlers: Vec<ChangeHandler>,
}

impl<T> NotifyList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Registers a handler invoked after every structural mutation.
    pub fn when_changed(&mut self, handler: ChangeHandler) {
        self.handlers.push(handler);
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.notify();
    }

    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item);
        self.notify();
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&mut self, index: usize) -> T {
        let removed = self.items.remove(index);
        self.notify();
        removed
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, item: T) -> T {
        let previous = std::mem::replace(&mut self.items[index], item);
        self.notify();
        previous
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.notify();
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn notify(&self) {
        for handler in &self.handlers {
            handler();
        }
    }
}

impl<T> Default for NotifyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for NotifyList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            handlers: Vec::new(),
        }
    }
}

impl<T> FromIterator<T> for NotifyList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> Deref for NotifyList<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a NotifyList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for NotifyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T: Trackable + Clone> TrackableList for NotifyList<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<&dyn Trackable> {
        TrackableList::get(&self.items, index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Trackable> {
        TrackableList::get_mut(&mut self.items, index)
    }

    fn remove(&mut self, index: usize) {
        NotifyList::remove(self, index);
    }

    fn push_clone_of(&mut self, item: &dyn Trackable) -> bool {
        if self.items.push_clone_of(item) {
            self.notify();
            true
        } else {
            false
        }
    }
}
