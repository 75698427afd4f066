//! Arena-based node storage with typed handles.
//!
//! The IR tree lives in an [`Arena`]: every node is addressed by a
//! [`Handle`], and node identity (as used by child replacement) is handle
//! equality. Slots can be vacated when a subtree is removed; a vacated slot
//! is never reused, so a stale handle can never alias a newer node.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A typed handle into an [`Arena`] or [`UniqueArena`].
pub struct Handle<T> {
    index: u32,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.index)
    }
}

impl<T> Handle<T> {
    pub(crate) fn new(index: u32) -> Self {
        Self {
            index,
            _phantom: PhantomData,
        }
    }

    /// Returns the zero-based index of this handle.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

fn checked_index(len: usize) -> u32 {
    u32::try_from(len)
        .unwrap_or_else(|_| panic!("arena overflow: {len} items exceeds u32::MAX"))
}

/// An append-only arena whose slots can be vacated but never reused.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    data: Vec<Option<T>>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            live: 0,
        }
    }

    /// Number of slots ever allocated, including vacated ones.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing was ever allocated.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of occupied slots.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Appends a value and returns its handle.
    pub fn append(&mut self, value: T) -> Handle<T> {
        let index = checked_index(self.data.len());
        self.data.push(Some(value));
        self.live += 1;
        Handle::new(index)
    }

    /// Returns `true` if the slot behind `handle` is occupied.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        matches!(self.data.get(handle.index()), Some(Some(_)))
    }

    /// Returns a reference to the value if the handle is valid and occupied.
    pub fn try_get(&self, handle: Handle<T>) -> Option<&T> {
        self.data.get(handle.index()).and_then(Option::as_ref)
    }

    /// Mutable counterpart of [`Arena::try_get`].
    pub fn try_get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.data.get_mut(handle.index()).and_then(Option::as_mut)
    }

    /// Vacates a slot and hands back its value. Removing twice yields `None`.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let taken = self.data.get_mut(handle.index()).and_then(Option::take);
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    /// Iterates over occupied `(handle, &value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        // Safety: arena size bounded by u32::MAX (enforced in append)
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (Handle::new(i as u32), v)))
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        match self.data.get(handle.index()) {
            Some(Some(value)) => value,
            Some(None) => panic!("handle {handle:?} refers to a removed slot"),
            None => panic!("handle {handle:?} out of bounds ({} slots)", self.data.len()),
        }
    }
}

impl<T> IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        let len = self.data.len();
        match self.data.get_mut(handle.index()) {
            Some(Some(value)) => value,
            Some(None) => panic!("handle {handle:?} refers to a removed slot"),
            None => panic!("handle {handle:?} out of bounds ({len} slots)"),
        }
    }
}

/// A deduplicating arena that returns the same [`Handle`] for equal values.
#[derive(Clone, Debug)]
pub struct UniqueArena<T> {
    data: Vec<T>,
    map: HashMap<T, u32>,
}

impl<T: Hash + Eq> Default for UniqueArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> UniqueArena<T> {
    /// Creates an empty deduplicating arena.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            map: HashMap::new(),
        }
    }

    /// Returns the number of unique elements in the arena.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the arena contains no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Looks up an existing value through a borrowed form of it.
    pub fn get_handle<Q>(&self, key: &Q) -> Option<Handle<T>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|&index| Handle::new(index))
    }

    /// Inserts a value, returning an existing handle if the value is already present.
    pub fn insert(&mut self, value: T) -> Handle<T>
    where
        T: Clone,
    {
        if let Some(&index) = self.map.get(&value) {
            return Handle::new(index);
        }
        let index = checked_index(self.data.len());
        self.map.insert(value.clone(), index);
        self.data.push(value);
        Handle::new(index)
    }

    /// Returns a reference to the value if the handle is valid.
    pub fn try_get(&self, handle: Handle<T>) -> Option<&T> {
        self.data.get(handle.index())
    }
}

impl<T> Index<Handle<T>> for UniqueArena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        &self.data[handle.index()]
    }
}
