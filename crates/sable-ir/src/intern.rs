//! Process-wide string interning.
//!
//! Identifiers, struct names and field names are interned once per host so
//! that every compile shares one copy of each distinct string. The pool is
//! append-only; inserts take a mutex so concurrent compiles can share it.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::arena::UniqueArena;

/// An interned string. Cloning is a reference-count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    /// Returns the string contents.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if both names point at the same interned storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deduplicating string pool.
#[derive(Debug, Default)]
pub struct Interner {
    pool: Mutex<UniqueArena<Arc<str>>>,
}

impl Interner {
    /// Creates an empty pool, for hosts that scope interning to their own lifetime.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared pool for hosts that do not manage their own.
    pub fn global() -> &'static Interner {
        static GLOBAL: OnceLock<Interner> = OnceLock::new();
        GLOBAL.get_or_init(Interner::new)
    }

    /// Returns the stable, deduplicated storage for `text`.
    pub fn intern(&self, text: &str) -> Name {
        // The pool is append-only, so a poisoned lock still guards valid data.
        let mut pool = self.pool.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = match pool.get_handle(text) {
            Some(handle) => handle,
            None => pool.insert(Arc::from(text)),
        };
        Name(Arc::clone(&pool[handle]))
    }

    /// Number of distinct strings seen so far.
    pub fn len(&self) -> usize {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_shares_storage() {
        let interner = Interner::new();
        let a = interner.intern("color");
        let b = interner.intern("color");
        assert!(a.ptr_eq(&b));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_text_gets_distinct_entries() {
        let interner = Interner::new();
        let a = interner.intern("u_mvp");
        let b = interner.intern("u_light");
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
        assert_eq!(a, "u_mvp");
    }

    #[test]
    fn concurrent_interning_dedups() {
        let interner = Arc::new(Interner::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let interner = Arc::clone(&interner);
                std::thread::spawn(move || interner.intern("shared"))
            })
            .collect();
        let names: Vec<Name> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(names.windows(2).all(|w| w[0].ptr_eq(&w[1])));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn global_pool_is_shared() {
        let a = Interner::global().intern("sable_global_probe");
        let b = Interner::global().intern("sable_global_probe");
        assert!(a.ptr_eq(&b));
    }
}
