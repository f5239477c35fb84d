//! Process-wide identity interning for immutable, expensive resources.
//!
//! An [`InternCache`] maps a case-insensitive name to one shared `Arc<T>`.
//! Two requests for the same name always observe the identical instance: the
//! first candidate to reach the critical section wins and every later
//! candidate for that name is dropped in favor of the cached entry.
//!
//! Entries are never updated or removed, so the only shared mutable state is
//! the map itself, guarded by a single mutex held for the full duration of
//! each operation.

use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// A resource that can live in an [`InternCache`].
pub trait Interned {
    /// Name the resource is registered under. Compared case-insensitively.
    fn intern_name(&self) -> &str;

    /// One-line human readable description used by [`InternCache::dump_state`].
    fn debug_summary(&self) -> String;
}

/// Caller misuse of the cache.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cannot intern a resource with an empty name")]
    EmptyName,
}

/// Folds a name for keying: locale-independent lowercase over every char.
///
/// Used for both map equality and diagnostic sort order, so lookups and dumps
/// agree on every platform.
pub fn fold_name(name: &str) -> String {
    name.chars().flat_map(char::to_lowercase).collect()
}

/// Case-insensitive name → shared instance map with get-or-insert semantics.
pub struct InternCache<T> {
    title: &'static str,
    entries: Mutex<BTreeMap<String, Arc<T>>>,
}

impl<T: Interned> InternCache<T> {
    /// Creates an empty cache. `title` is the header line of [`Self::dump_state`].
    pub const fn new(title: &'static str) -> Self {
        Self {
            title,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    // Entries are immutable once inserted, so a panic in another holder cannot
    // leave the map half-updated; recover the guard instead of propagating.
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Arc<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached instance for `name`, if any. Never creates.
    pub fn lookup(&self, name: &str) -> Option<Arc<T>> {
        self.entries().get(&fold_name(name)).cloned()
    }

    /// Registers `candidate` under its own name unless an entry already exists.
    ///
    /// Returns the surviving instance. When an entry already exists the
    /// candidate is dropped and the existing `Arc` is returned, so callers must
    /// continue with the returned value rather than their own candidate.
    ///
    /// # Errors
    /// Returns [`CacheError::EmptyName`] if the candidate's name is empty or
    /// whitespace only.
    pub fn intern_or_get(&self, candidate: Arc<T>) -> Result<Arc<T>, CacheError> {
        let name = candidate.intern_name();
        if name.trim().is_empty() {
            return Err(CacheError::EmptyName);
        }
        let key = fold_name(name);

        let mut entries = self.entries();
        if let Some(existing) = entries.get(&key) {
            debug!(
                "{}: '{}' already interned as '{}', discarding candidate",
                self.title,
                name,
                existing.intern_name()
            );
            return Ok(Arc::clone(existing));
        }

        debug!("{}: interned '{}'", self.title, name);
        entries.insert(key, Arc::clone(&candidate));
        Ok(candidate)
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Renders a deterministic listing of every entry for diagnostics.
    ///
    /// Format: the title line, then `"  <name>: <summary>\n"` per entry sorted
    /// case-insensitively by name, then a blank line.
    pub fn dump_state(&self) -> String {
        let entries = self.entries();
        let mut out = String::with_capacity(self.title.len() + 2 + entries.len() * 48);
        out.push_str(self.title);
        out.push('\n');
        for entry in entries.values() {
            out.push_str("  ");
            out.push_str(entry.intern_name());
            out.push_str(": ");
            out.push_str(&entry.debug_summary());
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[derive(Debug)]
    struct Named {
        name: String,
        tag: u32,
    }

    impl Named {
        fn arc(name: &str, tag: u32) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                tag,
            })
        }
    }

    impl Interned for Named {
        fn intern_name(&self) -> &str {
            &self.name
        }

        fn debug_summary(&self) -> String {
            format!("tag {}", self.tag)
        }
    }

    #[test]
    fn lookup_misses_before_intern() {
        let cache: InternCache<Named> = InternCache::new("Test cache");
        assert!(cache.lookup("Times New Roman").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn intern_then_lookup_ignores_case() {
        let cache = InternCache::new("Test cache");
        let first = cache
            .intern_or_get(Named::arc("Times New Roman", 1))
            .unwrap();

        let looked_up = cache.lookup("times new roman").expect("entry present");
        assert!(Arc::ptr_eq(&first, &looked_up));

        let again = cache
            .intern_or_get(Named::arc("Times New Roman", 2))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.tag, 1);
    }

    #[test]
    fn differently_cased_candidates_share_identity() {
        let cache = InternCache::new("Test cache");
        let arial = cache.intern_or_get(Named::arc("Arial", 1)).unwrap();
        let upper = cache.intern_or_get(Named::arc("ARIAL", 2)).unwrap();
        let lower = cache.lookup("arial").unwrap();

        assert!(Arc::ptr_eq(&arial, &upper));
        assert!(Arc::ptr_eq(&arial, &lower));
        assert_eq!(upper.intern_name(), "Arial");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn non_ascii_names_fold_case() {
        let cache = InternCache::new("Test cache");
        let mixed = cache.intern_or_get(Named::arc("Ärial", 1)).unwrap();
        let upper = cache.intern_or_get(Named::arc("ÄRIAL", 2)).unwrap();

        assert!(Arc::ptr_eq(&mixed, &upper));
        assert!(Arc::ptr_eq(&mixed, &cache.lookup("ärial").unwrap()));
        assert_eq!(cache.len(), 1);
        assert_eq!(fold_name("ΣΟΦΙΑ Ärial"), "σοφια ärial");
    }

    #[test]
    fn losing_candidate_is_released() {
        let cache = InternCache::new("Test cache");
        cache.intern_or_get(Named::arc("Serif", 1)).unwrap();

        let loser = Named::arc("serif", 2);
        let weak = Arc::downgrade(&loser);
        let winner = cache.intern_or_get(loser).unwrap();

        assert_eq!(winner.tag, 1);
        assert!(weak.upgrade().is_none(), "loser should be dropped");
    }

    #[test]
    fn empty_names_are_rejected() {
        let cache = InternCache::new("Test cache");
        assert_eq!(
            cache.intern_or_get(Named::arc("", 1)).unwrap_err(),
            CacheError::EmptyName
        );
        assert_eq!(
            cache.intern_or_get(Named::arc("   ", 1)).unwrap_err(),
            CacheError::EmptyName
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn dump_state_is_sorted_case_insensitively() {
        let cache = InternCache::new("Font families by name");
        for (name, tag) in [("verdana", 3), ("Arial", 1), ("Courier New", 2), ("ARIAL", 9)] {
            cache.intern_or_get(Named::arc(name, tag)).unwrap();
        }

        assert_eq!(
            cache.dump_state(),
            "Font families by name\n  Arial: tag 1\n  Courier New: tag 2\n  verdana: tag 3\n\n"
        );
    }

    #[test]
    fn count_never_decreases() {
        let cache = InternCache::new("Test cache");
        let mut last = 0;
        for name in ["a", "B", "A", "c", "b", "C", "d"] {
            cache.intern_or_get(Named::arc(name, 0)).unwrap();
            let _ = cache.lookup("zzz");
            let now = cache.len();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 4);
    }

    #[test]
    fn concurrent_interns_agree_on_one_instance() {
        const THREADS: usize = 16;
        let cache = Arc::new(InternCache::new("Test cache"));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let name = if i % 2 == 0 { "Fira Code" } else { "FIRA CODE" };
                    barrier.wait();
                    cache.intern_or_get(Named::arc(name, i as u32)).unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<Named>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first = &results[0];
        assert!(results.iter().all(|r| Arc::ptr_eq(first, r)));
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(first, &cache.lookup("fira code").unwrap()));
    }
}
