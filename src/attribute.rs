//! The attribute store backing nodes, edges, slots, carriers and the area.
//!
//! Every entry is either a concrete value or a deferred computation. The override rules are
//! enforced here rather than by callers:
//!
//! * [`AttributeStore::set`] always wins, replacing a lazy or concrete entry.
//! * [`AttributeStore::lazy_set`] never replaces a concrete value.
//! * [`AttributeStore::get`] evaluates a lazy entry at most once and caches the result, unless
//!   the evaluation fails, in which case the entry stays lazy.
use crate::error::{GraphError, GraphResult};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A deferred attribute computation
pub type Thunk = Rc<dyn Fn() -> GraphResult<f64>>;

/// A single entry in an [`AttributeStore`]
#[derive(Clone)]
enum Entry {
    Lazy(Thunk),
    Concrete(f64),
}

/// A map from attribute name to a concrete or lazily computed value
#[derive(Default, Clone)]
pub struct AttributeStore {
    entries: RefCell<IndexMap<Rc<str>, Entry>>,
}

impl AttributeStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a concrete value, overwriting any previous entry
    pub fn set(&mut self, key: &str, value: f64) {
        self.entries
            .get_mut()
            .insert(Rc::from(key), Entry::Concrete(value));
    }

    /// Store a deferred computation, unless a concrete value is already present
    pub fn lazy_set<F>(&mut self, key: &str, thunk: F)
    where
        F: Fn() -> GraphResult<f64> + 'static,
    {
        let entries = self.entries.get_mut();
        if let Some(Entry::Concrete(_)) = entries.get(key) {
            return;
        }

        entries.insert(Rc::from(key), Entry::Lazy(Rc::new(thunk)));
    }

    /// Read a value, evaluating and caching a deferred computation
    pub fn get(&self, key: &str) -> GraphResult<f64> {
        self.read(key, true)
    }

    /// Read a value, evaluating a deferred computation without caching its result
    pub fn get_uncached(&self, key: &str) -> GraphResult<f64> {
        self.read(key, false)
    }

    /// Read a value if one is present, treating a missing entry as `None`
    pub fn get_opt(&self, key: &str, cache: bool) -> GraphResult<Option<f64>> {
        if self.contains(key) {
            self.read(key, cache).map(Some)
        } else {
            Ok(None)
        }
    }

    fn read(&self, key: &str, cache: bool) -> GraphResult<f64> {
        let thunk = match self.entries.borrow().get(key) {
            None => return Err(GraphError::missing(key)),
            Some(Entry::Concrete(value)) => return Ok(*value),
            Some(Entry::Lazy(thunk)) => Rc::clone(thunk),
        };

        // The borrow is released before evaluating, so the thunk may read other stores freely
        let value = thunk()?;
        if cache {
            let mut entries = self.entries.borrow_mut();
            // Only replace the entry if it is still the thunk we evaluated
            let unchanged = matches!(
                entries.get(key),
                Some(Entry::Lazy(current)) if Rc::ptr_eq(current, &thunk)
            );
            if unchanged {
                entries.insert(Rc::from(key), Entry::Concrete(value));
            }
        }

        Ok(value)
    }

    /// Whether the store has any entry for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Whether the store holds a concrete value for `key`
    pub fn is_concrete(&self, key: &str) -> bool {
        matches!(self.entries.borrow().get(key), Some(Entry::Concrete(_)))
    }

    /// Remove an entry, returning whether one was present
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.get_mut().shift_remove(key).is_some()
    }

    /// The names of all attributes in the store, in insertion order
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut map = f.debug_map();
        for (key, entry) in entries.iter() {
            match entry {
                Entry::Concrete(value) => map.entry(key, value),
                Entry::Lazy(_) => map.entry(key, &"<lazy>"),
            };
        }
        map.finish()
    }
}
