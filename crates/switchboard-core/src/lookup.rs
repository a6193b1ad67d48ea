//! Ordered, event-emitting key/value collection.
//!
//! A [`Lookup`] keeps its entries in a well-defined order: insertion order by
//! default, or the order imposed by a [`Comparator`]. Every mutation is
//! published as a [`LookupEvent`] on the streams returned by
//! [`Lookup::watch`].
//!
//! # Example
//!
//! ```
//! use switchboard_core::lookup::{Comparator, Lookup, LookupEvent};
//!
//! let mut lookup = Lookup::new().with_comparator(Comparator::by_key());
//! let events = lookup.watch();
//!
//! lookup.add("b", 2).unwrap();
//! lookup.add("a", 1).unwrap();
//!
//! assert_eq!(lookup.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
//! assert_eq!(
//!     events.drain(),
//!     vec![LookupEvent::Added("b"), LookupEvent::Added("a")]
//! );
//! ```

use std::{
    cmp::Ordering,
    collections::HashSet,
    fmt::{self, Display},
    hash::Hash,
    rc::Rc,
};

use indexmap::IndexMap;
use log::trace;

use crate::{
    error::{CollectionError, Result},
    events::{Emitter, EventStream},
};

/// A change published by a [`Lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEvent<K> {
    /// The key was inserted. Emitted after any automatic re-sort.
    Added(K),
    /// The key and its value were removed.
    Removed(K),
    /// The collection was re-ordered by `sort` or `rearrange`.
    Sorted,
}

type CompareFn<K, V> = dyn Fn((&K, &V), (&K, &V)) -> Ordering;

/// Ordering rule for a [`Lookup`].
pub struct Comparator<K, V>(Rc<CompareFn<K, V>>);

impl<K, V> Clone for Comparator<K, V> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<K, V> fmt::Debug for Comparator<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Comparator")
    }
}

impl<K: 'static, V: 'static> Comparator<K, V> {
    /// Orders entries with an arbitrary function over `(key, value)` pairs.
    pub fn by<F>(compare: F) -> Self
    where
        F: Fn((&K, &V), (&K, &V)) -> Ordering + 'static,
    {
        Self(Rc::new(compare))
    }

    /// Orders entries by a field extracted from the value.
    pub fn by_field<T, F>(field: F) -> Self
    where
        T: Ord,
        F: Fn(&V) -> T + 'static,
    {
        Self::by(move |(_, a), (_, b)| field(a).cmp(&field(b)))
    }

    /// Orders entries by the natural order of their keys.
    pub fn by_key() -> Self
    where
        K: Ord,
    {
        Self::by(|(a, _), (b, _)| a.cmp(b))
    }

    /// Orders entries by the natural order of their values.
    pub fn natural() -> Self
    where
        V: Ord,
    {
        Self::by(|(_, a), (_, b)| a.cmp(b))
    }
}

impl<K, V> Comparator<K, V> {
    fn compare(&self, a: (&K, &V), b: (&K, &V)) -> Ordering {
        (self.0)(a, b)
    }
}

/// Options accepted by [`Lookup::add_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    sort: bool,
    silent: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            sort: true,
            silent: false,
        }
    }
}

impl AddOptions {
    /// Skip the automatic re-sort after inserting.
    pub fn without_sort(mut self) -> Self {
        self.sort = false;
        self
    }

    /// Do not publish an [`LookupEvent::Added`] event.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// Ordered key/value collection with optional sorting and rearranging.
///
/// Keys are unique; adding an existing key is an error rather than an
/// overwrite.
pub struct Lookup<K, V> {
    items: IndexMap<K, V>,
    comparator: Option<Comparator<K, V>>,
    arranger: Option<Box<dyn FnMut(&mut V, usize)>>,
    events: Emitter<LookupEvent<K>>,
}

impl<K, V> Default for Lookup<K, V> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            comparator: None,
            arranger: None,
            events: Emitter::default(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Lookup<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("items", &self.items)
            .field("sorted", &self.comparator.is_some())
            .finish()
    }
}

impl<K, V> Lookup<K, V>
where
    K: Hash + Eq + Clone + Display,
{
    /// Creates an empty lookup ordered by insertion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lookup from initial key/value pairs, in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if a key occurs twice.
    pub fn from_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut lookup = Self::new();
        for (key, value) in items {
            lookup.add_with(key, value, AddOptions::default().silent())?;
        }
        Ok(lookup)
    }

    /// Sets the ordering rule and sorts the existing entries.
    pub fn with_comparator(mut self, comparator: Comparator<K, V>) -> Self {
        self.comparator = Some(comparator);
        self.sort_items();
        self
    }

    /// Sets the callback that records a new ordinal on a value during
    /// [`rearrange`](Self::rearrange).
    pub fn with_arranger<F>(mut self, arranger: F) -> Self
    where
        F: FnMut(&mut V, usize) + 'static,
    {
        self.arranger = Some(Box::new(arranger));
        self
    }

    /// Opens a stream of this lookup's future events.
    pub fn watch(&mut self) -> EventStream<LookupEvent<K>> {
        self.events.watch()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.items.get(key)
    }

    /// Mutable access to a value. Changing fields used by the comparator
    /// does not re-sort; call [`sort`](Self::sort) afterwards.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.items.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.items.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.values()
    }

    /// Mutable access to every value, in order. See [`get_mut`](Self::get_mut)
    /// about sorting.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.items.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.items.iter()
    }

    /// Returns the value at position `index`, or `None` when out of range.
    pub fn at(&self, index: usize) -> Option<&V> {
        self.items.get_index(index).map(|(_, value)| value)
    }

    /// Returns the key at position `index`, or `None` when out of range.
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.items.get_index(index).map(|(key, _)| key)
    }

    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.items.get_index_of(key)
    }

    pub fn index_of(&self, value: &V) -> Option<usize>
    where
        V: PartialEq,
    {
        self.items.values().position(|candidate| candidate == value)
    }

    /// Returns every entry matching `predicate`, in order.
    pub fn filter<P>(&self, mut predicate: P) -> impl Iterator<Item = (&K, &V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.items
            .iter()
            .filter(move |(key, value)| predicate(*key, *value))
    }

    /// Returns the first entry matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<(&K, &V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.items
            .iter()
            .find(|(key, value)| predicate(*key, *value))
    }

    /// Inserts `value` under `key`, re-sorting when a comparator is set.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if `key` is already present.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        self.add_with(key, value, AddOptions::default())
    }

    /// Inserts `value` under `key` with explicit [`AddOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if `key` is already present.
    pub fn add_with(&mut self, key: K, value: V, options: AddOptions) -> Result<()> {
        if self.items.contains_key(&key) {
            return Err(CollectionError::duplicate_key(&key));
        }

        trace!(key = key.to_string(); "Adding lookup item");
        self.items.insert(key.clone(), value);

        if options.sort {
            self.sort_items();
        }
        if !options.silent {
            self.events.emit(LookupEvent::Added(key));
        }
        Ok(())
    }

    /// Removes and returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::MissingKey`] if `key` is not present.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        let value = self
            .items
            .shift_remove(key)
            .ok_or_else(|| CollectionError::missing_key(key))?;

        trace!(key = key.to_string(); "Removed lookup item");
        self.events.emit(LookupEvent::Removed(key.clone()));
        Ok(value)
    }

    /// Re-applies the comparator. Stable: equal entries keep their order.
    ///
    /// Does nothing (and publishes nothing) without a comparator.
    pub fn sort(&mut self) {
        if self.sort_items() {
            self.events.emit(LookupEvent::Sorted);
        }
    }

    /// Moves the listed keys to the front in the given order, hands every
    /// value its new ordinal through the arranger, then re-sorts.
    ///
    /// Keys not listed keep their relative order after the listed ones.
    /// Repeated keys only count once.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::MissingKey`] if any key is unknown; the
    /// lookup is left untouched in that case.
    pub fn rearrange(&mut self, keys: &[K]) -> Result<()> {
        if let Some(missing) = keys.iter().find(|key| !self.items.contains_key(*key)) {
            return Err(CollectionError::missing_key(missing));
        }

        let mut seen = HashSet::new();
        let mut position = 0;
        for key in keys {
            if !seen.insert(key) {
                continue;
            }
            if let Some(current) = self.items.get_index_of(key) {
                self.items.move_index(current, position);
                position += 1;
            }
        }

        if let Some(arranger) = self.arranger.as_mut() {
            for (ordinal, value) in self.items.values_mut().enumerate() {
                arranger(value, ordinal);
            }
        }

        self.sort_items();
        self.events.emit(LookupEvent::Sorted);
        Ok(())
    }

    fn sort_items(&mut self) -> bool {
        let Some(comparator) = self.comparator.clone() else {
            return false;
        };
        self.items
            .sort_by(|a_key, a_value, b_key, b_value| {
                comparator.compare((a_key, a_value), (b_key, b_value))
            });
        true
    }
}
