//! Composition of several named [`Lookup`]s into one flat namespace.
//!
//! A [`LookupGroup`] owns its member lookups and keeps an index from every
//! member key to the member that owns it. Keys are unique across the whole
//! group, so "which member owns key K" always has a single answer.
//!
//! Mutations go through the group. After delegating to a member, the group
//! drains that member's [`LookupEvent`]s, updates its index and re-publishes
//! them as [`GroupEvent`]s tagged with the owning member.

use std::{fmt, fmt::Display, hash::Hash};

use indexmap::IndexMap;
use log::debug;

use crate::{
    error::{CollectionError, Result},
    events::{Emitter, EventStream},
    identifier::Id,
    lookup::{Lookup, LookupEvent},
};

/// A change published by a [`LookupGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent<K> {
    Added { owner: Id, key: K },
    Removed { owner: Id, key: K },
    Sorted { owner: Id },
    Subscribed { owner: Id },
    Unsubscribed { owner: Id },
}

impl<K> GroupEvent<K> {
    /// Returns the member the event concerns.
    pub fn owner(&self) -> Id {
        match self {
            Self::Added { owner, .. }
            | Self::Removed { owner, .. }
            | Self::Sorted { owner }
            | Self::Subscribed { owner }
            | Self::Unsubscribed { owner } => *owner,
        }
    }
}

struct Member<K, V> {
    lookup: Lookup<K, V>,
    events: EventStream<LookupEvent<K>>,
}

/// Named member lookups addressed as one set of globally unique keys.
pub struct LookupGroup<K, V> {
    members: Lookup<Id, Member<K, V>>,
    owners: IndexMap<K, Id>,
    events: Emitter<GroupEvent<K>>,
}

impl<K, V> Default for LookupGroup<K, V> {
    fn default() -> Self {
        Self {
            members: Lookup::default(),
            owners: IndexMap::new(),
            events: Emitter::default(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for LookupGroup<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupGroup")
            .field("owners", &self.owners)
            .finish()
    }
}

impl<K, V> LookupGroup<K, V>
where
    K: Hash + Eq + Clone + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a stream of this group's future events.
    pub fn watch(&mut self) -> EventStream<GroupEvent<K>> {
        self.events.watch()
    }

    /// Attaches `lookup` as the member `name`.
    ///
    /// Publishes [`GroupEvent::Subscribed`] followed by one
    /// [`GroupEvent::Added`] per key already in the lookup.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::AlreadySubscribed`] if `name` is taken.
    /// - [`CollectionError::KeyCollision`] if any key of `lookup` already
    ///   belongs to the group.
    pub fn subscribe(&mut self, name: Id, mut lookup: Lookup<K, V>) -> Result<()> {
        if self.members.has(&name) {
            return Err(CollectionError::already_subscribed(name));
        }
        if let Some(key) = lookup.keys().find(|key| self.owners.contains_key(*key)) {
            return Err(CollectionError::key_collision(name, key));
        }

        let keys: Vec<K> = lookup.keys().cloned().collect();
        let events = lookup.watch();
        self.members.add(name, Member { lookup, events })?;

        debug!(member:? = name, keys = keys.len(); "Subscribed group member");
        self.events.emit(GroupEvent::Subscribed { owner: name });
        for key in keys {
            self.owners.insert(key.clone(), name);
            self.events.emit(GroupEvent::Added { owner: name, key });
        }
        Ok(())
    }

    /// Detaches the member `name` and hands its lookup back.
    ///
    /// Every key of the member leaves the flat namespace, publishing one
    /// [`GroupEvent::Removed`] per key followed by
    /// [`GroupEvent::Unsubscribed`]. Other members are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NotSubscribed`] if `name` is unknown.
    pub fn unsubscribe(&mut self, name: Id) -> Result<Lookup<K, V>> {
        let member = self
            .members
            .remove(&name)
            .map_err(|_| CollectionError::not_subscribed(name))?;
        let Member { lookup, events } = member;
        drop(events);

        for key in lookup.keys() {
            self.owners.shift_remove(key);
            self.events.emit(GroupEvent::Removed {
                owner: name,
                key: key.clone(),
            });
        }
        debug!(member:? = name, keys = lookup.len(); "Unsubscribed group member");
        self.events.emit(GroupEvent::Unsubscribed { owner: name });
        Ok(lookup)
    }

    /// Adds `key` to the member `owner`.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::DuplicateKey`] if any member already holds `key`.
    /// - [`CollectionError::NotSubscribed`] if `owner` is unknown.
    pub fn add(&mut self, owner: Id, key: K, value: V) -> Result<()> {
        if self.owners.contains_key(&key) {
            return Err(CollectionError::duplicate_key(&key));
        }
        self.member_entry(owner)?.lookup.add(key, value)?;
        self.pump(owner);
        Ok(())
    }

    /// Removes `key` from whichever member owns it.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::MissingKey`] if no member holds `key`.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        let owner = self
            .owner_of(key)
            .ok_or_else(|| CollectionError::missing_key(key))?;
        let value = self.member_entry(owner)?.lookup.remove(key)?;
        self.pump(owner);
        Ok(value)
    }

    /// Re-sorts the member `owner` with its own comparator.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NotSubscribed`] if `owner` is unknown.
    pub fn sort(&mut self, owner: Id) -> Result<()> {
        self.member_entry(owner)?.lookup.sort();
        self.pump(owner);
        Ok(())
    }

    /// Rearranges the member `owner`, see [`Lookup::rearrange`].
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NotSubscribed`] if `owner` is unknown, or
    /// [`CollectionError::MissingKey`] for keys the member does not hold.
    pub fn rearrange(&mut self, owner: Id, keys: &[K]) -> Result<()> {
        self.member_entry(owner)?.lookup.rearrange(keys)?;
        self.pump(owner);
        Ok(())
    }

    /// Returns the name of the member owning `key`.
    pub fn owner_of(&self, key: &K) -> Option<Id> {
        self.owners.get(key).copied()
    }

    pub fn has(&self, key: &K) -> bool {
        self.owners.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let owner = self.owners.get(key)?;
        self.members.get(owner)?.lookup.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let owner = *self.owners.get(key)?;
        self.members.get_mut(&owner)?.lookup.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Keys of every member in the order they joined the group.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.owners.keys()
    }

    /// Entries of every member in the order they joined the group.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.owners.iter().filter_map(|(key, owner)| {
            let value = self.members.get(owner)?.lookup.get(key)?;
            Some((key, value))
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Returns every entry across all members matching `predicate`.
    pub fn filter<P>(&self, mut predicate: P) -> impl Iterator<Item = (&K, &V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.iter().filter(move |(key, value)| predicate(*key, *value))
    }

    /// Returns the first entry across all members matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<(&K, &V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.iter().find(|(key, value)| predicate(*key, *value))
    }

    pub fn member(&self, name: Id) -> Option<&Lookup<K, V>> {
        self.members.get(&name).map(|member| &member.lookup)
    }

    pub fn has_member(&self, name: Id) -> bool {
        self.members.has(&name)
    }

    /// Member names in subscription order.
    pub fn member_names(&self) -> impl Iterator<Item = Id> + '_ {
        self.members.keys().copied()
    }

    fn member_entry(&mut self, owner: Id) -> Result<&mut Member<K, V>> {
        self.members
            .get_mut(&owner)
            .ok_or_else(|| CollectionError::not_subscribed(owner))
    }

    /// Folds the member's pending events into the index and re-publishes them.
    fn pump(&mut self, owner: Id) {
        let Some(member) = self.members.get(&owner) else {
            return;
        };
        for event in member.events.drain() {
            match event {
                LookupEvent::Added(key) => {
                    self.owners.insert(key.clone(), owner);
                    self.events.emit(GroupEvent::Added { owner, key });
                }
                LookupEvent::Removed(key) => {
                    self.owners.shift_remove(&key);
                    self.events.emit(GroupEvent::Removed { owner, key });
                }
                LookupEvent::Sorted => self.events.emit(GroupEvent::Sorted { owner }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn lookup(keys: &[&'static str]) -> Lookup<&'static str, usize> {
        Lookup::from_items(keys.iter().enumerate().map(|(idx, key)| (*key, idx))).unwrap()
    }

    fn group_keys(group: &LookupGroup<&'static str, usize>) -> Vec<&'static str> {
        group.keys().copied().collect()
    }

    #[test]
    fn test_subscribe_flattens_members() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&["a1", "a2"])).unwrap();
        group.subscribe(Id::new("b"), lookup(&["b1"])).unwrap();

        assert_eq!(group_keys(&group), vec!["a1", "a2", "b1"]);
        assert_eq!(group.owner_of(&"a2"), Some(Id::new("a")));
        assert_eq!(group.owner_of(&"b1"), Some(Id::new("b")));
        assert_eq!(group.get(&"a2"), Some(&1));
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_subscribe_colliding_keys_fails() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&["x", "y"])).unwrap();

        let err = group.subscribe(Id::new("b"), lookup(&["z", "y"])).unwrap_err();
        assert_eq!(err, CollectionError::key_collision("b", "y"));
        assert!(!group.has_member(Id::new("b")));
        assert_eq!(group.owner_of(&"y"), Some(Id::new("a")));
        assert!(!group.has(&"z"));
    }

    #[test]
    fn test_subscribe_same_name_twice_fails() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&["x"])).unwrap();

        let err = group.subscribe(Id::new("a"), lookup(&["q"])).unwrap_err();
        assert_eq!(err, CollectionError::already_subscribed("a"));
    }

    #[test]
    fn test_unsubscribe_removes_only_that_member() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&["a1"])).unwrap();
        group.subscribe(Id::new("b"), lookup(&["b1", "b2"])).unwrap();

        let detached = group.unsubscribe(Id::new("b")).unwrap();

        assert_eq!(detached.len(), 2);
        assert!(!group.has(&"b1"));
        assert!(!group.has(&"b2"));
        assert_eq!(group.owner_of(&"b1"), None);
        assert_eq!(group_keys(&group), vec!["a1"]);
        assert!(group.member(Id::new("b")).is_none());
    }

    #[test]
    fn test_unsubscribe_unknown_fails() {
        let mut group: LookupGroup<&str, usize> = LookupGroup::new();
        assert_eq!(
            group.unsubscribe(Id::new("ghost")).unwrap_err(),
            CollectionError::not_subscribed("ghost")
        );
    }

    #[test]
    fn test_add_delegates_to_owner() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&[])).unwrap();
        group.subscribe(Id::new("b"), lookup(&[])).unwrap();

        group.add(Id::new("b"), "k", 7).unwrap();

        assert_eq!(group.owner_of(&"k"), Some(Id::new("b")));
        assert_eq!(group.member(Id::new("b")).unwrap().get(&"k"), Some(&7));
        assert!(group.member(Id::new("a")).unwrap().is_empty());
    }

    #[test]
    fn test_add_key_present_in_other_member_fails() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&["k"])).unwrap();
        group.subscribe(Id::new("b"), lookup(&[])).unwrap();

        let err = group.add(Id::new("b"), "k", 1).unwrap_err();
        assert_eq!(err, CollectionError::duplicate_key("k"));
        assert!(group.member(Id::new("b")).unwrap().is_empty());
    }

    #[test]
    fn test_add_to_unknown_member_fails() {
        let mut group: LookupGroup<&str, usize> = LookupGroup::new();
        assert_eq!(
            group.add(Id::new("nobody"), "k", 1).unwrap_err(),
            CollectionError::not_subscribed("nobody")
        );
    }

    #[test]
    fn test_remove_delegates_via_owner() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&["a1"])).unwrap();
        group.subscribe(Id::new("b"), lookup(&["b1"])).unwrap();

        assert_eq!(group.remove(&"b1").unwrap(), 0);
        assert!(!group.has(&"b1"));
        assert!(group.member(Id::new("b")).unwrap().is_empty());
        assert_eq!(
            group.remove(&"b1").unwrap_err(),
            CollectionError::missing_key("b1")
        );
    }

    #[test]
    fn test_events_are_tagged_with_owner() {
        let mut group = LookupGroup::new();
        let events = group.watch();
        let a = Id::new("a");

        group.subscribe(a, lookup(&["x"])).unwrap();
        group.add(a, "y", 1).unwrap();
        group.remove(&"x").unwrap();
        group.unsubscribe(a).unwrap();

        assert_eq!(
            events.drain(),
            vec![
                GroupEvent::Subscribed { owner: a },
                GroupEvent::Added { owner: a, key: "x" },
                GroupEvent::Added { owner: a, key: "y" },
                GroupEvent::Removed { owner: a, key: "x" },
                GroupEvent::Removed { owner: a, key: "y" },
                GroupEvent::Unsubscribed { owner: a },
            ]
        );
    }

    #[test]
    fn test_rearrange_member() {
        let mut group = LookupGroup::new();
        let a = Id::new("a");
        group.subscribe(a, lookup(&["p", "q", "r"])).unwrap();
        let events = group.watch();

        group.rearrange(a, &["r", "p", "q"]).unwrap();

        let ordered: Vec<_> = group.member(a).unwrap().keys().copied().collect();
        assert_eq!(ordered, vec!["r", "p", "q"]);
        assert_eq!(events.drain(), vec![GroupEvent::Sorted { owner: a }]);
    }

    #[test]
    fn test_filter_and_find_span_members() {
        let mut group = LookupGroup::new();
        group.subscribe(Id::new("a"), lookup(&["a0", "a1"])).unwrap();
        group.subscribe(Id::new("b"), lookup(&["b0", "b1"])).unwrap();

        let firsts: Vec<_> = group.filter(|_, idx| *idx == 0).map(|(k, _)| *k).collect();
        assert_eq!(firsts, vec!["a0", "b0"]);
        assert_eq!(group.find(|key, _| key.starts_with('b')), Some((&"b0", &0)));
    }

    proptest! {
        #[test]
        fn prop_keys_stay_globally_unique(
            first in proptest::collection::hash_set(0u32..50, 0..20),
            second in proptest::collection::hash_set(0u32..50, 0..20),
        ) {
            let mut group = LookupGroup::new();
            let a = Id::new("first");
            let b = Id::new("second");
            let first_lookup = Lookup::from_items(first.iter().map(|k| (*k, ()))).unwrap();
            let second_lookup = Lookup::from_items(second.iter().map(|k| (*k, ()))).unwrap();

            group.subscribe(a, first_lookup).unwrap();
            let collides = first.intersection(&second).next().is_some();
            let result = group.subscribe(b, second_lookup);
            prop_assert_eq!(result.is_err(), collides);

            if !collides {
                for key in &second {
                    prop_assert_eq!(group.owner_of(key), Some(b));
                }
                group.unsubscribe(b).unwrap();
                for key in &second {
                    prop_assert!(!group.has(key));
                    prop_assert_eq!(group.owner_of(key), None);
                }
            }
            for key in &first {
                prop_assert_eq!(group.owner_of(key), Some(a));
            }
        }
    }
}
