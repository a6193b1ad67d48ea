//! The diagram's single entry point.

use switchboard_core::{
    events::{Emitter, EventStream},
    identifier::Id,
};

use super::{Cardinality, Endpoint, EndpointRole, acceptance::ids};

/// A change of the entry point's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEvent {
    Set { target: Id },
    Unset { target: Id },
}

/// A source-only endpoint outside every state, marking where the state
/// machine starts.
///
/// It has at most one target. Choosing a new target replaces the old one.
#[derive(Debug)]
pub struct EntryPoint {
    endpoint: Endpoint,
    target_categories: Vec<Id>,
    target: Option<Id>,
    events: Emitter<EntryEvent>,
}

impl EntryPoint {
    /// Creates an entry point that may target endpoints of the listed
    /// categories. An empty list allows any target-capable endpoint.
    pub fn new(id: Id, target_categories: &[&str]) -> Self {
        let endpoint = Endpoint::new(id, Id::new("entry_point"))
            .with_role(EndpointRole::Source)
            .with_cardinality(Cardinality::Single);
        Self {
            endpoint,
            target_categories: ids(target_categories),
            target: None,
            events: Emitter::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.endpoint.id()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn watch(&mut self) -> EventStream<EntryEvent> {
        self.events.watch()
    }

    /// Returns `true` if `endpoint` may become the target.
    pub fn accepts(&self, endpoint: &Endpoint) -> bool {
        endpoint.role().is_target()
            && (self.target_categories.is_empty()
                || self.target_categories.contains(&endpoint.category()))
    }

    /// Points the entry at `target`, returning the replaced target.
    pub(crate) fn replace(&mut self, target: Id) -> Option<Id> {
        let previous = self.target.replace(target);
        if let Some(previous) = previous {
            self.events.emit(EntryEvent::Unset { target: previous });
        }
        self.events.emit(EntryEvent::Set { target });
        previous
    }

    pub(crate) fn clear(&mut self) -> Option<Id> {
        let previous = self.target.take()?;
        self.events.emit(EntryEvent::Unset { target: previous });
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_emits_unset_then_set() {
        let mut entry = EntryPoint::new(Id::new("start"), &["entry_endpoint"]);
        let events = entry.watch();

        assert_eq!(entry.replace(Id::new("s1-entry")), None);
        assert_eq!(entry.replace(Id::new("s2-entry")), Some(Id::new("s1-entry")));
        assert_eq!(entry.clear(), Some(Id::new("s2-entry")));
        assert_eq!(entry.clear(), None);

        assert_eq!(
            events.drain(),
            vec![
                EntryEvent::Set { target: Id::new("s1-entry") },
                EntryEvent::Unset { target: Id::new("s1-entry") },
                EntryEvent::Set { target: Id::new("s2-entry") },
                EntryEvent::Unset { target: Id::new("s2-entry") },
            ]
        );
    }

    #[test]
    fn test_accepts_categories() {
        let entry = EntryPoint::new(Id::new("start"), &["entry_endpoint"]);
        let allowed = Endpoint::new(Id::new("s1-entry"), Id::new("entry_endpoint"));
        let other = Endpoint::new(Id::new("s1-out"), Id::new("exit_endpoint"));
        let source_only = Endpoint::new(Id::new("s1-x"), Id::new("entry_endpoint"))
            .with_role(EndpointRole::Source);

        assert!(entry.accepts(&allowed));
        assert!(!entry.accepts(&other));
        assert!(!entry.accepts(&source_only));
    }
}
