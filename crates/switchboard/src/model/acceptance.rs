//! Rules deciding which connection collection accepts a link.
//!
//! Every connection collection carries an [`Acceptance`]. When a link is
//! drawn, the collections are asked in registration order and the first one
//! that accepts the [`LinkCandidate`] stores the new connection.

use std::fmt;

use switchboard_core::identifier::Id;

use super::{Endpoint, State};

/// Everything known about a proposed link between two endpoints.
#[derive(Debug, Clone, Copy)]
pub struct LinkCandidate<'a> {
    pub source: &'a Endpoint,
    pub target: &'a Endpoint,
    pub source_state: &'a State,
    pub target_state: &'a State,
    /// State collection holding the source state.
    pub source_collection: Id,
    /// State collection holding the target state.
    pub target_collection: Id,
}

impl LinkCandidate<'_> {
    /// Returns `true` if both endpoints live on the same state.
    pub fn is_self_link(&self) -> bool {
        self.source_state.id() == self.target_state.id()
    }
}

/// Decides whether a connection collection accepts a link.
pub trait Acceptance {
    fn accepts(&self, candidate: &LinkCandidate<'_>) -> bool;
}

impl<F> Acceptance for F
where
    F: Fn(&LinkCandidate<'_>) -> bool,
{
    fn accepts(&self, candidate: &LinkCandidate<'_>) -> bool {
        self(candidate)
    }
}

/// Accepts links by endpoint category and state collection.
///
/// Empty category or collection lists match anything. The source endpoint
/// must be able to act as a source and the target as a target.
#[derive(Debug, Clone, Default)]
pub struct CategoryRule {
    source_categories: Vec<Id>,
    target_categories: Vec<Id>,
    source_collections: Vec<Id>,
    target_collections: Vec<Id>,
    allow_self_links: bool,
}

impl CategoryRule {
    pub fn new(source_categories: &[&str], target_categories: &[&str]) -> Self {
        Self {
            source_categories: ids(source_categories),
            target_categories: ids(target_categories),
            ..Self::default()
        }
    }

    /// Restricts the state collections holding each end.
    pub fn between_collections(mut self, sources: &[&str], targets: &[&str]) -> Self {
        self.source_collections = ids(sources);
        self.target_collections = ids(targets);
        self
    }

    pub fn allow_self_links(mut self) -> Self {
        self.allow_self_links = true;
        self
    }
}

impl Acceptance for CategoryRule {
    fn accepts(&self, candidate: &LinkCandidate<'_>) -> bool {
        candidate.source.role().is_source()
            && candidate.target.role().is_target()
            && matches_any(&self.source_categories, candidate.source.category())
            && matches_any(&self.target_categories, candidate.target.category())
            && matches_any(&self.source_collections, candidate.source_collection)
            && matches_any(&self.target_collections, candidate.target_collection)
            && (self.allow_self_links || !candidate.is_self_link())
    }
}

/// A named connection collection and its acceptance rule.
pub struct ConnectionRule {
    name: Id,
    acceptance: Box<dyn Acceptance>,
}

impl fmt::Debug for ConnectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ConnectionRule {
    pub fn new(name: Id, acceptance: impl Acceptance + 'static) -> Self {
        Self {
            name,
            acceptance: Box::new(acceptance),
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn accepts(&self, candidate: &LinkCandidate<'_>) -> bool {
        self.acceptance.accepts(candidate)
    }
}

pub(super) fn ids(names: &[&str]) -> Vec<Id> {
    names.iter().map(|name| Id::new(name)).collect()
}

fn matches_any(allowed: &[Id], value: Id) -> bool {
    allowed.is_empty() || allowed.contains(&value)
}
