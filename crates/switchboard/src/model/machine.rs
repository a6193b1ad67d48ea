//! The state machine graph: states, their endpoints and the connections
//! between endpoints.
//!
//! # Overview
//!
//! [`StateMachine`] keeps three [`LookupGroup`]s:
//!
//! - **states**, one member per state collection;
//! - **endpoints**, a global index from endpoint id to category with one
//!   member per state, so every endpoint id is unique across the diagram;
//! - **connections**, one member per connection collection.
//!
//! Each group publishes its changes, which is how views and the plumbing
//! bridge learn about the model. Removals cascade: a removed endpoint takes
//! its connections (and the entry target) with it, and a removed state
//! takes its endpoints.

use std::fmt;

use log::{debug, info};

use switchboard_core::{
    error::CollectionError,
    events::EventStream,
    geometry::Point,
    group::{GroupEvent, LookupGroup},
    identifier::Id,
    lookup::Lookup,
};

use super::{Connection, ConnectionRule, Endpoint, EntryEvent, EntryPoint, LinkCandidate, State};
use crate::error::SwitchboardError;

type Result<T> = std::result::Result<T, SwitchboardError>;

/// Why a link between two endpoints was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No connection collection accepts the pair.
    NoAcceptingCollection,
    /// A single-cardinality endpoint is already connected.
    EndpointSaturated { endpoint: Id },
    /// The pair's identity already names a connection between other
    /// endpoints.
    IdentityTaken { connection: Id },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAcceptingCollection => f.write_str("no connection collection accepts the link"),
            Self::EndpointSaturated { endpoint } => {
                write!(f, "endpoint `{endpoint}` takes no further connections")
            }
            Self::IdentityTaken { connection } => {
                write!(f, "connection `{connection}` already joins other endpoints")
            }
        }
    }
}

/// Outcome of routing a link to a connection collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// The pair is already connected; the connection is reused.
    Existing { connection: Id, collection: Id },
    /// The named collection accepts the link.
    Accepted { collection: Id },
    Rejected(RejectReason),
}

/// The graph model of a diagram.
#[derive(Debug, Default)]
pub struct StateMachine {
    states: LookupGroup<Id, State>,
    endpoints: LookupGroup<Id, Id>,
    connections: LookupGroup<Id, Connection>,
    rules: Vec<ConnectionRule>,
    entry: Option<EntryPoint>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty state collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection already exists.
    pub fn add_state_collection(&mut self, name: Id) -> Result<()> {
        self.states.subscribe(name, Lookup::new())?;
        Ok(())
    }

    /// Registers a connection collection. Collections are offered new links
    /// in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection already exists.
    pub fn add_connection_collection(&mut self, rule: ConnectionRule) -> Result<()> {
        self.connections.subscribe(rule.name(), Lookup::new())?;
        self.rules.push(rule);
        Ok(())
    }

    pub fn set_entry_point(&mut self, entry: EntryPoint) {
        self.entry = Some(entry);
    }

    pub fn watch_states(&mut self) -> EventStream<GroupEvent<Id>> {
        self.states.watch()
    }

    /// Streams endpoint changes; the event owner is the endpoint's state.
    pub fn watch_endpoints(&mut self) -> EventStream<GroupEvent<Id>> {
        self.endpoints.watch()
    }

    pub fn watch_connections(&mut self) -> EventStream<GroupEvent<Id>> {
        self.connections.watch()
    }

    /// Streams entry target changes, if the machine has an entry point.
    pub fn watch_entry(&mut self) -> Option<EventStream<EntryEvent>> {
        self.entry.as_mut().map(EntryPoint::watch)
    }

    pub fn states(&self) -> &LookupGroup<Id, State> {
        &self.states
    }

    pub fn state(&self, id: Id) -> Option<&State> {
        self.states.get(&id)
    }

    /// The state collection holding `state`.
    pub fn state_collection(&self, state: Id) -> Option<Id> {
        self.states.owner_of(&state)
    }

    pub fn connections(&self) -> &LookupGroup<Id, Connection> {
        &self.connections
    }

    pub fn connection(&self, id: Id) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// The connection collection holding `connection`.
    pub fn connection_collection(&self, connection: Id) -> Option<Id> {
        self.connections.owner_of(&connection)
    }

    pub fn entry_point(&self) -> Option<&EntryPoint> {
        self.entry.as_ref()
    }

    pub fn is_entry(&self, endpoint: Id) -> bool {
        self.entry.as_ref().is_some_and(|entry| entry.id() == endpoint)
    }

    /// Looks up an endpoint on any state, or the entry point itself.
    pub fn endpoint(&self, id: Id) -> Option<&Endpoint> {
        match &self.entry {
            Some(entry) if entry.id() == id => Some(entry.endpoint()),
            _ => self.state_endpoint(id).ok(),
        }
    }

    /// The state owning `endpoint`.
    pub fn state_of(&self, endpoint: Id) -> Option<&State> {
        let state = self.endpoints.owner_of(&endpoint)?;
        self.states.get(&state)
    }

    /// Ids of every connection touching `endpoint`.
    pub fn connections_of(&self, endpoint: Id) -> Vec<Id> {
        self.connections
            .filter(|_, connection| connection.touches(endpoint))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Adds `state` and its endpoints to `collection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is unknown, the state id is taken,
    /// or any of its endpoint ids is already in use.
    pub fn add_state(&mut self, collection: Id, state: State) -> Result<()> {
        let id = state.id();
        if !self.states.has_member(collection) {
            return Err(SwitchboardError::unknown_collection(collection));
        }
        if self.states.has(&id) {
            return Err(CollectionError::duplicate_key(id).into());
        }
        if let Some(entry) = &self.entry {
            if state.endpoint(entry.id()).is_some() {
                return Err(CollectionError::key_collision(id, entry.id()).into());
            }
        }

        let index = Lookup::from_items(
            state
                .endpoints()
                .iter()
                .map(|(endpoint, value)| (*endpoint, value.category())),
        )?;
        self.endpoints.subscribe(id, index)?;
        self.states.add(collection, id, state)?;

        debug!(state:? = id, collection:? = collection; "Added state");
        Ok(())
    }

    /// Removes a state, first removing every connection touching its
    /// endpoints, then the entry target if it points at one of them, then
    /// the endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the state is unknown.
    pub fn remove_state(&mut self, id: Id) -> Result<State> {
        let endpoints: Vec<Id> = self
            .endpoints
            .member(id)
            .ok_or_else(|| SwitchboardError::unknown_state(id))?
            .keys()
            .copied()
            .collect();

        for endpoint in &endpoints {
            self.drop_connections(*endpoint)?;
        }
        for endpoint in &endpoints {
            self.drop_entry_target(*endpoint);
        }
        self.endpoints.unsubscribe(id)?;
        let state = self.states.remove(&id)?;

        info!(state:? = id, endpoints = endpoints.len(); "Removed state");
        Ok(state)
    }

    /// Adds `endpoint` to the state `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state is unknown or the endpoint id is taken.
    pub fn add_endpoint(&mut self, state: Id, endpoint: Endpoint) -> Result<()> {
        if !self.states.has(&state) {
            return Err(SwitchboardError::unknown_state(state));
        }
        if self.is_entry(endpoint.id()) {
            return Err(CollectionError::duplicate_key(endpoint.id()).into());
        }

        let id = endpoint.id();
        self.endpoints.add(state, id, endpoint.category())?;
        self.states
            .get_mut(&state)
            .ok_or_else(|| SwitchboardError::unknown_state(state))?
            .insert_endpoint(endpoint)?;

        debug!(endpoint:? = id, state:? = state; "Added endpoint");
        Ok(())
    }

    /// Removes an endpoint together with its connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unknown.
    pub fn remove_endpoint(&mut self, id: Id) -> Result<Endpoint> {
        let state = self
            .endpoints
            .owner_of(&id)
            .ok_or_else(|| SwitchboardError::unknown_endpoint(id))?;

        self.drop_connections(id)?;
        self.drop_entry_target(id);
        self.endpoints.remove(&id)?;
        let endpoint = self
            .states
            .get_mut(&state)
            .ok_or_else(|| SwitchboardError::unknown_state(state))?
            .take_endpoint(id)?;

        debug!(endpoint:? = id, state:? = state; "Removed endpoint");
        Ok(endpoint)
    }

    /// Reorders the endpoints of one category on a state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state, category or any listed endpoint is
    /// unknown.
    pub fn rearrange_endpoints(&mut self, state: Id, category: Id, order: &[Id]) -> Result<()> {
        self.states
            .get_mut(&state)
            .ok_or_else(|| SwitchboardError::unknown_state(state))?
            .rearrange_endpoints(category, order)
    }

    /// Stores the diagram-local position of a state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state is unknown.
    pub fn set_layout(&mut self, state: Id, layout: Point) -> Result<()> {
        self.states
            .get_mut(&state)
            .ok_or_else(|| SwitchboardError::unknown_state(state))?
            .set_layout(layout);
        Ok(())
    }

    /// Decides where a link from `source` to `target` belongs, without
    /// changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is not on a state.
    pub fn route(&self, source: Id, target: Id) -> Result<Routing> {
        let connection = Id::connection(source, target);
        if let Some(collection) = self.connections.owner_of(&connection) {
            if !self.joins(connection, source, target) {
                return Ok(Routing::Rejected(RejectReason::IdentityTaken { connection }));
            }
            return Ok(Routing::Existing {
                connection,
                collection,
            });
        }

        let source = self.state_endpoint(source)?;
        let target = self.state_endpoint(target)?;
        for endpoint in [source, target] {
            if self.is_saturated(endpoint) {
                return Ok(Routing::Rejected(RejectReason::EndpointSaturated {
                    endpoint: endpoint.id(),
                }));
            }
        }

        let candidate = self.candidate(source, target)?;
        let routing = self
            .rules
            .iter()
            .find(|rule| rule.accepts(&candidate))
            .map_or(Routing::Rejected(RejectReason::NoAcceptingCollection), |rule| {
                Routing::Accepted {
                    collection: rule.name(),
                }
            });
        Ok(routing)
    }

    /// Connects `source` to `target` in the first accepting collection.
    ///
    /// Connecting an already connected pair is a no-op reported as
    /// [`Routing::Existing`]; a refused link changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is not on a state.
    pub fn connect(&mut self, source: Id, target: Id) -> Result<Routing> {
        let routing = self.route(source, target)?;
        if let Routing::Accepted { collection } = routing {
            let connection = Connection::new(source, target);
            self.connections
                .add(collection, connection.id(), connection)?;
            debug!(
                connection:? = connection.id(),
                collection:? = collection;
                "Connected endpoints"
            );
        }
        Ok(routing)
    }

    /// Whether `connection` exists and runs from `source` to `target`.
    ///
    /// Endpoint ids may contain `-`, so two pairs can share a joined id.
    pub fn joins(&self, connection: Id, source: Id, target: Id) -> bool {
        self.connections
            .get(&connection)
            .is_some_and(|stored| stored.source() == source && stored.target() == target)
    }

    /// Removes a connection. Unknown ids are ignored.
    pub fn disconnect(&mut self, connection: Id) -> Option<Connection> {
        let removed = self.connections.remove(&connection).ok()?;
        debug!(connection:? = connection; "Disconnected endpoints");
        Some(removed)
    }

    /// Decides whether the entry point may target `target`.
    ///
    /// Accepted links are reported with the entry point's id as collection.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no entry point or `target` is not on a
    /// state.
    pub fn route_entry(&self, target: Id) -> Result<Routing> {
        let entry = self
            .entry
            .as_ref()
            .ok_or_else(|| SwitchboardError::Graph("diagram has no entry point".to_string()))?;

        if entry.target() == Some(target) {
            return Ok(Routing::Existing {
                connection: Id::connection(entry.id(), target),
                collection: entry.id(),
            });
        }

        let endpoint = self.state_endpoint(target)?;
        if !entry.accepts(endpoint) {
            return Ok(Routing::Rejected(RejectReason::NoAcceptingCollection));
        }
        if self.is_saturated(endpoint) {
            return Ok(Routing::Rejected(RejectReason::EndpointSaturated { endpoint: target }));
        }
        Ok(Routing::Accepted {
            collection: entry.id(),
        })
    }

    /// Points the entry at `target`, replacing any previous target, which is
    /// returned. Setting the current target again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no entry point, `target` is unknown, or
    /// the entry point may not target it.
    pub fn set_entry_target(&mut self, target: Id) -> Result<Option<Id>> {
        match self.route_entry(target)? {
            Routing::Existing { .. } => Ok(Some(target)),
            Routing::Accepted { .. } => {
                let previous = self.entry.as_mut().and_then(|entry| entry.replace(target));
                info!(target:? = target; "Entry target set");
                Ok(previous)
            }
            Routing::Rejected(reason) => Err(SwitchboardError::Graph(format!(
                "`{target}` cannot be the entry target: {reason}"
            ))),
        }
    }

    /// Clears the entry target, returning it.
    pub fn unset_entry_target(&mut self) -> Option<Id> {
        let previous = self.entry.as_mut()?.clear()?;
        info!(target:? = previous; "Entry target unset");
        Some(previous)
    }

    fn state_endpoint(&self, id: Id) -> Result<&Endpoint> {
        self.state_of(id)
            .and_then(|state| state.endpoint(id))
            .ok_or_else(|| SwitchboardError::unknown_endpoint(id))
    }

    fn candidate<'a>(&'a self, source: &'a Endpoint, target: &'a Endpoint) -> Result<LinkCandidate<'a>> {
        let state = |endpoint: &Endpoint| {
            self.states
                .get(&endpoint.state())
                .zip(self.states.owner_of(&endpoint.state()))
                .ok_or_else(|| SwitchboardError::unknown_state(endpoint.state()))
        };
        let (source_state, source_collection) = state(source)?;
        let (target_state, target_collection) = state(target)?;
        Ok(LinkCandidate {
            source,
            target,
            source_state,
            target_state,
            source_collection,
            target_collection,
        })
    }

    fn is_saturated(&self, endpoint: &Endpoint) -> bool {
        let Some(max) = endpoint.cardinality().max_connections() else {
            return false;
        };
        let entry_links = usize::from(
            self.entry
                .as_ref()
                .is_some_and(|entry| entry.target() == Some(endpoint.id())),
        );
        self.connections_of(endpoint.id()).len() + entry_links >= max
    }

    fn drop_connections(&mut self, endpoint: Id) -> Result<()> {
        for connection in self.connections_of(endpoint) {
            self.connections.remove(&connection)?;
        }
        Ok(())
    }

    fn drop_entry_target(&mut self, endpoint: Id) {
        let targets_endpoint = self
            .entry
            .as_ref()
            .is_some_and(|entry| entry.target() == Some(endpoint));
        if targets_endpoint {
            self.unset_entry_target();
        }
    }
}
