//! The bridge between the diagram model and the visual layer.
//!
//! # Overview
//!
//! A [`Diagram`] owns the [`StateMachine`], the state and connection views,
//! the injected [`Plumbing`] adapter and the [`Placement`] of states. It
//! turns user gestures reported by the visual layer into model changes and
//! model changes into visual ones:
//!
//! - a line dropped onto a handle becomes a connection in the first
//!   accepting collection, or is erased again with a single
//!   [`DiagramEvent::Unsupported`];
//! - a line pulled off becomes a removed connection;
//! - a removed state or endpoint takes its lines with it.
//!
//! Model changes flow to the views through the model's group events. After
//! each operation the diagram drains them and publishes [`DiagramEvent`]s:
//! removals first (connections, entry target, endpoints, states), then
//! additions in the opposite order.

use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info};

use switchboard_core::{
    events::{Emitter, EventStream},
    geometry::Point,
    group::GroupEvent,
    identifier::Id,
};

use super::{HandleOptions, Plumbing, VisualLink};
use crate::{
    error::SwitchboardError,
    layout::Placement,
    model::{
        Connection, DiagramData, EntryEvent, RejectReason, Routing, State, StateMachine,
    },
    schema::{DiagramSchema, StateType},
    view::{
        ConnectionView, EndpointView, RecordFeed, StateView, ViewCollection, ViewSpec,
        WidgetRegistry,
    },
};

type Result<T> = std::result::Result<T, SwitchboardError>;

/// A change of the diagram, published after every operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramEvent {
    StateAdded { state: Id, collection: Id },
    StateRemoved { state: Id, collection: Id },
    StateMoved { state: Id, layout: Point },
    EndpointAdded { endpoint: Id, state: Id },
    EndpointRemoved { endpoint: Id, state: Id },
    Connected { connection: Id, collection: Id },
    Disconnected { connection: Id, collection: Id },
    EntryConnected { target: Id },
    EntryDisconnected { target: Id },
    /// A drawn line was refused and erased.
    Unsupported {
        source: Id,
        target: Id,
        link: VisualLink,
        reason: RejectReason,
    },
}

/// Result of a line being drawn between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The endpoints are connected. `created` is `false` when an existing
    /// connection was reused.
    Connected {
        connection: Id,
        collection: Id,
        created: bool,
    },
    Rejected(RejectReason),
}

/// Where a pair of endpoints stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Unconnected,
    /// A line is being dragged out of the source.
    Pending,
    Connected { connection: Id },
}

#[derive(Debug)]
struct Feeds {
    states: EventStream<GroupEvent<Id>>,
    endpoints: EventStream<GroupEvent<Id>>,
    connections: EventStream<GroupEvent<Id>>,
    entry: Option<EventStream<EntryEvent>>,
}

/// An editable diagram drawn through a [`Plumbing`] adapter.
pub struct Diagram<P> {
    model: StateMachine,
    default_collection: Option<Id>,
    state_types: IndexMap<Id, StateType>,
    fallback_type: StateType,
    state_views: ViewCollection<State, StateView>,
    connection_views: ViewCollection<Connection, ConnectionView>,
    plumbing: P,
    placement: Placement,
    feeds: Feeds,
    entry_link: Option<VisualLink>,
    pending_source: Option<Id>,
    events: Emitter<DiagramEvent>,
}

impl<P: std::fmt::Debug> std::fmt::Debug for Diagram<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagram")
            .field("model", &self.model)
            .field("plumbing", &self.plumbing)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl<P: Plumbing> Diagram<P> {
    /// Builds an empty diagram for `schema`, registering the entry point's
    /// handle with `plumbing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema names a collection twice.
    pub fn new(schema: DiagramSchema, plumbing: P, placement: Placement) -> Result<Self> {
        let default_collection = schema.default_collection();
        let DiagramSchema {
            name,
            state_collections,
            state_types,
            fallback_type,
            connection_rules,
            entry,
        } = schema;

        let mut model = StateMachine::new();
        for collection in state_collections {
            model.add_state_collection(collection)?;
        }
        for rule in connection_rules {
            model.add_connection_collection(rule)?;
        }
        if let Some(entry) = entry {
            model.set_entry_point(entry);
        }

        let endpoint_registry = Rc::new(WidgetRegistry::new(EndpointView::build));
        let state_registry = state_registry(&state_types, &fallback_type, &endpoint_registry);
        let mut state_views = ViewCollection::new(Rc::new(state_registry));
        state_views.bind(RecordFeed::Group(model.watch_states()));
        let mut connection_views =
            ViewCollection::new(Rc::new(WidgetRegistry::new(ConnectionView::build)));
        connection_views.bind(RecordFeed::Group(model.watch_connections()));

        let feeds = Feeds {
            states: model.watch_states(),
            endpoints: model.watch_endpoints(),
            connections: model.watch_connections(),
            entry: model.watch_entry(),
        };

        let mut diagram = Self {
            model,
            default_collection,
            state_types,
            fallback_type,
            state_views,
            connection_views,
            plumbing,
            placement,
            feeds,
            entry_link: None,
            pending_source: None,
            events: Emitter::new(),
        };
        if let Some(entry) = diagram.model.entry_point() {
            let options = HandleOptions::from(entry.endpoint());
            diagram.plumbing.make_source(entry.id(), &options);
        }

        info!(schema:? = name; "Created diagram");
        Ok(diagram)
    }

    /// Builds a diagram for `schema` holding everything in `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not fit the schema.
    pub fn from_data(
        schema: DiagramSchema,
        plumbing: P,
        placement: Placement,
        data: &DiagramData,
    ) -> Result<Self> {
        let mut diagram = Self::new(schema, plumbing, placement)?;
        let collection = diagram.default_collection.ok_or_else(|| {
            SwitchboardError::Graph("schema has no state collection".to_string())
        })?;
        diagram.model.load(data, collection)?;
        diagram.pump()?;
        Ok(diagram)
    }

    /// Captures the model as a serializable snapshot.
    pub fn to_data(&self) -> DiagramData {
        self.model.to_data()
    }

    /// Opens a stream of this diagram's future events.
    pub fn watch(&mut self) -> EventStream<DiagramEvent> {
        self.events.watch()
    }

    pub fn model(&self) -> &StateMachine {
        &self.model
    }

    pub fn plumbing(&self) -> &P {
        &self.plumbing
    }

    pub fn plumbing_mut(&mut self) -> &mut P {
        &mut self.plumbing
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn state_views(&self) -> &ViewCollection<State, StateView> {
        &self.state_views
    }

    pub fn connection_views(&self) -> &ViewCollection<Connection, ConnectionView> {
        &self.connection_views
    }

    pub fn state_view(&self, state: Id) -> Option<&StateView> {
        self.state_views.by_record(state)
    }

    pub fn connection_view(&self, connection: Id) -> Option<&ConnectionView> {
        self.connection_views.by_record(connection)
    }

    /// The line from the entry point to its target, once drawn.
    pub fn entry_link(&self) -> Option<VisualLink> {
        self.entry_link
    }

    /// Creates a state of type `kind` with the type's initial endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the type's endpoint slots collide.
    pub fn instantiate(&self, kind: Id, id: Id) -> Result<State> {
        self.state_types
            .get(&kind)
            .unwrap_or(&self.fallback_type)
            .instantiate(kind, id)
    }

    /// Adds `state` to `collection`, or to the first state collection, and
    /// places it.
    ///
    /// # Errors
    ///
    /// Returns an error if the state or one of its endpoints clashes with
    /// the diagram, or the collection is unknown.
    pub fn add_state(&mut self, collection: Option<Id>, state: State) -> Result<()> {
        let collection = collection
            .or(self.default_collection)
            .ok_or_else(|| SwitchboardError::Graph("schema has no state collection".to_string()))?;
        let id = state.id();
        self.model.add_state(collection, state)?;
        self.pump()?;
        self.place(id)?;
        Ok(())
    }

    /// Removes a state together with its endpoints, connections and lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the state is unknown.
    pub fn remove_state(&mut self, id: Id) -> Result<State> {
        let endpoints: Vec<Id> = self
            .model
            .state(id)
            .ok_or_else(|| SwitchboardError::unknown_state(id))?
            .endpoints()
            .keys()
            .copied()
            .collect();
        self.erase_lines_of(&endpoints);
        let state = self.model.remove_state(id)?;
        self.pump()?;
        Ok(state)
    }

    /// Adds an endpoint to a state and registers its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the state is unknown or the endpoint id is taken.
    pub fn add_endpoint(&mut self, state: Id, endpoint: crate::model::Endpoint) -> Result<()> {
        self.model.add_endpoint(state, endpoint)?;
        self.pump()
    }

    /// Removes an endpoint together with its connections and lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unknown.
    pub fn remove_endpoint(&mut self, id: Id) -> Result<crate::model::Endpoint> {
        if self.model.state_of(id).is_none() {
            return Err(SwitchboardError::unknown_endpoint(id));
        }
        self.erase_lines_of(&[id]);
        let endpoint = self.model.remove_endpoint(id)?;
        self.pump()?;
        Ok(endpoint)
    }

    /// Reorders the endpoints of one category on a state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state, category or an endpoint is unknown.
    pub fn rearrange_endpoints(&mut self, state: Id, category: Id, order: &[Id]) -> Result<()> {
        self.model.rearrange_endpoints(state, category, order)?;
        self.sync_state_view(state)
    }

    /// Records that the user started dragging a line out of `source`.
    pub fn on_drag_started(&mut self, source: Id) {
        debug!(source:? = source; "Drag started");
        self.pending_source = Some(source);
    }

    /// Records that the user dropped a dragged line on nothing.
    pub fn on_drag_cancelled(&mut self) {
        self.pending_source = None;
    }

    /// Handles a line the visual layer drew from `source` to `target`.
    ///
    /// The line is kept if a connection collection accepts it, or if the
    /// pair is already connected (a duplicate line is erased). Otherwise it
    /// is erased and a single [`DiagramEvent::Unsupported`] is published.
    ///
    /// # Errors
    ///
    /// Returns an error, after erasing the line, if either endpoint is
    /// unknown.
    pub fn on_link_created(&mut self, source: Id, target: Id, link: VisualLink) -> Result<LinkOutcome> {
        self.pending_source = None;
        if self.model.is_entry(source) {
            return self.on_entry_link_created(target, link);
        }

        let routing = match self.model.connect(source, target) {
            Ok(routing) => routing,
            Err(err) => {
                self.plumbing.remove_link(&link);
                return Err(err);
            }
        };
        match routing {
            Routing::Accepted { collection } => {
                let connection = Id::connection(source, target);
                self.pump()?;
                if let Some(view) = self.connection_views.by_record_mut(connection) {
                    view.attach(link);
                }
                Ok(LinkOutcome::Connected {
                    connection,
                    collection,
                    created: true,
                })
            }
            Routing::Existing {
                connection,
                collection,
            } => {
                self.adopt_link(connection, link);
                Ok(LinkOutcome::Connected {
                    connection,
                    collection,
                    created: false,
                })
            }
            Routing::Rejected(reason) => Ok(self.reject(source, target, link, reason)),
        }
    }

    /// Handles a line the visual layer erased. Returns the removed
    /// connection, or `None` if the line was stale.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing the change fails.
    pub fn on_link_detached(&mut self, link: &VisualLink) -> Result<Option<Id>> {
        if self.entry_link.is_some_and(|entry| entry.id == link.id) {
            self.entry_link = None;
            self.model.unset_entry_target();
            self.pump()?;
            return Ok(Some(Id::connection(link.source, link.target)));
        }

        let connection = Id::connection(link.source, link.target);
        if !self.model.joins(connection, link.source, link.target) {
            debug!(connection:? = connection; "Ignoring detach of unknown connection");
            return Ok(None);
        }
        let current = self
            .connection_views
            .by_record(connection)
            .and_then(ConnectionView::link);
        if current.is_some_and(|current| current.id != link.id) {
            debug!(connection:? = connection; "Ignoring detach of a stale line");
            return Ok(None);
        }

        self.model.disconnect(connection);
        self.pump()?;
        Ok(Some(connection))
    }

    /// Connects two endpoints as if the user drew the line.
    ///
    /// An already connected pair is reused without drawing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is unknown.
    pub fn connect(&mut self, source: Id, target: Id) -> Result<LinkOutcome> {
        if self.model.is_entry(source) {
            return self.connect_entry(target);
        }
        if let Routing::Existing {
            connection,
            collection,
        } = self.model.route(source, target)?
        {
            return Ok(LinkOutcome::Connected {
                connection,
                collection,
                created: false,
            });
        }
        let link = self.plumbing.create_link(source, target);
        self.on_link_created(source, target, link)
    }

    /// Removes a connection and erases its line. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing the change fails.
    pub fn detach(&mut self, connection: Id) -> Result<Option<Connection>> {
        if let Some(link) = self.entry_link {
            if Id::connection(link.source, link.target) == connection {
                self.detach_entry()?;
                return Ok(None);
            }
        }

        let Some(existing) = self.model.connection(connection).copied() else {
            return Ok(None);
        };
        if let Some(link) = self
            .connection_views
            .by_record(connection)
            .and_then(ConnectionView::link)
        {
            self.plumbing.remove_link(&link);
        }
        self.model.disconnect(existing.id());
        self.pump()?;
        Ok(Some(existing))
    }

    /// Draws a line from the entry point to `target` as if the user drew it.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no entry point or `target` is unknown.
    pub fn connect_entry(&mut self, target: Id) -> Result<LinkOutcome> {
        let entry = self.entry_id()?;
        if let Routing::Existing {
            connection,
            collection,
        } = self.model.route_entry(target)?
        {
            if self.entry_link.is_some() {
                return Ok(LinkOutcome::Connected {
                    connection,
                    collection,
                    created: false,
                });
            }
        }
        let link = self.plumbing.create_link(entry, target);
        self.on_link_created(entry, target, link)
    }

    /// Erases the entry line and clears the entry target, returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing the change fails.
    pub fn detach_entry(&mut self) -> Result<Option<Id>> {
        match self.entry_link {
            Some(link) => {
                self.plumbing.remove_link(&link);
                self.on_link_detached(&link)?;
                Ok(Some(link.target))
            }
            None => self.unset_entry_target(),
        }
    }

    /// Points the entry at `target` and redraws its line, returning the
    /// previous target.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no entry point or it may not target
    /// `target`.
    pub fn set_entry_target(&mut self, target: Id) -> Result<Option<Id>> {
        let entry = self.entry_id()?;
        let previous = self.model.set_entry_target(target)?;
        if previous != Some(target) || self.entry_link.is_none() {
            if let Some(old) = self.entry_link.take() {
                self.plumbing.remove_link(&old);
            }
            self.entry_link = Some(self.plumbing.create_link(entry, target));
        }
        self.pump()?;
        Ok(previous)
    }

    /// Clears the entry target and erases its line, returning the target.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing the change fails.
    pub fn unset_entry_target(&mut self) -> Result<Option<Id>> {
        if let Some(link) = self.entry_link.take() {
            self.plumbing.remove_link(&link);
        }
        let previous = self.model.unset_entry_target();
        self.pump()?;
        Ok(previous)
    }

    /// Where the pair `source`, `target` stands.
    pub fn link_state(&self, source: Id, target: Id) -> LinkState {
        let connection = Id::connection(source, target);
        let entry_connected = self.model.is_entry(source)
            && self
                .model
                .entry_point()
                .is_some_and(|entry| entry.target() == Some(target));
        if entry_connected || self.model.connection(connection).is_some() {
            LinkState::Connected { connection }
        } else if self.pending_source == Some(source) {
            LinkState::Pending
        } else {
            LinkState::Unconnected
        }
    }

    /// Moves a state to the absolute position `position`, typically at the
    /// end of a drag, and saves the matching local position.
    ///
    /// # Errors
    ///
    /// Returns an error if the state is unknown.
    pub fn move_state(&mut self, state: Id, position: Point) -> Result<()> {
        let layout = self.placement.to_local(position);
        self.model.set_layout(state, layout)?;
        if let Some(view) = self.state_views.by_record_mut(state) {
            view.set_position(position);
        }
        self.events.emit(DiagramEvent::StateMoved { state, layout });
        Ok(())
    }

    /// Updates the scroll offset of the surface and repositions every state.
    ///
    /// # Errors
    ///
    /// Returns an error if a state cannot be placed.
    pub fn set_scroll(&mut self, scroll: Point) -> Result<()> {
        self.placement.set_scroll(scroll);
        self.layout()
    }

    /// The local position the next packed state of `kind` would get.
    pub fn preview_position(&self, kind: Id) -> Point {
        let size = self
            .state_types
            .get(&kind)
            .unwrap_or(&self.fallback_type)
            .template()
            .size();
        self.placement.peek(size)
    }

    /// Positions every state: saved positions are converted to absolute
    /// ones, states without one are packed and the result saved.
    ///
    /// # Errors
    ///
    /// Returns an error if a state has no view.
    pub fn layout(&mut self) -> Result<()> {
        let states: Vec<Id> = self.model.states().keys().copied().collect();
        for state in states {
            self.place(state)?;
        }
        Ok(())
    }

    /// Lays out and renders every view, drawing any missing lines.
    ///
    /// # Errors
    ///
    /// Returns an error if layout fails.
    pub fn render(&mut self) -> Result<()> {
        self.pump()?;
        self.layout()?;
        self.state_views.render();
        self.connection_views.render();

        let missing: Vec<(Id, Id, Id)> = self
            .connection_views
            .views()
            .values()
            .filter(|view| view.link().is_none())
            .map(|view| (view.connection(), view.source(), view.target()))
            .collect();
        for (connection, source, target) in missing {
            let link = self.plumbing.create_link(source, target);
            if let Some(view) = self.connection_views.by_record_mut(connection) {
                view.attach(link);
            }
        }

        if self.entry_link.is_none() {
            let entry = self
                .model
                .entry_point()
                .and_then(|entry| entry.target().map(|target| (entry.id(), target)));
            if let Some((entry, target)) = entry {
                self.entry_link = Some(self.plumbing.create_link(entry, target));
            }
        }
        debug!(states = self.state_views.len(), connections = self.connection_views.len(); "Rendered diagram");
        Ok(())
    }

    fn entry_id(&self) -> Result<Id> {
        self.model
            .entry_point()
            .map(|entry| entry.id())
            .ok_or_else(|| SwitchboardError::Graph("diagram has no entry point".to_string()))
    }

    fn on_entry_link_created(&mut self, target: Id, link: VisualLink) -> Result<LinkOutcome> {
        let routing = match self.model.route_entry(target) {
            Ok(routing) => routing,
            Err(err) => {
                self.plumbing.remove_link(&link);
                return Err(err);
            }
        };
        let source = link.source;
        match routing {
            Routing::Existing {
                connection,
                collection,
            } => {
                match self.entry_link {
                    Some(current) if current.id != link.id => self.plumbing.remove_link(&link),
                    _ => self.entry_link = Some(link),
                }
                Ok(LinkOutcome::Connected {
                    connection,
                    collection,
                    created: false,
                })
            }
            Routing::Accepted { collection } => {
                if let Some(old) = self.entry_link.take() {
                    self.plumbing.remove_link(&old);
                }
                self.model.set_entry_target(target)?;
                self.entry_link = Some(link);
                self.pump()?;
                Ok(LinkOutcome::Connected {
                    connection: Id::connection(source, target),
                    collection,
                    created: true,
                })
            }
            Routing::Rejected(reason) => Ok(self.reject(source, target, link, reason)),
        }
    }

    /// Keeps a single line per connection: a second line for an existing
    /// connection is erased, a connection without one adopts it.
    fn adopt_link(&mut self, connection: Id, link: VisualLink) {
        let current = self
            .connection_views
            .by_record(connection)
            .and_then(ConnectionView::link);
        match current {
            Some(current) if current.id != link.id => self.plumbing.remove_link(&link),
            Some(_) => {}
            None => {
                if let Some(view) = self.connection_views.by_record_mut(connection) {
                    view.attach(link);
                }
            }
        }
    }

    fn reject(&mut self, source: Id, target: Id, link: VisualLink, reason: RejectReason) -> LinkOutcome {
        self.plumbing.remove_link(&link);
        info!(source:? = source, target:? = target; "Link refused: {reason}");
        self.events.emit(DiagramEvent::Unsupported {
            source,
            target,
            link,
            reason,
        });
        LinkOutcome::Rejected(reason)
    }

    /// Erases the lines of every connection touching `endpoints`, and the
    /// entry line if it ends at one of them.
    fn erase_lines_of(&mut self, endpoints: &[Id]) {
        let mut links = Vec::new();
        for endpoint in endpoints {
            for connection in self.model.connections_of(*endpoint) {
                if let Some(link) = self
                    .connection_views
                    .by_record(connection)
                    .and_then(ConnectionView::link)
                {
                    links.push(link);
                }
            }
        }
        if let Some(entry) = self.entry_link {
            if endpoints.contains(&entry.target) {
                self.entry_link = None;
                links.push(entry);
            }
        }
        for link in links {
            self.plumbing.remove_link(&link);
        }
    }

    fn place(&mut self, state: Id) -> Result<Point> {
        let size = self
            .state_views
            .by_record(state)
            .map(StateView::size)
            .ok_or_else(|| SwitchboardError::Layout(format!("state `{state}` has no view")))?;
        let saved = self
            .model
            .state(state)
            .ok_or_else(|| SwitchboardError::unknown_state(state))?
            .layout();
        let layout = match saved {
            Some(layout) => layout,
            None => {
                let layout = self.placement.pack(size);
                self.model.set_layout(state, layout)?;
                layout
            }
        };
        let position = self.placement.to_absolute(layout);
        if let Some(view) = self.state_views.by_record_mut(state) {
            view.set_position(position);
        }
        Ok(position)
    }

    fn sync_state_view(&mut self, state: Id) -> Result<()> {
        let Some(record) = self.model.state(state) else {
            return Ok(());
        };
        if let Some(view) = self.state_views.by_record_mut(state) {
            view.sync_endpoints(record)?;
        }
        Ok(())
    }

    fn register_handle(&mut self, endpoint: Id) {
        let Some(record) = self.model.endpoint(endpoint) else {
            return;
        };
        let options = HandleOptions::from(record);
        let role = record.role();
        if role.is_source() {
            self.plumbing.make_source(endpoint, &options);
        }
        if role.is_target() {
            self.plumbing.make_target(endpoint, &options);
        }
    }

    /// Drains the model's events into the views, the visual layer and the
    /// diagram's own event stream.
    fn pump(&mut self) -> Result<()> {
        self.connection_views.sync(self.model.connections())?;
        self.state_views.sync(self.model.states())?;

        let connections = self.feeds.connections.drain();
        let endpoints = self.feeds.endpoints.drain();
        let states = self.feeds.states.drain();
        let entry = self
            .feeds
            .entry
            .as_ref()
            .map(EventStream::drain)
            .unwrap_or_default();
        let mut touched = IndexSet::new();

        for event in &connections {
            if let GroupEvent::Removed { owner, key } = event {
                self.events.emit(DiagramEvent::Disconnected {
                    connection: *key,
                    collection: *owner,
                });
            }
        }
        for event in &entry {
            if let EntryEvent::Unset { target } = event {
                self.events
                    .emit(DiagramEvent::EntryDisconnected { target: *target });
            }
        }
        for event in &endpoints {
            if let GroupEvent::Removed { owner, key } = event {
                self.plumbing.release(*key);
                touched.insert(*owner);
                self.events.emit(DiagramEvent::EndpointRemoved {
                    endpoint: *key,
                    state: *owner,
                });
            }
        }
        for event in &states {
            if let GroupEvent::Removed { owner, key } = event {
                self.events.emit(DiagramEvent::StateRemoved {
                    state: *key,
                    collection: *owner,
                });
            }
        }

        for event in &states {
            if let GroupEvent::Added { owner, key } = event {
                self.events.emit(DiagramEvent::StateAdded {
                    state: *key,
                    collection: *owner,
                });
            }
        }
        for event in &endpoints {
            if let GroupEvent::Added { owner, key } = event {
                self.register_handle(*key);
                touched.insert(*owner);
                self.events.emit(DiagramEvent::EndpointAdded {
                    endpoint: *key,
                    state: *owner,
                });
            }
        }
        for event in &entry {
            if let EntryEvent::Set { target } = event {
                self.events
                    .emit(DiagramEvent::EntryConnected { target: *target });
            }
        }
        for event in &connections {
            if let GroupEvent::Added { owner, key } = event {
                self.events.emit(DiagramEvent::Connected {
                    connection: *key,
                    collection: *owner,
                });
            }
        }

        for state in touched {
            self.sync_state_view(state)?;
        }
        Ok(())
    }
}

fn state_registry(
    state_types: &IndexMap<Id, StateType>,
    fallback_type: &StateType,
    endpoint_registry: &Rc<WidgetRegistry<crate::model::Endpoint, EndpointView>>,
) -> WidgetRegistry<State, StateView> {
    let fallback = fallback_type.template().clone();
    let endpoints = Rc::clone(endpoint_registry);
    let mut registry = WidgetRegistry::new(move |spec: &ViewSpec<'_, State>| {
        StateView::from_template(spec, &fallback, Rc::clone(&endpoints))
    });
    for (kind, state_type) in state_types {
        let template = state_type.template().clone();
        let endpoints = Rc::clone(endpoint_registry);
        registry = registry.register(*kind, move |spec: &ViewSpec<'_, State>| {
            StateView::from_template(spec, &template, Rc::clone(&endpoints))
        });
    }
    registry
}
