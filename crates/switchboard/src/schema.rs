//! Declarative description of an editor: which collections exist, what each
//! state type looks like and which links are allowed.
//!
//! # Example
//!
//! ```
//! # use switchboard::schema::{DiagramSchema, EndpointSlot, StateType};
//! # use switchboard::model::{CategoryRule, EndpointRole};
//! # use switchboard::view::StateTemplate;
//! # use switchboard_core::{geometry::Size, identifier::Id};
//! let schema = DiagramSchema::new("flows")
//!     .with_state_collection("steps")
//!     .with_state_type(
//!         "step",
//!         StateType::new(StateTemplate::new(Size::new(100.0, 40.0)))
//!             .with_slot(EndpointSlot::new("inputs", "in", EndpointRole::Target))
//!             .with_slot(EndpointSlot::new("outputs", "out", EndpointRole::Source)),
//!     )
//!     .with_connection_collection("links", CategoryRule::new(&["outputs"], &["inputs"]));
//!
//! let state = schema.instantiate(Id::new("step"), Id::new("s1")).unwrap();
//! assert!(state.endpoint(Id::new("s1-out")).is_some());
//! ```

use indexmap::IndexMap;

use switchboard_core::{geometry::Size, identifier::Id};

use crate::{
    error::SwitchboardError,
    model::{Acceptance, Cardinality, ConnectionRule, Endpoint, EndpointRole, EntryPoint, State},
    view::StateTemplate,
};

/// An endpoint every new state of a type starts with.
///
/// The endpoint id is `"{state}-{suffix}"`.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSlot {
    category: Id,
    suffix: String,
    role: EndpointRole,
    cardinality: Cardinality,
}

impl EndpointSlot {
    pub fn new(category: &str, suffix: &str, role: EndpointRole) -> Self {
        Self {
            category: Id::new(category),
            suffix: suffix.to_string(),
            role,
            cardinality: Cardinality::Multiple,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn category(&self) -> Id {
        self.category
    }

    /// The endpoint this slot gives the state `state`.
    pub fn endpoint_for(&self, state: Id) -> Endpoint {
        let id = Id::new(&format!("{state}-{}", self.suffix));
        Endpoint::new(id, self.category)
            .with_role(self.role)
            .with_cardinality(self.cardinality)
    }
}

/// The look and initial endpoints of one type of state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateType {
    template: StateTemplate,
    slots: Vec<EndpointSlot>,
}

impl StateType {
    pub fn new(template: StateTemplate) -> Self {
        Self {
            template,
            slots: Vec::new(),
        }
    }

    pub fn with_slot(mut self, slot: EndpointSlot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn template(&self) -> &StateTemplate {
        &self.template
    }

    pub fn slots(&self) -> &[EndpointSlot] {
        &self.slots
    }

    /// Creates a state of this type with its initial endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if two slots produce the same endpoint id.
    pub fn instantiate(&self, kind: Id, id: Id) -> Result<State, SwitchboardError> {
        self.slots
            .iter()
            .enumerate()
            .try_fold(State::new(id, kind), |state, (ordinal, slot)| {
                state.with_endpoint(slot.endpoint_for(id).with_ordinal(ordinal))
            })
    }
}

impl Default for StateType {
    fn default() -> Self {
        Self::new(StateTemplate::new(Size::new(160.0, 80.0)))
    }
}

/// Everything needed to build a [`Diagram`](crate::plumbing::Diagram).
#[derive(Debug)]
pub struct DiagramSchema {
    pub(crate) name: Id,
    pub(crate) state_collections: Vec<Id>,
    pub(crate) state_types: IndexMap<Id, StateType>,
    pub(crate) fallback_type: StateType,
    pub(crate) connection_rules: Vec<ConnectionRule>,
    pub(crate) entry: Option<EntryPoint>,
}

impl DiagramSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: Id::new(name),
            state_collections: Vec::new(),
            state_types: IndexMap::new(),
            fallback_type: StateType::default(),
            connection_rules: Vec::new(),
            entry: None,
        }
    }

    /// Adds a state collection. The first one receives states that do not
    /// name a collection.
    pub fn with_state_collection(mut self, name: &str) -> Self {
        self.state_collections.push(Id::new(name));
        self
    }

    pub fn with_state_type(mut self, kind: &str, state_type: StateType) -> Self {
        self.state_types.insert(Id::new(kind), state_type);
        self
    }

    /// Sets the type used for states whose kind is not registered.
    pub fn with_fallback_type(mut self, state_type: StateType) -> Self {
        self.fallback_type = state_type;
        self
    }

    /// Adds a connection collection. Links go to the first collection, in
    /// the order added, that accepts them.
    pub fn with_connection_collection(
        mut self,
        name: &str,
        acceptance: impl Acceptance + 'static,
    ) -> Self {
        self.connection_rules
            .push(ConnectionRule::new(Id::new(name), acceptance));
        self
    }

    /// Gives the diagram an entry point that may target endpoints of the
    /// listed categories.
    pub fn with_entry_point(mut self, id: &str, target_categories: &[&str]) -> Self {
        self.entry = Some(EntryPoint::new(Id::new(id), target_categories));
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn default_collection(&self) -> Option<Id> {
        self.state_collections.first().copied()
    }

    pub fn state_type(&self, kind: Id) -> &StateType {
        self.state_types.get(&kind).unwrap_or(&self.fallback_type)
    }

    /// Creates a new state of type `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the type's slots collide.
    pub fn instantiate(&self, kind: Id, id: Id) -> Result<State, SwitchboardError> {
        self.state_type(kind).instantiate(kind, id)
    }
}
