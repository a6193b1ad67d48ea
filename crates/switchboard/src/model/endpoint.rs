//! Connection points owned by states.

use serde::{Deserialize, Serialize};

use switchboard_core::identifier::Id;

/// Which ends of a connection an endpoint may take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    Source,
    Target,
    #[default]
    Both,
}

impl EndpointRole {
    pub fn is_source(self) -> bool {
        matches!(self, Self::Source | Self::Both)
    }

    pub fn is_target(self) -> bool {
        matches!(self, Self::Target | Self::Both)
    }
}

/// How many connections an endpoint may take part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one connection, in either position.
    Single,
    #[default]
    Multiple,
}

impl Cardinality {
    /// The maximum number of connections, `None` meaning unbounded.
    pub fn max_connections(self) -> Option<usize> {
        match self {
            Self::Single => Some(1),
            Self::Multiple => None,
        }
    }
}

/// A named connection point on a [`State`](super::State).
///
/// The endpoint's category is the name of the endpoint collection it lives
/// in on its state (`entry_endpoint`, `choice_endpoints`, `left`, ...), and
/// doubles as its type tag for view and acceptance dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    id: Id,
    state: Id,
    category: Id,
    role: EndpointRole,
    cardinality: Cardinality,
    label: Option<String>,
    ordinal: usize,
}

impl Endpoint {
    /// Creates an endpoint in `category`. It is bound to its state when
    /// added to one.
    pub fn new(id: Id, category: Id) -> Self {
        Self {
            id,
            state: id,
            category,
            role: EndpointRole::default(),
            cardinality: Cardinality::default(),
            label: None,
            ordinal: 0,
        }
    }

    pub fn with_role(mut self, role: EndpointRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// The owning state's id.
    pub fn state(&self) -> Id {
        self.state
    }

    pub fn category(&self) -> Id {
        self.category
    }

    pub fn role(&self) -> EndpointRole {
        self.role
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Position among the endpoints of the same category.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: usize) {
        self.ordinal = ordinal;
    }

    pub(crate) fn bind_to(&mut self, state: Id) {
        self.state = state;
    }
}
