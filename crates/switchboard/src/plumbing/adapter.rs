//! The seam between the diagram and the line-drawing layer.

use std::fmt;

use switchboard_core::identifier::Id;

use crate::model::Endpoint;

/// Identity of a line drawn by the visual layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u64);

impl LinkId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// A line between two endpoint handles, as drawn by the visual layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualLink {
    pub id: LinkId,
    pub source: Id,
    pub target: Id,
}

impl VisualLink {
    pub fn new(id: u64, source: Id, target: Id) -> Self {
        Self {
            id: LinkId::new(id),
            source,
            target,
        }
    }
}

/// How an endpoint handle behaves in the visual layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleOptions {
    /// Maximum number of lines at the handle; `None` for unbounded.
    pub max_connections: Option<usize>,
}

impl From<&Endpoint> for HandleOptions {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            max_connections: endpoint.cardinality().max_connections(),
        }
    }
}

/// Line-drawing operations the diagram needs from its visual layer.
///
/// Implementations draw and erase lines and turn endpoint elements into
/// draggable handles. They report user gestures back by calling
/// [`Diagram::on_drag_started`](super::Diagram::on_drag_started),
/// [`Diagram::on_link_created`](super::Diagram::on_link_created) and
/// [`Diagram::on_link_detached`](super::Diagram::on_link_detached).
pub trait Plumbing {
    /// Draws a line between two handles.
    fn create_link(&mut self, source: Id, target: Id) -> VisualLink;

    /// Erases a line. Erasing an unknown line does nothing.
    fn remove_link(&mut self, link: &VisualLink);

    /// Lets lines be dragged out of `handle`.
    fn make_source(&mut self, handle: Id, options: &HandleOptions);

    /// Lets lines be dropped onto `handle`.
    fn make_target(&mut self, handle: Id, options: &HandleOptions);

    /// Drops every handle registration of `handle`.
    fn release(&mut self, handle: Id);
}
