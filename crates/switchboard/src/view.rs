//! Views: the visual counterparts of model records.
//!
//! # Overview
//!
//! - [`Widget`] - Anything that can be rendered and torn down.
//! - [`WidgetRegistry`] - Picks the widget constructor for a record by its
//!   type tag, with a fallback.
//! - [`ViewCollection`] - Keyed widgets kept in step with a record set.
//! - [`SubviewCollection`] and [`SubviewCollectionGroup`] - Widgets for the
//!   nested records of a parent, driven by a declarative schema.
//! - [`StateView`], [`EndpointView`] and [`ConnectionView`] - The widgets
//!   of a diagram.

mod collection;
mod registry;
mod subview;
mod widgets;

pub use collection::{RecordFeed, RecordSet, SyncReport, ViewCollection, ViewOptions};
pub use registry::{ViewSpec, WidgetRegistry};
pub use subview::{SubviewCollection, SubviewCollectionGroup, SubviewSchema};
pub use widgets::{ConnectionView, EndpointView, StateTemplate, StateView};

use switchboard_core::identifier::Id;

use crate::model::{Connection, Endpoint, State};

/// Options forwarded to a widget when it is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Also remove the backing record from its record set.
    pub remove_record: bool,
    /// Also detach any visual links the widget owns.
    pub detach: bool,
}

/// A renderable view.
pub trait Widget {
    /// Draws or redraws the widget.
    fn render(&mut self);

    /// Tears the widget down. Called once, when it leaves its collection.
    fn destroy(&mut self, _options: &RemoveOptions) {}
}

/// Records that name the kind of widget they want.
pub trait Tagged {
    fn type_tag(&self) -> Option<Id>;
}

impl Tagged for State {
    fn type_tag(&self) -> Option<Id> {
        Some(self.kind())
    }
}

impl Tagged for Endpoint {
    fn type_tag(&self) -> Option<Id> {
        Some(self.category())
    }
}

impl Tagged for Connection {
    fn type_tag(&self) -> Option<Id> {
        None
    }
}
