//! The widgets of a diagram.

use std::rc::Rc;

use log::warn;

use switchboard_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use super::{
    RemoveOptions, SubviewCollectionGroup, SubviewSchema, SyncReport, ViewSpec, Widget,
    WidgetRegistry,
};
use crate::{
    error::SwitchboardError,
    model::{Connection, Endpoint, State},
    plumbing::VisualLink,
};

/// Draws one endpoint handle of a state.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointView {
    endpoint: Id,
    widget_type: Option<Id>,
    label: Option<String>,
    renders: usize,
    destroyed: bool,
}

impl EndpointView {
    pub fn build(spec: &ViewSpec<'_, Endpoint>) -> Self {
        Self {
            endpoint: spec.key,
            widget_type: spec.type_tag,
            label: spec
                .record
                .and_then(|endpoint| endpoint.label().map(str::to_string)),
            renders: 0,
            destroyed: false,
        }
    }

    pub fn endpoint(&self) -> Id {
        self.endpoint
    }

    pub fn widget_type(&self) -> Option<Id> {
        self.widget_type
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Widget for EndpointView {
    fn render(&mut self) {
        self.renders += 1;
    }

    fn destroy(&mut self, _options: &RemoveOptions) {
        self.destroyed = true;
    }
}

/// Size and endpoint layout shared by every state of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTemplate {
    size: Size,
    endpoints: Vec<SubviewSchema>,
}

impl StateTemplate {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            endpoints: Vec::new(),
        }
    }

    /// Draws the endpoints of `attribute` with `widget_type`.
    pub fn with_endpoints(mut self, attribute: &str, widget_type: &str) -> Self {
        self.endpoints.push(SubviewSchema::new(attribute, widget_type));
        self
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn endpoints(&self) -> &[SubviewSchema] {
        &self.endpoints
    }
}

/// Draws a state and its endpoint handles.
#[derive(Debug)]
pub struct StateView {
    state: Id,
    kind: Id,
    name: String,
    size: Size,
    position: Option<Point>,
    endpoints: SubviewCollectionGroup<Endpoint, EndpointView>,
    renders: usize,
}

impl StateView {
    /// Builds the view for a state from its type's template.
    pub fn from_template(
        spec: &ViewSpec<'_, State>,
        template: &StateTemplate,
        endpoint_registry: Rc<WidgetRegistry<Endpoint, EndpointView>>,
    ) -> Self {
        let mut view = Self {
            state: spec.key,
            kind: spec
                .record
                .map_or_else(|| spec.type_tag.unwrap_or(spec.key), State::kind),
            name: spec
                .record
                .map(|state| state.name().to_string())
                .unwrap_or_default(),
            size: template.size(),
            position: None,
            endpoints: SubviewCollectionGroup::new(template.endpoints(), endpoint_registry),
            renders: 0,
        };
        if let Some(state) = spec.record {
            if let Err(err) = view.sync_endpoints(state) {
                warn!(state:? = spec.key; "Could not build endpoint views: {err}");
            }
        }
        view
    }

    pub fn state(&self) -> Id {
        self.state
    }

    pub fn kind(&self) -> Id {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Absolute position of the top-left corner, once laid out.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }

    /// Absolute bounds, once laid out.
    pub fn bounds(&self) -> Option<Bounds> {
        self.position.map(|position| position.to_bounds(self.size))
    }

    pub fn endpoints(&self) -> &SubviewCollectionGroup<Endpoint, EndpointView> {
        &self.endpoints
    }

    pub fn endpoint(&self, id: Id) -> Option<&EndpointView> {
        self.endpoints.get(id)
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Brings the endpoint views in line with the state's endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint view cannot be added or removed.
    pub fn sync_endpoints(&mut self, state: &State) -> Result<SyncReport, SwitchboardError> {
        self.name = state.name().to_string();
        self.endpoints.sync(state.endpoints())
    }
}

impl Widget for StateView {
    fn render(&mut self) {
        self.renders += 1;
        self.endpoints.render();
    }

    fn destroy(&mut self, options: &RemoveOptions) {
        self.endpoints.clear(options);
    }
}

/// Draws a connection; holds the visual link once one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionView {
    connection: Id,
    source: Id,
    target: Id,
    link: Option<VisualLink>,
    renders: usize,
    destroyed: bool,
}

impl ConnectionView {
    pub fn build(spec: &ViewSpec<'_, Connection>) -> Self {
        let (source, target) = spec
            .record
            .map_or((spec.key, spec.key), |connection| {
                (connection.source(), connection.target())
            });
        Self {
            connection: spec.key,
            source,
            target,
            link: None,
            renders: 0,
            destroyed: false,
        }
    }

    pub fn connection(&self) -> Id {
        self.connection
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn link(&self) -> Option<VisualLink> {
        self.link
    }

    /// Attaches `link`, returning the link it replaces.
    pub(crate) fn attach(&mut self, link: VisualLink) -> Option<VisualLink> {
        self.link.replace(link)
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Widget for ConnectionView {
    fn render(&mut self) {
        self.renders += 1;
    }

    fn destroy(&mut self, options: &RemoveOptions) {
        if options.detach {
            self.link = None;
        }
        self.destroyed = true;
    }
}
