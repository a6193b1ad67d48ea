//! SVG snapshots of a diagram.

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use svg::{self, node::element as svg_element};

use switchboard_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use super::Error;
use crate::{
    config::StyleConfig,
    model::{Endpoint, State},
    plumbing::{Diagram, Plumbing},
};

const MARGIN: f32 = 20.0;
const HANDLE_RADIUS: f32 = 4.0;
const ENTRY_OFFSET: f32 = 40.0;

/// Builder for [`Svg`].
#[derive(Debug, Default)]
pub struct SvgBuilder<'a> {
    style: Option<&'a StyleConfig>,
}

impl<'a> SvgBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: &'a StyleConfig) -> Self {
        self.style = Some(style);
        self
    }

    /// Resolves the style colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if a configured color is not valid CSS.
    pub fn build(self) -> Result<Svg, Error> {
        let (background, node_fill) = match self.style {
            Some(style) => (
                style.background_color().map_err(Error::Render)?,
                style.node_fill().map_err(Error::Render)?,
            ),
            None => (None, None),
        };
        Ok(Svg {
            background,
            node_fill,
        })
    }
}

/// Renders diagrams to SVG documents.
#[derive(Debug, Clone)]
pub struct Svg {
    background: Option<Color>,
    node_fill: Option<Color>,
}

impl Svg {
    /// Renders every laid-out state, connection and the entry marker.
    ///
    /// States without a position are skipped, and so are lines touching
    /// them.
    pub fn render_diagram<P: Plumbing>(&self, diagram: &Diagram<P>) -> svg::Document {
        let mut handles = IndexMap::new();
        let mut states = svg_element::Group::new().set("class", "states");
        let mut content: Option<Bounds> = None;

        for view in diagram.state_views().views().values() {
            let Some(bounds) = view.bounds() else {
                continue;
            };
            content = Some(content.map_or(bounds, |content| content.merge(&bounds)));

            let fill = self
                .node_fill
                .map_or_else(|| "white".to_string(), |color| color.to_string());
            let label = if view.name().is_empty() {
                view.state().to_string()
            } else {
                view.name().to_string()
            };
            let mut group = svg_element::Group::new()
                .set("data-state", view.state().to_string())
                .add(
                    svg_element::Rectangle::new()
                        .set("x", bounds.min_x())
                        .set("y", bounds.min_y())
                        .set("width", bounds.width())
                        .set("height", bounds.height())
                        .set("rx", 6)
                        .set("fill", fill)
                        .set("stroke", "black"),
                )
                .add(
                    svg_element::Text::new(label)
                        .set("x", bounds.center().x())
                        .set("y", bounds.center().y())
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "middle"),
                );

            if let Some(state) = diagram.model().state(view.state()) {
                for (endpoint, position) in handle_positions(state, bounds) {
                    group = group.add(
                        svg_element::Circle::new()
                            .set("data-endpoint", endpoint.to_string())
                            .set("cx", position.x())
                            .set("cy", position.y())
                            .set("r", HANDLE_RADIUS),
                    );
                    handles.insert(endpoint, position);
                }
            }
            states = states.add(group);
        }

        let mut links = svg_element::Group::new().set("class", "connections");
        for view in diagram.connection_views().views().values() {
            if let (Some(source), Some(target)) =
                (handles.get(&view.source()), handles.get(&view.target()))
            {
                links = links.add(
                    line(*source, *target).set("data-connection", view.connection().to_string()),
                );
            }
        }

        let entry = diagram
            .model()
            .entry_point()
            .and_then(|entry| entry.target().map(|target| (entry.id(), target)));
        if let Some((entry, target)) = entry {
            if let Some(target) = handles.get(&target).copied() {
                let marker = Point::new(target.x() - ENTRY_OFFSET, target.y());
                let radius = HANDLE_RADIUS * 2.0;
                let marker_bounds = Bounds::new_from_top_left(
                    Point::new(marker.x() - radius, marker.y() - radius),
                    Size::new(radius * 2.0, radius * 2.0),
                );
                content = Some(
                    content.map_or(marker_bounds, |content| content.merge(&marker_bounds)),
                );
                links = links
                    .add(line(marker, target).set("data-entry", entry.to_string()))
                    .add(
                        svg_element::Circle::new()
                            .set("cx", marker.x())
                            .set("cy", marker.y())
                            .set("r", radius)
                            .set("fill", "black"),
                    );
            }
        }

        let content = content.unwrap_or_default();
        let width = content.width() + MARGIN * 2.0;
        let height = content.height() + MARGIN * 2.0;
        debug!(width, height; "Calculated snapshot size");

        let mut doc = svg::Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);
        if let Some(background) = self.background.filter(|color| !color.is_transparent()) {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", background.to_string()),
            );
        }

        let main_group = svg_element::Group::new()
            .set(
                "transform",
                format!(
                    "translate({}, {})",
                    MARGIN - content.min_x(),
                    MARGIN - content.min_y()
                ),
            )
            .add(states)
            .add(links);
        doc.add(main_group)
    }

    /// Renders `diagram` and writes it to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn export_to<P: Plumbing>(&self, diagram: &Diagram<P>, path: &Path) -> Result<(), Error> {
        let doc = self.render_diagram(diagram);
        svg::save(path, &doc).map_err(Error::Io)?;
        info!(path:? = path; "SVG exported");
        Ok(())
    }
}

fn line(from: Point, to: Point) -> svg_element::Line {
    svg_element::Line::new()
        .set("x1", from.x())
        .set("y1", from.y())
        .set("x2", to.x())
        .set("y2", to.y())
        .set("stroke", "black")
}

/// Spreads a state's handles along its sides: endpoints that take links on
/// the left edge, endpoints that only send on the right.
fn handle_positions(state: &State, bounds: Bounds) -> Vec<(Id, Point)> {
    let (left, right): (Vec<_>, Vec<_>) = state
        .endpoints()
        .values()
        .partition(|endpoint| endpoint.role().is_target());

    let spread = |endpoints: Vec<&Endpoint>, x: f32| {
        let step = bounds.height() / (endpoints.len() + 1) as f32;
        endpoints
            .into_iter()
            .enumerate()
            .map(move |(index, endpoint)| {
                let y = bounds.min_y() + step * (index + 1) as f32;
                (endpoint.id(), Point::new(x, y))
            })
            .collect::<Vec<_>>()
    };

    let mut positions = spread(left, bounds.min_x());
    positions.extend(spread(right, bounds.max_x()));
    positions
}
