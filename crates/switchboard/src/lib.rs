//! Switchboard - the editing engine behind visual flow and routing editors.
//!
//! A diagram is a graph of states whose endpoints are joined by connections.
//! The engine keeps that graph, mirrors it into view collections, keeps an
//! external line-drawing layer in step with it and places states that have
//! no saved position on a grid.
//!
//! - [`model`] - States, endpoints, connections and the entry point.
//! - [`view`] - Keyed widget collections kept in step with the model.
//! - [`plumbing`] - The bridge to the line-drawing layer.
//! - [`layout`] - Grid placement.
//! - [`schema`] and [`editors`] - What a diagram may contain.

pub mod config;
pub mod editors;
pub mod export;
pub mod layout;
pub mod model;
pub mod plumbing;
pub mod schema;
pub mod view;

mod error;

pub use switchboard_core::{color, events, geometry, group, identifier, lookup};

pub use error::SwitchboardError;

use std::path::Path;

use log::{debug, info};

use config::AppConfig;
use export::svg::SvgBuilder;
use layout::Placement;
use model::DiagramData;
use plumbing::{Diagram, Plumbing, RecordingPlumbing};

/// Loads, lays out and exports diagrams with one configuration.
///
/// # Examples
///
/// ```rust
/// use switchboard::{DiagramBuilder, config::AppConfig};
///
/// let json = r#"{
///     "states": [
///         {
///             "id": "s1",
///             "type": "send",
///             "name": "Hello",
///             "endpoints": [
///                 {"id": "s1-entry", "category": "entry_endpoint", "role": "target"}
///             ]
///         }
///     ],
///     "connections": [],
///     "entry_target": "s1-entry"
/// }"#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let diagram = builder.load(json).expect("Failed to load");
/// let svg = builder.render_svg(&diagram).expect("Failed to render");
/// assert!(svg.contains("Hello"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Builds a headless diagram from a JSON document and places every
    /// state.
    ///
    /// The schema is the configured editor's.
    ///
    /// # Errors
    ///
    /// Returns `SwitchboardError` if the configuration is invalid, the JSON
    /// is malformed or the document does not fit the schema.
    pub fn load(&self, json: &str) -> Result<Diagram<RecordingPlumbing>, SwitchboardError> {
        self.config
            .layout()
            .validate()
            .map_err(SwitchboardError::Config)?;

        let data: DiagramData = serde_json::from_str(json)?;
        let kind = self.config.editor().kind();
        info!(
            editor:? = kind,
            states = data.states.len(),
            connections = data.connections.len();
            "Loading diagram"
        );

        let mut diagram = Diagram::from_data(
            kind.schema(),
            RecordingPlumbing::new(),
            Placement::new(self.config.layout()),
            &data,
        )?;
        diagram.render()?;

        debug!(links = diagram.plumbing().link_count(); "Diagram loaded");
        Ok(diagram)
    }

    /// Renders a snapshot of `diagram` to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns `SwitchboardError` if a configured style color is invalid.
    pub fn render_svg<P: Plumbing>(&self, diagram: &Diagram<P>) -> Result<String, SwitchboardError> {
        let svg = SvgBuilder::new().with_style(self.config.style()).build()?;
        let document = svg.render_diagram(diagram);
        info!("SVG rendered successfully");
        Ok(document.to_string())
    }

    /// Writes a snapshot of `diagram` to `path`.
    ///
    /// # Errors
    ///
    /// Returns `SwitchboardError` if a style color is invalid or the file
    /// cannot be written.
    pub fn export_svg<P: Plumbing>(
        &self,
        diagram: &Diagram<P>,
        path: impl AsRef<Path>,
    ) -> Result<(), SwitchboardError> {
        let svg = SvgBuilder::new().with_style(self.config.style()).build()?;
        svg.export_to(diagram, path.as_ref())?;
        Ok(())
    }

    /// Serializes `diagram`, including the positions assigned by layout.
    ///
    /// # Errors
    ///
    /// Returns `SwitchboardError` if serialization fails.
    pub fn to_json<P: Plumbing>(&self, diagram: &Diagram<P>) -> Result<String, SwitchboardError> {
        Ok(serde_json::to_string_pretty(&diagram.to_data())?)
    }
}
