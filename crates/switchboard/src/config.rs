//! Configuration types for Switchboard editors.
//!
//! This module provides configuration structures that control which editor
//! preset is used, how states without a saved position are placed, and how
//! snapshots are styled. All types implement [`serde::Deserialize`] for
//! flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining every section.
//! - [`LayoutConfig`] - Controls automatic placement of states.
//! - [`EditorConfig`] - Selects the editor preset.
//! - [`StyleConfig`] - Controls visual styling options such as background color.
//!
//! # Example
//!
//! ```
//! # use switchboard::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.layout().num_cols(), 3);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use switchboard_core::color::Color;

use crate::{editors::EditorKind, layout::PackingStrategy};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Editor configuration section.
    #[serde(default)]
    editor: EditorConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, editor: EditorConfig, style: StyleConfig) -> Self {
        Self {
            layout,
            editor,
            style,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the editor configuration.
    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Automatic placement settings.
///
/// States that have no saved position are packed by the configured
/// [`PackingStrategy`]; the result is stored on the state.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    strategy: PackingStrategy,

    /// Column count for [`PackingStrategy::Columns`].
    #[serde(default = "default_num_cols")]
    num_cols: usize,

    /// Row width limit for [`PackingStrategy::Rows`].
    #[serde(default = "default_max_row_width")]
    max_row_width: f32,

    /// Space added around each state while packing.
    #[serde(default)]
    cell_padding: f32,
}

fn default_num_cols() -> usize {
    3
}

fn default_max_row_width() -> f32 {
    960.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: PackingStrategy::default(),
            num_cols: default_num_cols(),
            max_row_width: default_max_row_width(),
            cell_padding: 0.0,
        }
    }
}

impl LayoutConfig {
    pub fn new(strategy: PackingStrategy, num_cols: usize, max_row_width: f32) -> Self {
        Self {
            strategy,
            num_cols,
            max_row_width,
            cell_padding: 0.0,
        }
    }

    pub fn with_cell_padding(mut self, cell_padding: f32) -> Self {
        self.cell_padding = cell_padding;
        self
    }

    pub fn strategy(&self) -> PackingStrategy {
        self.strategy
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn max_row_width(&self) -> f32 {
        self.max_row_width
    }

    pub fn cell_padding(&self) -> f32 {
        self.cell_padding
    }

    /// Checks the values are usable for packing.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_cols == 0 {
            return Err("layout.num_cols must be at least 1".to_string());
        }
        if !(self.max_row_width > 0.0) {
            return Err(format!(
                "layout.max_row_width must be positive, got {}",
                self.max_row_width
            ));
        }
        if self.cell_padding < 0.0 {
            return Err(format!(
                "layout.cell_padding must not be negative, got {}",
                self.cell_padding
            ));
        }
        Ok(())
    }
}

/// Editor preset selection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    kind: EditorKind,
}

impl EditorConfig {
    pub fn new(kind: EditorKind) -> Self {
        Self { kind }
    }

    /// Returns the [`EditorKind`] whose schema diagrams are built with.
    pub fn kind(&self) -> EditorKind {
        self.kind
    }
}

/// Visual styling configuration for snapshots.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] for snapshots, as a color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Fill [`Color`] for state boxes, as a color string.
    #[serde(default)]
    node_fill: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.background_color.as_deref(), "background color")
    }

    /// Returns the parsed state fill [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string is invalid.
    pub fn node_fill(&self) -> Result<Option<Color>, String> {
        parse_color(self.node_fill.as_deref(), "node fill")
    }
}

fn parse_color(value: Option<&str>, what: &str) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {what} in config: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.layout().strategy(), PackingStrategy::Columns);
        assert_eq!(config.layout().num_cols(), 3);
        assert_eq!(config.editor().kind(), EditorKind::Dialogue);
        assert!(config.layout().validate().is_ok());
        assert_eq!(config.style().node_fill(), Ok(None));
    }

    #[test]
    fn test_invalid_layout_values() {
        let config = LayoutConfig::new(PackingStrategy::Columns, 0, 100.0);
        assert!(config.validate().is_err());

        let config = LayoutConfig::new(PackingStrategy::Rows, 2, 0.0);
        assert!(config.validate().is_err());

        let config = LayoutConfig::default().with_cell_padding(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let style = StyleConfig {
            background_color: Some("not-a-color".to_string()),
            node_fill: Some("#fafafa".to_string()),
        };
        assert!(style.background_color().is_err());
        assert!(style.node_fill().unwrap().is_some());
    }
}
