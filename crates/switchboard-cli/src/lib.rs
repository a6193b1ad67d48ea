//! CLI logic for the Switchboard diagram tool.
//!
//! Loads a diagram document, places every state that has no saved position
//! and writes either the placed document or an SVG snapshot.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use switchboard::{DiagramBuilder, SwitchboardError};

/// Run the Switchboard CLI application
///
/// An output path ending in `.json` receives the placed diagram document,
/// any other path an SVG snapshot.
///
/// # Errors
///
/// Returns `SwitchboardError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed documents or documents the editor's schema refuses
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), SwitchboardError> {
    info!(input:? = args.input, output:? = args.output; "Processing diagram");

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let diagram = builder.load(&source)?;

    let output = args.output.as_path();
    if output.extension().is_some_and(|ext| ext == "json") {
        fs::write(output, builder.to_json(&diagram)?)?;
        info!(path:? = output; "Diagram document written");
    } else {
        builder.export_svg(&diagram, output)?;
        info!(path:? = output; "SVG snapshot written");
    }

    Ok(())
}
