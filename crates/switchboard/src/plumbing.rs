//! Connecting the model to a line-drawing layer.
//!
//! The visual layer sits behind the [`Plumbing`] trait. [`Diagram`] drives
//! it from model changes and turns the gestures it reports back into model
//! changes. [`RecordingPlumbing`] is the in-memory implementation used for
//! headless rendering and tests.

mod adapter;
mod diagram;
mod recording;

pub use adapter::{HandleOptions, LinkId, Plumbing, VisualLink};
pub use diagram::{Diagram, DiagramEvent, LinkOutcome, LinkState};
pub use recording::{PlumbingCall, RecordingPlumbing};
