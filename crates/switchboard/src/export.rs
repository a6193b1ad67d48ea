//! Export of laid-out diagrams.
//!
//! The only backend is [`svg`], which draws a static snapshot of a
//! [`Diagram`](crate::plumbing::Diagram): states as boxes with their
//! endpoint handles, connections as straight lines and the entry point as a
//! marker in front of its target.
//!
//! Export operations return [`Error`]. It converts into
//! [`SwitchboardError::Export`](crate::SwitchboardError::Export) at the
//! crate boundary.

pub mod svg;

/// Errors that can occur during diagram export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
