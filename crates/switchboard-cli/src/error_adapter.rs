//! Error adapter for converting SwitchboardError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use switchboard::SwitchboardError;

/// Adapter rendering a [`SwitchboardError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a SwitchboardError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            SwitchboardError::Io(_) => "switchboard::io",
            SwitchboardError::Collection(_) => "switchboard::collection",
            SwitchboardError::Json(_) => "switchboard::json",
            SwitchboardError::Graph(_) => "switchboard::graph",
            SwitchboardError::Layout(_) => "switchboard::layout",
            SwitchboardError::Config(_) => "switchboard::config",
            SwitchboardError::Export(_) => "switchboard::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            SwitchboardError::Json(_) => "the input must be a diagram document in JSON",
            SwitchboardError::Graph(_) => {
                "check that every connection joins endpoints the editor allows to be linked"
            }
            SwitchboardError::Config(_) => "see the [layout], [editor] and [style] sections",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_follows_variant() {
        let err = SwitchboardError::Graph("unknown state `s9`".to_string());
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "switchboard::graph");
        assert!(adapter.help().is_some());
        assert_eq!(adapter.to_string(), "Graph error: unknown state `s9`");
    }

    #[test]
    fn test_io_has_no_help() {
        let err = SwitchboardError::Io(std::io::Error::other("disk full"));
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "switchboard::io");
        assert!(adapter.help().is_none());
    }
}
