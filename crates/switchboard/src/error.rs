//! Error types for Switchboard operations.
//!
//! This module provides the main error type [`SwitchboardError`] which wraps
//! the conditions that can occur while building, editing, laying out or
//! exporting a diagram.
//!
//! Rejected user links are *not* errors: they surface as
//! [`DiagramEvent::Unsupported`](crate::plumbing::DiagramEvent::Unsupported).

use std::io;

use thiserror::Error;

use switchboard_core::{error::CollectionError, identifier::Id};

/// The main error type for Switchboard operations.
#[derive(Debug, Error)]
pub enum SwitchboardError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl SwitchboardError {
    pub(crate) fn unknown_state(id: Id) -> Self {
        Self::Graph(format!("unknown state `{id}`"))
    }

    pub(crate) fn unknown_endpoint(id: Id) -> Self {
        Self::Graph(format!("unknown endpoint `{id}`"))
    }

    pub(crate) fn unknown_collection(id: Id) -> Self {
        Self::Graph(format!("unknown collection `{id}`"))
    }
}

impl From<crate::export::Error> for SwitchboardError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
