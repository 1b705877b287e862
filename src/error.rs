// src/error.rs
use colflow_layout::LayoutError;
use thiserror::Error;

/// Everything that can go wrong while replaying a flow script.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Script parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Distribution failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Event {index} ({event}) failed: {source}")]
    Event {
        index: usize,
        event: &'static str,
        #[source]
        source: LayoutError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
