//! Replays recorded layout events against the column distribution engine.
//!
//! The engine itself lives in `colflow-layout`. This crate adds a JSON
//! script format for driving it without a box tree, and the `colflow`
//! command line tool built on that.

pub mod error;
pub mod script;

pub use error::ReplayError;
pub use script::{
    ContainerReport, ContainerSpec, DistributionReport, FlowEvent, FlowScript, PlanEntry, replay,
};

pub use colflow_layout as layout;
pub use colflow_types as types;
