pub mod fixtures;

use colflow::layout::{Column, ColumnRowStack};
use colflow::types::LayoutCoord;
use colflow::{DistributionReport, FlowScript, ReplayError};
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parses a script built with the fixtures and replays it.
pub fn run(script: Value) -> Result<DistributionReport, ReplayError> {
    init_logs();
    let script = FlowScript::from_json(&serde_json::to_string(&script)?)?;
    colflow::replay(&script)
}

pub fn columns(rows: &ColumnRowStack) -> Vec<&Column> {
    rows.iter().flat_map(|row| row.columns()).collect()
}

pub fn heights(rows: &ColumnRowStack) -> Vec<LayoutCoord> {
    columns(rows).into_iter().map(Column::height).collect()
}

pub fn starts(rows: &ColumnRowStack) -> Vec<LayoutCoord> {
    columns(rows).into_iter().map(Column::virtual_y).collect()
}

pub fn row_positions(rows: &ColumnRowStack) -> Vec<LayoutCoord> {
    rows.iter().map(|row| row.position()).collect()
}
