use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Out of memory while allocating {0}.")]
    OutOfMemory(&'static str),
    #[error("Distribution events out of order: {0}.")]
    EventOrder(&'static str),
}

pub mod boundary;
pub mod breakpoint;
pub mod column;
pub mod config;
pub mod distributor;
pub mod float;
pub mod locator;
pub mod pages;
pub mod paginator;
pub mod policy;
pub mod spanned;
pub mod util;

pub use self::boundary::BoundaryElement;
pub use self::breakpoint::{BreakKind, BreakPlan, Breakpoint, BreakpointRef};
pub use self::column::{Column, ColumnRow, ColumnRowStack, PaneTraversal, PaneVisitor};
pub use self::config::{DistributorConfig, PaginatorConfig};
pub use self::distributor::{Distributor, DistributorStack};
pub use self::float::{ColumnCreationPolicy, FloatQueue, PaneFloat, PaneFloatEntry};
pub use self::locator::{ColumnLocator, LocatorStack, PanePosition};
pub use self::pages::{PageDescription, PageSequence};
pub use self::paginator::Paginator;
pub use self::policy::BreakPolicy;
pub use self::spanned::SpannedElement;

pub use colflow_types::{BoxId, LayoutCoord, Rect, RowIndex, Translation};

#[cfg(test)]
mod distributor_test;
#[cfg(test)]
mod test_utils;
