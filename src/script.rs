//! Flow scripts: a recorded layout pass, as JSON.
//!
//! A script names the container to distribute, the breaks found while it
//! was laid out as a single column, and the events the layout pass reported
//! in document order. Replaying the script drives a [`DistributorStack`] the
//! same way the layout pass would have.
//!
//! ```json
//! {
//!   "container": { "mode": "columns", "config": { "column_count": 2, "virtual_height": 40 } },
//!   "events": [
//!     { "event": "allocate", "y": 0, "element": { "kind": "block", "block": 1 } },
//!     { "event": "advance_head", "y": 40 },
//!     { "event": "commit" },
//!     { "event": "finalize" }
//!   ]
//! }
//! ```

use crate::error::ReplayError;
use colflow_layout::{
    BoundaryElement, BreakKind, BreakPlan, BreakPolicy, Breakpoint, ColumnRowStack, Distributor,
    DistributorConfig, DistributorStack, LayoutError, PaginatorConfig, PaneFloat, Paginator,
    SpannedElement,
};
use colflow_types::{BoxId, LayoutCoord};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn yes() -> bool {
    true
}

/// One entry of the break plan collected while laying out a container as a
/// single column. Entries must be in document order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum PlanEntry {
    /// An explicit column or page break.
    Break { virtual_y: LayoutCoord, kind: BreakKind },
    /// A spanned element and the break in front of it.
    Spanned {
        element: BoxId,
        virtual_y: LayoutCoord,
        #[serde(default)]
        margin_top: LayoutCoord,
        #[serde(default)]
        margin_bottom: LayoutCoord,
        /// It turned out not to span after all; its break is dropped.
        #[serde(default)]
        cancelled: bool,
    },
    /// A pane float seen at this point of the flow.
    FloatHeight { height: LayoutCoord },
}

/// The multi-pane container a distributor is created for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ContainerSpec {
    Columns {
        #[serde(default)]
        config: DistributorConfig,
        #[serde(default)]
        plan: Vec<PlanEntry>,
    },
    Pages {
        #[serde(default)]
        config: PaginatorConfig,
    },
}

impl ContainerSpec {
    /// Builds a fresh distributor for one pass over this container.
    pub fn build(&self) -> Result<Distributor, LayoutError> {
        match self {
            ContainerSpec::Columns { config, plan } => {
                let (breakpoints, spanned, leading_floats_height) = build_plan(plan)?;
                let config = DistributorConfig {
                    floats_virtual_height: config.floats_virtual_height + leading_floats_height,
                    ..config.clone()
                };
                Ok(Distributor::new(config, breakpoints, spanned))
            }
            ContainerSpec::Pages { config } => Ok(Paginator::new(config.clone()).into()),
        }
    }
}

fn build_plan(
    entries: &[PlanEntry],
) -> Result<(Vec<Breakpoint>, Vec<SpannedElement>, LayoutCoord), LayoutError> {
    let mut plan = BreakPlan::new();

    for entry in entries {
        match *entry {
            PlanEntry::Break { virtual_y, kind } => {
                plan.insert_break(virtual_y, kind)?;
            }
            PlanEntry::Spanned {
                element,
                virtual_y,
                margin_top,
                margin_bottom,
                cancelled,
            } => {
                let index = plan.add_spanned_element(element, virtual_y, margin_top, margin_bottom)?;
                if cancelled {
                    plan.cancel_spanned_break(index);
                }
            }
            PlanEntry::FloatHeight { height } => plan.add_pane_float_height(height),
        }
    }

    let leading_floats_height = plan.leading_floats_height();
    let (breakpoints, spanned) = plan.finish();
    Ok((breakpoints, spanned, leading_floats_height))
}

/// One event reported by the layout pass. Positions are relative to the
/// container entered last.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    EnterChild {
        offset: LayoutCoord,
        /// Set when the child is itself a multi-pane container.
        #[serde(default)]
        nested_container: Option<BoxId>,
    },
    LeaveChild { offset: LayoutCoord },
    Allocate {
        y: LayoutCoord,
        element: BoundaryElement,
        #[serde(default)]
        start_offset: LayoutCoord,
    },
    AdvanceHead { y: LayoutCoord },
    Commit {
        #[serde(default = "yes")]
        check_available_space: bool,
    },
    EarliestBreak { y: LayoutCoord },
    EnterSpanned {
        element: BoxId,
        position: LayoutCoord,
        #[serde(default)]
        break_before: BreakPolicy,
    },
    LeaveSpanned {
        element: BoxId,
        position: LayoutCoord,
        height: LayoutCoord,
    },
    SkipSpanned { element: BoxId },
    AddFloat { float: PaneFloat },
    EmptyBlock { block: BoxId, height: LayoutCoord },
    BreakColumn {
        #[serde(default)]
        stop_before: Option<BoundaryElement>,
    },
    BreakPage {
        #[serde(default)]
        stop_before: Option<BoundaryElement>,
    },
    PageBreakBefore { policy: BreakPolicy },
    PageBreakAfter { policy: BreakPolicy },
    /// Starts distributing an inner multi-pane container.
    Push {
        #[serde(default)]
        id: Option<BoxId>,
        container: ContainerSpec,
    },
    /// The inner container is done; its distributor is reported.
    Pop,
    Finalize {
        #[serde(default)]
        stretch_to_ancestor: bool,
    },
}

impl FlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FlowEvent::EnterChild { .. } => "enter_child",
            FlowEvent::LeaveChild { .. } => "leave_child",
            FlowEvent::Allocate { .. } => "allocate",
            FlowEvent::AdvanceHead { .. } => "advance_head",
            FlowEvent::Commit { .. } => "commit",
            FlowEvent::EarliestBreak { .. } => "earliest_break",
            FlowEvent::EnterSpanned { .. } => "enter_spanned",
            FlowEvent::LeaveSpanned { .. } => "leave_spanned",
            FlowEvent::SkipSpanned { .. } => "skip_spanned",
            FlowEvent::AddFloat { .. } => "add_float",
            FlowEvent::EmptyBlock { .. } => "empty_block",
            FlowEvent::BreakColumn { .. } => "break_column",
            FlowEvent::BreakPage { .. } => "break_page",
            FlowEvent::PageBreakBefore { .. } => "page_break_before",
            FlowEvent::PageBreakAfter { .. } => "page_break_after",
            FlowEvent::Push { .. } => "push",
            FlowEvent::Pop => "pop",
            FlowEvent::Finalize { .. } => "finalize",
        }
    }
}

/// A recorded layout pass over one root container.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlowScript {
    pub container: ContainerSpec,
    pub events: Vec<FlowEvent>,
}

impl FlowScript {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// The outcome of distributing one container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerReport {
    /// The inner container, as given when it was pushed. `None` for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<BoxId>,
    pub rows: ColumnRowStack,
    pub reached_max_height: bool,
    /// Height of the tallest page, for paged containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_height: Option<LayoutCoord>,
    /// Floats that never found a column.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unplaced_floats: Vec<BoxId>,
}

impl ContainerReport {
    fn new(container: Option<BoxId>, dist: Distributor) -> Self {
        let rows = dist.rows().clone();
        let reached_max_height = dist.reached_max_height();
        let unplaced_floats = dist.float_queue().iter().map(|entry| entry.box_id()).collect();
        let page_height = Paginator::try_from(dist).ok().map(|pages| pages.page_height());

        Self {
            container,
            rows,
            reached_max_height,
            page_height,
            unplaced_floats,
        }
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.column_count()).sum()
    }
}

/// Rows of the root container, and of every inner container in the order
/// they were finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub root: ContainerReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<ContainerReport>,
}

impl DistributionReport {
    pub fn to_json(&self, pretty: bool) -> Result<String, ReplayError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

struct Replay {
    stack: DistributorStack,
    /// Ids of the inner containers currently pushed, innermost last.
    open: Vec<Option<BoxId>>,
    finished: Vec<ContainerReport>,
}

impl Replay {
    fn apply(&mut self, event: &FlowEvent) -> Result<(), LayoutError> {
        let stack = &mut self.stack;

        match event {
            FlowEvent::EnterChild {
                offset,
                nested_container,
            } => stack.enter_child(*offset, *nested_container),
            FlowEvent::LeaveChild { offset } => stack.leave_child(*offset),
            FlowEvent::Allocate {
                y,
                element,
                start_offset,
            } => stack.allocate_content(*y, *element, *start_offset),
            FlowEvent::AdvanceHead { y } => stack.advance_head(*y),
            FlowEvent::Commit {
                check_available_space,
            } => stack.commit_content(*check_available_space),
            FlowEvent::EarliestBreak { y } => stack.set_earliest_break_position(*y),
            FlowEvent::EnterSpanned {
                element,
                position,
                break_before,
            } => stack.enter_spanned_box(*element, *position, *break_before),
            FlowEvent::LeaveSpanned {
                element,
                position,
                height,
            } => stack.leave_spanned_box(*element, *position, *height),
            FlowEvent::SkipSpanned { element } => stack.skip_spanned_box(*element),
            FlowEvent::AddFloat { float } => stack.add_pane_float(float.clone()),
            FlowEvent::EmptyBlock { block, height } => stack.add_empty_block_content(*block, *height),
            FlowEvent::BreakColumn { stop_before } => stack.explicitly_break_column(*stop_before),
            FlowEvent::BreakPage { stop_before } => stack.explicitly_break_page(*stop_before),
            FlowEvent::PageBreakBefore { policy } => stack.set_page_break_policy_before_current(*policy),
            FlowEvent::PageBreakAfter { policy } => stack.set_page_break_policy_after_previous(*policy),
            FlowEvent::Push { id, container } => {
                stack.push(container.build()?)?;
                self.open.push(*id);
                Ok(())
            }
            FlowEvent::Pop => {
                if stack.depth() < 2 {
                    return Err(LayoutError::EventOrder("pop of the root container"));
                }
                let dist = stack.pop()?;
                let id = self.open.pop().flatten();
                log::debug!("Inner container {:?} done", id);
                self.finished.push(ContainerReport::new(id, dist));
                Ok(())
            }
            FlowEvent::Finalize {
                stretch_to_ancestor,
            } => stack.finalize(*stretch_to_ancestor),
        }
    }
}

/// Replays `script` and reports where everything ended up.
///
/// Replaying the same script always gives the same report.
pub fn replay(script: &FlowScript) -> Result<DistributionReport, ReplayError> {
    let mut replay = Replay {
        stack: DistributorStack::new(script.container.build()?),
        open: Vec::new(),
        finished: Vec::new(),
    };

    for (index, event) in script.events.iter().enumerate() {
        log::trace!("Event {}: {:?}", index, event);
        replay.apply(event).map_err(|source| ReplayError::Event {
            index,
            event: event.name(),
            source,
        })?;
    }

    let root = replay.stack.into_root()?;
    log::info!(
        "Replayed {} events into {} rows",
        script.events.len(),
        root.rows().len()
    );

    Ok(DistributionReport {
        root: ContainerReport::new(None, root),
        nested: replay.finished,
    })
}
