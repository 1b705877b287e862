use crate::breakpoint::BreakpointRef;
use colflow_types::{BoxId, LayoutCoord};
use serde::{Deserialize, Serialize};

/// A spanned (column-span: all) box inside a multi-column container.
///
/// Created and queued during layout, consumed in document order during
/// distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpannedElement {
    element: BoxId,
    margin_top: LayoutCoord,
    margin_bottom: LayoutCoord,
    #[serde(default)]
    breakpoint: Option<BreakpointRef>,
}

impl SpannedElement {
    pub fn new(
        element: BoxId,
        margin_top: LayoutCoord,
        margin_bottom: LayoutCoord,
        breakpoint: Option<BreakpointRef>,
    ) -> Self {
        Self {
            element,
            margin_top,
            margin_bottom,
            breakpoint,
        }
    }

    pub fn element(&self) -> BoxId {
        self.element
    }

    pub fn margin_top(&self) -> LayoutCoord {
        self.margin_top
    }

    pub fn margin_bottom(&self) -> LayoutCoord {
        self.margin_bottom
    }

    pub fn breakpoint(&self) -> Option<BreakpointRef> {
        self.breakpoint
    }

    pub(crate) fn set_breakpoint(&mut self, breakpoint: Option<BreakpointRef>) {
        self.breakpoint = breakpoint;
    }

    /// Detaches the break caused by this element and returns it, so that
    /// the owner of the breakpoint list can drop it.
    pub fn cancel_break(&mut self) -> Option<BreakpointRef> {
        self.breakpoint.take()
    }
}
