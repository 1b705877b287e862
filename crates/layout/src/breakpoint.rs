//! Explicit column, row and page breaks found while laying out a multi-pane
//! container as a single column.

use crate::LayoutError;
use crate::spanned::SpannedElement;
use crate::util::try_push;
use colflow_types::{BoxId, LayoutCoord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Column,
    /// A row break; page breaks are row breaks too.
    Row,
    /// The break in front of a spanned (column-span: all) element.
    Spanned,
}

/// Index of a breakpoint in the ordered breakpoint list of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakpointRef(pub usize);

/// A column or row break at a virtual Y position.
///
/// Breaks are either caused by explicit column/page breaks (break-before and
/// break-after), or by spanned elements. Their virtual positions are what
/// column balancing works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    virtual_y: LayoutCoord,
    kind: BreakKind,
    /// Virtual height of the pane-attached floats between this break and the next.
    #[serde(default)]
    pane_float_height: LayoutCoord,
    /// Implicit breaks assumed in front of this one. Only meaningful while
    /// an initial row height is being computed.
    #[serde(skip)]
    assumed_implicit_breaks: u32,
}

impl Breakpoint {
    pub fn new(virtual_y: LayoutCoord, kind: BreakKind) -> Self {
        Self {
            virtual_y,
            kind,
            pane_float_height: 0,
            assumed_implicit_breaks: 0,
        }
    }

    pub fn virtual_y(&self) -> LayoutCoord {
        self.virtual_y
    }

    pub fn kind(&self) -> BreakKind {
        self.kind
    }

    /// Page breaks count as row breaks.
    pub fn is_row_break(&self) -> bool {
        self.kind != BreakKind::Column
    }

    pub fn is_spanned_element(&self) -> bool {
        self.kind == BreakKind::Spanned
    }

    /// Accounts for a pane-attached float assumed to end up after this
    /// break, but before the next one.
    pub fn propagate_pane_float_height(&mut self, height: LayoutCoord) {
        self.pane_float_height += height;
    }

    pub fn pane_float_height(&self) -> LayoutCoord {
        self.pane_float_height
    }

    pub fn assume_implicit_break_before(&mut self) {
        self.assumed_implicit_breaks += 1;
    }

    pub fn assumed_implicit_breaks(&self) -> u32 {
        self.assumed_implicit_breaks
    }

    pub fn reset_assumed_implicit_breaks(&mut self) {
        self.assumed_implicit_breaks = 0;
    }
}

/// Collects breakpoints and spanned elements while a multi-pane container is
/// laid out, before it is distributed.
#[derive(Debug, Default)]
pub struct BreakPlan {
    breakpoints: Vec<Option<Breakpoint>>,
    spanned: Vec<SpannedElement>,
    leading_floats_height: LayoutCoord,
}

impl BreakPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a break. Breaks must be inserted in document order.
    pub fn insert_break(
        &mut self,
        virtual_y: LayoutCoord,
        kind: BreakKind,
    ) -> Result<BreakpointRef, LayoutError> {
        debug_assert!(
            self.last_live().map_or(true, |bp| bp.virtual_y <= virtual_y),
            "breakpoints must be inserted in document order"
        );
        try_push(&mut self.breakpoints, Some(Breakpoint::new(virtual_y, kind)), "breakpoint")?;
        Ok(BreakpointRef(self.breakpoints.len() - 1))
    }

    /// Registers a spanned element together with the break it causes.
    pub fn add_spanned_element(
        &mut self,
        element: BoxId,
        virtual_y: LayoutCoord,
        margin_top: LayoutCoord,
        margin_bottom: LayoutCoord,
    ) -> Result<usize, LayoutError> {
        let breakpoint = self.insert_break(virtual_y, BreakKind::Spanned)?;
        try_push(
            &mut self.spanned,
            SpannedElement::new(element, margin_top, margin_bottom, Some(breakpoint)),
            "spanned element",
        )?;
        Ok(self.spanned.len() - 1)
    }

    /// Cancels the break caused by a spanned element that did not turn out
    /// to become one.
    pub fn cancel_spanned_break(&mut self, spanned_index: usize) {
        let cancelled = self
            .spanned
            .get_mut(spanned_index)
            .and_then(SpannedElement::cancel_break);

        if let Some(BreakpointRef(index)) = cancelled {
            if let Some(slot) = self.breakpoints.get_mut(index) {
                *slot = None;
            }
        }
    }

    /// Accounts for a pane-attached float at the current end of the plan.
    ///
    /// Floats seen before the first break add to the container's leading
    /// float height instead.
    pub fn add_pane_float_height(&mut self, height: LayoutCoord) {
        match self.breakpoints.iter_mut().rev().find_map(Option::as_mut) {
            Some(bp) => bp.propagate_pane_float_height(height),
            None => self.leading_floats_height += height,
        }
    }

    /// Virtual height of floats that precede every break.
    pub fn leading_floats_height(&self) -> LayoutCoord {
        self.leading_floats_height
    }

    pub fn spanned_elements(&self) -> &[SpannedElement] {
        &self.spanned
    }

    fn last_live(&self) -> Option<&Breakpoint> {
        self.breakpoints.iter().rev().find_map(Option::as_ref)
    }

    /// Drops cancelled breaks and returns the ordered lists for distribution.
    pub fn finish(self) -> (Vec<Breakpoint>, Vec<SpannedElement>) {
        let mut remap = Vec::with_capacity(self.breakpoints.len());
        let mut breakpoints = Vec::with_capacity(self.breakpoints.len());

        for slot in self.breakpoints {
            match slot {
                Some(bp) => {
                    remap.push(Some(BreakpointRef(breakpoints.len())));
                    breakpoints.push(bp);
                }
                None => remap.push(None),
            }
        }

        let spanned = self
            .spanned
            .into_iter()
            .map(|mut elm| {
                let new_ref = elm.breakpoint().and_then(|r| remap.get(r.0).copied().flatten());
                elm.set_breakpoint(new_ref);
                elm
            })
            .collect();

        (breakpoints, spanned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_breaks_are_row_breaks() {
        assert!(Breakpoint::new(0, BreakKind::Row).is_row_break());
        assert!(Breakpoint::new(0, BreakKind::Spanned).is_row_break());
        assert!(!Breakpoint::new(0, BreakKind::Column).is_row_break());
    }

    #[test]
    fn floats_before_first_break_are_leading() {
        let mut plan = BreakPlan::new();
        plan.add_pane_float_height(30);
        plan.insert_break(100, BreakKind::Column).unwrap();
        plan.add_pane_float_height(12);
        assert_eq!(plan.leading_floats_height(), 30);

        let (breaks, _) = plan.finish();
        assert_eq!(breaks[0].pane_float_height(), 12);
    }

    #[test]
    fn cancelled_spanned_break_is_dropped_and_refs_remapped() {
        let mut plan = BreakPlan::new();
        let first = plan.add_spanned_element(BoxId::new(1), 50, 0, 0).unwrap();
        plan.insert_break(80, BreakKind::Column).unwrap();
        plan.add_spanned_element(BoxId::new(2), 120, 5, 5).unwrap();
        plan.cancel_spanned_break(first);

        let (breaks, spanned) = plan.finish();
        assert_eq!(breaks.len(), 2);
        assert_eq!(breaks[0].kind(), BreakKind::Column);
        assert_eq!(spanned[0].breakpoint(), None);
        assert_eq!(spanned[1].breakpoint(), Some(BreakpointRef(1)));
    }
}
