//! Drives distributors the way box layout would, for tests.

use crate::boundary::BoundaryElement;
use crate::breakpoint::{BreakKind, BreakPlan, Breakpoint};
use crate::column::{Column, ColumnRowStack};
use crate::config::DistributorConfig;
use crate::distributor::{Distributor, DistributorStack};
use crate::spanned::SpannedElement;
use colflow_types::{BoxId, LayoutCoord};

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Feeds blocks to the innermost distributor of a stack, top to bottom.
///
/// Blocks get ids from 1 upwards in the order they are added.
pub struct Flow<'a> {
    stack: &'a mut DistributorStack,
    y: LayoutCoord,
    next_id: u32,
}

impl<'a> Flow<'a> {
    pub fn new(stack: &'a mut DistributorStack) -> Self {
        Self {
            stack,
            y: 0,
            next_id: 1,
        }
    }

    pub fn next_id(&self) -> BoxId {
        BoxId::new(self.next_id)
    }

    fn take_id(&mut self) -> BoxId {
        let id = BoxId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Unbreakable blocks of the given heights, each followed by a possible
    /// break.
    pub fn blocks(&mut self, heights: &[LayoutCoord]) -> &mut Self {
        for &height in heights {
            let id = self.take_id();
            self.stack
                .allocate_content(self.y, BoundaryElement::block(id), 0)
                .unwrap();
            self.y += height;
            self.stack.advance_head(self.y).unwrap();
            self.stack.commit_content(true).unwrap();
        }
        self
    }

    /// Lines of `line_height` in one container block.
    pub fn lines(&mut self, count: usize, line_height: LayoutCoord) -> &mut Self {
        let container = self.take_id();
        for _ in 0..count {
            let line = self.take_id();
            self.stack
                .allocate_content(self.y, BoundaryElement::line(container, line), 0)
                .unwrap();
            self.y += line_height;
            self.stack.advance_head(self.y).unwrap();
            self.stack.commit_content(true).unwrap();
        }
        self
    }

    pub fn column_break(&mut self) -> &mut Self {
        let stop_before = BoundaryElement::block(self.next_id());
        self.stack.explicitly_break_column(Some(stop_before)).unwrap();
        self
    }

    pub fn page_break(&mut self) -> &mut Self {
        let stop_before = BoundaryElement::block(self.next_id());
        self.stack.explicitly_break_page(Some(stop_before)).unwrap();
        self
    }

    /// A spanned element of `height` whose top border edge is at the
    /// current position plus `margin_top`.
    pub fn spanned(
        &mut self,
        element: BoxId,
        margin_top: LayoutCoord,
        height: LayoutCoord,
        margin_bottom: LayoutCoord,
    ) -> &mut Self {
        let top = self.y + margin_top;
        self.stack
            .enter_spanned_box(element, top, crate::BreakPolicy::Allow)
            .unwrap();
        self.stack.advance_head(top + height).unwrap();
        self.stack.leave_spanned_box(element, top, height).unwrap();
        self.y = top + height + margin_bottom;
        self
    }

    pub fn finish(&mut self) {
        self.stack.finalize(false).unwrap();
    }
}

/// A root distributor with `count` balanced columns of width 100 and gap 10.
pub fn columns(count: u32, virtual_height: LayoutCoord) -> DistributorConfig {
    DistributorConfig {
        virtual_height,
        ..DistributorConfig::columns(count, 100, 10)
    }
}

/// Distributes blocks of the given heights into a fresh distributor.
pub fn distribute(
    config: DistributorConfig,
    breakpoints: Vec<Breakpoint>,
    heights: &[LayoutCoord],
) -> Distributor {
    init_logs();
    let mut stack = DistributorStack::new(Distributor::new(config, breakpoints, Vec::new()));
    Flow::new(&mut stack).blocks(heights).finish();
    stack.into_root().unwrap()
}

/// Breakpoints of a plan holding only column breaks at `positions`.
pub fn column_breaks(positions: &[LayoutCoord]) -> Vec<Breakpoint> {
    let mut plan = BreakPlan::new();
    for &y in positions {
        plan.insert_break(y, BreakKind::Column).unwrap();
    }
    plan.finish().0
}

pub fn spanned_plan(spanned: &[(BoxId, LayoutCoord, LayoutCoord, LayoutCoord)]) -> (Vec<Breakpoint>, Vec<SpannedElement>) {
    let mut plan = BreakPlan::new();
    for &(element, virtual_y, margin_top, margin_bottom) in spanned {
        plan.add_spanned_element(element, virtual_y, margin_top, margin_bottom)
            .unwrap();
    }
    plan.finish()
}

/// Columns of every row, in order.
pub fn all_columns(rows: &ColumnRowStack) -> Vec<&Column> {
    rows.iter().flat_map(|row| row.columns()).collect()
}

pub fn heights(rows: &ColumnRowStack) -> Vec<LayoutCoord> {
    all_columns(rows).into_iter().map(Column::height).collect()
}

pub fn starts(rows: &ColumnRowStack) -> Vec<LayoutCoord> {
    all_columns(rows).into_iter().map(Column::virtual_y).collect()
}
