//! Distribution of single-column ("virtual") content into rows of columns,
//! or into pages.
//!
//! The layout pass walks the virtual flow in document order and reports
//! content, breaks, spanned boxes and pane floats. The distributor turns that
//! into a [`ColumnRowStack`]. Multi-pane containers nest: a distributor for
//! an inner container consults the distributors of all enclosing containers
//! when it needs more space. The chain is kept in a [`DistributorStack`],
//! outermost first.

mod balance;
mod breaks;
mod columns;
mod commit;
mod floats;
mod spanned;

use crate::LayoutError;
use crate::boundary::BoundaryElement;
use crate::breakpoint::Breakpoint;
use crate::column::{Column, ColumnRow, ColumnRowStack};
use crate::config::DistributorConfig;
use crate::float::{ColumnCreationPolicy, FloatQueue, PaneFloat};
use crate::pages::PageSequence;
use crate::policy::BreakPolicy;
use crate::spanned::SpannedElement;
use colflow_types::{BoxId, LayoutCoord, RowIndex};

/// What kind of panes a distributor creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaneMode {
    /// Columns of a multi-column container.
    Columns,
    /// Pages of a paged container. There is no row structure; all pages
    /// live in one row.
    Pages {
        vertical_padding: LayoutCoord,
        page_height_auto: bool,
    },
}

/// Virtual Y positions that only move forward during a pass.
///
/// `committed_virtual_y <= pending_virtual_y_start <= virtual_y` holds
/// between events. Allocating past a skipped margin moves `virtual_y` along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursors {
    /// Bottom of uncommitted content.
    pub virtual_y: LayoutCoord,
    /// Bottom of content already put into a column.
    pub committed_virtual_y: LayoutCoord,
    /// Start candidate of the next column.
    pub pending_virtual_y_start: LayoutCoord,
    /// Start of the open column.
    pub col_virtual_y_start: LayoutCoord,
    /// Commits below this position have no effect.
    pub earliest_break_virtual_y: LayoutCoord,
}

/// Paged-media bookkeeping of a root distributor.
#[derive(Debug, Clone, Copy)]
struct PageState {
    /// Row after which a page break is allowed. `None` means before the
    /// first row.
    last_allowed_break_after: Option<RowIndex>,
    policy_after_previous: BreakPolicy,
    policy_before_current: BreakPolicy,
    page_open: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            last_allowed_break_after: None,
            policy_after_previous: BreakPolicy::Avoid,
            policy_before_current: BreakPolicy::Avoid,
            page_open: true,
        }
    }
}

/// Distribution state of one multi-pane container.
#[derive(Debug)]
pub struct Distributor {
    pub(crate) mode: PaneMode,
    column_count: i32,
    column_width: LayoutCoord,
    content_width: LayoutCoord,
    column_gap: LayoutCoord,
    pub(crate) column_y_stride: LayoutCoord,
    virtual_height: LayoutCoord,
    max_height: LayoutCoord,
    /// Virtual height of pane floats not yet added to any column.
    remaining_floats_virtual_height: LayoutCoord,
    always_balance: bool,
    ancestor_in_same_element: bool,
    paged_media: Option<PageSequence>,
    /// Inner multi-pane container currently being distributed, if any.
    descendant_container: Option<BoxId>,

    pub(crate) rows: ColumnRowStack,
    breakpoints: Vec<Breakpoint>,
    next_break: usize,
    spanned: Vec<SpannedElement>,
    next_spanned: usize,
    float_queue: FloatQueue,

    first_uncommitted: Option<BoundaryElement>,
    last_allocated: Option<BoundaryElement>,
    pending_start_offset: LayoutCoord,

    cursors: Cursors,
    stack_offset: LayoutCoord,
    initial_row_height: LayoutCoord,
    current_row_height: LayoutCoord,
    max_row_height: LayoutCoord,
    pub(crate) top_floats_height: LayoutCoord,
    pub(crate) bottom_floats_height: LayoutCoord,
    /// Bottom margin of the last spanned row, to collapse with what follows.
    pending_margin: LayoutCoord,
    current_column_num: i32,
    pub(crate) column_y: LayoutCoord,
    y_translation: LayoutCoord,

    span_all: bool,
    is_rtl: bool,
    balance_current_row: bool,
    allow_column_stretch: bool,
    column_open: bool,
    row_open: bool,
    height_restricted: bool,
    reached_max_height: bool,
    row_has_spanned_floats: bool,
    trial: bool,
    paging: PageState,
}

impl Distributor {
    /// Creates a distributor for one pass.
    ///
    /// `breakpoints` and `spanned` are the ordered lists collected during
    /// layout, usually by [`crate::BreakPlan::finish`].
    pub fn new(
        config: DistributorConfig,
        breakpoints: Vec<Breakpoint>,
        spanned: Vec<SpannedElement>,
    ) -> Self {
        let column_count = i32::try_from(config.column_count.max(1)).unwrap_or(i32::MAX);

        Self {
            mode: PaneMode::Columns,
            column_count,
            column_width: config.column_width,
            content_width: config.content_width,
            column_gap: config.column_gap,
            column_y_stride: config.column_y_stride,
            virtual_height: config.virtual_height,
            max_height: config.max_height,
            remaining_floats_virtual_height: config.floats_virtual_height,
            always_balance: config.always_balance,
            ancestor_in_same_element: config.ancestor_in_same_element,
            paged_media: config.paged_media,
            descendant_container: None,
            rows: ColumnRowStack::new(),
            breakpoints,
            next_break: 0,
            spanned,
            next_spanned: 0,
            float_queue: FloatQueue::new(),
            first_uncommitted: None,
            last_allocated: None,
            pending_start_offset: 0,
            cursors: Cursors::default(),
            stack_offset: -config.top_offset,
            initial_row_height: 0,
            current_row_height: 0,
            max_row_height: 0,
            top_floats_height: 0,
            bottom_floats_height: 0,
            pending_margin: 0,
            current_column_num: 0,
            column_y: 0,
            y_translation: -config.top_offset,
            span_all: false,
            is_rtl: config.rtl,
            balance_current_row: config.always_balance,
            allow_column_stretch: false,
            column_open: false,
            row_open: false,
            height_restricted: config.height_restricted,
            reached_max_height: false,
            row_has_spanned_floats: false,
            trial: config.trial,
            paging: PageState::default(),
        }
    }

    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    pub fn rows(&self) -> &ColumnRowStack {
        &self.rows
    }

    /// Hands over the rows built during the pass.
    pub fn into_rows(self) -> ColumnRowStack {
        self.rows
    }

    pub fn column_count(&self) -> i32 {
        self.column_count
    }

    pub fn stack_offset(&self) -> LayoutCoord {
        self.stack_offset
    }

    pub fn current_row_height(&self) -> LayoutCoord {
        self.current_row_height
    }

    pub fn initial_row_height(&self) -> LayoutCoord {
        self.initial_row_height
    }

    pub fn max_row_height(&self) -> LayoutCoord {
        self.max_row_height
    }

    pub fn is_span_all(&self) -> bool {
        self.span_all
    }

    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// Specifies that this distributor only estimates the height of an inner
    /// container.
    pub fn set_trial(&mut self) {
        self.trial = true;
    }

    pub fn float_queue(&self) -> &FloatQueue {
        &self.float_queue
    }

    pub fn paged_media(&self) -> Option<&PageSequence> {
        self.paged_media.as_ref()
    }

    /// Whether the row height hit its maximum at some point.
    pub fn reached_max_height(&self) -> bool {
        self.reached_max_height
    }

    /// Bottom margin of the last row added. Only rows of spanned elements
    /// have margins.
    pub fn pending_margin(&self) -> LayoutCoord {
        self.pending_margin
    }

    /// Columns still unused in the current row.
    pub fn columns_left(&self) -> i32 {
        (if self.span_all { 1 } else { self.column_count }) - self.current_column_num
    }

    /// Vertical space used in the current column so far.
    pub fn space_used(&self) -> LayoutCoord {
        self.cursors.committed_virtual_y - self.cursors.col_virtual_y_start
            + self.top_floats_height
            + self.bottom_floats_height
    }

    pub fn space_left(&self) -> LayoutCoord {
        self.current_row_height - self.space_used()
    }

    pub fn current_row(&self) -> Option<&ColumnRow> {
        if self.row_open { self.rows.last() } else { None }
    }

    pub(crate) fn current_row_mut(&mut self) -> Option<&mut ColumnRow> {
        if self.row_open {
            self.rows.last_mut()
        } else {
            None
        }
    }

    pub fn current_column(&self) -> Option<&Column> {
        if self.column_open {
            self.current_row().and_then(ColumnRow::last_column)
        } else {
            None
        }
    }

    pub(crate) fn current_column_mut(&mut self) -> Option<&mut Column> {
        if self.column_open {
            self.current_row_mut().and_then(ColumnRow::last_column_mut)
        } else {
            None
        }
    }

    /// Position of the current row, or where the next row would go.
    pub fn row_position(&self) -> LayoutCoord {
        match self.rows.last() {
            Some(last) if self.row_open => last.position(),
            Some(last) => last.position() + last.height() + self.pending_margin,
            None => 0,
        }
    }

    /// Converts a virtual position to a bottom relative to the first row.
    ///
    /// That bottom is a virtual position in the enclosing container.
    pub fn bottom(&self, some_virtual_y: LayoutCoord) -> LayoutCoord {
        let row_pos = self.current_row().map_or(0, ColumnRow::position);
        row_pos + some_virtual_y - self.cursors.col_virtual_y_start
            + self.top_floats_height
            + self.bottom_floats_height
    }

    /// Commits before `local_virtual_y` will have no effect.
    pub fn set_earliest_break_position(&mut self, local_virtual_y: LayoutCoord) {
        let new_virtual_y = local_virtual_y + self.stack_offset;
        if self.cursors.earliest_break_virtual_y < new_virtual_y {
            self.cursors.earliest_break_virtual_y = new_virtual_y;
        }
    }

    /// Moves the uncommitted bottom. Must not move backwards within a
    /// subtree.
    pub fn advance_head(&mut self, local_y: LayoutCoord) {
        self.cursors.virtual_y = local_y + self.stack_offset;
        log::trace!("Head at {}", self.cursors.virtual_y);
    }

    /// Enters a child box at `offset` below the top border edge of its
    /// container. `nested_container` is the inner multi-pane container
    /// entered, if any.
    pub fn enter_child(&mut self, offset: LayoutCoord, nested_container: Option<BoxId>) {
        self.stack_offset += offset;
        self.descendant_container = nested_container;
    }

    pub fn leave_child(&mut self, offset: LayoutCoord) {
        self.stack_offset -= offset;
        self.descendant_container = None;
    }

    /// Page break policy before the element about to be added.
    pub(crate) fn set_policy_before_current(&mut self, policy: BreakPolicy, has_ancestor: bool) {
        if self.first_uncommitted.is_none() && !has_ancestor {
            self.paging.policy_before_current = policy;
        }
    }

    /// Page break policy after the element just added.
    pub(crate) fn set_policy_after_previous(&mut self, policy: BreakPolicy, has_ancestor: bool) {
        if (self.row_open || self.first_uncommitted.is_none()) && !has_ancestor {
            self.paging.policy_after_previous = policy;
        }
    }

    /// Stretches the current row to fit `element_height` more content.
    ///
    /// With a constraining ancestor, or before the last column, each column
    /// may only be stretched once and not beyond the initial row height. The
    /// last column of an unconstrained row may be stretched as often as
    /// needed, up to the maximum row height.
    pub(crate) fn stretch_column(&mut self, element_height: LayoutCoord, has_ancestor: bool) -> bool {
        if has_ancestor || self.current_column_num + 1 < self.column_count {
            if !self.allow_column_stretch {
                return false;
            }

            self.allow_column_stretch = false;

            if self.space_used() >= self.initial_row_height {
                return false;
            }
        }

        self.current_row_height = self.space_used() + element_height;

        if self.current_row_height > self.max_row_height {
            self.current_row_height = self.max_row_height;
            self.reached_max_height = true;
            return false;
        }

        log::debug!("Stretched row to {}", self.current_row_height);
        true
    }

    pub(crate) fn increase_row_height(&mut self, increase: LayoutCoord) {
        self.current_row_height += increase;

        if self.current_row_height > self.max_row_height {
            self.current_row_height = self.max_row_height;
            self.reached_max_height = true;
        }

        if self.current_row_height < 0 {
            self.current_row_height = 0;
        }
    }

    /// Grows the row height to `height` if balancing. Auto-height pages also
    /// grow the page stride, moving later pages down.
    pub(crate) fn update_height(&mut self, height: LayoutCoord) {
        if self.balance_current_row && self.current_row_height < height {
            self.current_row_height = height;

            if self.current_row_height > self.max_row_height {
                self.current_row_height = self.max_row_height;
                self.reached_max_height = true;
            }
        }

        let PaneMode::Pages {
            vertical_padding,
            page_height_auto: true,
        } = self.mode
        else {
            return;
        };

        let new_stride = height - (self.top_floats_height + self.bottom_floats_height) + vertical_padding;

        if self.column_y_stride < new_stride {
            let increase = new_stride - self.column_y_stride;
            let mut moved = 0;

            if let Some(row) = self.current_row_mut() {
                let mut acc_increase = increase;

                for page in row.columns_mut().iter_mut().skip(1) {
                    page.move_down(acc_increase);
                    acc_increase += increase;
                    moved += 1;
                }
            }

            self.column_y += increase * moved;
            self.column_y_stride = new_stride;
            log::debug!("Page height grew to {}", new_stride);
        }
    }

    /// Accumulated height of the floats affecting the current column,
    /// including floats in earlier columns of the row that span into it.
    pub fn floats_height(&self) -> LayoutCoord {
        let mut top_height = 0;
        let mut bottom_height = 0;

        let (Some(row), true) = (self.current_row(), self.column_open) else {
            return 0;
        };

        for (min_span, column) in (1u32..).zip(row.columns().iter().rev()) {
            for entry in column.floats().iter().filter(|e| e.column_span() >= min_span) {
                let height = entry.outer_height();
                if entry.is_top_aligned() {
                    top_height = top_height.max(height);
                } else {
                    bottom_height = bottom_height.max(height);
                }
            }
        }

        top_height + bottom_height
    }

    /// X position of the next column, spreading the column width rounding
    /// error over the gaps, mirrored for right-to-left.
    pub fn calculate_column_x(&self) -> LayoutCoord {
        let accumulated_gap = if self.column_gap == 0 || self.column_count < 2 {
            self.current_column_num * self.column_gap
        } else {
            let mut total_gap = self.column_gap * (self.column_count - 1);
            let error = self.content_width - (self.column_width * self.column_count + total_gap);
            total_gap += error;
            total_gap * self.current_column_num / (self.column_count - 1)
        };

        if self.is_rtl {
            self.content_width - (self.current_column_num + 1) * self.column_width - accumulated_gap
        } else {
            self.current_column_num * self.column_width + accumulated_gap
        }
    }

    fn is_paged_root(&self) -> bool {
        !self.trial && self.paged_media.is_some()
    }

    /// Skips the breakpoint at `next_break` once it has been handled.
    fn pass_breakpoint(&mut self) -> Option<Breakpoint> {
        let bp = self.breakpoints.get(self.next_break).cloned()?;
        self.remaining_floats_virtual_height += bp.pane_float_height();
        self.next_break += 1;
        Some(bp)
    }
}

/// A distributor together with the distributors of all enclosing
/// multi-pane containers, innermost last.
pub(crate) struct Nest<'a> {
    pub(crate) dist: &'a mut Distributor,
    pub(crate) outer: &'a mut [Distributor],
}

/// The distributor of the nearest enclosing container, if any.
pub(crate) fn ancestor_of(outer: &mut [Distributor]) -> Option<Nest<'_>> {
    let (dist, outer) = outer.split_last_mut()?;
    Some(Nest { dist, outer })
}

impl Nest<'_> {
    fn has_ancestor(&self) -> bool {
        !self.outer.is_empty()
    }

    fn ancestor(&self) -> Option<&Distributor> {
        self.outer.last()
    }

    /// Whether taller columns can be had by moving to a new row or page.
    pub(crate) fn more_space_ahead(&self) -> bool {
        more_space_ahead(self.dist, self.outer)
    }
}

fn more_space_ahead(dist: &Distributor, outer: &[Distributor]) -> bool {
    if dist.column_open && dist.space_used() > 0 {
        return true;
    }

    if let Some((ancestor, rest)) = outer.split_last() {
        return more_space_ahead(ancestor, rest);
    }

    match &dist.paged_media {
        // Moving to a new page gives taller columns unless the row already
        // starts at the top of one.
        Some(pages) if !dist.trial => dist.max_row_height < pages.page_height,
        _ => false,
    }
}

/// The chain of distributors of nested multi-pane containers.
///
/// Events always go to the innermost distributor, which consults its
/// ancestors as needed.
#[derive(Debug)]
pub struct DistributorStack {
    levels: Vec<Distributor>,
}

impl DistributorStack {
    pub fn new(root: Distributor) -> Self {
        Self { levels: vec![root] }
    }

    /// Starts distributing an inner container.
    pub fn push(&mut self, nested: Distributor) -> Result<(), LayoutError> {
        crate::util::try_push(&mut self.levels, nested, "nested distributor")
    }

    /// Removes the innermost distributor once its container is done.
    pub fn pop(&mut self) -> Result<Distributor, LayoutError> {
        self.levels
            .pop()
            .ok_or(LayoutError::EventOrder("pop from an empty distributor stack"))
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn innermost(&self) -> Option<&Distributor> {
        self.levels.last()
    }

    pub fn root(&self) -> Option<&Distributor> {
        self.levels.first()
    }

    /// Takes the root distributor once every nested one is popped.
    pub fn into_root(mut self) -> Result<Distributor, LayoutError> {
        if self.levels.len() != 1 {
            return Err(LayoutError::EventOrder("nested distributors still open"));
        }
        self.pop()
    }

    fn nest(&mut self) -> Result<Nest<'_>, LayoutError> {
        ancestor_of(&mut self.levels).ok_or(LayoutError::EventOrder("empty distributor stack"))
    }

    fn innermost_mut(&mut self) -> Result<&mut Distributor, LayoutError> {
        self.levels
            .last_mut()
            .ok_or(LayoutError::EventOrder("empty distributor stack"))
    }

    pub fn enter_child(
        &mut self,
        offset: LayoutCoord,
        nested_container: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        self.innermost_mut()?.enter_child(offset, nested_container);
        Ok(())
    }

    pub fn leave_child(&mut self, offset: LayoutCoord) -> Result<(), LayoutError> {
        self.innermost_mut()?.leave_child(offset);
        Ok(())
    }

    /// Reports `element` at `local_y`. It becomes the start candidate of the
    /// next column if nothing is pending yet.
    pub fn allocate_content(
        &mut self,
        local_y: LayoutCoord,
        element: BoundaryElement,
        start_offset: LayoutCoord,
    ) -> Result<(), LayoutError> {
        self.nest()?.allocate_content(local_y, element, start_offset);
        Ok(())
    }

    pub fn advance_head(&mut self, local_y: LayoutCoord) -> Result<(), LayoutError> {
        self.innermost_mut()?.advance_head(local_y);
        Ok(())
    }

    /// Commits pending content at a possible break point, creating columns,
    /// rows and pages as needed.
    pub fn commit_content(&mut self, check_available_space: bool) -> Result<(), LayoutError> {
        self.nest()?.commit_content(check_available_space)
    }

    pub fn set_earliest_break_position(&mut self, local_y: LayoutCoord) -> Result<(), LayoutError> {
        self.innermost_mut()?.set_earliest_break_position(local_y);
        Ok(())
    }

    pub fn get_new_column(
        &mut self,
        start_element: Option<BoundaryElement>,
        minimum_height: LayoutCoord,
        add_queued_floats: bool,
    ) -> Result<(), LayoutError> {
        self.nest()?.get_new_column(start_element, minimum_height, add_queued_floats)
    }

    /// Whether `new_virtual_y` fits in the current column, stretching it
    /// (and ancestors) if allowed.
    pub fn find_space(&mut self, new_virtual_y: LayoutCoord) -> Result<bool, LayoutError> {
        Ok(self.nest()?.find_space(new_virtual_y))
    }

    pub fn stretch_column(&mut self, element_height: LayoutCoord) -> Result<bool, LayoutError> {
        let has_ancestor = self.levels.len() > 1;
        Ok(self.innermost_mut()?.stretch_column(element_height, has_ancestor))
    }

    pub fn enter_spanned_box(
        &mut self,
        element: BoxId,
        stack_position: LayoutCoord,
        break_before: BreakPolicy,
    ) -> Result<(), LayoutError> {
        self.nest()?.enter_spanned_box(element, stack_position, break_before)
    }

    pub fn leave_spanned_box(
        &mut self,
        element: BoxId,
        stack_position: LayoutCoord,
        layout_height: LayoutCoord,
    ) -> Result<(), LayoutError> {
        self.nest()?.leave_spanned_box(element, stack_position, layout_height)
    }

    pub fn skip_spanned_box(&mut self, element: BoxId) -> Result<(), LayoutError> {
        self.nest()?.skip_spanned_box(element)
    }

    pub fn add_pane_float(&mut self, float: PaneFloat) -> Result<(), LayoutError> {
        self.nest()?.add_pane_float(float)
    }

    pub fn add_queued_floats(&mut self, policy: ColumnCreationPolicy) -> Result<(), LayoutError> {
        self.nest()?.add_queued_floats(policy)
    }

    pub fn flush_floats(&mut self, virtual_bottom: LayoutCoord) -> Result<(), LayoutError> {
        self.nest()?.flush_floats(virtual_bottom);
        Ok(())
    }

    /// Reports the part of `block` not covered by its children, splitting it
    /// over columns as needed.
    pub fn add_empty_block_content(
        &mut self,
        block: BoxId,
        layout_height: LayoutCoord,
    ) -> Result<(), LayoutError> {
        self.nest()?.add_empty_block_content(block, layout_height)
    }

    pub fn explicitly_break_column(
        &mut self,
        stop_before: Option<BoundaryElement>,
    ) -> Result<(), LayoutError> {
        self.nest()?.explicitly_break_column(stop_before, false)
    }

    pub fn explicitly_break_page(
        &mut self,
        stop_before: Option<BoundaryElement>,
    ) -> Result<(), LayoutError> {
        self.nest()?.explicitly_break_page(stop_before, false, false)
    }

    pub fn set_page_break_policy_before_current(
        &mut self,
        policy: BreakPolicy,
    ) -> Result<(), LayoutError> {
        let has_ancestor = self.levels.len() > 1;
        self.innermost_mut()?.set_policy_before_current(policy, has_ancestor);
        Ok(())
    }

    pub fn set_page_break_policy_after_previous(
        &mut self,
        policy: BreakPolicy,
    ) -> Result<(), LayoutError> {
        let has_ancestor = self.levels.len() > 1;
        self.innermost_mut()?.set_policy_after_previous(policy, has_ancestor);
        Ok(())
    }

    pub fn set_stop_before(&mut self, element: Option<BoundaryElement>) -> Result<(), LayoutError> {
        self.nest()?.set_stop_before(element);
        Ok(())
    }

    pub fn close_column(&mut self) -> Result<(), LayoutError> {
        self.nest()?.close_column();
        Ok(())
    }

    pub fn close_row(&mut self, stretch_to_ancestor: bool) -> Result<(), LayoutError> {
        self.nest()?.close_row(stretch_to_ancestor);
        Ok(())
    }

    pub fn close_page(&mut self) -> Result<(), LayoutError> {
        self.nest()?.close_page();
        Ok(())
    }

    pub fn more_space_ahead(&mut self) -> Result<bool, LayoutError> {
        Ok(self.nest()?.more_space_ahead())
    }

    /// Commits pending content and floats and closes the open column.
    pub fn finalize_column(&mut self) -> Result<(), LayoutError> {
        self.nest()?.finalize_column()
    }

    /// Ends the pass of the innermost distributor. With
    /// `stretch_to_ancestor`, the last row reaches down to the bottom of a
    /// height-restricted ancestor, so bottom floats sit at its very bottom.
    pub fn finalize(&mut self, stretch_to_ancestor: bool) -> Result<(), LayoutError> {
        self.nest()?.finalize(stretch_to_ancestor)
    }
}
