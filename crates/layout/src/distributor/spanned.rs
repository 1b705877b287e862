use super::Nest;
use crate::LayoutError;
use crate::boundary::BoundaryElement;
use crate::float::ColumnCreationPolicy;
use crate::policy::BreakPolicy;
use colflow_types::{BoxId, LayoutCoord, collapse_margins};

impl Nest<'_> {
    /// Margins of the next queued spanned element, which must be `element`.
    fn queued_spanned(&self, element: BoxId) -> Result<(LayoutCoord, LayoutCoord), LayoutError> {
        let spanned = self
            .dist
            .spanned
            .get(self.dist.next_spanned)
            .ok_or(LayoutError::EventOrder("no spanned element queued"))?;

        if spanned.element() != element {
            return Err(LayoutError::EventOrder("spanned element out of document order"));
        }

        Ok((spanned.margin_top(), spanned.margin_bottom()))
    }

    /// Ends the current row before a spanned element and starts the
    /// single-column row the element lives in.
    ///
    /// `stack_position` is the top border edge of the element.
    pub(crate) fn enter_spanned_box(
        &mut self,
        element: BoxId,
        stack_position: LayoutCoord,
        break_before: BreakPolicy,
    ) -> Result<(), LayoutError> {
        let (margin_top, _) = self.queued_spanned(element)?;
        let boundary = BoundaryElement::block(element);

        // Get the bottom margin of the last content committed.
        self.dist.advance_head(stack_position - margin_top);
        self.finalize_column()?;
        self.set_stop_before(Some(boundary));
        self.add_queued_floats(ColumnCreationPolicy::Any)?;
        self.close_row(false);

        // Collapse with the bottom margin of an adjacent spanned element.
        // Both were laid out without collapsing.
        let dist = &mut *self.dist;
        let total_margin = dist.pending_margin + margin_top;
        dist.pending_margin = collapse_margins(dist.pending_margin, margin_top);
        dist.y_translation -= total_margin - dist.pending_margin;

        if self.dist.is_paged_root() && !self.has_ancestor() {
            let paging = &mut self.dist.paging;
            paging.policy_before_current = break_before;

            if paging.policy_after_previous.allowed_between(break_before) {
                paging.last_allowed_break_after = self.dist.rows.last_index();
            }
        }

        self.allocate_content(stack_position, boundary, 0);

        let dist = &mut *self.dist;
        dist.advance_head(stack_position);
        dist.cursors.committed_virtual_y = dist.cursors.virtual_y;
        dist.cursors.pending_virtual_y_start = dist.cursors.virtual_y;

        match dist.pass_breakpoint() {
            Some(bp) if !bp.is_spanned_element() => {
                log::warn!("Break at {} passed by a spanned element", bp.virtual_y())
            }
            Some(_) => {}
            None => log::warn!("No break queued for spanned element {:?}", element),
        }

        dist.span_all = true;
        log::debug!("Entered spanned element {:?} at {}", element, stack_position);
        Ok(())
    }

    /// Closes the row of a spanned element. Columns resume below its bottom
    /// margin.
    pub(crate) fn leave_spanned_box(
        &mut self,
        element: BoxId,
        stack_position: LayoutCoord,
        layout_height: LayoutCoord,
    ) -> Result<(), LayoutError> {
        let (_, margin_bottom) = self.queued_spanned(element)?;

        debug_assert!(
            self.dist
                .current_row()
                .map_or(true, |row| row.column_count() <= 1)
        );

        self.dist.last_allocated = Some(BoundaryElement::block(element));
        self.finalize_column()?;
        self.close_row(false);

        let dist = &mut *self.dist;
        dist.pending_margin = margin_bottom;
        dist.advance_head(stack_position + layout_height + margin_bottom);
        dist.cursors.committed_virtual_y = dist.cursors.virtual_y;
        dist.cursors.pending_virtual_y_start = dist.cursors.virtual_y;
        dist.next_spanned += 1;
        dist.span_all = false;

        log::debug!("Left spanned element {:?}", element);
        Ok(())
    }

    /// Skips a spanned element that needs no row of its own.
    pub(crate) fn skip_spanned_box(&mut self, element: BoxId) -> Result<(), LayoutError> {
        self.queued_spanned(element)?;
        self.dist.next_spanned += 1;
        Ok(())
    }
}
