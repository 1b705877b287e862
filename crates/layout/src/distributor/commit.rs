use super::{Nest, ancestor_of};
use crate::LayoutError;
use crate::boundary::BoundaryElement;
use crate::float::ColumnCreationPolicy;
use colflow_types::{BoxId, LayoutCoord};

impl Nest<'_> {
    /// Reports `element` at `local_virtual_y`, relative to the container
    /// currently entered.
    ///
    /// Nothing is put into a column yet; that waits until a possible break
    /// point is reached and [`Nest::commit_content`] is called. If nothing
    /// was pending, `element` becomes the start candidate of the next column.
    pub(crate) fn allocate_content(
        &mut self,
        local_virtual_y: LayoutCoord,
        element: BoundaryElement,
        start_offset: LayoutCoord,
    ) {
        let dist = &mut *self.dist;
        let new_virtual_y = local_virtual_y + dist.stack_offset;

        if dist.first_uncommitted.is_none() {
            if dist.allow_column_stretch && dist.current_column().is_some() {
                let bottom = dist.cursors.col_virtual_y_start + dist.current_row_height;

                if dist.cursors.pending_virtual_y_start < bottom && new_virtual_y >= bottom {
                    // A margin took us past the assumed bottom of the column.
                    // Margins crossing column boundaries are dropped, so they
                    // must not stretch the column.
                    dist.allow_column_stretch = false;
                }
            }

            dist.first_uncommitted = Some(element);
            dist.pending_start_offset = start_offset;

            if dist.current_column().is_some() {
                dist.cursors.pending_virtual_y_start = new_virtual_y;

                // Skipped margin; the head moves past it too.
                if dist.cursors.virtual_y < new_virtual_y {
                    dist.cursors.virtual_y = new_virtual_y;
                }
            }
        }

        dist.last_allocated = Some(element);

        let bottom = self.dist.bottom(new_virtual_y);
        if let Some(mut ancestor) = ancestor_of(self.outer) {
            ancestor.allocate_content(bottom, element, start_offset);
        }
    }

    /// Whether content up to `new_virtual_y` fits in the current column,
    /// stretching it if allowed. True if there is no current column.
    pub(crate) fn find_space(&mut self, new_virtual_y: LayoutCoord) -> bool {
        if self.dist.current_column().is_none() {
            return true;
        }

        let uncommitted_height = new_virtual_y - self.dist.cursors.committed_virtual_y;

        if self.dist.space_left() >= uncommitted_height {
            return true;
        }

        let bottom = self.dist.bottom(new_virtual_y);
        if let Some(mut ancestor) = ancestor_of(self.outer) {
            // The ancestor must allow the stretch too.
            let ancestor_y = bottom + ancestor.dist.stack_offset;
            if !ancestor.find_space(ancestor_y) {
                return false;
            }
        }

        let has_ancestor = self.has_ancestor();
        self.dist.stretch_column(uncommitted_height, has_ancestor)
    }

    /// Commits pending content to the current column, or to new ones if it
    /// does not fit. Called at every possible break point.
    ///
    /// Without `check_available_space` the content goes into the current
    /// column as is. Ancestors are committed that way; space is only managed
    /// by the innermost distributor.
    pub(crate) fn commit_content(&mut self, check_available_space: bool) -> Result<(), LayoutError> {
        let Some(first_uncommitted) = self.dist.first_uncommitted else {
            return Ok(());
        };

        let virtual_y = self.dist.cursors.virtual_y;

        if virtual_y < self.dist.cursors.earliest_break_virtual_y {
            return Ok(());
        }

        if self.dist.current_column().is_none()
            || (check_available_space && !self.find_space(virtual_y))
        {
            let minimum_height = virtual_y - self.dist.cursors.pending_virtual_y_start;
            self.get_new_column(Some(first_uncommitted), minimum_height, true)?;
        }

        let bottom = self.dist.bottom(virtual_y);
        if let Some(mut ancestor) = ancestor_of(self.outer) {
            let ancestor_y = bottom + ancestor.dist.stack_offset;

            if ancestor.dist.cursors.virtual_y < ancestor_y {
                ancestor.dist.cursors.virtual_y = ancestor_y;
            }

            ancestor.commit_content(false)?;
        }

        let dist = &mut *self.dist;
        let last_allocated = dist.last_allocated;

        match dist.current_column_mut() {
            Some(column) => column.set_stop_after_element(last_allocated),
            None => log::warn!("No column to commit content at {} to", virtual_y),
        }

        dist.cursors.committed_virtual_y = virtual_y;
        dist.cursors.pending_virtual_y_start = virtual_y;
        dist.pending_start_offset = 0;
        dist.first_uncommitted = None;
        log::trace!("Committed up to {}", virtual_y);

        self.add_queued_floats(ColumnCreationPolicy::None)
    }

    /// Treats pane floats as regular content up to `virtual_bottom`.
    ///
    /// Floats are never committed in the container they live in, but
    /// ancestors must make room for them.
    pub(crate) fn flush_floats(&mut self, virtual_bottom: LayoutCoord) {
        let dist = &mut *self.dist;
        let virtual_bottom = virtual_bottom + dist.stack_offset;

        if dist.cursors.virtual_y < virtual_bottom {
            dist.cursors.virtual_y = virtual_bottom;
            dist.cursors.committed_virtual_y = virtual_bottom;
            dist.cursors.pending_virtual_y_start = virtual_bottom;

            let bottom = self.dist.bottom(virtual_bottom);
            if let Some(mut ancestor) = ancestor_of(self.outer) {
                ancestor.flush_floats(bottom);
            }
        }
    }

    /// Makes the last column end right before `element`, in ancestors too.
    pub(crate) fn set_stop_before(&mut self, element: Option<BoundaryElement>) {
        if !self.dist.row_open {
            return;
        }

        if let Some(column) = self.dist.current_row_mut().and_then(|row| row.last_column_mut()) {
            column.set_stop_before_element(element);
        }

        if let Some(mut ancestor) = ancestor_of(self.outer) {
            ancestor.set_stop_before(element);
        }
    }

    /// Commits everything pending, adds the floats that fit and closes the
    /// column.
    pub(crate) fn finalize_column(&mut self) -> Result<(), LayoutError> {
        let cursors = &mut self.dist.cursors;
        if cursors.virtual_y < cursors.earliest_break_virtual_y {
            // Pull past all content.
            cursors.virtual_y = cursors.earliest_break_virtual_y;
        }

        self.commit_content(true)?;
        self.add_queued_floats(ColumnCreationPolicy::One)?;
        self.close_column();
        Ok(())
    }

    /// Ends the pass: commits everything, places every remaining float and
    /// closes the last row.
    pub(crate) fn finalize(&mut self, stretch_to_ancestor: bool) -> Result<(), LayoutError> {
        self.finalize_column()?;
        self.add_queued_floats(ColumnCreationPolicy::Any)?;
        self.close_row(stretch_to_ancestor);

        log::debug!(
            "Distributed into {} rows (reached max height: {})",
            self.dist.rows.len(),
            self.dist.reached_max_height
        );
        Ok(())
    }

    /// Adds the part of `block` that its children did not cover, splitting
    /// it over as many columns as needed. Blocks with little or no child
    /// content have no natural break points of their own.
    pub(crate) fn add_empty_block_content(
        &mut self,
        block: BoxId,
        layout_height: LayoutCoord,
    ) -> Result<(), LayoutError> {
        let element = BoundaryElement::block(block);
        let stack_offset = self.dist.stack_offset;

        if self.dist.cursors.virtual_y < self.dist.cursors.earliest_break_virtual_y {
            // Adjacent to unbreakable content.
            let unbreakable_amount = self.dist.cursors.earliest_break_virtual_y - stack_offset;

            if unbreakable_amount >= layout_height {
                // Something unbreakable reaches at least as deep as this
                // block, so it cannot be split.
                self.dist.advance_head(layout_height);
                return Ok(());
            }

            self.dist.advance_head(unbreakable_amount);
        }

        if self.dist.cursors.virtual_y < stack_offset {
            // Skip to the top border edge. Margins are not split.
            self.dist.advance_head(0);
        }

        let mut height_processed = self.dist.cursors.virtual_y - stack_offset;

        if height_processed >= layout_height {
            return Ok(());
        }

        self.dist.last_allocated = Some(element);
        self.commit_content(true)?;

        if self.dist.current_row().is_none() {
            // A spanned box was the last child of this block.
            self.get_new_column(Some(element), 0, true)?;
        }

        if self.dist.current_row_height <= 0 {
            // Zero row height in constrained height. Splitting over an
            // endless number of columns would not help.
            self.dist.advance_head(layout_height);
            return Ok(());
        }

        while height_processed < layout_height {
            let mut advancement = self.dist.space_left();

            if advancement <= 0 {
                // Out of space. Close the column rather than stretch it.
                self.close_column();
                advancement = self.dist.current_row_height;

                if advancement <= 0 {
                    self.dist.advance_head(layout_height);
                    return Ok(());
                }
            }

            self.allocate_content(height_processed, element, height_processed);

            height_processed = (height_processed + advancement).min(layout_height);
            self.dist.advance_head(height_processed);

            if height_processed < layout_height {
                self.commit_content(true)?;
            }
        }

        Ok(())
    }
}
