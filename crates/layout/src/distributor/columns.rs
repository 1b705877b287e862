use super::balance::{balanced_row_height, even_row_height};
use super::{Nest, PaneMode, ancestor_of};
use crate::LayoutError;
use crate::boundary::BoundaryElement;
use crate::column::{Column, ColumnRow};
use crate::float::ColumnCreationPolicy;
use crate::policy::BreakPolicy;
use colflow_types::{LAYOUT_COORD_MIN, LayoutCoord, RowIndex};

impl Nest<'_> {
    /// Creates a new column, and a new row (and page) for it if needed.
    ///
    /// When the last column of an inner container's row is used up, or its
    /// row is too short for `minimum_height`, the enclosing container
    /// advances to its next column and a new inner row is started.
    pub(crate) fn get_new_column(
        &mut self,
        start_element: Option<BoundaryElement>,
        minimum_height: LayoutCoord,
        add_queued_floats: bool,
    ) -> Result<(), LayoutError> {
        if self.dist.column_open {
            // Implicit column break.
            self.close_column();
        }

        let mut need_new_ancestor_column = false;
        // Start the new ancestor column with the ancestor's own pending
        // element, unless the ancestor distributes this same element.
        let mut use_ancestors_first_uncommitted = false;

        let height_left = !self.dist.row_open
            || self.dist.row_position() + self.dist.current_row_height < self.dist.max_height;

        if let (Some(ancestor), true) = (self.ancestor(), height_left) {
            let ancestor_has_no_column = ancestor.current_column().is_none();
            need_new_ancestor_column = ancestor_has_no_column || self.dist.columns_left() == 0;
            use_ancestors_first_uncommitted =
                ancestor_has_no_column && !self.dist.ancestor_in_same_element;

            if !need_new_ancestor_column
                && (!self.dist.row_open || minimum_height > self.dist.current_row_height)
            {
                // Does the ancestor column, and the row here if any, have
                // room for the minimum height?
                let space_used = ancestor.stack_offset + self.dist.row_position()
                    - ancestor.cursors.col_virtual_y_start;
                let mut available = if ancestor.balance_current_row {
                    ancestor.current_row_height - space_used
                } else {
                    ancestor.max_row_height - space_used
                };

                if self.dist.row_open && available > self.dist.max_row_height {
                    available = self.dist.max_row_height;
                }

                if available < minimum_height {
                    need_new_ancestor_column = self.more_space_ahead();
                }
            }

            if need_new_ancestor_column {
                if self.dist.row_open {
                    // Floats waiting for a new row may go now.
                    self.dist.float_queue.reset_for_next_row();
                }

                self.close_row(true);

                if let (Some(row), Some(ancestor)) = (self.dist.rows.last(), ancestor_of(self.outer)) {
                    // The next outer column starts right below this row.
                    // Start candidates propagated so far are not reliable.
                    let start = ancestor.dist.stack_offset + row.position() + row.height();
                    ancestor.dist.cursors.pending_virtual_y_start = start;
                    ancestor.dist.cursors.committed_virtual_y = start;
                    if ancestor.dist.cursors.virtual_y < start {
                        ancestor.dist.cursors.virtual_y = start;
                    }
                }
            }
        } else if self.dist.is_paged_root() {
            self.check_page_exhausted(minimum_height);
        }

        if !self.dist.row_open {
            self.open_row(minimum_height, need_new_ancestor_column, use_ancestors_first_uncommitted)?;
        }

        // Cut margins crossing column boundaries.
        let margin_gap =
            self.dist.cursors.pending_virtual_y_start - self.dist.cursors.committed_virtual_y;

        if margin_gap > 0 {
            let columns_left = self.dist.column_count - self.dist.current_column_num;

            if self.dist.balance_current_row && columns_left > 0 {
                // The skipped margin was not part of the initial row height.
                // Balance the rest of the content without it.
                self.dist.increase_row_height(-(margin_gap / columns_left));
            }

            self.dist.y_translation -= margin_gap;
        }

        let column = Column::new(
            start_element,
            self.dist.cursors.pending_virtual_y_start,
            self.dist.pending_start_offset,
            self.dist.calculate_column_x(),
            self.dist.column_y,
            self.dist.y_translation,
        );

        let row_index = self.dist.rows.last_index();
        let column_index = {
            let row = self
                .dist
                .current_row_mut()
                .ok_or(LayoutError::EventOrder("no open row for new column"))?;
            row.add_column(column)?;
            row.column_count() - 1
        };

        log::debug!(
            "New column {} at virtual y {} (row height {})",
            self.dist.current_column_num,
            self.dist.cursors.pending_virtual_y_start,
            self.dist.current_row_height
        );

        self.dist.cursors.col_virtual_y_start = self.dist.cursors.pending_virtual_y_start;
        self.dist.column_open = true;
        self.reserve_spanning_float_heights(column_index);

        self.dist.pending_start_offset = 0;
        self.dist.allow_column_stretch = true;
        for ancestor in self.outer.iter_mut() {
            ancestor.pending_start_offset = 0;
            ancestor.allow_column_stretch = true;
        }

        if add_queued_floats {
            self.add_queued_floats(ColumnCreationPolicy::None)?;

            let floats_height = self.dist.top_floats_height + self.dist.bottom_floats_height;

            if self.dist.current_column().is_none()
                || (floats_height > 0
                    && self.dist.max_row_height - floats_height < minimum_height)
            {
                // Floats in the way. No room for content here; move on.
                if let Some(column) = row_index
                    .and_then(|index| self.dist.rows.get_mut(index))
                    .and_then(|row| row.columns_mut().get_mut(column_index))
                {
                    column.set_content_less();
                }

                return self.get_new_column(start_element, minimum_height, add_queued_floats);
            }
        }

        Ok(())
    }

    /// In paged media, closes the page when all of its columns are used, or
    /// when the row is too short and a new page would give more room.
    fn check_page_exhausted(&mut self, minimum_height: LayoutCoord) {
        let mut create_new_page = false;

        if self.dist.columns_left() == 0 {
            if let Some(row) = self.dist.rows.last() {
                let height = row.height().max(self.dist.current_row_height);
                create_new_page = row.position() + height < self.dist.max_height;
            }

            if create_new_page {
                self.dist.paging.last_allowed_break_after = self.dist.rows.last_index();
            }
        }

        if !create_new_page {
            if self.dist.row_open {
                create_new_page =
                    minimum_height > self.dist.current_row_height && self.more_space_ahead();
            } else if let (Some(row), Some(pages)) = (self.dist.rows.last(), &self.dist.paged_media) {
                let start_position = row.position() + row.height() + self.dist.pending_margin;

                if start_position + minimum_height > pages.page_bottom()
                    && start_position > pages.page_top()
                {
                    create_new_page = self.more_space_ahead();
                }
            }
        }

        if create_new_page {
            // Actual page creation happens when the next row is opened.
            self.close_page();
        }
    }

    /// Opens a new row and computes its initial height.
    fn open_row(
        &mut self,
        minimum_height: LayoutCoord,
        need_new_ancestor_column: bool,
        use_ancestors_first_uncommitted: bool,
    ) -> Result<(), LayoutError> {
        let last_row = self.dist.rows.last_index();
        let mut new_row_y = self
            .dist
            .rows
            .last()
            .map_or(0, |row| row.position() + row.height());

        new_row_y += self.dist.pending_margin;
        self.dist.y_translation -= self.dist.pending_margin;
        self.dist.pending_margin = 0;

        if !self.dist.paging.page_open && self.dist.paged_media.is_some() {
            new_row_y += self.get_new_page();
            self.dist.paging.last_allowed_break_after = last_row;
        } else {
            self.dist.paging.page_open = true;
            self.dist.max_row_height = self.dist.max_height - new_row_y.max(0);
        }

        let new_row_index = self.dist.rows.push(ColumnRow::new(new_row_y))?;

        if need_new_ancestor_column {
            if let Some(ancestor) = ancestor_of(self.outer) {
                let container = ancestor.dist.descendant_container;

                if let Some(previous) = new_row_index.0.checked_sub(1) {
                    let stop = container.map(|c| BoundaryElement::column_row(c, RowIndex(previous)));
                    if let Some(column) =
                        ancestor.dist.current_row_mut().and_then(ColumnRow::last_column_mut)
                    {
                        column.set_stop_after_element(stop);
                    }
                }
            }

            let start_element = match self.ancestor() {
                Some(ancestor) if use_ancestors_first_uncommitted => {
                    debug_assert!(ancestor.first_uncommitted.is_some());
                    ancestor.first_uncommitted
                }
                Some(ancestor) => ancestor
                    .descendant_container
                    .map(|c| BoundaryElement::column_row(c, new_row_index)),
                None => None,
            };

            if let Some(mut ancestor) = ancestor_of(self.outer) {
                ancestor.get_new_column(start_element, minimum_height, true)?;
            }
        }

        if self.dist.is_paged_root() && !self.has_ancestor() {
            if let Some(pages) = &self.dist.paged_media {
                let remaining_page_height = pages.page_bottom() - new_row_y;
                self.dist.max_row_height = self.dist.max_row_height.min(remaining_page_height);
            }

            if self
                .dist
                .paging
                .policy_after_previous
                .allowed_between(self.dist.paging.policy_before_current)
            {
                self.dist.paging.last_allowed_break_after = last_row;
            }
        }

        let mut initial_row_height = self.initial_row_height();

        if let Some(ancestor) = self.ancestor() {
            // Clamp to what the ancestor column has left. Without balancing,
            // use all of it.
            let space_used = ancestor.stack_offset + new_row_y
                - ancestor.cursors.col_virtual_y_start
                + ancestor.floats_height();
            let space = ancestor.current_row_height - space_used;
            let max_space = ancestor.max_row_height - space_used;

            if self.dist.balance_current_row {
                initial_row_height = initial_row_height.min(space);
            } else {
                initial_row_height = initial_row_height.max(space);
            }

            self.dist.max_row_height = self.dist.max_row_height.min(max_space);
        }

        let dist = &mut *self.dist;
        dist.initial_row_height = initial_row_height.min(dist.max_row_height);
        dist.current_row_height = dist.initial_row_height;
        dist.row_open = true;
        dist.row_has_spanned_floats = false;

        log::debug!(
            "New row {} at y {} (initial height {}, max {})",
            new_row_index.0,
            new_row_y,
            dist.current_row_height,
            dist.max_row_height
        );
        Ok(())
    }

    /// Height of the row being opened, from the breaks ahead of it.
    fn initial_row_height(&mut self) -> LayoutCoord {
        let dist = &mut *self.dist;
        dist.balance_current_row = dist.always_balance;

        let mut row_stop = dist.virtual_height;
        let mut relevant_explicit_breaks = 0;
        let mut row_break = None;
        let mut index = dist.next_break;

        while index < dist.breakpoints.len() {
            dist.breakpoints[index].reset_assumed_implicit_breaks();

            let next_break_y = dist
                .breakpoints
                .get(dist.next_break)
                .map_or(LAYOUT_COORD_MIN, |bp| bp.virtual_y());

            if dist.cursors.pending_virtual_y_start > next_break_y {
                log::warn!("Already past the break at virtual y {}", next_break_y);
                if let Some(bp) = dist.breakpoints.get(dist.next_break) {
                    dist.remaining_floats_virtual_height += bp.pane_float_height();
                }
                dist.next_break = index + 1;
                index += 1;
                continue;
            }

            let bp = &dist.breakpoints[index];

            if bp.is_row_break() {
                // A spanned box or a page break stops the row.
                row_stop = bp.virtual_y();

                if bp.is_spanned_element() {
                    // Content before a spanned box is always balanced.
                    dist.balance_current_row = true;
                }

                row_break = Some(index);
                break;
            }

            relevant_explicit_breaks += 1;
            index += 1;
        }

        // Balance as if the floats still queued were regular content.
        row_stop += dist.remaining_floats_virtual_height;

        let mut free_breaks = 0;

        if dist.balance_current_row {
            if !dist.span_all {
                free_breaks = (dist.column_count - 1) - relevant_explicit_breaks;
            }

            if free_breaks <= 0 {
                // Too many explicit breaks ahead for balancing to matter.
                dist.balance_current_row = false;
            }
        }

        let start = dist.cursors.pending_virtual_y_start;

        if free_breaks <= 0 {
            row_stop - start
        } else if relevant_explicit_breaks > 0 {
            let end = row_break.map_or(dist.breakpoints.len(), |i| i + 1);
            let open_ended = end == dist.breakpoints.len();
            let first = dist.next_break.min(end);
            balanced_row_height(start, &mut dist.breakpoints[first..end], row_stop, open_ended, free_breaks)
        } else {
            even_row_height(row_stop - start, free_breaks)
        }
    }

    /// Reserves float height in the new column for floats in earlier
    /// columns of the row that span into it.
    fn reserve_spanning_float_heights(&mut self, new_column_index: usize) {
        let dist = &mut *self.dist;
        let mut top_floats_height = LAYOUT_COORD_MIN;
        let mut bottom_floats_height = LAYOUT_COORD_MIN;

        if dist.row_has_spanned_floats {
            if let Some(row) = dist.rows.last() {
                for (i, column) in row.columns().iter().take(new_column_index).enumerate() {
                    let mut this_col_top_height = 0;
                    let floats = column.floats();

                    for (f, entry) in floats.iter().enumerate() {
                        this_col_top_height += entry.outer_height();

                        if dist.current_column_num - (i as i32) >= entry.column_span() as i32 {
                            continue;
                        }

                        if entry.is_top_aligned() {
                            top_floats_height = top_floats_height.max(this_col_top_height);
                        } else {
                            let this_col_bottom_height: LayoutCoord =
                                floats[f..].iter().map(|e| e.outer_height()).sum();
                            bottom_floats_height = bottom_floats_height.max(this_col_bottom_height);
                            break;
                        }
                    }
                }
            }
        }

        // No spanning floats means no height.
        dist.top_floats_height = if top_floats_height == LAYOUT_COORD_MIN {
            0
        } else {
            top_floats_height
        };
        dist.bottom_floats_height = if bottom_floats_height == LAYOUT_COORD_MIN {
            0
        } else {
            bottom_floats_height
        };
    }

    /// Advances to a new page, returning how far rows after the last allowed
    /// page break moved down.
    fn get_new_page(&mut self) -> LayoutCoord {
        debug_assert!(!self.has_ancestor());

        let y_pos = self
            .dist
            .paging
            .last_allowed_break_after
            .and_then(|index| self.dist.rows.get(index))
            .map_or(0, |row| row.position() + row.height());

        if self.dist.paging.page_open {
            self.close_page();
        }

        let dist = &mut *self.dist;
        let Some(pages) = dist.paged_media.as_mut() else {
            return 0;
        };

        let mut policy = dist
            .paging
            .policy_after_previous
            .combine(dist.paging.policy_before_current);

        loop {
            let page = pages.advance_page(y_pos);

            policy = match policy {
                // A blank page is needed if parity is off.
                BreakPolicy::Left if page.number % 2 == 1 => BreakPolicy::Allow,
                BreakPolicy::Left => BreakPolicy::Always,
                BreakPolicy::Right if page.number % 2 == 0 => BreakPolicy::Allow,
                BreakPolicy::Right => BreakPolicy::Always,
                _ => BreakPolicy::Allow,
            };

            if policy == BreakPolicy::Allow {
                break;
            }
        }

        let page_top = pages.page_top();
        let y_offset = page_top - y_pos;
        dist.max_row_height = pages.page_bottom() - page_top;
        dist.paging.page_open = true;

        // Everything after the page break moves down to the new page.
        let first_moved = dist
            .paging
            .last_allowed_break_after
            .map_or(0, |index| index.0 + 1);
        for row in dist.rows.rows_from_mut(first_moved) {
            row.move_down(y_offset);
        }

        log::debug!("New page at {} (rows moved by {})", page_top, y_offset);
        y_offset
    }

    /// Closes the open column, if any, recording its final geometry.
    pub(crate) fn close_column(&mut self) {
        let dist = &mut *self.dist;
        let column_height = dist.space_used();
        let top = dist.top_floats_height;
        let bottom = dist.bottom_floats_height;
        let floats_height = top + bottom;

        let Some(column) = dist.current_column_mut() else {
            dist.column_open = false;
            return;
        };

        column.set_top_floats_height(top);
        column.set_bottom_floats_height(bottom);
        column.translate_y_by(top);
        column.set_height(column_height - floats_height);
        column.position_top_floats();

        dist.update_height(column_height);
        dist.column_y += dist.column_y_stride;
        dist.y_translation -= column_height - floats_height;
        dist.current_column_num += 1;
        dist.column_open = false;

        if floats_height != 0 {
            // Pane floats are never committed; ancestors still have to
            // account for them.
            let bottom = self.dist.bottom(self.dist.cursors.committed_virtual_y);
            if let Some(mut ancestor) = ancestor_of(self.outer) {
                ancestor.flush_floats(bottom);
            }
        }
    }

    /// Closes the open row (and column), positioning its bottom floats.
    pub(crate) fn close_row(&mut self, stretch_to_ancestor: bool) {
        if self.dist.row_open {
            self.close_column();

            let stretch = stretch_to_ancestor
                && self.ancestor().is_some_and(|ancestor| ancestor.height_restricted);
            let dist = &mut *self.dist;

            dist.column_y = 0;
            dist.current_column_num = 0;

            let max_row_height = dist.max_row_height;
            if let Some(row) = dist.current_row_mut() {
                let mut row_height = row.height();

                if stretch && row_height < max_row_height {
                    row_height = max_row_height;
                }

                for column in row.columns_mut() {
                    column.position_bottom_floats(row_height);
                }
            }
        }

        self.dist.row_open = false;
    }

    /// Closes the current page. Later content goes on a new page.
    pub(crate) fn close_page(&mut self) {
        if let PaneMode::Pages { .. } = self.dist.mode {
            // A paged container's pages are its columns; there is no outer
            // page to close.
            return;
        }

        self.close_row(false);

        if let Some(mut ancestor) = ancestor_of(self.outer) {
            ancestor.close_page();
        } else if !self.dist.trial {
            self.dist.paging.page_open = false;
        }
    }
}
