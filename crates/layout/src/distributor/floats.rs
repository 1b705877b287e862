use super::Nest;
use crate::LayoutError;
use crate::boundary::BoundaryElement;
use crate::float::{ColumnCreationPolicy, PaneFloat, PaneFloatEntry};
use colflow_types::{BoxId, LayoutCoord};

/// Where the queued float `id` wants to go: its start pane, and whether it
/// waits for the next row.
fn placement(nest: &Nest<'_>, id: BoxId) -> Option<(Option<i32>, bool)> {
    nest.dist.float_queue.get(id).map(|entry| {
        let start_pane = entry.start_pane.map(|pane| i32::try_from(pane).unwrap_or(i32::MAX));
        (start_pane, entry.for_next_row)
    })
}

impl Nest<'_> {
    /// Queues a pane float. It is added to a column once one with room for
    /// it comes along.
    pub(crate) fn add_pane_float(&mut self, float: PaneFloat) -> Result<(), LayoutError> {
        let span = i32::try_from(float.column_span.max(1)).unwrap_or(i32::MAX);
        let mut start_pane = None;
        let mut for_next_row = false;

        if float.far_corner {
            start_pane = u32::try_from(self.dist.column_count - span).ok();
        }

        if float.for_next_page {
            if self.has_ancestor() {
                // Next page of the enclosing paged container means next row
                // here.
                for_next_row = true;
            } else {
                start_pane = u32::try_from(self.dist.current_column_num + 1).ok();
            }
        }

        log::debug!(
            "Queued pane float {:?} (start pane {:?}, next row {})",
            float.id,
            start_pane,
            for_next_row
        );
        self.dist
            .float_queue
            .insert(PaneFloatEntry::new(float, start_pane, for_next_row))
    }

    /// Adds queued floats that fit in the current column, and keeps going
    /// for as long as the next float in the queue fits too.
    ///
    /// `policy` decides whether new columns may be created to host floats
    /// that do not fit.
    pub(crate) fn add_queued_floats(&mut self, policy: ColumnCreationPolicy) -> Result<(), LayoutError> {
        let mut allow_new_columns = policy != ColumnCreationPolicy::None;
        let fill_row = matches!(policy, ColumnCreationPolicy::Any | ColumnCreationPolicy::OneRow);

        if self.dist.span_all {
            return Ok(());
        }

        while let Some(id) = self.dist.float_queue.first().map(PaneFloatEntry::box_id) {
            let Some((start_pane, for_next_row)) = placement(self, id) else {
                break;
            };

            if self.has_ancestor()
                && !for_next_row
                && self.dist.current_column_num > 0
                && start_pane.is_some_and(|pane| pane < self.dist.current_column_num)
            {
                // Not enough columns left in this row. Moving it may reveal
                // other floats that are ready.
                self.dist.float_queue.move_first_to_next_row()?;
                continue;
            }

            if fill_row {
                if policy == ColumnCreationPolicy::Any && self.has_ancestor() && for_next_row {
                    if self.dist.current_row().is_none() {
                        self.get_new_column(None, 0, false)?;
                    }

                    let rows_before = self.dist.rows.len();
                    while self.dist.rows.len() == rows_before {
                        self.get_new_column(None, 0, false)?;
                    }
                }

                // A new row re-sorts the queue.
                let Some((start_pane, for_next_row)) = placement(self, id) else {
                    continue;
                };

                if let (Some(start_pane), false) = (start_pane, for_next_row) {
                    let rows_before = self.dist.rows.len();

                    while self.dist.current_column_num < start_pane {
                        self.get_new_column(None, 0, false)?;

                        if self.dist.rows.len() != rows_before {
                            // The row ran out of panes before the start pane.
                            break;
                        }
                    }
                }
            } else if for_next_row || start_pane.is_some_and(|pane| pane > self.dist.current_column_num) {
                // Not ready for this one yet.
                break;
            }

            let Some(height) = self.dist.float_queue.get(id).map(PaneFloatEntry::outer_height) else {
                continue;
            };
            let mut new_column = false;

            if self.dist.current_column().is_none() {
                if !allow_new_columns {
                    break;
                }

                new_column = true;
                self.get_new_column(Some(BoundaryElement::block(id)), height, false)?;

                if policy == ColumnCreationPolicy::One {
                    allow_new_columns = false;
                }
            }

            let virtual_y = self.dist.cursors.virtual_y;

            if new_column || self.dist.space_used() == 0 || self.find_space(virtual_y + height) {
                if let Some(entry) = self.dist.float_queue.remove(id) {
                    self.place_float(entry)?;
                }
                continue;
            }

            if fill_row {
                self.close_column();

                if self.dist.current_column_num >= self.dist.column_count {
                    if policy == ColumnCreationPolicy::OneRow {
                        break;
                    }

                    self.close_row(false);
                    self.dist.float_queue.reset_for_next_row();
                }

                continue;
            }

            break;
        }

        Ok(())
    }

    /// Attaches `entry` to the current column and honors the breaks it
    /// forces after itself.
    fn place_float(&mut self, entry: PaneFloatEntry) -> Result<(), LayoutError> {
        let height = entry.outer_height();
        let span = i32::try_from(entry.column_span()).unwrap_or(i32::MAX);
        let top_aligned = entry.is_top_aligned();
        let force_page_break_after = entry.float.force_page_break_after;
        let force_column_break_after = entry.float.force_column_break_after;
        let id = entry.box_id();

        let column = self
            .dist
            .current_column_mut()
            .ok_or(LayoutError::EventOrder("no column for pane float"))?;
        column.add_float(entry)?;

        let dist = &mut *self.dist;
        if span > 1 {
            dist.row_has_spanned_floats = true;
        }

        dist.remaining_floats_virtual_height -= height * span;

        if top_aligned {
            dist.top_floats_height += height;
        } else {
            dist.bottom_floats_height += height;
        }

        log::debug!(
            "Placed pane float {:?} in column {} (height {})",
            id,
            dist.current_column_num,
            height
        );

        if force_page_break_after {
            self.explicitly_break_page(None, true, false)?;
        } else if force_column_break_after {
            self.break_columns_after_float(span)?;
        }

        Ok(())
    }

    /// Ends every column a float with a forced column break after it spans.
    fn break_columns_after_float(&mut self, span: i32) -> Result<(), LayoutError> {
        let remaining_columns = self.dist.column_count - (self.dist.current_column_num + span);
        let mut span_left = span;

        loop {
            if self.dist.balance_current_row && remaining_columns > 0 {
                // Make up for the space lost to the forced break.
                let increase: LayoutCoord = self.dist.space_left() / remaining_columns;
                self.dist.increase_row_height(increase);
            }

            self.explicitly_break_column(None, true)?;
            span_left -= 1;

            if span_left <= 0 {
                return Ok(());
            }

            // Skip the empty columns the float spans.
            self.get_new_column(None, 0, false)?;
        }
    }
}
