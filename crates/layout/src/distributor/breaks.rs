use super::{Nest, PaneMode, ancestor_of};
use crate::LayoutError;
use crate::boundary::BoundaryElement;
use crate::float::ColumnCreationPolicy;

impl Nest<'_> {
    /// Ends the current page, and with it the current column and row.
    ///
    /// `closed_by_pane_float` is set when a float with a forced break after
    /// it ends the page; the float is already in the column then.
    /// `has_child` is set when an inner container forwards its own page
    /// break here.
    pub(crate) fn explicitly_break_page(
        &mut self,
        stop_before: Option<BoundaryElement>,
        closed_by_pane_float: bool,
        has_child: bool,
    ) -> Result<(), LayoutError> {
        if let PaneMode::Pages { .. } = self.dist.mode {
            // Pages are the columns here.
            if closed_by_pane_float {
                self.close_column();
            } else {
                self.finalize_column()?;
                self.set_stop_before(stop_before);
            }
            return Ok(());
        }

        if !closed_by_pane_float {
            self.finalize_column()?;

            if !has_child {
                // Before the row closes.
                self.set_stop_before(stop_before);
                self.add_queued_floats(ColumnCreationPolicy::OneRow)?;
            }
        }

        self.close_row(false);

        if self.dist.is_paged_root() && !self.has_ancestor() {
            // Rows up to here stay on the page being closed.
            self.dist.paging.last_allowed_break_after = self.dist.rows.last_index();
        }

        if let Some(mut ancestor) = ancestor_of(self.outer) {
            ancestor.explicitly_break_page(stop_before, false, true)?;
        }

        if !self.dist.trial {
            self.close_page();
        }

        if !closed_by_pane_float && !has_child {
            match self.dist.pass_breakpoint() {
                Some(bp) if !bp.is_row_break() || bp.is_spanned_element() => {
                    log::warn!("Page break passed a break of kind {:?}", bp.kind())
                }
                Some(_) => {}
                None => log::warn!("No break queued for page break"),
            }
        }

        log::debug!("Page break at {}", self.dist.cursors.virtual_y);
        Ok(())
    }

    /// Ends the current column.
    pub(crate) fn explicitly_break_column(
        &mut self,
        stop_before: Option<BoundaryElement>,
        closed_by_pane_float: bool,
    ) -> Result<(), LayoutError> {
        if let PaneMode::Pages { .. } = self.dist.mode {
            log::warn!("Column break outside of a multi-column container ignored");
            return Ok(());
        }

        if closed_by_pane_float {
            self.close_column();
            return Ok(());
        }

        self.finalize_column()?;

        match self.dist.pass_breakpoint() {
            Some(bp) if bp.is_row_break() => {
                log::warn!("Column break passed a break of kind {:?}", bp.kind())
            }
            Some(_) => {}
            None => log::warn!("No break queued for column break"),
        }

        self.set_stop_before(stop_before);
        log::debug!("Column break at {}", self.dist.cursors.virtual_y);
        Ok(())
    }
}
