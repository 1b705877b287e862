//! Finding the columns a box ended up in after distribution.
//!
//! A [`ColumnLocator`] walks the rows of a multi-pane container in step with
//! a traversal of the container's content, the same way the distributor
//! walked it. Locators for nested containers are chained in a
//! [`LocatorStack`], outermost first.

use crate::LayoutError;
use crate::column::{Column, ColumnRow, ColumnRowStack};
use colflow_types::{BoxId, LayoutCoord, Rect, RowIndex, Translation};

/// A column in a row stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanePosition {
    pub row: RowIndex,
    pub column: usize,
}

enum Step {
    Column,
    /// Entered the row at this position.
    Row(LayoutCoord),
}

/// Locates one target box in the rows of one multi-pane container.
#[derive(Debug, Clone)]
pub struct ColumnLocator<'a> {
    target: BoxId,
    /// Pane floats are found directly in the columns they are attached to.
    pane_float: bool,
    rows: &'a ColumnRowStack,
    current: PanePosition,
    start: Option<PanePosition>,
    end: Option<PanePosition>,
    box_translation: Translation,
    /// Distance from the top of the start column to the top of the box.
    start_offset_from_top: LayoutCoord,
    virtual_y: LayoutCoord,
    stack_offset: LayoutCoord,
    descendant_translation: Translation,
    /// Union of the border areas of the box in every column it lives in,
    /// relative to its top-left border edge in the start column, as if the
    /// box had no width.
    border_rect: Rect,
}

impl<'a> ColumnLocator<'a> {
    /// Starts looking for `target` at the first column of `rows`.
    pub fn new(
        target: BoxId,
        rows: &'a ColumnRowStack,
        top_border_padding: LayoutCoord,
    ) -> Result<Self, LayoutError> {
        let has_columns = rows.first().is_some_and(|row| row.column_count() > 0);

        if !has_columns {
            return Err(LayoutError::EventOrder("no columns to locate a box in"));
        }

        Ok(Self {
            target,
            pane_float: false,
            rows,
            current: PanePosition {
                row: RowIndex(0),
                column: 0,
            },
            start: None,
            end: None,
            box_translation: Translation::zero(),
            start_offset_from_top: 0,
            virtual_y: 0,
            stack_offset: -top_border_padding,
            descendant_translation: Translation::zero(),
            border_rect: Rect::default(),
        })
    }

    /// Looks for the pane float `target` of height `height`.
    ///
    /// If one of the columns holds the float, it is found right away and no
    /// traversal is needed. Otherwise it lives in a nested container.
    pub fn for_pane_float(
        target: BoxId,
        height: LayoutCoord,
        rows: &'a ColumnRowStack,
        top_border_padding: LayoutCoord,
    ) -> Result<Self, LayoutError> {
        let mut locator = Self::new(target, rows, top_border_padding)?;
        locator.pane_float = true;

        let found = rows.iter().enumerate().find_map(|(row_index, row)| {
            row.columns()
                .iter()
                .position(|column| column.has_float(target))
                .map(|column| PanePosition {
                    row: RowIndex(row_index),
                    column,
                })
        });

        if let Some(position) = found {
            locator.current = position;
            locator.mark_start();
            locator.mark_end();
            locator.border_rect.bottom = height;
            log::debug!("Pane float {} found in {:?}", target, position);
        }

        Ok(locator)
    }

    pub fn target(&self) -> BoxId {
        self.target
    }

    /// Enters a child block at `offset` below the top border edge of its
    /// container.
    pub fn enter_child(&mut self, offset: LayoutCoord) {
        self.stack_offset += offset;
    }

    pub fn leave_child(&mut self, offset: LayoutCoord) {
        self.stack_offset -= offset;
    }

    pub fn is_box_start_found(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_box_end_found(&self) -> bool {
        self.end.is_some()
    }

    pub fn start(&self) -> Option<PanePosition> {
        self.start
    }

    pub fn end(&self) -> Option<PanePosition> {
        self.end
    }

    /// Translation from the container's content edge to the start column,
    /// including the column's virtual-to-actual Y translation.
    pub fn box_translation(&self) -> Translation {
        self.box_translation
    }

    pub fn start_offset_from_top(&self) -> LayoutCoord {
        self.start_offset_from_top
    }

    pub fn border_rect(&self) -> Rect {
        self.border_rect
    }

    /// Sets the translation into a nested multi-pane container.
    pub fn set_descendant_translation(&mut self, translation: Translation) {
        self.descendant_translation = translation;
    }

    pub fn descendant_translation(&self) -> Translation {
        self.descendant_translation
    }

    /// Column the box starts in.
    pub fn start_column(&self) -> Option<&'a Column> {
        self.start.and_then(|position| self.column_at(position))
    }

    fn row_at(&self, index: RowIndex) -> Option<&'a ColumnRow> {
        let rows: &'a ColumnRowStack = self.rows;
        rows.get(index)
    }

    fn column_at(&self, position: PanePosition) -> Option<&'a Column> {
        self.row_at(position.row)
            .and_then(|row| row.columns().get(position.column))
    }

    /// Advances one column or row if the current virtual position has
    /// reached it.
    fn advance(&mut self) -> Option<Step> {
        let row = self.row_at(self.current.row)?;
        let next_column = self.current.column + 1;

        if let Some(column) = row.columns().get(next_column) {
            if self.virtual_y < column.virtual_y() {
                return None;
            }

            // Bottom of the column being left, then top of the next one.
            self.update_border_rect(column.virtual_y());
            self.current.column = next_column;
            self.update_border_rect(column.virtual_y());
            return Some(Step::Column);
        }

        let next_row = RowIndex(self.current.row.0 + 1);
        let row = self.row_at(next_row)?;

        let Some(column) = row.first_column() else {
            log::warn!("Skipping {} without columns", next_row);
            return None;
        };

        if self.virtual_y < column.virtual_y() {
            return None;
        }

        self.update_border_rect(column.virtual_y());
        self.current = PanePosition {
            row: next_row,
            column: 0,
        };
        self.update_border_rect(column.virtual_y());
        Some(Step::Row(row.position()))
    }

    /// Expands the border rectangle to the current column at `virtual_y`.
    fn update_border_rect(&mut self, virtual_y: LayoutCoord) {
        if self.pane_float {
            return;
        }

        let Some(start) = self.start else {
            return;
        };

        let (Some(start_row), Some(start_column), Some(row), Some(column)) = (
            self.row_at(start.row),
            self.column_at(start),
            self.row_at(self.current.row),
            self.column_at(self.current),
        ) else {
            return;
        };

        let x = column.x() - start_column.x();
        let y = (row.position() + column.y()) - (start_row.position() + start_column.y())
            + virtual_y
            - column.virtual_y()
            - self.start_offset_from_top;

        self.border_rect.include_point(x, y);
    }

    fn mark_start(&mut self) {
        if self.start.is_some() {
            log::warn!("Start of {} found twice", self.target);
            return;
        }

        let (Some(row), Some(column)) = (self.row_at(self.current.row), self.column_at(self.current))
        else {
            return;
        };

        let mut translation_y = row.position() + column.y();
        if !self.pane_float {
            translation_y += column.translation_y();
        }

        self.start = Some(self.current);
        self.box_translation = Translation::new(column.x(), translation_y);
        self.start_offset_from_top = self.virtual_y - column.virtual_y();
    }

    fn mark_end(&mut self) {
        if self.end.is_some() {
            log::warn!("End of {} found twice", self.target);
            return;
        }

        self.end = Some(self.current);
        self.update_border_rect(self.virtual_y);
    }
}

/// Moves the innermost locator to `local_virtual_y`, telling ancestors
/// about every row it crosses.
fn set_position(levels: &mut [ColumnLocator<'_>], local_virtual_y: LayoutCoord) {
    let Some((locator, outer)) = levels.split_last_mut() else {
        return;
    };

    locator.virtual_y = locator.stack_offset + local_virtual_y;

    while let Some(step) = locator.advance() {
        if let Step::Row(row_position) = step {
            // The ancestor may have to move to its next column too.
            set_position(outer, row_position);
        }
    }
}

fn set_box_start_found(levels: &mut [ColumnLocator<'_>]) {
    if let Some((locator, outer)) = levels.split_last_mut() {
        locator.mark_start();
        set_box_start_found(outer);
    }
}

fn set_box_end_found(levels: &mut [ColumnLocator<'_>]) {
    if let Some((locator, outer)) = levels.split_last_mut() {
        locator.mark_end();
        set_box_end_found(outer);
    }
}

/// Column locators of nested multi-pane containers, innermost last.
#[derive(Debug)]
pub struct LocatorStack<'a> {
    levels: Vec<ColumnLocator<'a>>,
}

impl<'a> LocatorStack<'a> {
    pub fn new(root: ColumnLocator<'a>) -> Self {
        Self { levels: vec![root] }
    }

    /// Starts locating inside a nested container. A pane float already found
    /// by `nested` is reported to the enclosing locators right away.
    pub fn push(&mut self, nested: ColumnLocator<'a>) -> Result<(), LayoutError> {
        let found = nested.is_box_end_found();

        if found {
            set_box_start_found(&mut self.levels);
            set_box_end_found(&mut self.levels);
        }

        crate::util::try_push(&mut self.levels, nested, "nested locator")
    }

    pub fn pop(&mut self) -> Result<ColumnLocator<'a>, LayoutError> {
        self.levels
            .pop()
            .ok_or(LayoutError::EventOrder("pop from an empty locator stack"))
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn innermost(&self) -> Option<&ColumnLocator<'a>> {
        self.levels.last()
    }

    pub fn innermost_mut(&mut self) -> Option<&mut ColumnLocator<'a>> {
        self.levels.last_mut()
    }

    pub fn root(&self) -> Option<&ColumnLocator<'a>> {
        self.levels.first()
    }

    pub fn into_root(mut self) -> Result<ColumnLocator<'a>, LayoutError> {
        if self.levels.len() != 1 {
            return Err(LayoutError::EventOrder("nested locators still open"));
        }
        self.pop()
    }

    fn innermost_or_err(&mut self) -> Result<&mut ColumnLocator<'a>, LayoutError> {
        self.levels
            .last_mut()
            .ok_or(LayoutError::EventOrder("empty locator stack"))
    }

    pub fn enter_child(&mut self, offset: LayoutCoord) -> Result<(), LayoutError> {
        self.innermost_or_err()?.enter_child(offset);
        Ok(())
    }

    pub fn leave_child(&mut self, offset: LayoutCoord) -> Result<(), LayoutError> {
        self.innermost_or_err()?.leave_child(offset);
        Ok(())
    }

    /// Sets the position of the element being examined, relative to the
    /// container currently entered.
    pub fn set_position(&mut self, local_virtual_y: LayoutCoord) {
        set_position(&mut self.levels, local_virtual_y);
    }

    /// The target starts at the current position.
    pub fn set_box_start_found(&mut self) {
        set_box_start_found(&mut self.levels);
    }

    /// The target ends at the current position. Locating is done.
    pub fn set_box_end_found(&mut self) {
        set_box_end_found(&mut self.levels);
    }

    pub fn is_box_end_found(&self) -> bool {
        self.levels.last().is_some_and(ColumnLocator::is_box_end_found)
    }

    /// Translation of the box's start column from the outermost container's
    /// content edge, through every nested container.
    pub fn total_translation(&self) -> Translation {
        self.levels.iter().fold(Translation::zero(), |acc, locator| {
            let t = locator.box_translation();
            acc.offset(t.x, t.y)
        })
    }
}
