//! Columns (or pages), rows of them, and the stack of rows a multi-pane
//! container ends up with.

use crate::LayoutError;
use crate::boundary::BoundaryElement;
use crate::float::PaneFloatEntry;
use crate::util::{try_insert, try_push};
use colflow_types::{BoxId, LayoutCoord, RowIndex, Translation};
use serde::Serialize;

/// A column in a row of a multi-column container, or a page in a paged
/// container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Innermost first element. `None` for a column that only holds floats.
    start_element: Option<BoundaryElement>,
    /// Innermost last element. Only meaningful once the column is closed.
    stop_element: Option<BoundaryElement>,
    /// The column stops right before its stop element instead of right after.
    exclude_stop_element: bool,
    /// Attached floats in visual order: top floats, then bottom floats.
    floats: Vec<PaneFloatEntry>,
    virtual_y: LayoutCoord,
    height: LayoutCoord,
    /// Offset into the start element, for elements split over columns.
    start_offset: LayoutCoord,
    top_floats_height: LayoutCoord,
    bottom_floats_height: LayoutCoord,
    /// Distance from the left edge of the row.
    x: LayoutCoord,
    /// Distance from the top edge of the row.
    y: LayoutCoord,
    /// Distance between actual and virtual Y positions.
    translate_y: LayoutCoord,
}

impl Column {
    pub fn new(
        start_element: Option<BoundaryElement>,
        virtual_y: LayoutCoord,
        start_offset: LayoutCoord,
        x: LayoutCoord,
        y: LayoutCoord,
        translate_y: LayoutCoord,
    ) -> Self {
        Self {
            start_element,
            stop_element: start_element,
            exclude_stop_element: false,
            floats: Vec::new(),
            virtual_y,
            height: 0,
            start_offset,
            top_floats_height: 0,
            bottom_floats_height: 0,
            x,
            y,
            translate_y,
        }
    }

    pub fn set_height(&mut self, height: LayoutCoord) {
        self.height = height;
    }

    /// Marks the column as holding no content, only floats.
    pub fn set_content_less(&mut self) {
        self.start_element = None;
        self.stop_element = None;
    }

    pub fn set_stop_after_element(&mut self, element: Option<BoundaryElement>) {
        self.exclude_stop_element = false;
        self.stop_element = element;
    }

    pub fn set_stop_before_element(&mut self, element: Option<BoundaryElement>) {
        self.exclude_stop_element = true;
        self.stop_element = element;
    }

    pub fn move_down(&mut self, amount: LayoutCoord) {
        self.y += amount;
    }

    pub fn translate_y_by(&mut self, amount: LayoutCoord) {
        self.translate_y += amount;
    }

    pub fn set_top_floats_height(&mut self, height: LayoutCoord) {
        self.top_floats_height = height;
    }

    pub fn set_bottom_floats_height(&mut self, height: LayoutCoord) {
        self.bottom_floats_height = height;
    }

    /// Attaches a float, in front of any bottom floats already there.
    pub fn add_float(&mut self, entry: PaneFloatEntry) -> Result<(), LayoutError> {
        let first_bottom = self
            .floats
            .iter()
            .position(|f| !f.is_top_aligned())
            .unwrap_or(self.floats.len());
        try_insert(&mut self.floats, first_bottom, entry, "pane float")
    }

    /// Stacks top floats downwards from the top of the column.
    pub fn position_top_floats(&mut self) {
        let mut float_y = 0;

        for entry in self.floats.iter_mut().take_while(|f| f.is_top_aligned()) {
            float_y += entry.float.margin_top;
            entry.y = float_y;
            float_y += entry.float.margin_bottom + entry.float.height;
        }
    }

    /// Stacks bottom floats upwards from `row_height`.
    pub fn position_bottom_floats(&mut self, row_height: LayoutCoord) {
        let mut float_y = row_height;

        for entry in self.floats.iter_mut().rev().take_while(|f| !f.is_top_aligned()) {
            float_y -= entry.float.margin_bottom + entry.float.height;
            entry.y = float_y;
            float_y -= entry.float.margin_top;
        }
    }

    pub fn has_float(&self, id: BoxId) -> bool {
        self.floats.iter().any(|f| f.box_id() == id)
    }

    pub fn floats(&self) -> &[PaneFloatEntry] {
        &self.floats
    }

    pub fn start_element(&self) -> Option<BoundaryElement> {
        self.start_element
    }

    pub fn stop_element(&self) -> Option<BoundaryElement> {
        self.stop_element
    }

    pub fn excludes_stop_element(&self) -> bool {
        self.exclude_stop_element
    }

    pub fn start_offset(&self) -> LayoutCoord {
        self.start_offset
    }

    pub fn virtual_y(&self) -> LayoutCoord {
        self.virtual_y
    }

    pub fn height(&self) -> LayoutCoord {
        self.height
    }

    pub fn top_floats_height(&self) -> LayoutCoord {
        self.top_floats_height
    }

    pub fn bottom_floats_height(&self) -> LayoutCoord {
        self.bottom_floats_height
    }

    pub fn x(&self) -> LayoutCoord {
        self.x
    }

    pub fn y(&self) -> LayoutCoord {
        self.y
    }

    pub fn translation_y(&self) -> LayoutCoord {
        self.translate_y
    }

    /// Height including the floats that affect this column.
    pub fn outer_height(&self) -> LayoutCoord {
        self.height + self.top_floats_height + self.bottom_floats_height
    }
}

/// Where a pane ends up on screen, handed to a [`PaneVisitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneTraversal {
    /// Index of the pane in its row.
    pub index: usize,
    /// Translation to the top-left corner of the pane.
    pub pane_translation: Translation,
    /// Translation to apply to the single-column content of the pane.
    pub content_translation: Translation,
    /// Top of the pane's content clip, relative to the pane.
    pub clip_top: LayoutCoord,
    pub clip_height: LayoutCoord,
}

/// Receives the panes of a row, one at a time, during traversal.
pub trait PaneVisitor {
    /// Called before the content of `column` is traversed. Returning `false`
    /// skips the pane.
    fn enter_pane(&mut self, column: &Column, pane: &PaneTraversal) -> bool;

    fn leave_pane(&mut self, _column: &Column, _pane: &PaneTraversal) {}
}

/// A row of columns. One row is created each time content is put into
/// columns after a spanned element (or at the start), one for each spanned
/// element, and, in paged media, one per page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRow {
    /// Position relative to the top content edge of the container.
    y: LayoutCoord,
    columns: Vec<Column>,
}

impl ColumnRow {
    pub fn new(y: LayoutCoord) -> Self {
        Self {
            y,
            columns: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) -> Result<(), LayoutError> {
        try_push(&mut self.columns, column, "column")
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn first_column(&self) -> Option<&Column> {
        self.columns.first()
    }

    pub fn last_column(&self) -> Option<&Column> {
        self.columns.last()
    }

    pub fn last_column_mut(&mut self) -> Option<&mut Column> {
        self.columns.last_mut()
    }

    pub fn position(&self) -> LayoutCoord {
        self.y
    }

    pub fn move_down(&mut self, amount: LayoutCoord) {
        self.y += amount;
    }

    /// Height of the tallest column, floats included.
    pub fn height(&self) -> LayoutCoord {
        self.columns.iter().map(Column::outer_height).max().unwrap_or(0)
    }

    pub(crate) fn take_columns(&mut self) -> Vec<Column> {
        std::mem::take(&mut self.columns)
    }

    /// Visits every column of the row with its screen translation, starting
    /// from the container's content edge at `origin`.
    pub fn traverse<V: PaneVisitor>(&self, origin: Translation, visitor: &mut V) {
        let row_origin = origin.offset(0, self.y);

        for (index, column) in self.columns.iter().enumerate() {
            let pane_translation = row_origin.offset(column.x, column.y);
            let pane = PaneTraversal {
                index,
                pane_translation,
                content_translation: pane_translation.offset(0, column.translate_y),
                clip_top: column.top_floats_height,
                clip_height: column.height,
            };

            if visitor.enter_pane(column, &pane) {
                visitor.leave_pane(column, &pane);
            }
        }
    }
}

/// All rows of one multi-pane container, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnRowStack {
    rows: Vec<ColumnRow>,
}

impl ColumnRowStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ColumnRow) -> Result<RowIndex, LayoutError> {
        try_push(&mut self.rows, row, "column row")?;
        Ok(RowIndex(self.rows.len() - 1))
    }

    pub fn first(&self) -> Option<&ColumnRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&ColumnRow> {
        self.rows.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut ColumnRow> {
        self.rows.last_mut()
    }

    pub fn last_index(&self) -> Option<RowIndex> {
        self.rows.len().checked_sub(1).map(RowIndex)
    }

    pub fn get(&self, index: RowIndex) -> Option<&ColumnRow> {
        self.rows.get(index.0)
    }

    pub fn get_mut(&mut self, index: RowIndex) -> Option<&mut ColumnRow> {
        self.rows.get_mut(index.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnRow> {
        self.rows.iter()
    }

    pub(crate) fn rows_from_mut(&mut self, start: usize) -> &mut [ColumnRow] {
        let start = start.min(self.rows.len());
        &mut self.rows[start..]
    }

    pub fn into_rows(self) -> Vec<ColumnRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::PaneFloat;

    fn float(id: u32, height: LayoutCoord, top: bool) -> PaneFloatEntry {
        let mut float = PaneFloat::new(BoxId::new(id), height);
        float.top_aligned = top;
        float.margin_top = 2;
        float.margin_bottom = 3;
        PaneFloatEntry::new(float, None, false)
    }

    #[test]
    fn floats_are_kept_top_first() {
        let mut column = Column::new(None, 0, 0, 0, 0, 0);
        column.add_float(float(1, 10, false)).unwrap();
        column.add_float(float(2, 10, true)).unwrap();
        column.add_float(float(3, 10, false)).unwrap();
        let ids: Vec<u32> = column.floats().iter().map(|f| f.box_id().raw()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(column.has_float(BoxId::new(3)));
        assert!(!column.has_float(BoxId::new(4)));
    }

    #[test]
    fn floats_stack_from_their_edge() {
        let mut column = Column::new(None, 0, 0, 0, 0, 0);
        column.add_float(float(1, 10, true)).unwrap();
        column.add_float(float(2, 20, true)).unwrap();
        column.add_float(float(3, 30, false)).unwrap();
        column.add_float(float(4, 40, false)).unwrap();
        column.position_top_floats();
        column.position_bottom_floats(200);

        let ids: Vec<u32> = column.floats().iter().map(|f| f.box_id().raw()).collect();
        let ys: Vec<LayoutCoord> = column.floats().iter().map(|f| f.y).collect();
        // The first bottom float added stays nearest the bottom edge.
        assert_eq!(ids, vec![1, 2, 4, 3]);
        assert_eq!(ys, vec![2, 17, 122, 167]);
    }

    #[test]
    fn row_height_is_tallest_column_with_floats() {
        let mut row = ColumnRow::new(40);
        let mut a = Column::new(None, 0, 0, 0, 0, 0);
        a.set_height(100);
        let mut b = Column::new(None, 100, 0, 50, 0, 0);
        b.set_height(80);
        b.set_top_floats_height(30);
        row.add_column(a).unwrap();
        row.add_column(b).unwrap();
        assert_eq!(row.height(), 110);
        assert_eq!(ColumnRow::new(0).height(), 0);
    }

    struct Recorder(Vec<PaneTraversal>);

    impl PaneVisitor for Recorder {
        fn enter_pane(&mut self, _column: &Column, pane: &PaneTraversal) -> bool {
            self.0.push(*pane);
            true
        }
    }

    #[test]
    fn traversal_translates_each_pane() {
        let mut row = ColumnRow::new(40);
        let mut column = Column::new(None, 0, 0, 60, 5, -100);
        column.set_height(90);
        column.set_top_floats_height(10);
        row.add_column(column).unwrap();

        let mut recorder = Recorder(Vec::new());
        row.traverse(Translation::new(1, 2), &mut recorder);

        let pane = recorder.0[0];
        assert_eq!(pane.pane_translation, Translation::new(61, 47));
        assert_eq!(pane.content_translation, Translation::new(61, -53));
        assert_eq!((pane.clip_top, pane.clip_height), (10, 90));
    }
}
