//! Start and stop elements of columns and pages.

use colflow_types::{BoxId, RowIndex};
use serde::{Deserialize, Serialize};

/// The logical unit a column or page starts or stops with.
///
/// This may be a line, a block, a table row group or caption, a table row, a
/// flex item, or a row of columns in an inner multi-pane container. The
/// referenced unit lives in the box tree and is never owned here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryElement {
    /// A line inside `container`.
    Line { container: BoxId, line: BoxId },
    /// A block box, or a layout break, in a vertical layout stack.
    Block { block: BoxId },
    /// A table row group or caption.
    TableListElement { element: BoxId },
    TableRow { row: BoxId },
    FlexItem { item: BoxId },
    /// A row of columns in the inner multi-pane container `container`.
    ColumnRow { container: BoxId, row: RowIndex },
}

impl BoundaryElement {
    pub fn line(container: BoxId, line: BoxId) -> Self {
        BoundaryElement::Line { container, line }
    }

    pub fn block(block: BoxId) -> Self {
        BoundaryElement::Block { block }
    }

    pub fn column_row(container: BoxId, row: RowIndex) -> Self {
        BoundaryElement::ColumnRow { container, row }
    }

    /// The element associated with this boundary.
    ///
    /// Lines report their container, column rows report the inner multi-pane
    /// container that owns the row.
    pub fn element(&self) -> BoxId {
        match *self {
            BoundaryElement::Line { container, .. } => container,
            BoundaryElement::Block { block } => block,
            BoundaryElement::TableListElement { element } => element,
            BoundaryElement::TableRow { row } => row,
            BoundaryElement::FlexItem { item } => item,
            BoundaryElement::ColumnRow { container, .. } => container,
        }
    }

    fn identity(&self) -> (u8, BoxId, usize) {
        match *self {
            BoundaryElement::Line { line, .. } => (0, line, 0),
            BoundaryElement::Block { block } => (1, block, 0),
            BoundaryElement::TableListElement { element } => (2, element, 0),
            BoundaryElement::TableRow { row } => (3, row, 0),
            BoundaryElement::FlexItem { item } => (4, item, 0),
            BoundaryElement::ColumnRow { container, row } => (5, container, row.0),
        }
    }
}

/// Two boundary elements are equal when they are the same kind of element
/// and refer to the same unit; the container of a line does not take part.
impl PartialEq for BoundaryElement {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for BoundaryElement {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_line_container() {
        let a = BoundaryElement::line(BoxId::new(1), BoxId::new(10));
        let b = BoundaryElement::line(BoxId::new(2), BoxId::new(10));
        assert_eq!(a, b);
    }

    #[test]
    fn equality_distinguishes_kinds() {
        let block = BoundaryElement::block(BoxId::new(5));
        let row = BoundaryElement::TableRow { row: BoxId::new(5) };
        assert_ne!(block, row);
    }

    #[test]
    fn column_rows_of_the_same_container_differ_by_index() {
        let a = BoundaryElement::column_row(BoxId::new(3), RowIndex(0));
        let b = BoundaryElement::column_row(BoxId::new(3), RowIndex(1));
        assert_ne!(a, b);
        assert_eq!(a.element(), BoxId::new(3));
    }
}
