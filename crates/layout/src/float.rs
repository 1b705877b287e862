//! Column- and page-attached floats, and the queue they wait in until a
//! pane with room for them comes along.

use crate::LayoutError;
use crate::util::try_insert;
use colflow_types::{BoxId, LayoutCoord};
use serde::{Deserialize, Serialize};

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

/// A floating box anchored to a column or page rather than to a block
/// formatting context.
///
/// The box itself lives in the box tree; this is the part of it the
/// distributor needs to place it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneFloat {
    pub id: BoxId,
    pub height: LayoutCoord,
    #[serde(default)]
    pub margin_top: LayoutCoord,
    #[serde(default)]
    pub margin_bottom: LayoutCoord,
    /// Top-aligned if true, bottom-aligned otherwise.
    #[serde(default = "yes")]
    pub top_aligned: bool,
    /// Aligned with the far (right in LTR) corner of the row.
    #[serde(default)]
    pub far_corner: bool,
    #[serde(default = "one")]
    pub column_span: u32,
    /// Belongs on the page following the one it is defined in.
    #[serde(default)]
    pub for_next_page: bool,
    #[serde(default)]
    pub force_page_break_after: bool,
    #[serde(default)]
    pub force_column_break_after: bool,
}

impl PaneFloat {
    pub fn new(id: BoxId, height: LayoutCoord) -> Self {
        Self {
            id,
            height,
            margin_top: 0,
            margin_bottom: 0,
            top_aligned: true,
            far_corner: false,
            column_span: 1,
            for_next_page: false,
            force_page_break_after: false,
            force_column_break_after: false,
        }
    }

    /// Height including vertical margins.
    pub fn outer_height(&self) -> LayoutCoord {
        self.height + self.margin_top + self.margin_bottom
    }
}

/// A float waiting in the queue, or attached to a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneFloatEntry {
    pub float: PaneFloat,
    /// The pane in the row this float must start in, if any.
    pub start_pane: Option<u32>,
    /// Not placed before the next row starts.
    pub for_next_row: bool,
    /// Y position relative to the top of the column, set when positioned.
    pub y: LayoutCoord,
}

impl PaneFloatEntry {
    pub fn new(float: PaneFloat, start_pane: Option<u32>, for_next_row: bool) -> Self {
        Self {
            float,
            start_pane,
            for_next_row,
            y: 0,
        }
    }

    pub fn box_id(&self) -> BoxId {
        self.float.id
    }

    pub fn is_top_aligned(&self) -> bool {
        self.float.top_aligned
    }

    pub fn column_span(&self) -> u32 {
        self.float.column_span.max(1)
    }

    pub fn outer_height(&self) -> LayoutCoord {
        self.float.outer_height()
    }

    fn queue_key(&self) -> (bool, u32) {
        (self.for_next_row, self.start_pane.unwrap_or(0))
    }
}

/// How eagerly new columns may be created just to host queued floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCreationPolicy {
    /// Don't allow new columns.
    None,
    /// Allow one new column, but only if there is no current one.
    One,
    /// Allow new columns, as long as no new row is needed.
    OneRow,
    /// Allow as many columns as it takes to place every float.
    Any,
}

/// Floats looking for a column to live in.
///
/// Floats for the current row come before floats for the next row, and
/// within a row they are ordered by start pane. Floats with the same key
/// keep document order.
#[derive(Debug, Clone, Default)]
pub struct FloatQueue {
    entries: Vec<PaneFloatEntry>,
}

impl FloatQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: PaneFloatEntry) -> Result<(), LayoutError> {
        let key = entry.queue_key();
        let index = self
            .entries
            .iter()
            .position(|e| e.queue_key() > key)
            .unwrap_or(self.entries.len());
        try_insert(&mut self.entries, index, entry, "float queue entry")
    }

    pub fn first(&self) -> Option<&PaneFloatEntry> {
        self.entries.first()
    }

    pub fn pop_first(&mut self) -> Option<PaneFloatEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    pub fn get(&self, id: BoxId) -> Option<&PaneFloatEntry> {
        self.entries.iter().find(|e| e.box_id() == id)
    }

    /// Takes the float for box `id` out of the queue.
    pub fn remove(&mut self, id: BoxId) -> Option<PaneFloatEntry> {
        let index = self.entries.iter().position(|e| e.box_id() == id)?;
        Some(self.entries.remove(index))
    }

    /// Moves the head of the queue to the next row. There were not enough
    /// columns left for it in the current one.
    pub fn move_first_to_next_row(&mut self) -> Result<(), LayoutError> {
        if let Some(mut entry) = self.pop_first() {
            entry.for_next_row = true;
            self.insert(entry)?;
        }
        Ok(())
    }

    /// Makes floats that were waiting for a new row eligible again.
    pub fn reset_for_next_row(&mut self) {
        for entry in &mut self.entries {
            entry.for_next_row = false;
        }
        // Stable, so document order within a start pane is kept.
        self.entries.sort_by_key(PaneFloatEntry::queue_key);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaneFloatEntry> {
        self.entries.iter()
    }
}
