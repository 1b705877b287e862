//! Newtype handles into the externally owned box tree
//!
//! The distribution engine never owns boxes. It refers to them through these
//! opaque ids, which the box tree hands out and resolves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-owning handle to a box (block, line, table row, float, container...).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(u32);

impl BoxId {
    /// Creates a handle from the raw id the box tree uses.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for BoxId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a row inside a container's row stack.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(pub usize);

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_ids_compare_by_raw_value() {
        assert_eq!(BoxId::new(7), BoxId::from(7));
        assert!(BoxId::new(3) < BoxId::new(4));
        assert_eq!(BoxId::new(9).to_string(), "#9");
    }
}
