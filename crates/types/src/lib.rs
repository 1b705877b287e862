pub mod geometry;
pub mod ids;

pub use geometry::{
    LAYOUT_COORD_MAX, LAYOUT_COORD_MIN, LayoutCoord, Rect, Translation, collapse_margins,
};
pub use ids::{BoxId, RowIndex};
