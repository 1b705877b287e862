use crate::pages::PageSequence;
use colflow_types::{LAYOUT_COORD_MAX, LayoutCoord};
use serde::Deserialize;

/// Construction-time settings for one multi-column distribution pass.
///
/// These are resolved by the box layout layer from the container's computed
/// style and are fixed for the whole pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DistributorConfig {
    /// Number of columns per row.
    ///
    /// Defaults to `1`.
    pub column_count: u32,
    /// Width of each column.
    pub column_width: LayoutCoord,
    /// Content box width of the container. Any difference between this and
    /// `column_count * column_width + gaps` is spread over the gaps.
    pub content_width: LayoutCoord,
    pub column_gap: LayoutCoord,
    /// Vertical distance between the top of one column and the next. Zero for
    /// ordinary columns, which sit side by side.
    pub column_y_stride: LayoutCoord,
    /// Top border and padding of the container. The virtual coordinate system
    /// starts below it.
    pub top_offset: LayoutCoord,
    /// Total virtual height of the content to distribute.
    pub virtual_height: LayoutCoord,
    /// Virtual height that pane floats would take up if they were regular
    /// content. Used to balance columns.
    pub floats_virtual_height: LayoutCoord,
    /// Maximum container content height. Rows are never taller than what is
    /// left of it.
    ///
    /// Defaults to `LAYOUT_COORD_MAX` (unconstrained).
    pub max_height: LayoutCoord,
    /// Balance the columns (`column-fill: balance`).
    ///
    /// Defaults to `true`.
    pub always_balance: bool,
    /// Lay out columns right to left.
    pub rtl: bool,
    /// The container has a definite height, so rows may be stretched to it.
    pub height_restricted: bool,
    /// Only estimating height. Pages are never closed and paged media is
    /// never consulted.
    pub trial: bool,
    /// The enclosing distributor distributes the content of this same
    /// element (e.g. a paged container with columns).
    pub ancestor_in_same_element: bool,
    /// Printed pages this root distributor lays content out on, if any.
    pub paged_media: Option<PageSequence>,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            column_count: 1,
            column_width: 0,
            content_width: 0,
            column_gap: 0,
            column_y_stride: 0,
            top_offset: 0,
            virtual_height: 0,
            floats_virtual_height: 0,
            max_height: LAYOUT_COORD_MAX,
            always_balance: true,
            rtl: false,
            height_restricted: false,
            trial: false,
            ancestor_in_same_element: false,
            paged_media: None,
        }
    }
}

impl DistributorConfig {
    /// Columns of `column_width` separated by `column_gap`, with the content
    /// width following from them.
    pub fn columns(column_count: u32, column_width: LayoutCoord, column_gap: LayoutCoord) -> Self {
        let count = column_count.max(1) as LayoutCoord;
        Self {
            column_count: column_count.max(1),
            column_width,
            content_width: column_width * count + column_gap * (count - 1),
            column_gap,
            ..Self::default()
        }
    }
}

/// Settings for paginating a paged container (`overflow: -o-paged`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaginatorConfig {
    /// Maximum container content height.
    pub max_height: LayoutCoord,
    /// Page width; pages are laid out side by side at this stride.
    pub page_width: LayoutCoord,
    /// Page height, which is also the vertical distance between pages.
    /// `None` means auto: pages grow to fit their tallest content.
    pub page_height: Option<LayoutCoord>,
    pub top_offset: LayoutCoord,
    /// Sum of the container's top and bottom padding. Added to the page
    /// stride when the page height is auto.
    pub vertical_padding: LayoutCoord,
    pub height_restricted: bool,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            max_height: LAYOUT_COORD_MAX,
            page_width: 0,
            page_height: None,
            top_offset: 0,
            vertical_padding: 0,
            height_restricted: false,
        }
    }
}
