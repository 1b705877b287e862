//! Distribution of a paged container's content into pages.
//!
//! A paginator is a [`Distributor`] with a single row whose columns are the
//! pages. It is driven through a [`crate::DistributorStack`] like any other
//! distributor; convert it with `Distributor::from` before pushing it and
//! back with `Paginator::try_from` once the pass is done.

use crate::LayoutError;
use crate::column::Column;
use crate::config::{DistributorConfig, PaginatorConfig};
use crate::distributor::{Distributor, PaneMode};
use colflow_types::{LAYOUT_COORD_MAX, LayoutCoord};

#[derive(Debug)]
pub struct Paginator {
    dist: Distributor,
}

impl Paginator {
    pub fn new(config: PaginatorConfig) -> Self {
        let distributor_config = DistributorConfig {
            column_count: u32::MAX,
            column_width: config.page_width,
            content_width: config.page_width,
            column_gap: 0,
            // Auto height starts out flat and grows with the tallest page.
            column_y_stride: config.page_height.unwrap_or(0),
            top_offset: config.top_offset,
            virtual_height: LAYOUT_COORD_MAX,
            floats_virtual_height: 0,
            max_height: config.max_height,
            always_balance: false,
            rtl: false,
            height_restricted: config.height_restricted,
            trial: false,
            ancestor_in_same_element: false,
            paged_media: None,
        };

        let mut dist = Distributor::new(distributor_config, Vec::new(), Vec::new());
        dist.mode = PaneMode::Pages {
            vertical_padding: config.vertical_padding,
            page_height_auto: config.page_height.is_none(),
        };

        Self { dist }
    }

    pub fn distributor(&self) -> &Distributor {
        &self.dist
    }

    /// Height of the tallest page so far.
    pub fn page_height(&self) -> LayoutCoord {
        self.dist.rows.last().map_or(0, |pages| pages.height())
    }

    pub fn page_count(&self) -> usize {
        self.dist.rows.last().map_or(0, |pages| pages.column_count())
    }

    /// Puts bottom floats at the bottom of the container, now that its final
    /// content height is known.
    pub fn update_bottom_floats(&mut self, content_height: LayoutCoord) {
        if let Some(pages) = self.dist.rows.last_mut() {
            let stretched_row_height = content_height - pages.position();

            for page in pages.columns_mut() {
                page.position_bottom_floats(stretched_row_height);
            }
        }
    }

    /// Hands over every page created so far, leaving none behind.
    pub fn take_all_pages(&mut self) -> Vec<Column> {
        self.dist
            .rows
            .last_mut()
            .map(|pages| pages.take_columns())
            .unwrap_or_default()
    }
}

impl From<Paginator> for Distributor {
    fn from(paginator: Paginator) -> Self {
        paginator.dist
    }
}

impl TryFrom<Distributor> for Paginator {
    type Error = LayoutError;

    fn try_from(dist: Distributor) -> Result<Self, Self::Error> {
        match dist.mode {
            PaneMode::Pages { .. } => Ok(Self { dist }),
            PaneMode::Columns => Err(LayoutError::EventOrder("distributor is not a paginator")),
        }
    }
}
