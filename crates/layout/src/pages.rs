//! Printed pages that a root distributor lays its rows out on.

use colflow_types::LayoutCoord;
use serde::{Deserialize, Serialize};

/// One printed page, in coordinates relative to the top of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescription {
    /// 0-based page number. Even numbers are right pages, odd are left.
    pub number: u32,
    pub top: LayoutCoord,
    pub bottom: LayoutCoord,
}

/// A sequence of uniform pages.
///
/// `first_page_top` is usually zero or negative: the container may start
/// somewhere down the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSequence {
    pub page_height: LayoutCoord,
    #[serde(default)]
    pub first_page_top: LayoutCoord,
    #[serde(skip)]
    current: u32,
}

impl PageSequence {
    pub fn new(page_height: LayoutCoord, first_page_top: LayoutCoord) -> Self {
        Self {
            page_height,
            first_page_top,
            current: 0,
        }
    }

    fn describe(&self, number: u32) -> PageDescription {
        let top = self.first_page_top + self.page_height * number as LayoutCoord;
        PageDescription {
            number,
            top,
            bottom: top + self.page_height,
        }
    }

    /// The page content is currently added to.
    pub fn current_page(&self) -> PageDescription {
        self.describe(self.current)
    }

    pub fn page_top(&self) -> LayoutCoord {
        self.current_page().top
    }

    pub fn page_bottom(&self) -> LayoutCoord {
        self.current_page().bottom
    }

    /// Moves to the next page, skipping pages that end above `y_pos`.
    pub fn advance_page(&mut self, y_pos: LayoutCoord) -> PageDescription {
        let mut next = self.current + 1;

        if self.page_height > 0 {
            while self.describe(next).bottom <= y_pos {
                next += 1;
            }
        }

        self.current = next;
        log::debug!("Advanced to page {}", next);
        self.current_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_uniform() {
        let pages = PageSequence::new(500, -100);
        assert_eq!(
            pages.current_page(),
            PageDescription {
                number: 0,
                top: -100,
                bottom: 400
            }
        );
    }

    #[test]
    fn advancing_skips_pages_above_position() {
        let mut pages = PageSequence::new(100, 0);
        assert_eq!(pages.advance_page(50).number, 1);
        assert_eq!(pages.advance_page(350).number, 3);
        assert_eq!(pages.page_top(), 300);
        assert_eq!(pages.page_bottom(), 400);
    }
}
