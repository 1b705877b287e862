//! Initial row height for balanced columns.

use crate::breakpoint::Breakpoint;
use colflow_types::{LAYOUT_COORD_MIN, LayoutCoord};

/// Height of a segment of `span` split by `implicit_breaks` assumed breaks,
/// rounded up.
fn segment_height(span: LayoutCoord, implicit_breaks: u32) -> LayoutCoord {
    let breaks = implicit_breaks as LayoutCoord;
    (span + breaks) / (breaks + 1)
}

/// Tallest segment, and the index of the break that ends it.
fn tallest_segment(start: LayoutCoord, breaks: &[Breakpoint]) -> (LayoutCoord, Option<usize>, LayoutCoord) {
    let mut prev = start;
    let mut max_height = LAYOUT_COORD_MIN;
    let mut tallest = None;

    for (index, bp) in breaks.iter().enumerate() {
        let height = segment_height(bp.virtual_y() - prev, bp.assumed_implicit_breaks());

        // Strict comparison: equal segments go to the first one scanned.
        if max_height < height {
            max_height = height;
            tallest = Some(index);
        }

        prev = bp.virtual_y();
    }

    (max_height, tallest, prev)
}

/// Places `free_breaks` implicit column breaks among the explicit `breaks`
/// of a row so that the tallest column is as short as possible, and returns
/// that column height.
///
/// `breaks` runs from the first break of the row up to and including the
/// break that stops the row. If `open_ended` holds, the row may also continue
/// past the last break, up to `row_stop`, and implicit breaks may be placed
/// in that trailing segment.
pub(crate) fn balanced_row_height(
    start: LayoutCoord,
    breaks: &mut [Breakpoint],
    row_stop: LayoutCoord,
    open_ended: bool,
    free_breaks: i32,
) -> LayoutCoord {
    let mut trailing_breaks: LayoutCoord = 0;

    for _ in 0..free_breaks {
        let (max_height, tallest, last_y) = tallest_segment(start, breaks);

        if open_ended && max_height < (row_stop - last_y) / (trailing_breaks + 1) {
            trailing_breaks += 1;
        } else if let Some(index) = tallest {
            breaks[index].assume_implicit_break_before();
        } else {
            log::warn!("No segment to place an implicit column break in");
        }
    }

    let (mut max_height, _, last_y) = tallest_segment(start, breaks);
    let trailing_height = (row_stop - last_y) / (trailing_breaks + 1);

    if open_ended && max_height < trailing_height {
        max_height = trailing_height;
    }

    log::debug!(
        "Balanced {} implicit breaks over {} explicit ones: row height {}",
        free_breaks,
        breaks.len(),
        max_height
    );
    max_height
}

/// Row height for balanced columns with no explicit breaks in the way.
pub(crate) fn even_row_height(span: LayoutCoord, free_breaks: i32) -> LayoutCoord {
    segment_height(span, free_breaks.max(0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::BreakKind;

    #[test]
    fn even_split_rounds_up() {
        assert_eq!(even_row_height(300, 2), 100);
        assert_eq!(even_row_height(301, 2), 101);
        assert_eq!(even_row_height(120, 2), 40);
    }

    #[test]
    fn implicit_break_goes_to_the_tallest_segment() {
        // Segments 50 / 150 / 100 with one implicit break to spare.
        let mut breaks = vec![
            Breakpoint::new(50, BreakKind::Column),
            Breakpoint::new(200, BreakKind::Column),
        ];
        let height = balanced_row_height(0, &mut breaks, 300, true, 1);

        assert_eq!(breaks[1].assumed_implicit_breaks(), 1);
        assert_eq!(height, 100);
    }

    #[test]
    fn trailing_segment_takes_implicit_breaks() {
        let mut breaks = vec![Breakpoint::new(20, BreakKind::Column)];
        let height = balanced_row_height(0, &mut breaks, 320, true, 2);

        assert_eq!(breaks[0].assumed_implicit_breaks(), 0);
        assert_eq!(height, 100);
    }

    #[test]
    fn row_break_closes_the_row() {
        let mut breaks = vec![
            Breakpoint::new(60, BreakKind::Column),
            Breakpoint::new(100, BreakKind::Spanned),
        ];
        let height = balanced_row_height(0, &mut breaks, 500, false, 1);

        assert_eq!(breaks[0].assumed_implicit_breaks(), 1);
        assert_eq!(height, 40);
    }

    #[test]
    fn ties_go_to_the_first_segment() {
        let mut breaks = vec![
            Breakpoint::new(100, BreakKind::Column),
            Breakpoint::new(200, BreakKind::Row),
        ];
        balanced_row_height(0, &mut breaks, 200, false, 1);

        assert_eq!(breaks[0].assumed_implicit_breaks(), 1);
        assert_eq!(breaks[1].assumed_implicit_breaks(), 0);
    }
}
