use serde::{Deserialize, Serialize};

/// Layout unit used throughout column distribution.
///
/// Distribution works on whole layout units so that column balancing is
/// exact: splitting a span `S` over `n` columns yields heights of either
/// `ceil(S / n)` or `floor(S / n)`.
pub type LayoutCoord = i32;

/// Largest coordinate used as an "unbounded" sentinel.
///
/// Kept well below `i32::MAX` so that sums of a sentinel and ordinary
/// coordinates cannot overflow.
pub const LAYOUT_COORD_MAX: LayoutCoord = i32::MAX / 4;

/// Smallest coordinate used as a "not yet set" sentinel.
pub const LAYOUT_COORD_MIN: LayoutCoord = -LAYOUT_COORD_MAX;

/// An axis-aligned rectangle stored as edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: LayoutCoord,
    pub top: LayoutCoord,
    pub right: LayoutCoord,
    pub bottom: LayoutCoord,
}

impl Rect {
    pub fn new(left: LayoutCoord, top: LayoutCoord, right: LayoutCoord, bottom: LayoutCoord) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> LayoutCoord {
        self.right - self.left
    }

    pub fn height(&self) -> LayoutCoord {
        self.bottom - self.top
    }

    /// Grows the rectangle so that it includes the point `(x, y)`.
    pub fn include_point(&mut self, x: LayoutCoord, y: LayoutCoord) {
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.top = self.top.min(y);
        self.bottom = self.bottom.max(y);
    }
}

/// A 2D offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Translation {
    pub x: LayoutCoord,
    pub y: LayoutCoord,
}

impl Translation {
    pub fn new(x: LayoutCoord, y: LayoutCoord) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    pub fn offset(self, dx: LayoutCoord, dy: LayoutCoord) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Collapses two adjoining vertical margins.
///
/// Two positive margins collapse to the larger one, two negative margins to
/// the more negative one, and a positive and a negative margin are summed.
pub fn collapse_margins(a: LayoutCoord, b: LayoutCoord) -> LayoutCoord {
    if a >= 0 {
        if a < b {
            b
        } else if b < 0 {
            a + b
        } else {
            a
        }
    } else if a > b {
        b
    } else if b > 0 {
        a + b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_margins_take_the_larger() {
        assert_eq!(collapse_margins(10, 20), 20);
        assert_eq!(collapse_margins(20, 10), 20);
    }

    #[test]
    fn negative_margins_take_the_most_negative() {
        assert_eq!(collapse_margins(-10, -20), -20);
        assert_eq!(collapse_margins(-20, -10), -20);
    }

    #[test]
    fn mixed_margins_are_summed() {
        assert_eq!(collapse_margins(30, -10), 20);
        assert_eq!(collapse_margins(-10, 30), 20);
    }

    #[test]
    fn rect_grows_to_include_points() {
        let mut rect = Rect::default();
        rect.include_point(-5, 40);
        rect.include_point(100, -3);
        assert_eq!(rect, Rect::new(-5, -3, 100, 40));
        assert_eq!(rect.width(), 105);
        assert_eq!(rect.height(), 43);
    }
}
