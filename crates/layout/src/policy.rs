use serde::{Deserialize, Serialize};

/// Page or column breaking policy at a potential break location,
/// decomposed from the break-before / break-after properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakPolicy {
    #[default]
    Avoid,
    Allow,
    Always,
    /// Break so that the next page is a left page.
    Left,
    /// Break so that the next page is a right page.
    Right,
}

impl BreakPolicy {
    pub fn is_forced(self) -> bool {
        matches!(self, BreakPolicy::Always | BreakPolicy::Left | BreakPolicy::Right)
    }

    /// Combines the policies meeting at one break location.
    ///
    /// Left beats right, which beats always, which beats avoid.
    pub fn combine(self, other: BreakPolicy) -> BreakPolicy {
        use BreakPolicy::*;

        if self == Left || other == Left {
            Left
        } else if self == Right || other == Right {
            Right
        } else if self == Always || other == Always {
            Always
        } else if self == Avoid || other == Avoid {
            Avoid
        } else {
            Allow
        }
    }

    /// Whether two adjoining policies allow (or force) a break between them.
    pub fn allowed_between(self, other: BreakPolicy) -> bool {
        if self.is_forced() || other.is_forced() {
            true
        } else {
            self != BreakPolicy::Avoid && other != BreakPolicy::Avoid
        }
    }
}
