//! Subset identifiers.

use std::fmt;

/// Partition an item belongs to.
///
/// `Unassigned` is the only non-terminal value: a completed split pass moves every
/// item it was asked to place into one of the three assignable subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subset {
    #[default]
    Unassigned,
    Training,
    Validation,
    Testing,
}

impl Subset {
    /// The three assignable subsets, in canonical (row) order.
    pub const ASSIGNABLE: [Subset; 3] = [Subset::Training, Subset::Validation, Subset::Testing];

    /// Row index into per-subset counters, or `None` for `Unassigned`.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        match self {
            Subset::Unassigned => None,
            Subset::Training => Some(0),
            Subset::Validation => Some(1),
            Subset::Testing => Some(2),
        }
    }

    /// Inverse of [`Subset::index`].
    #[must_use]
    pub fn from_index(idx: usize) -> Option<Subset> {
        Subset::ASSIGNABLE.get(idx).copied()
    }

    pub fn is_assigned(self) -> bool {
        self != Subset::Unassigned
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Subset::Unassigned => "unassigned",
            Subset::Training => "training",
            Subset::Validation => "validation",
            Subset::Testing => "testing",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
