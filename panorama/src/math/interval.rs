use crate::PanoramaError;
use std::fmt;

/// A closed interval of integers, `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval1D {
    from: i32,
    to: i32,
}

impl Interval1D {
    pub fn new(from: i32, to: i32) -> Result<Self, PanoramaError> {
        if from <= to {
            Ok(Self { from, to })
        } else {
            Err(PanoramaError::InvalidParameter("interval bounds"))
        }
    }

    pub fn included_from(&self) -> i32 {
        self.from
    }

    pub fn included_to(&self) -> i32 {
        self.to
    }

    pub fn contains(&self, v: i32) -> bool {
        self.from <= v && v <= self.to
    }

    /// Number of integers in this interval.
    pub fn size(&self) -> u64 {
        u64::from(self.to.abs_diff(self.from)) + 1
    }

    pub fn size_of_intersection_with(&self, other: &Self) -> u64 {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        if from <= to {
            u64::from(to.abs_diff(from)) + 1
        } else {
            0
        }
    }

    /// Returns `true` if the union of both intervals has no gap.
    pub fn is_unionable_with(&self, other: &Self) -> bool {
        self.size() + other.size() - self.size_of_intersection_with(other)
            == self.union(other).size()
    }

    /// Smallest interval covering both `self` and `other`, gaps
    /// between them included.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }

    /// This interval grown by `margin` on both ends.
    #[must_use]
    pub fn expanded(&self, margin: i32) -> Self {
        debug_assert!(margin >= 0);
        Self {
            from: self.from - margin,
            to: self.to + margin,
        }
    }
}

impl fmt::Display for Interval1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.from, self.to)
    }
}

/// The cartesian product of two [`Interval1D`], i.e. a rectangle of
/// integer pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval2D {
    x: Interval1D,
    y: Interval1D,
}

impl Interval2D {
    pub fn new(x: Interval1D, y: Interval1D) -> Self {
        Self { x, y }
    }

    pub fn ix(&self) -> Interval1D {
        self.x
    }

    pub fn iy(&self) -> Interval1D {
        self.y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x.contains(x) && self.y.contains(y)
    }

    pub fn size(&self) -> u64 {
        self.x.size() * self.y.size()
    }

    pub fn size_of_intersection_with(&self, other: &Self) -> u64 {
        self.x.size_of_intersection_with(&other.x) * self.y.size_of_intersection_with(&other.y)
    }

    pub fn is_unionable_with(&self, other: &Self) -> bool {
        self.size() + other.size() - self.size_of_intersection_with(other)
            == self.union(other).size()
    }

    /// Per-axis union.
    ///
    /// Note that the result may contain pairs that belong to neither
    /// operand.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x: self.x.union(&other.x),
            y: self.y.union(&other.y),
        }
    }

    #[must_use]
    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            x: self.x.expanded(margin),
            y: self.y.expanded(margin),
        }
    }
}

impl fmt::Display for Interval2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.x, self.y)
    }
}
