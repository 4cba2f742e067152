//! Closed projection interval.

/// A closed interval `[min, max]`, typically a shape's projection onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval. `min` and `max` are swapped if given out of order.
    #[inline]
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether the two intervals share more than a single point.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.min < other.max && other.min < self.max
    }

    /// Length of the shared region, zero if disjoint.
    #[inline]
    pub fn overlap(&self, other: &Interval) -> f32 {
        (self.max.min(other.max) - self.min.max(other.min)).max(0.0)
    }

    /// Whether `other` lies strictly inside this interval.
    #[inline]
    pub fn contains_exclusive(&self, other: &Interval) -> bool {
        other.min > self.min && other.max < self.max
    }

    /// Whether `value` lies in the interval (inclusive).
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Gap between two disjoint intervals, zero when they overlap.
    #[inline]
    pub fn distance(&self, other: &Interval) -> f32 {
        if self.max < other.min {
            other.min - self.max
        } else if other.max < self.min {
            self.min - other.max
        } else {
            0.0
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = Interval::new(0.0, 1.0);
        let b = Interval::new(1.0, 2.0);
        assert!(!a.overlaps(&b));
        assert_eq!(a.overlap(&b), 0.0);
        assert_eq!(a.distance(&b), 0.0);
    }

    #[test]
    fn test_overlap_and_distance() {
        let a = Interval::new(0.0, 1.0);
        let b = Interval::new(0.75, 3.0);
        assert!(a.overlaps(&b));
        assert!((a.overlap(&b) - 0.25).abs() < 1e-6);

        let c = Interval::new(2.0, 3.0);
        assert!((a.distance(&c) - 1.0).abs() < 1e-6);
        assert!((c.distance(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_containment() {
        let outer = Interval::new(-3.0, 3.0);
        let inner = Interval::new(-1.0, 2.0);
        assert!(outer.contains_exclusive(&inner));
        assert!(!inner.contains_exclusive(&outer));
        assert!(outer.contains(3.0));
    }

    #[test]
    fn test_new_orders_bounds() {
        let i = Interval::new(2.0, -1.0);
        assert_eq!(i.min, -1.0);
        assert_eq!(i.max, 2.0);
        assert_eq!(i.length(), 3.0);
    }
}
