pub mod assert;
pub mod collision;
pub mod linalg;
pub mod log;

pub mod gg_float {
    use crate::core::config::EPSILON;
    use num_traits::Zero;

    pub fn is_approximately_zero(x: f64) -> bool {
        x.abs() < EPSILON
    }

    pub fn force_positive_zero(x: f64) -> f64 {
        if x.is_zero() { 0.0 } else { x }
    }

    pub fn is_finite_positive(x: f64) -> bool {
        x.is_finite() && x > 0.0
    }
}

pub mod gg_iter {
    pub trait GgFloatIter: Iterator<Item = f64> {
        /// Returns the "obvious" max, with the following caveats:
        /// - if any input is NaN, returns the first NaN encountered;
        /// - +0.0 vs. -0.0 is handled nondeterministically, see `f64::max()`.
        fn max_f64(self) -> Option<f64>
        where
            Self: Sized,
        {
            self.fold(None, |max, x| match max {
                Some(m) if f64::is_nan(m) => Some(m),
                _ if x.is_nan() => Some(x),
                None => Some(x),
                Some(m) => Some(m.max(x)),
            })
        }
        fn min_f64(self) -> Option<f64>
        where
            Self: Sized,
        {
            self.fold(None, |min, x| match min {
                Some(m) if f64::is_nan(m) => Some(m),
                _ if x.is_nan() => Some(x),
                None => Some(x),
                Some(m) => Some(m.min(x)),
            })
        }
    }

    impl<T: Iterator<Item = f64>> GgFloatIter for T {}
}

pub mod gg_range {
    use std::ops::Range;

    /// Signed distance between two intervals on the same axis: positive when there is a gap
    /// between them, negative by the length of the overlap when they overlap.
    pub fn separation_f64(r1: &Range<f64>, r2: &Range<f64>) -> f64 {
        f64::max(r1.start, r2.start) - f64::min(r1.end, r2.end)
    }
}

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct UnorderedPair<T: Copy + Clone + Ord + PartialOrd + Eq + PartialEq>(T, T);
impl<T: Copy + Clone + Ord + PartialOrd + Eq + PartialEq> UnorderedPair<T> {
    pub fn new(a: T, b: T) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn fst(&self) -> T {
        self.0
    }
    pub fn snd(&self) -> T {
        self.1
    }
    pub fn contains(&self, value: T) -> bool {
        self.fst() == value || self.snd() == value
    }
}

#[cfg(test)]
mod tests {
    use super::gg_iter::GgFloatIter;
    use super::*;

    #[test]
    fn float_iter_min_max() {
        let xs = [3.0, -1.0, 2.5];
        assert_eq!(xs.iter().copied().max_f64(), Some(3.0));
        assert_eq!(xs.iter().copied().min_f64(), Some(-1.0));
        assert_eq!(std::iter::empty::<f64>().max_f64(), None);
        assert!([1.0, f64::NAN, 2.0].into_iter().max_f64().unwrap().is_nan());
        assert!([f64::NAN, 1.0].into_iter().min_f64().unwrap().is_nan());
    }

    #[test]
    fn range_separation() {
        assert_eq!(gg_range::separation_f64(&(0.0..1.0), &(2.0..3.0)), 1.0);
        assert_eq!(gg_range::separation_f64(&(2.0..3.0), &(0.0..1.0)), 1.0);
        assert_eq!(gg_range::separation_f64(&(0.0..1.0), &(0.5..3.0)), -0.5);
        assert_eq!(gg_range::separation_f64(&(0.0..1.0), &(1.0..3.0)), 0.0);
        // Containment: overlap is the length of the contained interval.
        assert_eq!(gg_range::separation_f64(&(0.0..4.0), &(1.0..2.0)), -1.0);
    }

    #[test]
    fn float_helpers() {
        assert!(gg_float::is_approximately_zero(1e-11));
        assert!(gg_float::is_approximately_zero(-1e-11));
        assert!(!gg_float::is_approximately_zero(1e-9));
        assert!(gg_float::force_positive_zero(-0.0).is_sign_positive());
        assert!(gg_float::is_finite_positive(1.0));
        assert!(!gg_float::is_finite_positive(0.0));
        assert!(!gg_float::is_finite_positive(f64::INFINITY));
    }

    #[test]
    fn unordered_pair_is_symmetric() {
        assert_eq!(UnorderedPair::new(2, 1), UnorderedPair::new(1, 2));
        assert_eq!(UnorderedPair::new(5, 3).fst(), 3);
        assert_eq!(UnorderedPair::new(5, 3).snd(), 5);
        assert!(UnorderedPair::new(1, 2).contains(2));
    }
}
