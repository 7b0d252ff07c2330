//! Unit-spacing Simpson quadrature of the robustness curve.
//!
//! Even-length inputs integrate the first `n - 1` samples with composite
//! Simpson and add the Cartwright correction for the final interval, which is
//! the rule SciPy applies since 1.11.

/// Integrates `ys` with unit spacing.
///
/// Fewer than two samples integrate to zero and exactly two use the
/// trapezoid rule.
///
/// # Examples
/// ```
/// use dismantle_core::simpson;
///
/// assert_eq!(simpson(&[]), 0.0);
/// assert_eq!(simpson(&[1.0, 0.5]), 0.75);
/// assert!((simpson(&[1.0, 1.0, 1.0]) - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn simpson(ys: &[f64]) -> f64 {
    let n = ys.len();
    match n {
        0 | 1 => 0.0,
        2 => trapezoid(ys[0], ys[1]),
        _ => {
            let odd_len = if n % 2 == 1 { n } else { n - 1 };
            let mut sum = 0.0;
            for k in (0..odd_len - 2).step_by(2) {
                sum += panel(ys[k], ys[k + 1], ys[k + 2]);
            }
            if n % 2 == 1 {
                sum / 3.0
            } else {
                sum / 3.0 + last_interval(ys[n - 3], ys[n - 2], ys[n - 1])
            }
        }
    }
}

/// Running Simpson integral maintained one sample at a time.
///
/// After every [`push`](Self::push) the value equals [`simpson`] over all
/// samples pushed so far.
///
/// # Examples
/// ```
/// use dismantle_core::{RobustnessAuc, simpson};
///
/// let curve = [0.9, 0.7, 0.4, 0.4, 0.2];
/// let mut auc = RobustnessAuc::new();
/// for (i, &y) in curve.iter().enumerate() {
///     auc.push(y);
///     assert_eq!(auc.value(), simpson(&curve[..=i]));
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RobustnessAuc {
    len: usize,
    tail: [f64; 3],
    panels: f64,
}

impl RobustnessAuc {
    /// Starts an empty integral.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next sample of the curve.
    pub fn push(&mut self, y: f64) {
        self.tail = [self.tail[1], self.tail[2], y];
        self.len += 1;
        if self.len >= 3 && self.len % 2 == 1 {
            self.panels += panel(self.tail[0], self.tail[1], self.tail[2]);
        }
    }

    /// Number of samples pushed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` before the first sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current value of the integral.
    #[must_use]
    pub fn value(&self) -> f64 {
        let [a, b, c] = self.tail;
        match self.len {
            0 | 1 => 0.0,
            2 => trapezoid(b, c),
            n if n % 2 == 1 => self.panels / 3.0,
            _ => self.panels / 3.0 + last_interval(a, b, c),
        }
    }
}

fn trapezoid(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

fn panel(a: f64, b: f64, c: f64) -> f64 {
    a + 4.0 * b + c
}

fn last_interval(before_prev: f64, prev: f64, last: f64) -> f64 {
    (5.0 * last + 8.0 * prev - before_prev) / 12.0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::suite_proptest_config;

    #[rstest]
    #[case(&[], 0.0)]
    #[case(&[0.7], 0.0)]
    #[case(&[1.0, 0.0], 0.5)]
    #[case(&[0.0, 1.0, 2.0], 2.0)]
    #[case(&[0.0, 1.0, 2.0, 3.0], 4.5)]
    #[case(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0], 5.0)]
    fn integrates_known_curves(#[case] ys: &[f64], #[case] expected: f64) {
        assert!(
            (simpson(ys) - expected).abs() < 1e-12,
            "simpson({ys:?}) = {}",
            simpson(ys)
        );
    }

    #[rstest]
    fn quadratic_is_exact_for_odd_lengths() {
        let ys: Vec<f64> = (0..7).map(|x| f64::from(x * x)).collect();
        assert!((simpson(&ys) - 72.0).abs() < 1e-9);
    }

    proptest! {
        #![proptest_config(suite_proptest_config(128))]

        #[test]
        fn running_value_matches_batch(ys in prop::collection::vec(0.0_f64..=1.0, 0..64)) {
            let mut auc = RobustnessAuc::new();
            for i in 0..ys.len() {
                auc.push(ys[i]);
                prop_assert_eq!(auc.value().to_bits(), simpson(&ys[..=i]).to_bits());
            }
            prop_assert_eq!(auc.len(), ys.len());
        }
    }
}
