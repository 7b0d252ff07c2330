//! Builder utilities for configuring dismantling runs.
//!
//! Exposes the stop-condition surface and the validation performed before a
//! [`Dismantler`] is constructed.

use crate::{Result, engine::Dismantler, error::DismantleError, policy::PolicyKind};

/// Size of the largest component at or below which a network counts as
/// dismantled.
///
/// # Examples
/// ```
/// use dismantle_core::StopCondition;
///
/// assert_eq!(StopCondition::Absolute(4).resolve(100), 4);
/// assert_eq!(StopCondition::Fraction(0.1).resolve(34), 4);
/// assert_eq!(StopCondition::Fraction(0.0).resolve(34), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StopCondition {
    /// Absolute vertex count.
    Absolute(usize),
    /// Fraction of the original vertex count, rounded up.
    Fraction(f64),
}

impl Default for StopCondition {
    fn default() -> Self {
        Self::Fraction(0.1)
    }
}

impl StopCondition {
    /// Resolves the condition against a graph with `vertex_count` vertices.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        reason = "validated fractions in [0, 1] keep the product within [0, vertex_count]"
    )]
    pub fn resolve(self, vertex_count: usize) -> usize {
        match self {
            Self::Absolute(count) => count,
            Self::Fraction(fraction) => {
                let scaled = (vertex_count as f64 * fraction).ceil();
                (scaled.max(0.0) as usize).min(vertex_count)
            }
        }
    }
}

/// Parameters resolved for one run and handed to the candidate producer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DismantleParams {
    /// Active stopping policy.
    pub policy: PolicyKind,
    /// Absolute stop condition for this graph.
    pub stop_condition: usize,
    /// AUC ceiling of the early-stopping guard; `None` disables it.
    pub early_stopping_auc: Option<f64>,
    /// Removals required before the guard may fire; `None` disables it.
    pub early_stopping_min_removals: Option<usize>,
}

/// Configures and constructs [`Dismantler`] instances.
///
/// # Examples
/// ```
/// use dismantle_core::{DismantlerBuilder, PolicyKind, StopCondition};
///
/// let dismantler = DismantlerBuilder::new()
///     .with_policy(PolicyKind::LccGated)
///     .with_stop_condition(StopCondition::Absolute(2))
///     .with_early_stopping(0.5, 3)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(dismantler.policy(), PolicyKind::LccGated);
/// assert_eq!(dismantler.early_stopping_auc(), Some(0.5));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DismantlerBuilder {
    policy: PolicyKind,
    stop_condition: StopCondition,
    early_stopping_auc: Option<f64>,
    early_stopping_min_removals: Option<usize>,
}

impl DismantlerBuilder {
    /// Creates a builder populated with default parameters: threshold policy,
    /// stop at 10% of the original vertex count, no early stopping.
    ///
    /// # Examples
    /// ```
    /// use dismantle_core::{DismantlerBuilder, PolicyKind, StopCondition};
    ///
    /// let builder = DismantlerBuilder::new();
    /// assert_eq!(builder.policy(), PolicyKind::Threshold);
    /// assert_eq!(builder.stop_condition(), StopCondition::Fraction(0.1));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the stopping policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the configured policy.
    #[must_use]
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Overrides the stop condition.
    #[must_use]
    pub fn with_stop_condition(mut self, stop_condition: StopCondition) -> Self {
        self.stop_condition = stop_condition;
        self
    }

    /// Returns the configured stop condition.
    #[must_use]
    pub fn stop_condition(&self) -> StopCondition {
        self.stop_condition
    }

    /// Sets the early-stopping AUC ceiling; `None` disables the guard.
    #[must_use]
    pub fn with_early_stopping_auc(mut self, ceiling: Option<f64>) -> Self {
        self.early_stopping_auc = ceiling;
        self
    }

    /// Sets the minimum removal count before early stopping may fire.
    #[must_use]
    pub fn with_early_stopping_min_removals(mut self, removals: Option<usize>) -> Self {
        self.early_stopping_min_removals = removals;
        self
    }

    /// Enables early stopping with both parameters at once.
    #[must_use]
    pub fn with_early_stopping(self, ceiling: f64, min_removals: usize) -> Self {
        self.with_early_stopping_auc(Some(ceiling))
            .with_early_stopping_min_removals(Some(min_removals))
    }

    /// Validates the configuration and constructs a [`Dismantler`].
    ///
    /// # Errors
    /// Returns [`DismantleError::InvalidStopFraction`] when a fractional stop
    /// condition is not a finite value in `[0, 1]`, and
    /// [`DismantleError::InvalidEarlyStoppingAuc`] when the AUC ceiling is
    /// NaN.
    ///
    /// # Examples
    /// ```
    /// use dismantle_core::{DismantleError, DismantlerBuilder, StopCondition};
    ///
    /// let err = DismantlerBuilder::new()
    ///     .with_stop_condition(StopCondition::Fraction(1.5))
    ///     .build()
    ///     .expect_err("fraction above one is rejected");
    /// assert!(matches!(err, DismantleError::InvalidStopFraction { .. }));
    /// ```
    pub fn build(self) -> Result<Dismantler> {
        if let StopCondition::Fraction(fraction) = self.stop_condition
            && !(0.0..=1.0).contains(&fraction)
        {
            return Err(DismantleError::InvalidStopFraction { got: fraction });
        }
        if let Some(ceiling) = self.early_stopping_auc
            && ceiling.is_nan()
        {
            return Err(DismantleError::InvalidEarlyStoppingAuc { got: ceiling });
        }
        Ok(Dismantler::new(
            self.policy,
            self.stop_condition,
            self.early_stopping_auc,
            self.early_stopping_min_removals,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::DismantleErrorCode;

    #[rstest]
    #[case(0.1, 34, 4)]
    #[case(0.25, 30, 8)]
    #[case(1.0, 7, 7)]
    #[case(0.5, 0, 0)]
    fn fractions_round_up(#[case] fraction: f64, #[case] n: usize, #[case] expected: usize) {
        assert_eq!(StopCondition::Fraction(fraction).resolve(n), expected);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.01)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_fractions_outside_unit_interval(#[case] fraction: f64) {
        let err = DismantlerBuilder::new()
            .with_stop_condition(StopCondition::Fraction(fraction))
            .build()
            .expect_err("fraction must be rejected");
        assert_eq!(err.code(), DismantleErrorCode::InvalidStopFraction);
    }

    #[rstest]
    fn rejects_nan_auc_ceiling() {
        let err = DismantlerBuilder::new()
            .with_early_stopping_auc(Some(f64::NAN))
            .build()
            .expect_err("NaN ceiling must be rejected");
        assert_eq!(err.code(), DismantleErrorCode::InvalidEarlyStoppingAuc);
    }

    #[rstest]
    fn infinite_ceiling_is_accepted() {
        let dismantler = DismantlerBuilder::new()
            .with_early_stopping(f64::INFINITY, 0)
            .build()
            .expect("infinite ceiling disables the guard");
        assert_eq!(dismantler.early_stopping_min_removals(), Some(0));
    }
}
