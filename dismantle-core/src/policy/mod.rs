//! Acceptance and termination rules for a dismantling run.
//!
//! The four policies form a closed set. Each one decides whether a proposed
//! vertex may be removed and when the run is over; all of them share the
//! early-stopping guard on the running robustness AUC.

mod auc;

use std::fmt;

pub use self::auc::{RobustnessAuc, simpson};
use crate::{
    builder::DismantleParams,
    connectivity::Components,
    graph::DynamicId,
    kcore::CoreNumbers,
};

/// Selects the acceptance and termination rule of a run.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum PolicyKind {
    /// Accept every candidate; stop once the LCC is at or below the stop
    /// condition.
    #[default]
    Threshold,
    /// Accept only candidates inside the current LCC.
    LccGated,
    /// Accept only LCC candidates; stop once the peak SLCC reaches the LCC.
    PeakSlcc,
    /// Accept only LCC candidates inside the 2-core; stop once the 2-core is
    /// empty.
    KCoreGated,
}

impl PolicyKind {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Threshold,
        Self::LccGated,
        Self::PeakSlcc,
        Self::KCoreGated,
    ];

    /// Stable name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::LccGated => "lcc_threshold",
            Self::PeakSlcc => "lcc_peak",
            Self::KCoreGated => "kcore_lcc_threshold",
        }
    }

    /// Returns `true` when the policy may veto candidates.
    #[must_use]
    pub const fn needs_feedback(self) -> bool {
        !matches!(self, Self::Threshold)
    }

    /// Returns `true` when the policy consults core numbers.
    #[must_use]
    pub const fn needs_core_numbers(self) -> bool {
        matches!(self, Self::KCoreGated)
    }

    /// Returns `true` when an empty candidate stream is an error.
    #[must_use]
    pub const fn requires_first_step(self) -> bool {
        matches!(self, Self::PeakSlcc)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StopReason {
    /// The LCC reached the stop condition.
    Dismantled,
    /// The peak SLCC caught up with the LCC.
    SlccPeak,
    /// No vertex is left in the 2-core.
    TwoCoreExhausted,
    /// The early-stopping guard fired.
    EarlyStopped,
    /// The producer ran out of candidates.
    ProducerExhausted,
    /// The graph had no vertices.
    EmptyGraph,
}

impl StopReason {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dismantled => "dismantled",
            Self::SlccPeak => "slcc_peak",
            Self::TwoCoreExhausted => "two_core_exhausted",
            Self::EarlyStopped => "early_stopped",
            Self::ProducerExhausted => "producer_exhausted",
            Self::EmptyGraph => "empty_graph",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a [`StoppingPolicy`]; the only transition is
/// `Running -> Stopped`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyState {
    /// Candidates are still being processed.
    Running,
    /// The run is over.
    Stopped(StopReason),
}

/// Early-stopping guard parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarlyStopping {
    /// AUC the running integral must exceed.
    pub ceiling: f64,
    /// Accepted removals that must be exceeded first.
    pub min_removals: usize,
}

impl EarlyStopping {
    /// The guard is active only when both parameters are set.
    #[must_use]
    pub fn from_params(params: &DismantleParams) -> Option<Self> {
        Some(Self {
            ceiling: params.early_stopping_auc?,
            min_removals: params.early_stopping_min_removals?,
        })
    }

    fn fires(self, accepted: usize, auc: f64) -> bool {
        accepted > self.min_removals && auc > self.ceiling
    }
}

/// State machine deciding acceptance and termination for one run.
///
/// # Examples
/// ```
/// use dismantle_core::{
///     Components, DismantleParams, Graph, PolicyKind, StopReason, StoppingPolicy,
/// };
///
/// let mut graph = Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)]);
/// let params = DismantleParams {
///     policy: PolicyKind::Threshold,
///     stop_condition: 2,
///     early_stopping_auc: None,
///     early_stopping_min_removals: None,
/// };
/// let mut policy = StoppingPolicy::new(&params, &Components::measure(&graph));
///
/// let centre = graph.dynamic_id(3_u64.into()).expect("vertex exists");
/// graph.clear_vertex(centre).expect("slot exists");
/// let (lcc, slcc) = policy.observe(&Components::measure(&graph), 5);
/// assert_eq!((lcc, slcc), (0.4, 0.4));
/// assert_eq!(policy.should_stop(), Some(StopReason::Dismantled));
/// ```
#[derive(Clone, Debug)]
pub struct StoppingPolicy {
    kind: PolicyKind,
    stop_condition: usize,
    early: Option<EarlyStopping>,
    state: PolicyState,
    lcc_size: usize,
    slcc_size: usize,
    peak_slcc: usize,
    auc: RobustnessAuc,
}

impl StoppingPolicy {
    /// Starts a policy from the run parameters and the initial components.
    #[must_use]
    pub fn new(params: &DismantleParams, initial: &Components) -> Self {
        Self {
            kind: params.policy,
            stop_condition: params.stop_condition,
            early: EarlyStopping::from_params(params),
            state: PolicyState::Running,
            lcc_size: initial.lcc_size(),
            slcc_size: initial.slcc_size(),
            peak_slcc: initial.slcc_size(),
            auc: RobustnessAuc::new(),
        }
    }

    /// The active policy.
    #[must_use]
    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PolicyState {
        self.state
    }

    /// Returns `true` while the run continues.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == PolicyState::Running
    }

    /// Resolved stop condition.
    #[must_use]
    pub fn stop_condition(&self) -> usize {
        self.stop_condition
    }

    /// Most recently observed LCC size.
    #[must_use]
    pub fn lcc_size(&self) -> usize {
        self.lcc_size
    }

    /// Most recently observed SLCC size.
    #[must_use]
    pub fn slcc_size(&self) -> usize {
        self.slcc_size
    }

    /// Largest SLCC size seen so far, including the initial graph.
    #[must_use]
    pub fn peak_slcc(&self) -> usize {
        self.peak_slcc
    }

    /// Running robustness AUC.
    #[must_use]
    pub fn auc(&self) -> f64 {
        self.auc.value()
    }

    /// Check performed before each pull. Only the k-core gated policy stops
    /// here, once its 2-core is empty.
    pub fn gate(&mut self, cores: Option<&CoreNumbers>) -> Option<StopReason> {
        if self.kind.needs_core_numbers() && cores.is_some_and(CoreNumbers::two_core_is_empty) {
            return self.transition(StopReason::TwoCoreExhausted);
        }
        None
    }

    /// Decides whether `vertex` may be removed. The k-core gated policy
    /// rejects every candidate when no core numbers are supplied.
    #[must_use]
    pub fn accepts(
        &self,
        vertex: DynamicId,
        components: &Components,
        cores: Option<&CoreNumbers>,
    ) -> bool {
        match self.kind {
            PolicyKind::Threshold => true,
            PolicyKind::LccGated | PolicyKind::PeakSlcc => components.contains_in_lcc(vertex),
            PolicyKind::KCoreGated => {
                components.contains_in_lcc(vertex)
                    && cores.is_some_and(|cores| cores.in_two_core(vertex))
            }
        }
    }

    /// Records the components after an accepted removal and returns the LCC
    /// and SLCC fractions of `original_vertex_count`.
    #[allow(clippy::cast_precision_loss, reason = "vertex counts fit in f64 mantissa")]
    pub fn observe(&mut self, components: &Components, original_vertex_count: usize) -> (f64, f64) {
        self.lcc_size = components.lcc_size();
        self.slcc_size = components.slcc_size();
        self.peak_slcc = self.peak_slcc.max(self.slcc_size);
        let total = original_vertex_count.max(1) as f64;
        let lcc_fraction = self.lcc_size as f64 / total;
        let slcc_fraction = self.slcc_size as f64 / total;
        self.auc.push(lcc_fraction);
        (lcc_fraction, slcc_fraction)
    }

    /// Termination check run after every accept-or-reject cycle.
    pub fn should_stop(&mut self) -> Option<StopReason> {
        if !self.is_running() {
            return None;
        }
        if self.lcc_size <= self.stop_condition {
            return self.transition(StopReason::Dismantled);
        }
        if self.kind == PolicyKind::PeakSlcc && self.peak_slcc >= self.lcc_size {
            return self.transition(StopReason::SlccPeak);
        }
        None
    }

    /// Early-stopping guard, run after [`should_stop`](Self::should_stop).
    pub fn early_stop(&mut self, accepted: usize) -> Option<StopReason> {
        let early = self.early?;
        if self.is_running() && early.fires(accepted, self.auc.value()) {
            return self.transition(StopReason::EarlyStopped);
        }
        None
    }

    /// Ends the run for a reason decided outside the policy, such as
    /// producer exhaustion. No-op once stopped.
    pub fn finish(&mut self, reason: StopReason) {
        if self.is_running() {
            self.state = PolicyState::Stopped(reason);
        }
    }

    fn transition(&mut self, reason: StopReason) -> Option<StopReason> {
        if !self.is_running() {
            return None;
        }
        self.state = PolicyState::Stopped(reason);
        Some(reason)
    }
}
