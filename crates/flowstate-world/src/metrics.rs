//! Per-step performance metrics for a [`World`](crate::World).

/// Timing and scheduling data collected during a single world step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Scheduler sweeps used. Zero for single-entity steps and empty worlds.
    pub sweeps: usize,
    /// Number of physics calls made.
    pub states_stepped: usize,
    /// Per-state physics time: `(state name, microseconds)`, in the order
    /// the states were stepped.
    pub per_state_us: Vec<(String, u64)>,
}

impl StepMetrics {
    /// Sum of the per-state times. Never exceeds `total_us` by more than
    /// timer resolution.
    pub fn physics_us(&self) -> u64 {
        self.per_state_us.iter().map(|(_, us)| us).sum()
    }
}
