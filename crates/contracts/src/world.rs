//! WorldContext - host-owned simulation context.

/// Snapshot of the host world handed to the sensor each phase.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldContext {
    /// World name (used for scene lookup)
    pub name: String,

    /// Simulation time (seconds)
    pub sim_time: f64,

    /// Completed physics iterations
    pub iteration: u64,
}

impl WorldContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sim_time: 0.0,
            iteration: 0,
        }
    }
}
