//! Write-only search counters.

/// Counters accumulated across every search a solver runs. Purely
/// observational: nothing in the search reads them back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolverStats {
    /// Nodes popped from an open set.
    pub nodes_popped: u64,
    /// Children that survived conflict and dominance filtering.
    pub nodes_generated: u64,
    /// Partial re-insertions of a parent with its next Δf target.
    pub reinsertions: u64,
    /// EPEA* invocations (one per group solve).
    pub searches: u64,
    /// Group merges performed by independence detection.
    pub merges: u64,
}
