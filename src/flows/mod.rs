//! The hierarchical orchestration flows.
//!
//! Three nested state machines: the top-level flow (clarify, brief, research,
//! report), the supervisor loop that delegates sub-topics, and the researcher
//! tool loop that actually searches. Each flow takes the model gateway and
//! its collaborators by injection so tests can substitute fakes.

pub mod researcher;
pub mod supervisor;
pub mod top_level;

pub use researcher::{ResearchOutput, ResearcherFlow};
pub use supervisor::{SupervisorFlow, SupervisorOutput};
pub use top_level::{DeepResearchFlow, RunOutcome};

/// Operational limits shared by the flows.
#[derive(Debug, Clone, Copy)]
pub struct FlowLimits {
    /// Result cap per search query
    pub search_max_results: usize,
    /// Ceiling on researcher tool-loop iterations before forced compression
    pub researcher_max_iterations: usize,
    /// Ceiling on supervisor coordination iterations before forced finish
    pub supervisor_max_iterations: usize,
}

impl Default for FlowLimits {
    fn default() -> Self {
        Self {
            search_max_results: 5,
            researcher_max_iterations: 12,
            supervisor_max_iterations: 12,
        }
    }
}

pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
