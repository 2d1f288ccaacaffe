//! Top-level flow: the outer state machine of one orchestration run.
//!
//! States: `Clarifying` (structured decision; clarifying questions suspend
//! the run and hand control back to the caller) → `BriefWriting` (condense
//! the conversation into one research brief) → `Researching` (run the
//! supervisor loop) → `Reporting` (synthesize the final report) → `Done`.
//!
//! The flow is stateless between invocations: resuming a suspended session
//! means running again over the persisted transcript with the user's reply
//! appended. All flow state is derived from the transcript, never stored.

use crate::flows::supervisor::SupervisorFlow;
use crate::flows::{now_iso, FlowLimits, ResearcherFlow};
use crate::llm::ModelGateway;
use crate::prompts;
use crate::search::SearchAggregator;
use crate::types::{Clarification, Message, Result};
use std::sync::Arc;

pub struct DeepResearchFlow {
    gateway: Arc<ModelGateway>,
    supervisor: SupervisorFlow,
}

/// Outcome of one orchestration run.
///
/// Which fields are set encodes where the run stopped: neither brief nor
/// report means it suspended awaiting clarification; a brief without a
/// report means research did not finish; both means the run completed.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The conversation after this run, including appended assistant messages
    pub messages: Vec<Message>,
    pub research_brief: Option<String>,
    pub final_report: Option<String>,
    /// Compressed findings collected by the supervisor
    pub notes: Vec<String>,
    /// Raw researcher transcripts, for traceability
    pub raw_notes: Vec<String>,
}

impl RunOutcome {
    fn suspended(messages: Vec<Message>) -> Self {
        Self {
            messages,
            research_brief: None,
            final_report: None,
            notes: vec![],
            raw_notes: vec![],
        }
    }
}

impl DeepResearchFlow {
    pub fn new(
        gateway: Arc<ModelGateway>,
        aggregator: Arc<SearchAggregator>,
        limits: FlowLimits,
    ) -> Self {
        let researcher = ResearcherFlow::new(gateway.clone(), aggregator, limits);
        let supervisor = SupervisorFlow::new(gateway.clone(), researcher, limits);
        Self {
            gateway,
            supervisor,
        }
    }

    /// Run the flow over a conversation transcript. The transcript carries
    /// the full history of the session, so a resumed run re-enters the
    /// clarification state with everything said so far.
    pub async fn run(&self, mut messages: Vec<Message>) -> Result<RunOutcome> {
        // Clarifying
        let prompt = prompts::clarify_prompt(&prompts::render_transcript(&messages), &now_iso());
        let decision: Clarification = self
            .gateway
            .complete_structured(&[Message::user(prompt)])
            .await?;

        if decision.needs_clarification {
            tracing::info!("clarification needed, suspending run");
            messages.push(Message::assistant(decision.questions));
            return Ok(RunOutcome::suspended(messages));
        }
        messages.push(Message::assistant(decision.verification));

        // BriefWriting
        let prompt = prompts::brief_prompt(&prompts::render_transcript(&messages), &now_iso());
        let research_brief = self.gateway.complete(&[Message::user(prompt)]).await?;
        tracing::info!(brief_len = research_brief.len(), "research brief written");
        // The brief re-enters the transcript as the research request.
        messages.push(Message::user(research_brief.clone()));

        // Researching
        let supervisor_output = self.supervisor.run(messages.clone()).await?;
        tracing::info!(
            notes = supervisor_output.notes.len(),
            raw_notes = supervisor_output.raw_notes.len(),
            "supervisor finished"
        );

        // Reporting
        let information = supervisor_output.notes.join("\n");
        let prompt = prompts::report_prompt(
            &research_brief,
            &prompts::render_transcript(&messages),
            &information,
        );
        let final_report = self.gateway.complete(&[Message::user(prompt)]).await?;
        messages.push(Message::assistant(final_report.clone()));

        Ok(RunOutcome {
            messages,
            research_brief: Some(research_brief),
            final_report: Some(final_report),
            notes: supervisor_output.notes,
            raw_notes: supervisor_output.raw_notes,
        })
    }
}
