//! Prompt templates for every model call in the orchestration flows.

use crate::types::{Message, MessageRole};

/// Render a transcript as plain text for prompts that take the whole
/// conversation inline.
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                MessageRole::System => "System",
                MessageRole::User => "Human",
                MessageRole::Assistant => "AI",
                MessageRole::Tool => "Tool",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn clarify_prompt(transcript: &str, date: &str) -> String {
    format!(
        "Today's date is {date}.

You are preparing to run deep research on the user's request. Review the
conversation so far and decide whether the request is specific enough to
research well.

Conversation:
{transcript}

If anything essential is ambiguous or missing, set needs_clarification to
true and write at most 3 short clarifying questions. Otherwise set it to
false and write a 1-2 line verification confirming your understanding of the
request and that research starts now."
    )
}

pub fn brief_prompt(transcript: &str, date: &str) -> String {
    format!(
        "Today's date is {date}.

Condense the conversation below into a single, precise and detailed research
brief. The brief must capture the user's goal, scope, and any stated
constraints, and stand alone without the conversation.

Conversation:
{transcript}

Reply with the brief only."
    )
}

pub fn supervisor_prompt(date: &str) -> String {
    format!(
        "Today's date is {date}.

You are a research supervisor. Your job is to plan the research and delegate
it, not to search yourself.

Tools:
- delegate_research: dispatch one researcher on a single, well-described
  sub-topic (at least a paragraph of description). Call it once per sub-topic;
  independent sub-topics may be delegated in the same turn and will run in
  parallel.
- reflect: record your strategic reasoning between delegations - what is
  known, what is missing, whether more research is needed.

When the collected findings cover the brief, stop calling tools and reply
with a short closing note instead."
    )
}

pub fn researcher_prompt(date: &str) -> String {
    format!(
        "Today's date is {date}.

You are a researcher working on one delegated sub-topic.

Tools:
- web_search: run one or more web queries and receive a digest of summarized
  sources. Prefer few, well-chosen queries over many broad ones.
- reflect: after each search, record what was found, what is still missing,
  and whether another search is worth it.

When you have enough information to answer the sub-topic thoroughly, stop
calling tools and reply with your findings."
    )
}

pub fn compress_prompt(date: &str) -> String {
    format!(
        "Today's date is {date}.

Condense the research transcript above into a dense digest of findings for
the sub-topic. Keep every concrete fact, figure, and source reference; drop
tool mechanics and repetition. Structure it so a report writer can use it
directly."
    )
}

pub fn summarize_webpage_prompt(content: &str, date: &str) -> String {
    format!(
        "Today's date is {date}.

Summarize the webpage content below. Produce a concise summary (paragraphs
and/or bullet points) plus up to five verbatim key excerpts worth quoting.

Webpage content:
{content}"
    )
}

pub fn report_prompt(brief: &str, transcript: &str, notes: &str) -> String {
    format!(
        "Write the final research report.

Research brief:
{brief}

Conversation with the user:
{transcript}

Collected research findings:
{notes}

Write a comprehensive, well-structured report that answers the brief, citing
the findings. Use clear section headings."
    )
}
