//! Prompt templates for each generation kind.
//!
//! System prompts set the interrogator's voice; user prompts carry exactly the
//! history the kind needs.

use std::fmt::Write;

use crate::ports::{GenerationContext, GenerationKind};

/// Returns the system prompt for a generation kind.
pub fn system_prompt_for(kind: GenerationKind) -> &'static str {
    match kind {
        GenerationKind::FirstQuestion => FIRST_QUESTION_SYSTEM,
        GenerationKind::AnswerAnalysis => ANALYSIS_SYSTEM,
        GenerationKind::NextQuestion => NEXT_QUESTION_SYSTEM,
        GenerationKind::FinalReport => FINAL_REPORT_SYSTEM,
    }
}

/// Builds the user prompt for a generation kind.
pub fn user_prompt_for(kind: GenerationKind, context: &GenerationContext) -> String {
    match kind {
        GenerationKind::FirstQuestion => format!(
            "The user wants to: \"{}\"\n\n{}",
            context.goal, FIRST_QUESTION_TASK
        ),
        GenerationKind::AnswerAnalysis => {
            let mut prompt = format!("User's goal: {}\n", context.goal);
            if let Some(last) = context.exchanges.last() {
                let _ = writeln!(prompt, "Question: {}", last.question);
            }
            let _ = writeln!(
                prompt,
                "Their answer: {}",
                context.current_answer.as_deref().unwrap_or_default()
            );
            prompt.push('\n');
            prompt.push_str(ANALYSIS_TASK);
            prompt
        }
        GenerationKind::NextQuestion => {
            let mut prompt = history(context);
            let _ = write!(
                prompt,
                "\nWrite question #{} of 5. {}",
                context.round(),
                NEXT_QUESTION_TASK
            );
            prompt
        }
        GenerationKind::FinalReport => {
            let mut prompt = history(context);
            prompt.push('\n');
            prompt.push_str(FINAL_REPORT_TASK);
            prompt
        }
    }
}

/// Extra instruction appended when a report could not be parsed.
pub fn strict_report_instruction() -> &'static str {
    STRICT_REPORT_INSTRUCTION
}

fn history(context: &GenerationContext) -> String {
    let mut out = format!("User's goal: {}\n\n", context.goal);
    for (i, exchange) in context.exchanges.iter().enumerate() {
        let _ = writeln!(out, "Q{}: {}", i + 1, exchange.question);
        let _ = writeln!(out, "A{}: {}", i + 1, exchange.answer);
    }
    out
}

// ============================================================================
// System prompts
// ============================================================================

const FIRST_QUESTION_SYSTEM: &str =
    "You ask blunt, specific questions that expose where a person really stands.";

const ANALYSIS_SYSTEM: &str =
    "You are the honest friend who calls out excuses with humour, never cruelty.";

const NEXT_QUESTION_SYSTEM: &str =
    "You ask follow-up questions that dig into contradictions in what was said.";

const FINAL_REPORT_SYSTEM: &str =
    "You are a candid coach summarising an interview. Reply with JSON only.";

// ============================================================================
// Tasks
// ============================================================================

const FIRST_QUESTION_TASK: &str = r#"Ask one uncomfortable, concrete question about their CURRENT situation with this goal.
Avoid generic coaching language. Return only the question."#;

const ANALYSIS_TASK: &str = r#"In one or two sentences, point out what this answer reveals or avoids.
Be specific to their words. Return only the analysis."#;

const NEXT_QUESTION_TASK: &str = r#"Build on their earlier answers and reference something specific they said.
Return only the question."#;

const FINAL_REPORT_TASK: &str = r#"Write a final report as a single JSON object with exactly these keys:

{
  "title": "The <Something> Report",
  "summary": "2-3 sentences about their real situation",
  "insights": ["up to 5 short statements about patterns, contradictions and blind spots"]
}"#;

const STRICT_REPORT_INSTRUCTION: &str = r#"Your previous reply could not be parsed.
Respond with ONLY the JSON object: no prose, no markdown fences, no trailing text.
"title" and "summary" must be non-empty strings and "insights" a non-empty array of strings."#;
