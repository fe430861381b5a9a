//! Fixed, non-generated substitutes used when the model gateway gives up.
//!
//! Every function is deterministic so a degraded session is reproducible.

use super::session::ROUNDS_PER_SESSION;

const FOLLOW_UP_QUESTIONS: [&str; ROUNDS_PER_SESSION - 1] = [
    "What have you already tried, and what exactly made you stop?",
    "Who around you knows about this goal, and what would they say is really in the way?",
    "If nothing changes in the next six months, what does your situation look like?",
    "What is one uncomfortable thing you could do this week that you have been avoiding?",
];

/// Opening question when the first generation fails.
pub fn first_question(goal: &str) -> String {
    format!(
        "Be honest: what is the single biggest thing stopping you from \"{}\" right now?",
        goal
    )
}

/// Analysis recorded for a round when the answer could not be analysed.
pub fn analysis(round: u8) -> String {
    format!(
        "Answer {} noted. There is more going on here than you are saying, and the next question digs into it.",
        round
    )
}

/// Question for `round` (2..=5) when generation fails.
pub fn next_question(round: u8) -> String {
    let idx = (round as usize)
        .saturating_sub(2)
        .min(FOLLOW_UP_QUESTIONS.len() - 1);
    FOLLOW_UP_QUESTIONS[idx].to_string()
}
