//! Closing report produced after the fifth round.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on insight statements kept in a report.
pub const MAX_REPORT_INSIGHTS: usize = 5;

/// Synthesized report: title, summary and ordered insight statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub title: String,
    pub summary: String,
    pub insights: Vec<String>,
}

/// Why generated text could not be read as a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportParseError {
    #[error("no JSON object in response")]
    NoJsonObject,

    #[error("invalid report JSON: {0}")]
    InvalidJson(String),

    #[error("report field '{0}' is empty")]
    EmptyField(&'static str),
}

#[derive(Deserialize)]
struct RawReport {
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    insights: Vec<String>,
}

impl FinalReport {
    /// Reads a report out of model output.
    ///
    /// Tolerates prose or code fences around the JSON object. Blank insight
    /// lines are dropped and the list is capped at [`MAX_REPORT_INSIGHTS`].
    pub fn parse(raw: &str) -> Result<Self, ReportParseError> {
        let start = raw.find('{').ok_or(ReportParseError::NoJsonObject)?;
        let end = raw.rfind('}').ok_or(ReportParseError::NoJsonObject)?;
        if end < start {
            return Err(ReportParseError::NoJsonObject);
        }

        let parsed: RawReport = serde_json::from_str(&raw[start..=end])
            .map_err(|e| ReportParseError::InvalidJson(e.to_string()))?;

        let title = parsed.title.trim().to_string();
        if title.is_empty() {
            return Err(ReportParseError::EmptyField("title"));
        }
        let summary = parsed.summary.trim().to_string();
        if summary.is_empty() {
            return Err(ReportParseError::EmptyField("summary"));
        }
        let insights: Vec<String> = parsed
            .insights
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .take(MAX_REPORT_INSIGHTS)
            .map(str::to_string)
            .collect();
        if insights.is_empty() {
            return Err(ReportParseError::EmptyField("insights"));
        }

        Ok(Self {
            title,
            summary,
            insights,
        })
    }

    /// Canonical JSON form, stored as the closing message content.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "title": self.title,
            "summary": self.summary,
            "insights": self.insights,
        })
        .to_string()
    }

    /// Non-generated report used when synthesis cannot be completed.
    pub fn fallback(goal: &str) -> Self {
        Self {
            title: "The Real Talk Report".to_string(),
            summary: format!(
                "After five questions about \"{}\", the want is clearly there. \
                 What is missing is a pattern of action that matches it.",
                goal
            ),
            insights: vec![
                "You know more about what is holding you back than you admit.".to_string(),
                "Your explanations are more detailed than your plans.".to_string(),
                "One small step this week beats a perfect plan next month.".to_string(),
            ],
        }
    }
}
