// Report and remediation data model. Wire names are camelCase to match
// the JSON contract the audit model is instructed to produce.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Critical,
    Moderate,
    Low,
}

impl IssueType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(IssueType::Critical),
            "moderate" => Some(IssueType::Moderate),
            "low" => Some(IssueType::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Critical => "critical",
            IssueType::Moderate => "moderate",
            IssueType::Low => "low",
        }
    }

    /// Score deduction per occurrence.
    pub fn weight(&self) -> i32 {
        match self {
            IssueType::Critical => 15,
            IssueType::Moderate => 7,
            IssueType::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: u32,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Verbatim offending HTML fragment or selector.
    pub element: String,
    pub suggestion: String,
    /// Occurrences of this exact issue; duplicates are merged.
    pub count: u32,
    /// At most one reference, formatted "WCAG 2.1 AA - <criterion> <name>".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationDetails {
    pub critical_count: u32,
    pub moderate_count: u32,
    pub low_count: u32,
    /// Pre-clamp score, may be negative.
    pub raw_score: i32,
    /// Post-clamp score; always equals the report's top-level score.
    pub final_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub score: u32,
    pub total_issues: u32,
    /// Elapsed model wall time, one decimal, suffixed "s".
    pub scan_time: String,
    pub issues: Vec<Issue>,
    pub calculation_details: CalculationDetails,
    pub url: String,
}

/// Recovery payload returned instead of raising when the model's output
/// violated the report contract. Carries the raw unparsed text and the
/// cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradedReport {
    pub url: String,
    /// The model's raw text, best effort. Empty when the call itself failed.
    pub report: String,
    pub error: String,
}

/// What an audit run hands back: a validated report, or the degraded
/// envelope. Callers always receive a structurally valid payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportEnvelope {
    Ready(Report),
    Degraded(DegradedReport),
}

impl ReportEnvelope {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ReportEnvelope::Degraded(_))
    }
}

/// Outcome for one image in a remediation batch. Failures are isolated:
/// the caption field carries a marker string and the cause lands in
/// `error`, while the rest of the batch proceeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionResult {
    pub img_url: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptionResult {
    pub fn captioned(img_url: &str, caption: String) -> Self {
        Self {
            img_url: img_url.to_string(),
            caption,
            error: None,
        }
    }

    pub fn failed(img_url: &str, cause: impl std::fmt::Display) -> Self {
        let cause = cause.to_string();
        Self {
            img_url: img_url.to_string(),
            caption: format!("Cannot caption: {}", cause),
            error: Some(cause),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Remediation output. The no-images case is explicit so it can never be
/// confused with a batch that was not processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Remediation {
    NoUncaptionedImages,
    Captions(Vec<CaptionResult>),
}
