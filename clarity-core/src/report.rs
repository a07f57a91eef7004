// Report generation: one model call, strict contract validation, and the
// degraded-envelope recovery path.

use crate::llm::ChatModel;
use crate::model::{
    CalculationDetails, CaptionResult, DegradedReport, Issue, IssueType, Remediation, Report,
    ReportEnvelope, Severity,
};
use crate::prompt::audit_prompt;
use colored::Colorize;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

/// Ways the model's output can violate the report contract. Every variant
/// is recovered into a degraded envelope, never propagated.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("model output is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("model output is not a JSON object")]
    NotAnObject,

    #[error("model output has no issues array")]
    MissingIssues,

    #[error("issue {index}: missing or invalid field `{field}`")]
    InvalidIssueField { index: usize, field: &'static str },
}

pub struct ReportGenerator<M: ChatModel> {
    model: M,
}

impl<M: ChatModel> ReportGenerator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Invoke the model once and validate its output. Never fails past
    /// this boundary: transport errors and contract violations become a
    /// degraded envelope carrying the raw text and the cause.
    pub async fn generate(&self, url: &str, content: &str) -> ReportEnvelope {
        let prompt = audit_prompt(content);
        let started = Instant::now();

        let raw = match self.model.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Model call failed for {}: {}", url, e);
                return ReportEnvelope::Degraded(DegradedReport {
                    url: url.to_string(),
                    report: String::new(),
                    error: e.to_string(),
                });
            }
        };
        let scan_time = format_scan_time(started.elapsed());

        match validate_report(&raw, url, scan_time) {
            Ok(report) => {
                info!("Report ready for {} (score {})", url, report.score);
                ReportEnvelope::Ready(report)
            }
            Err(e) => {
                warn!("Report contract violation for {}: {}", url, e);
                ReportEnvelope::Degraded(DegradedReport {
                    url: url.to_string(),
                    report: raw,
                    error: e.to_string(),
                })
            }
        }
    }
}

/// Elapsed seconds, one decimal, suffixed "s".
pub fn format_scan_time(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}

/// Validate the model's raw text against the report schema and normalize
/// it: duplicate issues merged, ids renumbered, scoring recomputed from
/// the issue list. The model's own arithmetic is never trusted.
pub fn validate_report(raw: &str, url: &str, scan_time: String) -> Result<Report, ContractError> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(ContractError::NotAnObject)?;
    let issue_values = object
        .get("issues")
        .and_then(Value::as_array)
        .ok_or(ContractError::MissingIssues)?;

    let mut issues: Vec<Issue> = Vec::new();
    for (index, issue_value) in issue_values.iter().enumerate() {
        let issue = parse_issue(issue_value, index)?;
        merge_issue(&mut issues, issue);
    }
    for (position, issue) in issues.iter_mut().enumerate() {
        issue.id = position as u32 + 1;
    }

    let calculation_details = score_issues(&issues);
    let total_issues = issues.iter().map(|issue| issue.count).sum();

    Ok(Report {
        score: calculation_details.final_score,
        total_issues,
        scan_time,
        issues,
        calculation_details,
        url: url.to_string(),
    })
}

fn parse_issue(value: &Value, index: usize) -> Result<Issue, ContractError> {
    let text_field = |field: &'static str| -> Result<String, ContractError> {
        value
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ContractError::InvalidIssueField { index, field })
    };

    let issue_type = IssueType::from_str(&text_field("type")?)
        .ok_or(ContractError::InvalidIssueField { index, field: "type" })?;
    let severity = Severity::from_str(&text_field("severity")?).ok_or(
        ContractError::InvalidIssueField {
            index,
            field: "severity",
        },
    )?;

    let count = match value.get("count") {
        None | Some(Value::Null) => 1,
        Some(count_value) => count_value
            .as_u64()
            .filter(|count| *count >= 1)
            .and_then(|count| u32::try_from(count).ok())
            .ok_or(ContractError::InvalidIssueField {
                index,
                field: "count",
            })?,
    };

    let wcag_reference = match value.get("wcagReference") {
        None | Some(Value::Null) => None,
        Some(reference) => Some(
            reference
                .as_str()
                .ok_or(ContractError::InvalidIssueField {
                    index,
                    field: "wcagReference",
                })?
                .to_string(),
        ),
    };

    Ok(Issue {
        // Assigned after merging.
        id: 0,
        issue_type,
        severity,
        title: text_field("title")?,
        description: text_field("description")?,
        element: text_field("element")?,
        suggestion: text_field("suggestion")?,
        count,
        wcag_reference,
    })
}

/// Issues with the same type and element are one issue with a higher
/// count, never two entries.
fn merge_issue(issues: &mut Vec<Issue>, incoming: Issue) {
    if let Some(existing) = issues
        .iter_mut()
        .find(|issue| issue.issue_type == incoming.issue_type && issue.element == incoming.element)
    {
        existing.count = existing.count.saturating_add(incoming.count);
    } else {
        issues.push(incoming);
    }
}

/// Score from 100 down: 15 per critical occurrence, 7 per moderate,
/// 3 per low. Raw value recorded before clamping at zero.
pub fn score_issues(issues: &[Issue]) -> CalculationDetails {
    let mut critical_count = 0u32;
    let mut moderate_count = 0u32;
    let mut low_count = 0u32;

    for issue in issues {
        match issue.issue_type {
            IssueType::Critical => critical_count += issue.count,
            IssueType::Moderate => moderate_count += issue.count,
            IssueType::Low => low_count += issue.count,
        }
    }

    // Counts come from untrusted model output; widen before multiplying
    // so an absurd count cannot overflow the deduction.
    let deductions = IssueType::Critical.weight() as i64 * critical_count as i64
        + IssueType::Moderate.weight() as i64 * moderate_count as i64
        + IssueType::Low.weight() as i64 * low_count as i64;
    let raw_score = (100 - deductions).clamp(i32::MIN as i64, 100) as i32;

    CalculationDetails {
        critical_count,
        moderate_count,
        low_count,
        raw_score,
        final_score: raw_score.max(0) as u32,
    }
}

pub fn render_text_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("            CLARITY ACCESSIBILITY REPORT\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    out.push_str(&format!("URL:          {}\n", report.url));
    out.push_str(&format!("Scan time:    {}\n", report.scan_time));

    let score_display = match report.score {
        90..=100 => format!("{}", report.score).green(),
        60..=89 => format!("{}", report.score).yellow(),
        _ => format!("{}", report.score).red(),
    };
    out.push_str(&format!("Score:        {}/100\n", score_display));
    out.push_str(&format!("Total issues: {}\n\n", report.total_issues));

    let details = &report.calculation_details;
    out.push_str(&format!(
        "  critical: {}  moderate: {}  low: {}  (raw score {})\n\n",
        details.critical_count, details.moderate_count, details.low_count, details.raw_score
    ));

    for issue in &report.issues {
        out.push_str(&format!(
            "[{}] {} ({}, severity {}, x{})\n",
            issue.id,
            issue.title,
            issue.issue_type.as_str(),
            issue.severity.as_str(),
            issue.count
        ));
        out.push_str(&format!("  Element:    {}\n", issue.element));
        out.push_str(&format!("  Problem:    {}\n", issue.description));
        out.push_str(&format!("  Suggestion: {}\n", issue.suggestion));
        if let Some(ref reference) = issue.wcag_reference {
            out.push_str(&format!("  Reference:  {}\n", reference));
        }
        out.push('\n');
    }

    if report.issues.is_empty() {
        out.push_str("No accessibility issues found.\n\n");
    }

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}

pub fn render_json_report(envelope: &ReportEnvelope) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Clarity",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
            },
            "result": envelope,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn render_remediation_text(remediation: &Remediation) -> String {
    match remediation {
        Remediation::NoUncaptionedImages => {
            "No uncaptioned images found. Nothing to remediate.\n".to_string()
        }
        Remediation::Captions(results) => {
            let mut out = String::new();
            out.push_str(&format!("Captioned {} image(s):\n\n", results.len()));
            for result in results {
                let marker = if result.is_failure() {
                    "✗".red()
                } else {
                    "✓".green()
                };
                out.push_str(&format!("  {} {}\n", marker, result.img_url));
                out.push_str(&format!("    {}\n", result.caption));
            }
            out
        }
    }
}

pub fn render_remediation_json(remediation: &Remediation) -> Result<String, serde_json::Error> {
    let results: &[CaptionResult] = match remediation {
        Remediation::NoUncaptionedImages => &[],
        Remediation::Captions(results) => results,
    };

    let json_report = serde_json::json!({
        "remediation": {
            "metadata": {
                "generator": "Clarity",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
            },
            "uncaptionedImages": results.len(),
            "results": results,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
