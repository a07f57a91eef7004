// Instruction template for the audit model. The JSON contract that the
// report generator validates against is defined here, in the template
// text itself.

const PAGE_TEXT_PLACEHOLDER: &str = "{page_text}";

const AUDIT_TEMPLATE: &str = r#"You are an expert in web accessibility. Analyze the following web page text for WCAG 2.1 accessibility issues.

Respond with JSON only. No prose, no markdown fences, nothing outside the single JSON object.

The JSON object must have exactly this shape:
{
  "score": <integer 0-100>,
  "totalIssues": <integer>,
  "issues": [
    {
      "id": <integer, unique within this report>,
      "type": "critical" | "moderate" | "low",
      "severity": "high" | "medium" | "low",
      "title": "<short issue title>",
      "description": "<what is wrong; cite the approximate source line number when determinable>",
      "element": "<verbatim offending HTML fragment or selector>",
      "suggestion": "<how to fix it>",
      "count": <number of occurrences>,
      "wcagReference": "WCAG 2.1 AA - <criterion number> <criterion name>"
    }
  ],
  "calculationDetails": {
    "criticalCount": <integer>,
    "moderateCount": <integer>,
    "lowCount": <integer>,
    "rawScore": <integer, may be negative>,
    "finalScore": <integer 0-100>
  }
}

Rules:
1. Report missing alternative text only for raster image formats: jpg, jpeg, png, gif, bmp, webp. Never report alt text issues for svg images, data URIs, or other vector formats.
2. Merge identical issues. If two findings share the same type and element, report a single issue and increment its count. Never list duplicates.
3. Give each issue exactly one wcagReference, and only a criterion that actually exists in WCAG 2.1. Never invent a reference.
4. Scoring: start from 100. Subtract 15 for each critical occurrence, 7 for each moderate occurrence, and 3 for each low occurrence, multiplied by count. Record the result as rawScore before clamping, then set finalScore = max(0, rawScore) and score = finalScore. If there are no issues the score is 100.

Web page content:
{page_text}
"#;

/// Render the fixed audit instruction around the extracted page text.
pub fn audit_prompt(page_text: &str) -> String {
    AUDIT_TEMPLATE.replace(PAGE_TEXT_PLACEHOLDER, page_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_page_text() {
        let prompt = audit_prompt("Some page content here");
        assert!(prompt.contains("Some page content here"));
        assert!(!prompt.contains(PAGE_TEXT_PLACEHOLDER));
    }

    #[test]
    fn test_prompt_states_the_contract() {
        let prompt = audit_prompt("");
        assert!(prompt.contains("JSON only"));
        assert!(prompt.contains("wcagReference"));
        assert!(prompt.contains("rawScore"));
        assert!(prompt.contains("Subtract 15"));
    }
}
