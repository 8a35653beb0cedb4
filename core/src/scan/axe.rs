use crate::error::{CoreError, CoreResult};
use crate::scan::model::{Impact, ScanResult, Violation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AxeResults {
    #[serde(default)]
    violations: Vec<AxeRule>,
    #[serde(default)]
    incomplete: Vec<AxeRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AxeRule {
    #[serde(default)]
    id: String,
    #[serde(default)]
    impact: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    help: String,
    #[serde(default)]
    help_url: Option<String>,
    #[serde(default)]
    nodes: Vec<serde_json::Value>,
}

pub fn parse_axe_output(bytes: &[u8]) -> CoreResult<ScanResult> {
    let results: AxeResults = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::AnalysisFailed(format!("unreadable analyzer output: {}", e)))?;
    normalize_axe_results(results)
}

/// Rules without matched nodes are dropped; node counts become occurrences.
/// Incomplete (needs-review) nodes are counted as warnings.
fn normalize_axe_results(results: AxeResults) -> CoreResult<ScanResult> {
    let mut violations = Vec::new();
    for rule in results.violations {
        if rule.nodes.is_empty() {
            continue;
        }
        let category = if rule.help.trim().is_empty() {
            rule.id.clone()
        } else {
            rule.help.clone()
        };
        let mut remedy = rule.description.trim().to_string();
        if let Some(url) = rule.help_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if remedy.is_empty() {
                remedy = url.to_string();
            } else {
                remedy = format!("{} ({})", remedy, url);
            }
        }
        let count = u32::try_from(rule.nodes.len()).unwrap_or(u32::MAX);
        let impact = rule.impact.as_deref().and_then(Impact::parse);
        let violation = Violation::new(category, count, remedy)
            .map_err(|e| CoreError::AnalysisFailed(format!("analyzer reported {}", e)))?;
        violations.push(violation.with_impact(impact));
    }
    let warnings: usize = results.incomplete.iter().map(|r| r.nodes.len()).sum();
    Ok(ScanResult::new(
        violations,
        u32::try_from(warnings).unwrap_or(u32::MAX),
    ))
}
