use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
}

impl Impact {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Impact::Critical),
            "serious" => Some(Impact::Serious),
            "moderate" => Some(Impact::Moderate),
            "minor" => Some(Impact::Minor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
        }
    }

    fn rank(self) -> u64 {
        match self {
            Impact::Critical => 5,
            Impact::Serious => 4,
            Impact::Moderate => 3,
            Impact::Minor => 2,
        }
    }
}

/// One category of accessibility defect found on a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "ViolationRepr")]
pub struct Violation {
    category: String,
    count: u32,
    remedy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    impact: Option<Impact>,
}

#[derive(Deserialize)]
struct ViolationRepr {
    category: String,
    count: u32,
    remedy: String,
    #[serde(default)]
    impact: Option<Impact>,
}

impl TryFrom<ViolationRepr> for Violation {
    type Error = CoreError;

    fn try_from(r: ViolationRepr) -> CoreResult<Self> {
        Ok(Violation::new(r.category, r.count, r.remedy)?.with_impact(r.impact))
    }
}

impl Violation {
    pub fn new(
        category: impl Into<String>,
        count: u32,
        remedy: impl Into<String>,
    ) -> CoreResult<Self> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(CoreError::InvalidViolation(
                "category must not be empty".to_string(),
            ));
        }
        if count == 0 {
            return Err(CoreError::InvalidViolation(format!(
                "count for '{}' must be at least 1",
                category
            )));
        }
        Ok(Self {
            category,
            count,
            remedy: remedy.into(),
            impact: None,
        })
    }

    pub fn with_impact(mut self, impact: Option<Impact>) -> Self {
        self.impact = impact;
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn remedy(&self) -> &str {
        &self.remedy
    }

    pub fn impact(&self) -> Option<Impact> {
        self.impact
    }

    /// impact rank (unknown = 1) times occurrences
    pub fn severity_score(&self) -> u64 {
        self.impact.map(Impact::rank).unwrap_or(1) * u64::from(self.count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScanResult {
    pub violations: Vec<Violation>,
    pub warning_count: u32,
}

impl ScanResult {
    pub fn new(violations: Vec<Violation>, warning_count: u32) -> Self {
        Self {
            violations,
            warning_count,
        }
    }

    pub fn total_violations(&self) -> u64 {
        self.violations.iter().map(|v| u64::from(v.count)).sum()
    }

    pub fn issue_kinds(&self) -> usize {
        self.violations.len()
    }

    /// Highest severity score first; ties keep detection order.
    pub fn ranked_by_severity(&self) -> Vec<&Violation> {
        let mut out: Vec<&Violation> = self.violations.iter().collect();
        out.sort_by(|a, b| b.severity_score().cmp(&a.severity_score()));
        out
    }
}
