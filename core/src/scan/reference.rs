//! Reference analyzer for pipeline tests and demos.
//!
//! It ignores the URL and always reports the same four violation categories
//! and two warnings. Production deployments use a URL-sensitive engine behind
//! the same `PageAnalyzer` trait (see `command::CommandAnalyzer`).

use crate::error::CoreResult;
use crate::scan::gateway::PageAnalyzer;
use crate::scan::model::{ScanResult, Violation};
use async_trait::async_trait;
use std::time::Duration;

const FIXED_VIOLATIONS: &[(&str, u32, &str)] = &[
    ("Missing alt text", 5, "Add descriptive alt text to all images"),
    ("Color contrast", 3, "Ensure contrast ratio meets WCAG AA standards"),
    ("Missing form labels", 2, "Associate all form inputs with labels"),
    ("Heading hierarchy", 1, "Use headings in sequential order"),
];

const FIXED_WARNINGS: u32 = 2;

#[derive(Debug, Clone, Default)]
pub struct ReferenceAnalyzer {
    simulated_delay: Duration,
}

impl ReferenceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = delay;
        self
    }

    pub fn fixed_result() -> CoreResult<ScanResult> {
        let mut violations = Vec::with_capacity(FIXED_VIOLATIONS.len());
        for (category, count, remedy) in FIXED_VIOLATIONS {
            violations.push(Violation::new(*category, *count, *remedy)?);
        }
        Ok(ScanResult::new(violations, FIXED_WARNINGS))
    }
}

#[async_trait]
impl PageAnalyzer for ReferenceAnalyzer {
    fn name(&self) -> &str {
        "reference"
    }

    async fn analyze(&self, _url: &str) -> CoreResult<ScanResult> {
        if !self.simulated_delay.is_zero() {
            tokio::time::sleep(self.simulated_delay).await;
        }
        Self::fixed_result()
    }
}
