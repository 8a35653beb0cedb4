use crate::scan::model::ScanResult;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use ulid::Ulid;

pub fn check_id_ulid() -> String {
    format!("c_{}", Ulid::new())
}

pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// One completed check. Never mutated after creation; a rescan of the same
/// URL produces a new record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckRecord {
    id: String,
    url: String,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    result: ScanResult,
}

impl CheckRecord {
    pub(crate) fn mint(url: &str, result: ScanResult) -> Self {
        Self::from_parts(check_id_ulid(), url, OffsetDateTime::now_utc(), result)
    }

    pub(crate) fn from_parts(
        id: impl Into<String>,
        url: impl Into<String>,
        timestamp: OffsetDateTime,
        result: ScanResult,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            timestamp,
            result,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    pub fn result(&self) -> &ScanResult {
        &self.result
    }

    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            id: self.id.clone(),
            url: self.url.clone(),
            timestamp: self.timestamp,
            total_violations: self.result.total_violations(),
            warning_count: self.result.warning_count,
        }
    }
}

/// History row; leaves out the itemized violations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckSummary {
    pub id: String,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub total_violations: u64,
    pub warning_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{check_id_ulid, CheckRecord};
    use crate::scan::reference::ReferenceAnalyzer;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = check_id_ulid();
        let b = check_id_ulid();
        assert!(a.starts_with("c_"));
        assert_eq!(a.len(), 28);
        assert_ne!(a, b);
    }

    #[test]
    fn summary_projects_totals() {
        let r = CheckRecord::mint(
            "https://example.com",
            ReferenceAnalyzer::fixed_result().unwrap(),
        );
        let s = r.summary();
        assert_eq!(s.id, r.id());
        assert_eq!(s.total_violations, 11);
        assert_eq!(s.warning_count, 2);
    }

    #[test]
    fn serializes_timestamp_as_rfc3339() {
        let r = CheckRecord::mint(
            "https://example.com",
            ReferenceAnalyzer::fixed_result().unwrap(),
        );
        let v = serde_json::to_value(&r).unwrap();
        let ts = v.get("timestamp").and_then(|x| x.as_str()).unwrap();
        assert!(ts.ends_with('Z'));
        let back: CheckRecord = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }
}
