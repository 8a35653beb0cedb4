use crate::error::{CoreError, CoreResult};
use crate::ledger::record::{CheckRecord, CheckSummary};
use std::collections::vec_deque;
use std::collections::VecDeque;
use tracing::info;

/// Borrowing, cloneable view of the ledger, newest first.
pub type Entries<'a> = vec_deque::Iter<'a, CheckRecord>;

/// Newest-first history of checks for one session.
#[derive(Debug, Clone, Default)]
pub struct CheckLedger {
    records: VecDeque<CheckRecord>,
}

impl CheckLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: CheckRecord) -> CoreResult<()> {
        if self.contains(record.id()) {
            return Err(CoreError::DuplicateId(record.id().to_string()));
        }
        info!(check_id = record.id(), "ledger append {}", record.url());
        self.records.push_front(record);
        Ok(())
    }

    pub fn list(&self) -> Entries<'_> {
        self.records.iter()
    }

    pub fn summaries(&self) -> Vec<CheckSummary> {
        self.list().map(CheckRecord::summary).collect()
    }

    pub fn get(&self, id: &str) -> CoreResult<&CheckRecord> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    /// Removing an id that is not present is an error, including a repeat
    /// removal of the same id.
    pub fn remove(&mut self, id: &str) -> CoreResult<CheckRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        let removed = self
            .records
            .remove(pos)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        info!(check_id = id, "ledger remove");
        Ok(removed)
    }

    pub fn clear(&mut self) {
        info!(removed = self.records.len(), "ledger clear");
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rebuilds a ledger from records already in newest-first order.
    pub(crate) fn from_newest_first(records: Vec<CheckRecord>) -> CoreResult<Self> {
        let mut ledger = Self::new();
        for r in records.into_iter().rev() {
            ledger.append(r)?;
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::CheckLedger;
    use crate::error::CoreError;
    use crate::ledger::record::CheckRecord;
    use crate::scan::model::ScanResult;
    use time::macros::datetime;

    fn rec(id: &str) -> CheckRecord {
        CheckRecord::from_parts(
            id,
            "https://example.com",
            datetime!(2026-02-10 00:00:00 UTC),
            ScanResult::default(),
        )
    }

    #[test]
    fn append_is_newest_first_and_rejects_duplicates() {
        let mut l = CheckLedger::new();
        l.append(rec("c_1")).unwrap();
        l.append(rec("c_2")).unwrap();
        l.append(rec("c_3")).unwrap();
        let ids: Vec<&str> = l.list().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["c_3", "c_2", "c_1"]);

        let err = l.append(rec("c_2")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId(ref id) if id == "c_2"));
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn list_is_restartable() {
        let mut l = CheckLedger::new();
        l.append(rec("c_1")).unwrap();
        l.append(rec("c_2")).unwrap();
        let it = l.list();
        let first: Vec<_> = it.clone().map(|r| r.id().to_string()).collect();
        let second: Vec<_> = it.map(|r| r.id().to_string()).collect();
        assert_eq!(first, second);
        assert_eq!(l.list().count(), 2);
    }

    #[test]
    fn remove_twice_is_not_found() {
        let mut l = CheckLedger::new();
        l.append(rec("c_1")).unwrap();
        l.append(rec("c_2")).unwrap();
        assert_eq!(l.remove("c_1").unwrap().id(), "c_1");
        assert!(!l.contains("c_1"));
        assert!(matches!(l.remove("c_1"), Err(CoreError::NotFound(_))));
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn clear_always_succeeds() {
        let mut l = CheckLedger::new();
        l.clear();
        l.append(rec("c_1")).unwrap();
        l.clear();
        assert!(l.is_empty());
    }

    #[test]
    fn rebuild_preserves_order() {
        let l = CheckLedger::from_newest_first(vec![rec("c_9"), rec("c_8")]).unwrap();
        let ids: Vec<&str> = l.list().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["c_9", "c_8"]);
        assert!(CheckLedger::from_newest_first(vec![rec("c_1"), rec("c_1")]).is_err());
    }
}
