use crate::error::{CoreError, CoreResult};
use crate::ledger::record::CheckRecord;
use crate::ledger::store::CheckLedger;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

pub const LEDGER_SCHEMA_VERSION: &str = "CHECK_LEDGER_V1";

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    schema_version: String,
    records: Vec<CheckRecord>,
}

pub fn save_ledger(path: impl AsRef<Path>, ledger: &CheckLedger) -> CoreResult<()> {
    let path = path.as_ref();
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let doc = LedgerFile {
        schema_version: LEDGER_SCHEMA_VERSION.to_string(),
        records: ledger.list().cloned().collect(),
    };
    // uniquely named in the target directory; removed on drop if persisting fails
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&serde_json::to_vec_pretty(&doc)?)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!("saved {} checks to {}", ledger.len(), path.display());
    Ok(())
}

/// A missing file is an empty history.
pub fn load_ledger(path: impl AsRef<Path>) -> CoreResult<CheckLedger> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("no ledger at {}, starting empty", path.display());
        return Ok(CheckLedger::new());
    }
    let bytes = fs::read(path)?;
    let doc: LedgerFile = serde_json::from_slice(&bytes)?;
    if doc.schema_version != LEDGER_SCHEMA_VERSION {
        return Err(CoreError::Config(format!(
            "{}: unsupported ledger schema {}",
            path.display(),
            doc.schema_version
        )));
    }
    CheckLedger::from_newest_first(doc.records)
}
