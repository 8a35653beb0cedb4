pub mod gate;
pub mod html;
pub mod pdf;

use crate::error::{CoreError, CoreResult};
use crate::ledger::record::{format_timestamp, CheckRecord};
use gate::{evaluate_export_gate, Capabilities, ExportFormat};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{debug, info};

/// Rendered report. The exporter suggests a stem; where the bytes go (disk,
/// HTTP response, download) is the caller's decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportedDocument {
    pub format: ExportFormat,
    pub filename_stem: String,
    pub mime_type: String,
    pub extension: String,
    pub generated_at: String,
    /// SHA-256 of the document rendered with an empty generated-at stamp.
    pub content_sha256: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.filename_stem, self.extension)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportExporter {
    capabilities: Capabilities,
}

impl ReportExporter {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn export(&self, record: &CheckRecord, format: ExportFormat) -> CoreResult<ExportedDocument> {
        self.export_at(record, format, OffsetDateTime::now_utc())
    }

    pub fn export_at(
        &self,
        record: &CheckRecord,
        format: ExportFormat,
        generated_at: OffsetDateTime,
    ) -> CoreResult<ExportedDocument> {
        if let Err(reason) = evaluate_export_gate(format, &self.capabilities) {
            debug!(check_id = record.id(), "export blocked: {:?}", reason);
            return Err(CoreError::CapabilityDenied(format!(
                "{:?} export requires the pdf_export capability ({:?})",
                format, reason
            )));
        }
        let stamp = format_timestamp(generated_at);
        let bytes = render(record, format, &stamp);
        let content_sha256 = sha256_hex(&render(record, format, ""));
        info!(
            check_id = record.id(),
            bytes = bytes.len(),
            "exported {:?} report",
            format
        );
        Ok(ExportedDocument {
            format,
            filename_stem: filename_stem(record),
            mime_type: format.mime_type().to_string(),
            extension: format.extension().to_string(),
            generated_at: stamp,
            content_sha256,
            bytes,
        })
    }
}

fn render(record: &CheckRecord, format: ExportFormat, stamp: &str) -> Vec<u8> {
    match format {
        ExportFormat::HTML => html::render_html_report(record, stamp).into_bytes(),
        ExportFormat::PDF => pdf::render_pdf_report(record, stamp),
    }
}

pub fn filename_stem(record: &CheckRecord) -> String {
    let id: String = record
        .id()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    format!("accessibility-report-{}", id)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
