use serde::{Deserialize, Serialize};

/// Permissions granted by the billing side. Opaque input: the core only reads them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Capabilities {
    #[serde(default)]
    pub pdf_export: bool,
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportFormat {
    HTML,
    PDF,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::HTML => "text/html; charset=utf-8",
            ExportFormat::PDF => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::HTML => "html",
            ExportFormat::PDF => "pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ExportFormat::HTML),
            "pdf" => Ok(ExportFormat::PDF),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportBlockReason {
    PDF_EXPORT_NOT_GRANTED,
}

pub fn evaluate_export_gate(
    format: ExportFormat,
    caps: &Capabilities,
) -> Result<(), ExportBlockReason> {
    match format {
        ExportFormat::HTML => Ok(()),
        ExportFormat::PDF if caps.pdf_export => Ok(()),
        ExportFormat::PDF => Err(ExportBlockReason::PDF_EXPORT_NOT_GRANTED),
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate_export_gate, Capabilities, ExportBlockReason, ExportFormat};

    #[test]
    fn html_is_always_open() {
        assert!(evaluate_export_gate(ExportFormat::HTML, &Capabilities::default()).is_ok());
        assert!(evaluate_export_gate(ExportFormat::HTML, &Capabilities { pdf_export: true }).is_ok());
    }

    #[test]
    fn pdf_needs_capability() {
        assert_eq!(
            evaluate_export_gate(ExportFormat::PDF, &Capabilities::default()).err(),
            Some(ExportBlockReason::PDF_EXPORT_NOT_GRANTED)
        );
        assert!(evaluate_export_gate(ExportFormat::PDF, &Capabilities { pdf_export: true }).is_ok());
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("HTML".parse::<ExportFormat>().unwrap(), ExportFormat::HTML);
        assert_eq!(" pdf ".parse::<ExportFormat>().unwrap(), ExportFormat::PDF);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
