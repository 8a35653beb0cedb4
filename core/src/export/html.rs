use crate::ledger::record::{format_timestamp, CheckRecord};

const STYLE: &str = "\
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; color: #222; }
    h1 { color: #333; }
    .totals { display: flex; gap: 24px; margin: 16px 0; }
    .totals div { background: #f5f5f5; padding: 12px 16px; border-radius: 4px; }
    .violation { background: #fee; padding: 15px; margin: 10px 0; border-left: 4px solid #c33; border-radius: 4px; }
    .impact { color: #933; font-size: 0.9em; margin-left: 6px; }
    .fix { color: #666; margin-top: 8px; }
    .meta { color: #666; }";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone page: inline styles only, no scripts, fonts or images.
pub fn render_html_report(record: &CheckRecord, generated_at: &str) -> String {
    let result = record.result();
    let url = escape_html(record.url());
    let mut out = Vec::new();
    out.push("<!DOCTYPE html>".to_string());
    out.push("<html lang=\"en\">".to_string());
    out.push("<head>".to_string());
    out.push("  <meta charset=\"utf-8\">".to_string());
    out.push(format!("  <title>Accessibility Report - {}</title>", url));
    out.push(format!("  <style>{}\n  </style>", STYLE));
    out.push("</head>".to_string());
    out.push("<body>".to_string());
    out.push("  <h1>Accessibility Report</h1>".to_string());
    out.push(format!("  <p><strong>URL:</strong> {}</p>", url));
    out.push(format!(
        "  <p><strong>Check ID:</strong> {}</p>",
        escape_html(record.id())
    ));
    out.push(format!(
        "  <p><strong>Scanned:</strong> {}</p>",
        format_timestamp(record.timestamp())
    ));
    out.push(format!(
        "  <p class=\"meta\"><strong>Generated:</strong> {}</p>",
        escape_html(generated_at)
    ));
    out.push("  <div class=\"totals\">".to_string());
    out.push(format!(
        "    <div><strong>Total Violations</strong><br>{}</div>",
        result.total_violations()
    ));
    out.push(format!(
        "    <div><strong>Issues Found</strong><br>{}</div>",
        result.issue_kinds()
    ));
    out.push(format!(
        "    <div><strong>Warnings</strong><br>{}</div>",
        result.warning_count
    ));
    out.push("  </div>".to_string());
    out.push("  <h2>Violations Found</h2>".to_string());
    if result.violations.is_empty() {
        out.push("  <p>No violations found.</p>".to_string());
    }
    for v in &result.violations {
        out.push("  <div class=\"violation\">".to_string());
        let impact = v
            .impact()
            .map(|i| format!("<span class=\"impact\">{}</span>", i.as_str()))
            .unwrap_or_default();
        out.push(format!(
            "    <strong>{}</strong> ({} occurrences){}",
            escape_html(v.category()),
            v.count(),
            impact
        ));
        out.push(format!(
            "    <div class=\"fix\"><strong>Fix:</strong> {}</div>",
            escape_html(v.remedy())
        ));
        out.push("  </div>".to_string());
    }
    out.push("</body>".to_string());
    out.push("</html>".to_string());
    out.push("".to_string());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{escape_html, render_html_report};
    use crate::ledger::record::CheckRecord;
    use crate::scan::model::{ScanResult, Violation};
    use time::macros::datetime;

    #[test]
    fn escapes_markup_in_user_text() {
        assert_eq!(
            escape_html("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        let rec = CheckRecord::from_parts(
            "c_1",
            "https://x.test/?a=<script>",
            datetime!(2026-02-10 00:00:00 UTC),
            ScanResult::new(vec![Violation::new("<b>", 1, "use <alt>").unwrap()], 0),
        );
        let html = render_html_report(&rec, "2026-02-10T01:00:00Z");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("Scanned:</strong> 2026-02-10T00:00:00Z"));
    }

    #[test]
    fn no_external_resources() {
        let rec = CheckRecord::from_parts(
            "c_1",
            "https://x.test",
            datetime!(2026-02-10 00:00:00 UTC),
            ScanResult::default(),
        );
        let html = render_html_report(&rec, "now");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("No violations found."));
        for needle in ["<link", "<script", "src=", "@import", "url("] {
            assert!(!html.contains(needle), "{}", needle);
        }
    }
}
