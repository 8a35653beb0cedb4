use crate::error::CoreResult;
use crate::ledger::record::{format_timestamp, CheckSummary};

pub fn render_history_csv(summaries: &[CheckSummary]) -> CoreResult<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record([
        "id",
        "url",
        "timestamp",
        "total_violations",
        "warning_count",
    ])?;
    for row in summaries {
        wtr.write_record([
            row.id.clone(),
            row.url.clone(),
            format_timestamp(row.timestamp),
            row.total_violations.to_string(),
            row.warning_count.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::render_history_csv;
    use crate::ledger::record::CheckSummary;
    use time::macros::datetime;

    #[test]
    fn renders_rows_in_given_order_and_quotes_commas() {
        let rows = vec![
            CheckSummary {
                id: "c_2".to_string(),
                url: "https://b.test/?q=a,b".to_string(),
                timestamp: datetime!(2026-02-11 08:30:00 UTC),
                total_violations: 11,
                warning_count: 2,
            },
            CheckSummary {
                id: "c_1".to_string(),
                url: "https://a.test".to_string(),
                timestamp: datetime!(2026-02-10 00:00:00 UTC),
                total_violations: 0,
                warning_count: 0,
            },
        ];
        let csv = render_history_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,url,timestamp,total_violations,warning_count");
        assert_eq!(lines[1], "c_2,\"https://b.test/?q=a,b\",2026-02-11T08:30:00Z,11,2");
        assert_eq!(lines[2], "c_1,https://a.test,2026-02-10T00:00:00Z,0,0");
        assert!(!csv.contains('\r'));
    }
}
