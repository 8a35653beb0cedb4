//! Minimal PDF 1.4 writer for plain-text reports.
//!
//! Letter pages, built-in Helvetica with WinAnsi encoding, one content
//! stream per page. No embedded fonts, images or metadata dates, so output
//! depends only on the input lines.

use crate::ledger::record::{format_timestamp, CheckRecord};

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN: u32 = 50;
const FONT_SIZE: u32 = 11;
const LEADING: u32 = 14;
const WRAP_COLUMNS: usize = 90;

pub fn report_lines(record: &CheckRecord, generated_at: &str) -> Vec<String> {
    let result = record.result();
    let mut lines = vec![
        "Accessibility Report".to_string(),
        String::new(),
        format!("URL: {}", record.url()),
        format!("Check ID: {}", record.id()),
        format!("Scanned: {}", format_timestamp(record.timestamp())),
        format!("Generated: {}", generated_at),
        String::new(),
        format!(
            "Total violations: {}    Issues found: {}    Warnings: {}",
            result.total_violations(),
            result.issue_kinds(),
            result.warning_count
        ),
        String::new(),
        "Violations Found".to_string(),
    ];
    if result.violations.is_empty() {
        lines.push("No violations found.".to_string());
    }
    for v in &result.violations {
        let impact = v
            .impact()
            .map(|i| format!(" [{}]", i.as_str()))
            .unwrap_or_default();
        lines.push(String::new());
        lines.push(format!(
            "- {} ({} occurrences){}",
            v.category(),
            v.count(),
            impact
        ));
        lines.push(format!("  Fix: {}", v.remedy()));
    }
    lines
}

pub fn render_pdf_report(record: &CheckRecord, generated_at: &str) -> Vec<u8> {
    write_text_pdf(&report_lines(record, generated_at))
}

pub fn write_text_pdf(lines: &[String]) -> Vec<u8> {
    let wrapped: Vec<String> = lines.iter().flat_map(|l| wrap_line(l, WRAP_COLUMNS)).collect();
    let per_page = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;
    let mut pages: Vec<&[String]> = wrapped.chunks(per_page.max(1)).collect();
    if pages.is_empty() {
        pages.push(&[]);
    }

    // 1 catalog, 2 pages tree, 3 font, then (page, content) pairs.
    let page_obj = |i: usize| 4 + 2 * i;
    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_obj(i)))
        .collect();
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
    );
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec());
    for (i, page) in pages.iter().enumerate() {
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                page_obj(i) + 1
            )
            .into_bytes(),
        );
        let stream = content_stream(page);
        let mut obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        obj.extend_from_slice(&stream);
        obj.extend_from_slice(b"\nendstream");
        objects.push(obj);
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }
    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

fn content_stream(lines: &[String]) -> Vec<u8> {
    let mut s = format!(
        "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
        FONT_SIZE,
        LEADING,
        MARGIN,
        PAGE_HEIGHT - MARGIN
    );
    for line in lines {
        s.push('(');
        s.push_str(&escape_pdf_text(line));
        s.push_str(") Tj\nT*\n");
    }
    s.push_str("ET");
    s.into_bytes()
}

/// Non-ASCII text is written as octal WinAnsi codes; characters the
/// encoding lacks become '?'.
fn escape_pdf_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            '\t' => out.push(' '),
            _ => match win_ansi_code(c) {
                Some(code) => out.push_str(&format!("\\{:03o}", code)),
                None => out.push('?'),
            },
        }
    }
    out
}

fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(code)
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }
    let indent: String = line.chars().take_while(|c| *c == ' ').collect();
    let indent_len = indent.chars().count();
    let mut out = Vec::new();
    let mut current = indent.clone();
    for word in line.split_whitespace() {
        let mut word = word.to_string();
        loop {
            let cur_len = current.chars().count();
            let fresh = cur_len == indent_len;
            let sep = if fresh { 0 } else { 1 };
            if cur_len + sep + word.chars().count() <= width {
                if !fresh {
                    current.push(' ');
                }
                current.push_str(&word);
                break;
            }
            if !fresh {
                out.push(std::mem::take(&mut current));
                current.push_str(&indent);
                continue;
            }
            // a single word wider than the line
            let room = width.saturating_sub(cur_len).max(1);
            let head: String = word.chars().take(room).collect();
            word = word.chars().skip(room).collect();
            current.push_str(&head);
            out.push(std::mem::take(&mut current));
            current.push_str(&indent);
            if word.is_empty() {
                break;
            }
        }
    }
    if current.chars().count() > indent_len {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{escape_pdf_text, wrap_line, write_text_pdf};

    #[test]
    fn escapes_delimiters_and_unmapped_chars() {
        assert_eq!(escape_pdf_text(r"a(b)\c"), r"a\(b\)\\c");
        assert_eq!(escape_pdf_text("漢"), "?");
    }

    #[test]
    fn latin_text_uses_win_ansi_codes() {
        assert_eq!(escape_pdf_text("café"), r"caf\351");
        assert_eq!(escape_pdf_text("https://münchen.de"), r"https://m\374nchen.de");
        assert_eq!(escape_pdf_text("€5 \u{2013} ok"), r"\2005 \226 ok");
        assert_eq!(escape_pdf_text("a\u{a0}b"), r"a\240b");

        let pdf = write_text_pdf(&["Größe".to_string()]);
        let text = String::from_utf8(pdf).unwrap();
        assert!(text.contains("/Encoding /WinAnsiEncoding"));
        assert!(text.contains(r"(Gr\366\337e) Tj"));
    }

    #[test]
    fn wraps_long_lines() {
        let long = format!("  Fix: {}", "word ".repeat(40));
        let wrapped = wrap_line(&long, 30);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 30));
        assert!(wrapped[1].starts_with("  "));

        let url = format!("URL: https://example.com/{}", "a".repeat(120));
        let wrapped = wrap_line(&url, 40);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 40));
        let joined: String = wrapped.concat();
        assert!(joined.matches('a').count() >= 120);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let lines: Vec<String> = (0..120).map(|i| format!("line {}", i)).collect();
        let pdf = write_text_pdf(&lines);
        let text = String::from_utf8(pdf.clone()).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 3"));

        let startxref = text.rfind("startxref\n").unwrap();
        let xref_at: usize = text[startxref + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_at..].starts_with("xref\n"));
        let entries: Vec<&str> = text[xref_at..].lines().skip(3).take(9).collect();
        for (i, e) in entries.iter().enumerate() {
            let off: usize = e[..10].parse().unwrap();
            assert!(text[off..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }
}
