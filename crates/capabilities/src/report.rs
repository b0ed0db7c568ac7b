//! Report rendering: the completed analysis as an HTML email.
//!
//! The analysis stages produce markdown; mail clients want inline HTML.
//! This is a small, deliberately incomplete markdown renderer: headers,
//! lists, rules, paragraphs, and inline bold/italic/code are all the
//! stages emit.

use regex::Regex;
use std::sync::OnceLock;

use ad_domain::order::AnalysisData;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Report assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render the full report email. Returns `(subject, html_body)`.
pub fn render_report(name: &str, analysis: &AnalysisData) -> (String, String) {
    let subject = format!("Your Vedic Astrology Report for {name}");

    let mut sections = String::new();
    if let Some(summary) = &analysis.summary {
        sections.push_str(&markdown_to_html(summary));
    }
    for (title, body) in [
        ("Birth Chart", analysis.chart_data_analysis.as_deref()),
        ("Dasha Periods", analysis.dasha_analysis.as_deref()),
        ("Goal Analysis", analysis.goal_analysis.as_deref()),
        ("Recommendations", analysis.recommendations.as_deref()),
    ] {
        if let Some(body) = body {
            sections.push_str("<hr>");
            sections.push_str(&format!("<h2>{title}</h2>"));
            sections.push_str(&markdown_to_html(body));
        }
    }

    let html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"></head>\
         <body style=\"font-family: sans-serif; line-height: 1.6; \
         max-width: 700px; margin: 0 auto; padding: 20px;\">\
         <h1>Your Astrology Report</h1>{sections}\
         <p style=\"color: #888; font-size: 12px;\">\
         Generated by AstroDesk. This report is for guidance only.</p>\
         </body></html>"
    );

    (subject, html)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Markdown → HTML
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert block-level markdown to HTML.
pub fn markdown_to_html(text: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;
    let mut in_paragraph = false;

    let close_open = |html: &mut String, in_list: &mut bool, in_paragraph: &mut bool| {
        if *in_list {
            html.push_str("</ul>");
            *in_list = false;
        }
        if *in_paragraph {
            html.push_str("</p>");
            *in_paragraph = false;
        }
    };

    for line in text.lines() {
        let stripped = line.trim();

        if stripped.is_empty() {
            close_open(&mut html, &mut in_list, &mut in_paragraph);
            continue;
        }

        if let Some(rest) = heading(stripped) {
            close_open(&mut html, &mut in_list, &mut in_paragraph);
            let (level, content) = rest;
            html.push_str(&format!("<h{level}>{}</h{level}>", inline(content)));
        } else if stripped.starts_with("---") {
            close_open(&mut html, &mut in_list, &mut in_paragraph);
            html.push_str("<hr>");
        } else if let Some(item) = list_item(stripped) {
            if in_paragraph {
                html.push_str("</p>");
                in_paragraph = false;
            }
            if !in_list {
                html.push_str("<ul>");
                in_list = true;
            }
            html.push_str(&format!("<li>{}</li>", inline(item)));
        } else {
            if in_list {
                html.push_str("</ul>");
                in_list = false;
            }
            if in_paragraph {
                html.push_str("<br>");
            } else {
                html.push_str("<p>");
                in_paragraph = true;
            }
            html.push_str(&inline(stripped));
        }
    }
    close_open(&mut html, &mut in_list, &mut in_paragraph);
    html
}

fn heading(line: &str) -> Option<(usize, &str)> {
    for level in (1..=4).rev() {
        let marker = "#".repeat(level) + " ";
        if let Some(rest) = line.strip_prefix(&marker) {
            return Some((level, rest));
        }
    }
    None
}

fn list_item(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest);
    }
    // Numbered items: "1. text"
    let idx = line.find(". ")?;
    if idx > 0 && line[..idx].bytes().all(|b| b.is_ascii_digit()) {
        Some(&line[idx + 2..])
    } else {
        None
    }
}

/// Inline formatting: escape HTML, then bold / italic / code.
fn inline(text: &str) -> String {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    static CODE: OnceLock<Regex> = OnceLock::new();

    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");

    let bold = BOLD
        .get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap())
        .replace_all(&escaped, "<strong>$1</strong>");
    // Bold is gone by now, so any remaining single-star pair is italic.
    let italic = ITALIC
        .get_or_init(|| Regex::new(r"\*([^*]+)\*").unwrap())
        .replace_all(&bold, "<em>$1</em>");
    CODE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap())
        .replace_all(&italic, "<code>$1</code>")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_and_paragraphs() {
        let html = markdown_to_html("## Current Period\n\nA good stretch ahead.");
        assert!(html.contains("<h2>Current Period</h2>"));
        assert!(html.contains("<p>A good stretch ahead.</p>"));
    }

    #[test]
    fn lists_close_properly() {
        let html = markdown_to_html("- first\n- second\n\nafter");
        assert!(html.contains("<ul><li>first</li><li>second</li></ul>"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn numbered_items_are_list_items() {
        let html = markdown_to_html("1. one\n2. two");
        assert!(html.contains("<li>one</li><li>two</li>"));
    }

    #[test]
    fn inline_bold_and_code() {
        assert_eq!(
            inline("**Jupiter** enters `Cancer`"),
            "<strong>Jupiter</strong> enters <code>Cancer</code>"
        );
    }

    #[test]
    fn html_is_escaped_before_formatting() {
        assert_eq!(inline("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn report_contains_all_present_sections() {
        let analysis = AnalysisData {
            summary: Some("## Summary\ntext".into()),
            chart_data_analysis: Some("chart".into()),
            dasha_analysis: Some("dasha".into()),
            goal_analysis: None,
            recommendations: Some("- do this".into()),
        };
        let (subject, html) = render_report("Asha Rao", &analysis);
        assert!(subject.contains("Asha Rao"));
        assert!(html.contains("<h2>Birth Chart</h2>"));
        assert!(html.contains("<h2>Dasha Periods</h2>"));
        assert!(!html.contains("<h2>Goal Analysis</h2>"));
        assert!(html.contains("<li>do this</li>"));
    }
}
