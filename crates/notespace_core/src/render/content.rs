//! Line-oriented renderer for the page content dialect.
//!
//! Supported syntax:
//! - plain lines, each rendered as its own paragraph;
//! - checklist lines `- [ ] text` and `- [x] text` (the `x` in any case);
//! - code blocks fenced by lines starting with three backticks.
//!
//! # Invariants
//! - Syntax is detected on the raw line; only payloads are escaped.
//! - The fence toggle is local to one call.

use once_cell::sync::Lazy;
use regex::Regex;

static UNCHECKED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- \[ \] (.*)").expect("valid unchecked item regex"));
static CHECKED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- \[[xX]\] (.*)").expect("valid checked item regex"));

const CODE_FENCE: &str = "```";

/// Renders raw content into display markup.
pub fn render_content(raw: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut in_code_block = false;

    for line in raw.split('\n') {
        if line.trim().starts_with(CODE_FENCE) {
            in_code_block = !in_code_block;
            parts.push(if in_code_block {
                "<pre><code>".to_string()
            } else {
                "</code></pre>".to_string()
            });
            continue;
        }

        if in_code_block {
            parts.push(format!("{}\n", escape_html(line)));
            continue;
        }

        if let Some(task) = capture_payload(&UNCHECKED_ITEM_RE, line) {
            parts.push(format!(
                r#"<label><input type="checkbox" disabled> {}</label><br>"#,
                escape_html(task)
            ));
        } else if let Some(task) = capture_payload(&CHECKED_ITEM_RE, line) {
            parts.push(format!(
                r#"<label><input type="checkbox" checked disabled> {}</label><br>"#,
                escape_html(task)
            ));
        } else {
            parts.push(format!("<p>{}</p>", escape_html(line)));
        }
    }

    parts.join("\n")
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn capture_payload<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|payload| payload.as_str())
}
