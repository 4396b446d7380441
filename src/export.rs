//! Note export renderers.
//!
//! Notes store their body as editor HTML. Markdown export converts the common
//! block and inline tags and strips anything else; HTML export wraps the body
//! in a standalone document.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;
use crate::model::{ExportFormat, Note};
use crate::util::format_datetime;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>").expect("valid heading regex"));
static STRONG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:strong|b)(?:\s[^>]*)?>(.*?)</(?:strong|b)>").expect("valid bold regex")
});
static EM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:em|i)(?:\s[^>]*)?>(.*?)</(?:em|i)>").expect("valid italic regex")
});
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#).expect("valid link regex")
});
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("valid list item regex"));
static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid break regex"));
static BLOCK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:p|div|ul|ol|blockquote)>").expect("valid block end regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));

pub fn render(note: &Note, format: ExportFormat) -> Result<String, AppError> {
    match format {
        ExportFormat::Markdown => Ok(to_markdown(note)),
        ExportFormat::Html => Ok(to_html_document(note)),
        ExportFormat::Pdf => Err(AppError::Unsupported(
            "pdf export is not available yet".to_string(),
        )),
    }
}

/// File name for an exported note: the title with unsafe characters replaced.
pub fn file_name(note: &Note, format: ExportFormat) -> String {
    let stem: String = note
        .title
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' || ch == ' ' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.trim().is_empty() {
        format!("note-{}", note.id)
    } else {
        stem.trim().to_string()
    };
    format!("{stem}.{}", format.extension())
}

pub fn to_markdown(note: &Note) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", note.title.trim()));
    output.push_str(&format!("- Folder: {}\n", note.folder));
    if !note.tags.is_empty() {
        output.push_str(&format!("- Tags: {}\n", note.tags.join(", ")));
    }
    output.push_str(&format!("- Updated: {}\n", format_datetime(note.updated_at)));
    output.push('\n');
    let body = html_to_markdown(&note.content);
    if !body.is_empty() {
        output.push_str(&body);
        output.push('\n');
    }
    output
}

pub fn html_to_markdown(html: &str) -> String {
    let text = HEADING_RE.replace_all(html, |caps: &regex::Captures<'_>| {
        let level: usize = caps[1].parse().unwrap_or(1);
        format!("\n{} {}\n\n", "#".repeat(level), caps[2].trim())
    });
    let text = LINK_RE.replace_all(&text, "[$2]($1)");
    let text = STRONG_RE.replace_all(&text, "**$1**");
    let text = EM_RE.replace_all(&text, "*$1*");
    let text = LIST_ITEM_RE.replace_all(&text, "- $1\n");
    let text = BREAK_RE.replace_all(&text, "\n");
    let text = BLOCK_END_RE.replace_all(&text, "\n\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

pub fn to_html_document(note: &Note) -> String {
    let title = escape_html(note.title.trim());
    let mut meta = format!("Folder: {}", escape_html(&note.folder));
    if !note.tags.is_empty() {
        meta.push_str(&format!(" &middot; Tags: {}", escape_html(&note.tags.join(", "))));
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<p class=\"meta\">{meta}</p>\n<article>\n{}\n</article>\n</body>\n</html>\n",
        note.content
    )
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note(title: &str, content: &str) -> Note {
        let now = Utc::now();
        Note {
            id: 4,
            title: title.to_string(),
            content: content.to_string(),
            folder: "Work".to_string(),
            tags: vec!["team".to_string()],
            is_pinned: false,
            shared_with: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn html_to_markdown_converts_common_tags() {
        let html = "<h2>Sync</h2><p>Ship <strong>filters</strong> and <em>notes</em>.</p>\
                    <ul><li>QA</li><li>Docs</li></ul><p>See <a href=\"https://example.com\">site</a>&nbsp;&amp; more</p>";
        let markdown = html_to_markdown(html);
        assert!(markdown.starts_with("## Sync"));
        assert!(markdown.contains("Ship **filters** and *notes*."));
        assert!(markdown.contains("- QA\n- Docs"));
        assert!(markdown.contains("See [site](https://example.com) & more"));
        assert!(!markdown.contains('<'));
    }

    #[test]
    fn markdown_export_has_title_and_metadata() {
        let rendered = render(&note("Plan", "<p>body</p>"), ExportFormat::Markdown)
            .expect("markdown");
        assert!(rendered.starts_with("# Plan\n\n- Folder: Work\n- Tags: team\n"));
        assert!(rendered.trim_end().ends_with("body"));
    }

    #[test]
    fn html_export_escapes_title() {
        let rendered =
            render(&note("A <b> & C", "<p>x</p>"), ExportFormat::Html).expect("html");
        assert!(rendered.contains("<title>A &lt;b&gt; &amp; C</title>"));
        assert!(rendered.contains("<article>\n<p>x</p>\n</article>"));
    }

    #[test]
    fn pdf_is_unsupported() {
        let err = render(&note("x", ""), ExportFormat::Pdf).unwrap_err();
        assert!(matches!(err, AppError::Unsupported(_)));
    }

    #[test]
    fn file_name_replaces_unsafe_characters() {
        assert_eq!(
            file_name(&note("Q3/Q4 plan?", ""), ExportFormat::Markdown),
            "Q3_Q4 plan_.md"
        );
        assert_eq!(file_name(&note("  ", ""), ExportFormat::Html), "note-4.html");
    }
}
