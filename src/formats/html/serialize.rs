//! HTML fragment output for intermediate documents

use std::fmt::Write;
use std::sync::Arc;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::document::{IntermediatePage, IntermediateText, DEFAULT_FONT_WEIGHT};

/// Class of the outer wrapper
pub const DOCUMENT_CLASS: &str = "hamster-note-document";
/// Class of every page wrapper
pub const PAGE_CLASS: &str = "hamster-note-page";

/// Render pages into a single fragment
///
/// Pages keep their ids, runs keep theirs; one element per page and per run.
pub fn render_fragment(document_id: &str, pages: &[Arc<IntermediatePage>]) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="{}" data-document-id="{}">"#,
        DOCUMENT_CLASS,
        encode_double_quoted_attribute(document_id)
    );

    for page in pages {
        render_page(&mut out, page);
    }

    out.push_str("</div>");
    out
}

fn render_page(out: &mut String, page: &IntermediatePage) {
    let _ = write!(
        out,
        r#"<div class="{}" id="{}" data-page-number="{}""#,
        PAGE_CLASS,
        encode_double_quoted_attribute(&page.id),
        page.number
    );
    if page.width > 0.0 && page.height > 0.0 {
        let _ = write!(
            out,
            r#" style="width:{}px;height:{}px""#,
            page.width, page.height
        );
    }
    out.push('>');

    for text in &page.texts {
        render_text(out, text);
    }

    out.push_str("</div>");
}

fn render_text(out: &mut String, text: &IntermediateText) {
    let _ = write!(
        out,
        r#"<span id="{}" dir="{}" style="{}">{}</span>"#,
        encode_double_quoted_attribute(&text.id),
        text.dir.as_str(),
        encode_double_quoted_attribute(&text_style(text)),
        encode_text(&text.content)
    );
    if text.is_eol {
        out.push_str("<br>");
    }
}

fn text_style(text: &IntermediateText) -> String {
    let mut style = format!("font-size:{}px", text.font_size);
    if text.font_weight != DEFAULT_FONT_WEIGHT {
        let _ = write!(style, ";font-weight:{}", text.font_weight);
    }
    if let Some(color) = &text.color {
        let _ = write!(style, ";color:{}", color);
    }
    if !text.font_family.is_empty() {
        let _ = write!(style, ";font-family:{}", text.font_family);
    }
    style
}
