//! Core document types
//!
//! Format-agnostic intermediate representation shared by every codec.

use serde::{Deserialize, Serialize};

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Html,
}

impl DocumentFormat {
    /// MIME type of the source format
    pub fn mime(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Html => "text/html",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => f.write_str("pdf"),
            DocumentFormat::Html => f.write_str("html"),
        }
    }
}

/// Font size used when a source does not declare one (pixels)
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Font weight used when a source does not declare one
pub const DEFAULT_FONT_WEIGHT: u16 = 400;

/// Font weight of bold text
pub const BOLD_FONT_WEIGHT: u16 = 700;

/// Build the id of page `number` within document `document_id`
///
/// Other components address pages through this exact format.
pub fn page_id(document_id: &str, number: u32) -> String {
    format!("{}-page-{}", document_id, number)
}

/// Recover the page number from a page id of `document_id`
pub fn parse_page_id(document_id: &str, page_id: &str) -> Option<u32> {
    let number = page_id
        .strip_prefix(document_id)?
        .strip_prefix("-page-")?;
    // Reject "+1", "01" and friends so the id round-trips exactly
    if number.is_empty() || number.starts_with(['+', '0']) {
        return None;
    }
    number.parse().ok()
}

/// Writing direction of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDir {
    #[default]
    Ltr,
    Rtl,
}

impl TextDir {
    /// Map an engine direction string: only `"ltr"` is left-to-right
    pub fn from_source(dir: &str) -> Self {
        if dir == "ltr" {
            TextDir::Ltr
        } else {
            TextDir::Rtl
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextDir::Ltr => "ltr",
            TextDir::Rtl => "rtl",
        }
    }
}

/// A positioned run of text with style metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateText {
    /// Unique id within the document
    pub id: String,
    /// Text content
    pub content: String,
    /// Origin X in page space
    pub x: f32,
    /// Origin (baseline) Y in page space
    pub y: f32,
    pub font_family: String,
    /// Font size in pixels
    pub font_size: f32,
    pub font_weight: u16,
    /// CSS color, unset when the source does not declare one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub dir: TextDir,
    /// Source marked this run as the end of a line
    #[serde(rename = "isEOL")]
    pub is_eol: bool,
}

impl IntermediateText {
    /// Run with default style values
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            x: 0.0,
            y: 0.0,
            font_family: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            font_weight: DEFAULT_FONT_WEIGHT,
            color: None,
            dir: TextDir::Ltr,
            is_eol: false,
        }
    }

    /// Id of the `index`-th run (0-based) of page `page_id`
    pub fn run_id(page_id: &str, index: usize) -> String {
        format!("{}-text-{}", page_id, index)
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight >= BOLD_FONT_WEIGHT
    }
}

/// One page of an intermediate document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediatePage {
    /// `{documentId}-page-{number}`
    pub id: String,
    /// 1-based page number
    pub number: u32,
    pub width: f32,
    pub height: f32,
    /// Text runs in reading order
    pub texts: Vec<IntermediateText>,
}

impl IntermediatePage {
    /// Plain text of the page: run contents joined by newlines
    pub fn pure_text(&self) -> String {
        self.texts
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Target of an outline entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "targetType", rename_all = "camelCase")]
pub enum OutlineDest {
    /// Jump to a page of the same document
    #[serde(rename_all = "camelCase")]
    Page { page_id: String },
    /// Open an external URL
    #[serde(rename_all = "camelCase")]
    Url { url: String, new_window: bool },
}

/// Outline (table of contents) entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItem {
    /// Entry label
    pub content: String,
    /// Resolved target; `None` when the source destination could not be resolved
    pub dest: Option<OutlineDest>,
    /// Nested entries
    pub items: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Number of entries in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.items.iter().map(OutlineItem::subtree_len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.items.is_empty()
    }
}
