//! External PDF engine surface
//!
//! The codec never parses PDF itself. It drives an engine through these
//! traits, whose shape follows the pdf.js document/page proxies: open from
//! bytes, per-page viewport and text content, document metadata, fingerprints,
//! outline, named-destination lookup and page-reference → index lookup.
//!
//! The data types deserialize from pdf.js-shaped JSON, so an engine that
//! already speaks that protocol can hand its payloads over unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opens documents from raw bytes
#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Open a document; fails when the engine cannot read the data
    async fn open(&self, data: Vec<u8>) -> anyhow::Result<Arc<dyn PdfDocumentProxy>>;
}

/// An open engine document
#[async_trait]
pub trait PdfDocumentProxy: Send + Sync {
    fn num_pages(&self) -> u32;

    /// Document fingerprints, most significant first
    fn fingerprints(&self) -> Vec<String>;

    async fn get_metadata(&self) -> anyhow::Result<PdfMetadata>;

    /// Load page `number` (1-based)
    async fn get_page(&self, number: u32) -> anyhow::Result<Arc<dyn PdfPageProxy>>;

    /// Outline tree; `None` when the document has none
    async fn get_outline(&self) -> anyhow::Result<Option<Vec<PdfOutlineNode>>>;

    /// Resolve a named destination to its explicit form
    async fn get_destination(&self, name: &str) -> anyhow::Result<Option<Vec<DestEntry>>>;

    /// Zero-based index of the page behind `page_ref`
    async fn get_page_index(&self, page_ref: &PageRef) -> anyhow::Result<u32>;
}

/// An open engine page
#[async_trait]
pub trait PdfPageProxy: Send + Sync {
    fn get_viewport(&self, scale: f32) -> Viewport;

    async fn get_text_content(&self) -> anyhow::Result<TextContent>;

    /// Release engine resources held by the page
    fn cleanup(&self) {}
}

/// Page dimensions at a given scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Text content of a page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextContent {
    pub items: Vec<TextItem>,
    /// Font styles keyed by `TextItem::font_name`
    #[serde(default)]
    pub styles: HashMap<String, TextStyle>,
}

/// One positioned string of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    #[serde(rename = "str")]
    pub text: String,
    /// `"ltr"`, `"rtl"` or `"ttb"`
    pub dir: String,
    /// `[a, b, c, d, e, f]` glyph matrix; `e`/`f` are the translation
    pub transform: [f32; 6],
    pub width: f32,
    pub height: f32,
    pub font_name: String,
    #[serde(rename = "hasEOL", default)]
    pub has_eol: Option<bool>,
}

/// Font metrics of a text style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default)]
    pub ascent: f32,
    #[serde(default)]
    pub descent: f32,
    pub font_family: String,
    #[serde(default)]
    pub vertical: bool,
}

/// Document metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfMetadata {
    #[serde(default)]
    pub info: PdfInfo,
}

/// Document information dictionary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PdfInfo {
    #[serde(default)]
    pub title: Option<String>,
}

/// Outline node as reported by the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOutlineNode {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub unsafe_url: Option<String>,
    #[serde(default)]
    pub new_window: Option<bool>,
    #[serde(default)]
    pub dest: Option<PdfDest>,
    #[serde(default)]
    pub items: Vec<PdfOutlineNode>,
}

/// Destination of an outline node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PdfDest {
    /// Named destination, resolved through `get_destination`
    Named(String),
    /// Explicit destination array
    Explicit(Vec<DestEntry>),
}

/// Entry of an explicit destination array
///
/// The first entry addresses the page: a page reference, or an integer page
/// index. The rest (fit mode, coordinates, zoom) is kept but not interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DestEntry {
    Ref(PageRef),
    Name { name: String },
    Number(f64),
    Null,
}

/// Indirect reference to a page object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub num: u32,
    #[serde(default)]
    pub gen: u32,
}
