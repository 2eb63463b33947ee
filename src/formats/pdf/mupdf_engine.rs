//! MuPDF-backed [`PdfEngine`]
//!
//! MuPDF documents are not thread-safe, so nothing MuPDF-owned is kept
//! between calls. The engine keeps the raw bytes and opens a fresh document
//! inside `spawn_blocking` for every operation. Outline and metadata are read
//! once at open time.

use std::sync::Arc;

use async_trait::async_trait;
use mupdf::{MetadataName, TextPageOptions};

use super::codec::fingerprint;
use super::engine::{
    DestEntry, PageRef, PdfDest, PdfDocumentProxy, PdfEngine, PdfInfo, PdfMetadata,
    PdfOutlineNode, PdfPageProxy, TextContent, TextItem, Viewport,
};

const PDF_MIME: &str = "application/pdf";

fn open_document(data: &[u8]) -> anyhow::Result<mupdf::Document> {
    mupdf::Document::from_bytes(data, PDF_MIME).map_err(|e| anyhow::anyhow!("MuPDF: {}", e))
}

/// [`PdfEngine`] over MuPDF
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfEngine;

#[async_trait]
impl PdfEngine for MupdfEngine {
    async fn open(&self, data: Vec<u8>) -> anyhow::Result<Arc<dyn PdfDocumentProxy>> {
        let doc = tokio::task::spawn_blocking(move || MupdfDocument::load(data)).await??;
        Ok(Arc::new(doc))
    }
}

struct MupdfDocument {
    data: Arc<Vec<u8>>,
    fingerprint: String,
    page_count: u32,
    title: Option<String>,
    outline: Vec<PdfOutlineNode>,
}

impl MupdfDocument {
    fn load(data: Vec<u8>) -> anyhow::Result<Self> {
        let doc = open_document(&data)?;
        let page_count = doc
            .page_count()
            .map_err(|e| anyhow::anyhow!("MuPDF: {}", e))? as u32;
        let title = doc
            .metadata(MetadataName::Title)
            .ok()
            .filter(|s| !s.is_empty());
        // Documents without bookmarks report an empty list
        let outline = doc
            .outlines()
            .map(|outlines| convert_outlines(&outlines))
            .unwrap_or_default();

        Ok(Self {
            fingerprint: fingerprint(&data),
            data: Arc::new(data),
            page_count,
            title,
            outline,
        })
    }
}

fn convert_outlines(outlines: &[mupdf::Outline]) -> Vec<PdfOutlineNode> {
    outlines
        .iter()
        .map(|outline| {
            let (url, dest) = match outline.page {
                Some(page) => (None, Some(PdfDest::Explicit(vec![DestEntry::Number(page as f64)]))),
                None => (outline.uri.clone(), None),
            };
            PdfOutlineNode {
                title: outline.title.clone(),
                url,
                dest,
                items: convert_outlines(&outline.down),
                ..Default::default()
            }
        })
        .collect()
}

#[async_trait]
impl PdfDocumentProxy for MupdfDocument {
    fn num_pages(&self) -> u32 {
        self.page_count
    }

    fn fingerprints(&self) -> Vec<String> {
        vec![self.fingerprint.clone()]
    }

    async fn get_metadata(&self) -> anyhow::Result<PdfMetadata> {
        Ok(PdfMetadata {
            info: PdfInfo {
                title: self.title.clone(),
                ..Default::default()
            },
        })
    }

    async fn get_page(&self, number: u32) -> anyhow::Result<Arc<dyn PdfPageProxy>> {
        anyhow::ensure!(
            (1..=self.page_count).contains(&number),
            "page {} out of range (1..={})",
            number,
            self.page_count
        );
        let data = self.data.clone();
        let page = tokio::task::spawn_blocking(move || MupdfPage::load(&data, number)).await??;
        Ok(Arc::new(page))
    }

    async fn get_outline(&self) -> anyhow::Result<Option<Vec<PdfOutlineNode>>> {
        Ok((!self.outline.is_empty()).then(|| self.outline.clone()))
    }

    async fn get_destination(&self, _name: &str) -> anyhow::Result<Option<Vec<DestEntry>>> {
        // MuPDF resolves named destinations while reading the outline
        Ok(None)
    }

    async fn get_page_index(&self, page_ref: &PageRef) -> anyhow::Result<u32> {
        anyhow::bail!("MuPDF outlines carry page indices, not references ({}R)", page_ref.num)
    }
}

/// Page data extracted in one pass
struct MupdfPage {
    width: f32,
    height: f32,
    content: TextContent,
}

impl MupdfPage {
    fn load(data: &[u8], number: u32) -> anyhow::Result<Self> {
        let doc = open_document(data)?;
        let page = doc
            .load_page(number as i32 - 1)
            .map_err(|e| anyhow::anyhow!("MuPDF: {}", e))?;
        let bounds = page.bounds().map_err(|e| anyhow::anyhow!("MuPDF: {}", e))?;
        let width = bounds.x1 - bounds.x0;
        let height = bounds.y1 - bounds.y0;

        let text_page = page
            .to_text_page(TextPageOptions::PRESERVE_WHITESPACE)
            .map_err(|e| anyhow::anyhow!("MuPDF: {}", e))?;

        let mut items = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let mut text = String::new();
                let mut min_x = f32::MAX;
                let mut max_x = f32::MIN;
                let mut baseline = f32::MIN;
                let mut size = 0.0f32;

                for ch in line.chars() {
                    if let Some(c) = ch.char() {
                        let quad = ch.quad();
                        min_x = min_x.min(quad.ul.x.min(quad.ll.x));
                        max_x = max_x.max(quad.ur.x.max(quad.lr.x));
                        baseline = baseline.max(quad.ll.y.max(quad.lr.y));
                        size = size.max(ch.size());
                        text.push(c);
                    }
                }

                if text.trim().is_empty() {
                    continue;
                }

                // MuPDF is top-down; the engine surface uses PDF user space
                let y = height - baseline;
                items.push(TextItem {
                    text,
                    dir: "ltr".to_string(),
                    transform: [size, 0.0, 0.0, size, min_x, y],
                    width: max_x - min_x,
                    height: size,
                    font_name: String::new(),
                    has_eol: Some(true),
                });
            }
        }

        Ok(Self {
            width,
            height,
            content: TextContent {
                items,
                styles: Default::default(),
            },
        })
    }
}

#[async_trait]
impl PdfPageProxy for MupdfPage {
    fn get_viewport(&self, scale: f32) -> Viewport {
        Viewport {
            width: self.width * scale,
            height: self.height * scale,
        }
    }

    async fn get_text_content(&self) -> anyhow::Result<TextContent> {
        Ok(self.content.clone())
    }
}
