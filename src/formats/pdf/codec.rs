//! PDF codec
//!
//! Implements [`Codec`] for PDF documents on top of an external [`PdfEngine`].
//! Opening the document, reading metadata and resolving the outline happen in
//! `encode`; page geometry and text are only extracted when a page is first
//! requested.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use sha2::{Digest, Sha256};

use super::engine::{PdfDocumentProxy, PdfEngine, TextItem, TextStyle};
use super::outline::OutlineResolver;
use crate::config::PdfConfig;
use crate::document::{
    page_id, Codec, Document, DocumentError, DocumentFormat, DocumentResult, IntermediateDocument,
    IntermediatePage, IntermediateText, PageCache, PageLoader, TextDir, DEFAULT_FONT_WEIGHT,
};

/// How far into the buffer the `%PDF-` header may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// PDF implementation of [`Codec`]
pub struct PdfCodec {
    engine: Arc<dyn PdfEngine>,
    config: PdfConfig,
}

impl PdfCodec {
    pub fn new(engine: Arc<dyn PdfEngine>) -> Self {
        Self::with_config(engine, PdfConfig::default())
    }

    pub fn with_config(engine: Arc<dyn PdfEngine>, config: PdfConfig) -> Self {
        Self { engine, config }
    }
}

#[async_trait]
impl Codec for PdfCodec {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn probe(&self, bytes: &[u8]) -> bool {
        let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
        window.windows(5).any(|w| w == b"%PDF-")
    }

    async fn encode(&self, bytes: &[u8]) -> DocumentResult<Option<Document>> {
        let pdf = self
            .engine
            .open(bytes.to_vec())
            .await
            .map_err(DocumentError::engine)?;

        let id = pdf
            .fingerprints()
            .into_iter()
            .next()
            .unwrap_or_else(|| fingerprint(bytes));

        let title = match pdf.get_metadata().await {
            Ok(metadata) => metadata.info.title.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read metadata of {}: {:#}", id, e);
                String::new()
            }
        };

        let outline = OutlineResolver::new(pdf.as_ref(), &id, self.config.outline_concurrency)
            .resolve_outline()
            .await;

        let page_count = pdf.num_pages();
        tracing::debug!(
            "Opened PDF {} ({} pages, outline: {})",
            id,
            page_count,
            outline.is_some()
        );

        let pages = PageCache::new(
            page_count,
            page_loader(pdf, id.clone(), self.config.viewport_scale),
        );

        Ok(Some(Document::new(
            DocumentFormat::Pdf,
            IntermediateDocument::new(id, title, pages, outline),
        )))
    }
}

/// Stable document id derived from the raw bytes
pub fn fingerprint(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(&digest[..16])
}

fn page_loader(pdf: Arc<dyn PdfDocumentProxy>, document_id: String, scale: f32) -> PageLoader {
    Arc::new(move |number| {
        let pdf = pdf.clone();
        let document_id = document_id.clone();
        async move { decode_page(pdf.as_ref(), &document_id, number, scale).await }.boxed()
    })
}

async fn decode_page(
    pdf: &dyn PdfDocumentProxy,
    document_id: &str,
    number: u32,
    scale: f32,
) -> DocumentResult<IntermediatePage> {
    let page = pdf
        .get_page(number)
        .await
        .map_err(|e| DocumentError::page_decode(number, format!("{:#}", e)))?;

    let viewport = page.get_viewport(scale);
    let content = page.get_text_content().await;
    page.cleanup();
    let content = content.map_err(|e| DocumentError::page_decode(number, format!("{:#}", e)))?;

    let id = page_id(document_id, number);
    let texts = content
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| text_run(&id, index, item, &content.styles))
        .collect();

    Ok(IntermediatePage {
        id,
        number,
        width: viewport.width,
        height: viewport.height,
        texts,
    })
}

/// One text run per engine item
///
/// The font size is the item's rendered height, not a value derived from the
/// style's ascent/descent.
fn text_run(
    page_id: &str,
    index: usize,
    item: &TextItem,
    styles: &HashMap<String, TextStyle>,
) -> IntermediateText {
    IntermediateText {
        id: IntermediateText::run_id(page_id, index),
        content: item.text.clone(),
        x: item.transform[4],
        y: item.transform[5],
        font_family: styles
            .get(&item.font_name)
            .map(|style| style.font_family.clone())
            .unwrap_or_default(),
        font_size: item.height,
        font_weight: DEFAULT_FONT_WEIGHT,
        color: None,
        dir: TextDir::from_source(&item.dir),
        is_eol: item.has_eol.unwrap_or(false),
    }
}
