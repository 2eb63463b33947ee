//! Scriptable in-memory PDF engine for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::engine::{
    DestEntry, PageRef, PdfDocumentProxy, PdfEngine, PdfInfo, PdfMetadata, PdfOutlineNode,
    PdfPageProxy, TextContent, Viewport,
};

/// Two runs in two fonts, one of them right-to-left
pub(crate) fn sample_text_content() -> TextContent {
    serde_json::from_str(
        r#"{
            "items": [
                {"str": "Hello", "dir": "ltr", "transform": [1, 0, 0, 1, 10, 20],
                 "height": 12, "width": 30, "fontName": "F1", "hasEOL": true},
                {"str": "مرحبا", "dir": "rtl", "transform": [1, 0, 0, 1, 40, 50],
                 "height": 10, "width": 25, "fontName": "F2", "hasEOL": false}
            ],
            "styles": {
                "F1": {"ascent": 9, "descent": -3, "fontFamily": "Arial"},
                "F2": {"ascent": 8, "descent": -2, "fontFamily": "Noto Sans Arabic"}
            }
        }"#,
    )
    .expect("valid text content")
}

pub(crate) struct MockEngine {
    pdf: Option<Arc<MockPdf>>,
    opens: AtomicUsize,
    opened_len: AtomicUsize,
}

impl MockEngine {
    pub(crate) fn new(pdf: Arc<MockPdf>) -> Self {
        Self {
            pdf: Some(pdf),
            opens: AtomicUsize::new(0),
            opened_len: AtomicUsize::new(0),
        }
    }

    /// Engine that rejects every input
    pub(crate) fn rejecting() -> Self {
        Self {
            pdf: None,
            opens: AtomicUsize::new(0),
            opened_len: AtomicUsize::new(0),
        }
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn opened_len(&self) -> usize {
        self.opened_len.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfEngine for MockEngine {
    async fn open(&self, data: Vec<u8>) -> anyhow::Result<Arc<dyn PdfDocumentProxy>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.opened_len.store(data.len(), Ordering::SeqCst);
        match &self.pdf {
            Some(pdf) => Ok(pdf.clone()),
            None => anyhow::bail!("Invalid PDF structure"),
        }
    }
}

pub(crate) struct MockPdf {
    fingerprints: Vec<String>,
    num_pages: u32,
    title: Option<String>,
    viewport: Viewport,
    content: TextContent,
    outline: Option<Vec<PdfOutlineNode>>,
    destinations: HashMap<String, Vec<DestEntry>>,
    page_indices: HashMap<u32, u32>,
    page_failures: Mutex<HashMap<u32, usize>>,
    page_delay: Duration,
    page_loads: AtomicUsize,
    destination_lookups: AtomicUsize,
    cleanups: Arc<AtomicUsize>,
}

impl MockPdf {
    pub(crate) fn new(fingerprint: &str, num_pages: u32) -> Self {
        Self {
            fingerprints: vec![fingerprint.to_string()],
            num_pages,
            title: None,
            viewport: Viewport {
                width: 600.0,
                height: 800.0,
            },
            content: sample_text_content(),
            outline: None,
            destinations: HashMap::new(),
            page_indices: HashMap::new(),
            page_failures: Mutex::new(HashMap::new()),
            page_delay: Duration::ZERO,
            page_loads: AtomicUsize::new(0),
            destination_lookups: AtomicUsize::new(0),
            cleanups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn without_fingerprints(mut self) -> Self {
        self.fingerprints.clear();
        self
    }

    pub(crate) fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub(crate) fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    pub(crate) fn with_outline(mut self, outline: Vec<PdfOutlineNode>) -> Self {
        self.outline = Some(outline);
        self
    }

    pub(crate) fn with_destination(mut self, name: &str, dest: Vec<DestEntry>) -> Self {
        self.destinations.insert(name.to_string(), dest);
        self
    }

    pub(crate) fn with_page_index(mut self, ref_num: u32, index: u32) -> Self {
        self.page_indices.insert(ref_num, index);
        self
    }

    /// Make the next `times` loads of page `number` fail
    pub(crate) fn failing_page(self, number: u32, times: usize) -> Self {
        self.page_failures.lock().insert(number, times);
        self
    }

    pub(crate) fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub(crate) fn page_loads(&self) -> usize {
        self.page_loads.load(Ordering::SeqCst)
    }

    pub(crate) fn destination_lookups(&self) -> usize {
        self.destination_lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfDocumentProxy for MockPdf {
    fn num_pages(&self) -> u32 {
        self.num_pages
    }

    fn fingerprints(&self) -> Vec<String> {
        self.fingerprints.clone()
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
        self.page_loads.fetch_add(1, Ordering::SeqCst);
        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        {
            let mut failures = self.page_failures.lock();
            if let Some(remaining) = failures.get_mut(&number) {
                if *remaining > 0 {
                    *remaining -= 1;
                    anyhow::bail!("Transport destroyed while loading page {}", number);
                }
            }
        }

        Ok(Arc::new(MockPage {
            viewport: self.viewport,
            content: self.content.clone(),
            cleanups: self.cleanups.clone(),
        }))
    }

    async fn get_outline(&self) -> anyhow::Result<Option<Vec<PdfOutlineNode>>> {
        Ok(self.outline.clone())
    }

    async fn get_destination(&self, name: &str) -> anyhow::Result<Option<Vec<DestEntry>>> {
        self.destination_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.destinations.get(name).cloned())
    }

    async fn get_page_index(&self, page_ref: &PageRef) -> anyhow::Result<u32> {
        self.page_indices
            .get(&page_ref.num)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid page reference {}R", page_ref.num))
    }
}

struct MockPage {
    viewport: Viewport,
    content: TextContent,
    cleanups: Arc<AtomicUsize>,
}

#[async_trait]
impl PdfPageProxy for MockPage {
    fn get_viewport(&self, scale: f32) -> Viewport {
        Viewport {
            width: self.viewport.width * scale,
            height: self.viewport.height * scale,
        }
    }

    async fn get_text_content(&self) -> anyhow::Result<TextContent> {
        Ok(self.content.clone())
    }

    fn cleanup(&self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}
