//! Intermediate document and lazy page access
//!
//! [`IntermediateDocument`] is the raw tree every codec produces. [`Document`]
//! is the consumer-facing handle returned by `encode`; pages are reached
//! through [`PageGetter`]s so callers decide whether and when to pay the decode
//! cost.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use super::cache::{PageCache, PageCacheStats};
use super::types::{page_id, parse_page_id, DocumentFormat, IntermediatePage, OutlineItem};
use super::DocumentResult;

/// The intermediate tree produced by a codec
#[derive(Debug)]
pub struct IntermediateDocument {
    id: String,
    title: String,
    pages: PageCache,
    outline: Option<Vec<OutlineItem>>,
}

impl IntermediateDocument {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        pages: PageCache,
        outline: Option<Vec<OutlineItem>>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            pages,
            outline,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_count(&self) -> u32 {
        self.pages.page_count()
    }

    /// Outline forest; `None` when the source has no outline
    pub fn outline(&self) -> Option<&[OutlineItem]> {
        self.outline.as_deref()
    }

    /// Id of page `number`
    pub fn page_id(&self, number: u32) -> String {
        page_id(&self.id, number)
    }

    /// Load one page (1-based)
    pub async fn page(&self, number: u32) -> DocumentResult<Arc<IntermediatePage>> {
        self.pages.get(number).await
    }

    /// Materialize every page, in order
    pub async fn pages(&self) -> DocumentResult<Vec<Arc<IntermediatePage>>> {
        let loads = (1..=self.page_count()).map(|number| self.pages.get(number));
        futures::future::try_join_all(loads).await
    }

    pub fn cache_stats(&self) -> PageCacheStats {
        self.pages.stats()
    }
}

/// Consumer-facing document handle
///
/// Cheap to clone; clones share the same page cache.
#[derive(Debug, Clone)]
pub struct Document {
    format: DocumentFormat,
    inner: Arc<IntermediateDocument>,
}

impl Document {
    pub fn new(format: DocumentFormat, inner: IntermediateDocument) -> Self {
        Self {
            format,
            inner: Arc::new(inner),
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn title(&self) -> &str {
        self.inner.title()
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn page_count(&self) -> u32 {
        self.inner.page_count()
    }

    /// All pages, decoding those not yet cached
    pub async fn pages(&self) -> DocumentResult<Vec<Arc<IntermediatePage>>> {
        self.inner.pages().await
    }

    /// Load page `number` directly
    pub async fn get_page(&self, number: u32) -> DocumentResult<Arc<IntermediatePage>> {
        self.inner.page(number).await
    }

    /// Deferred producer for page `number`; `None` when out of range
    pub fn get_page_by_page_number(&self, number: u32) -> Option<PageGetter> {
        self.inner.pages.contains(number).then(|| PageGetter {
            document: self.inner.clone(),
            number,
        })
    }

    /// Deferred producer for the page with id `id`; `None` for unknown ids
    pub fn get_page_by_id(&self, id: &str) -> Option<PageGetter> {
        let number = parse_page_id(self.id(), id)?;
        self.get_page_by_page_number(number)
    }

    /// Outline forest; `None` when the source has no outline
    pub fn outline(&self) -> Option<&[OutlineItem]> {
        self.inner.outline()
    }

    /// The raw intermediate tree, e.g. for re-serialization
    pub fn intermediate(&self) -> &Arc<IntermediateDocument> {
        &self.inner
    }
}

/// Zero-argument deferred page producer
///
/// Loading goes through the document's page cache, so every getter for the
/// same page shares one decode.
#[derive(Debug, Clone)]
pub struct PageGetter {
    document: Arc<IntermediateDocument>,
    number: u32,
}

impl PageGetter {
    pub fn page_number(&self) -> u32 {
        self.number
    }

    pub fn page_id(&self) -> String {
        self.document.page_id(self.number)
    }

    pub async fn load(&self) -> DocumentResult<Arc<IntermediatePage>> {
        self.document.page(self.number).await
    }
}

impl IntoFuture for PageGetter {
    type Output = DocumentResult<Arc<IntermediatePage>>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.load().await })
    }
}
