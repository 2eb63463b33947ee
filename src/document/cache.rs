//! Lazy page cache with singleflight decoding
//!
//! Every page of a document is produced on first access and memoized.
//! Concurrent requests for a page whose decode is in flight join that decode
//! instead of starting another one.
//!
//! # Thread Safety
//!
//! The slot map is guarded by a `parking_lot::Mutex` that is never held across
//! an await point. In-flight decodes are `Shared` futures: the first caller
//! creates the future, every caller (including the first) awaits a clone.
//!
//! A failed decode is delivered to everyone who joined it, then its slot is
//! cleared so that a later request retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use super::{DocumentError, DocumentResult, IntermediatePage};

/// Produces page `number` (1-based); called at most once per decode attempt
pub type PageLoader =
    Arc<dyn Fn(u32) -> BoxFuture<'static, DocumentResult<IntermediatePage>> + Send + Sync>;

type PageFuture = Shared<BoxFuture<'static, DocumentResult<Arc<IntermediatePage>>>>;

struct Slot {
    generation: u64,
    future: PageFuture,
}

/// Per-document memo of decoded pages
pub struct PageCache {
    page_count: u32,
    loader: PageLoader,
    slots: Mutex<HashMap<u32, Slot>>,
    next_generation: AtomicU64,
    decodes_started: AtomicUsize,
}

impl PageCache {
    /// Create a cache for `page_count` pages produced by `loader`
    pub fn new(page_count: u32, loader: PageLoader) -> Self {
        Self {
            page_count,
            loader,
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            decodes_started: AtomicUsize::new(0),
        }
    }

    /// Cache whose pages are already materialized
    pub fn from_pages(pages: Vec<IntermediatePage>) -> Self {
        let page_count = pages.len() as u32;
        let pages: Arc<Vec<IntermediatePage>> = Arc::new(pages);
        let loader: PageLoader = Arc::new(move |number| {
            let pages = pages.clone();
            async move {
                pages
                    .get(number as usize - 1)
                    .cloned()
                    .ok_or(DocumentError::PageNotFound(number))
            }
            .boxed()
        });
        Self::new(page_count, loader)
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn contains(&self, number: u32) -> bool {
        (1..=self.page_count).contains(&number)
    }

    /// Get page `number`, decoding it if no decode is cached or in flight
    pub async fn get(&self, number: u32) -> DocumentResult<Arc<IntermediatePage>> {
        if !self.contains(number) {
            return Err(DocumentError::PageNotFound(number));
        }

        let (generation, future) = {
            let mut slots = self.slots.lock();
            match slots.get(&number) {
                Some(slot) => (slot.generation, slot.future.clone()),
                None => {
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                    let future = self.start_decode(number);
                    slots.insert(
                        number,
                        Slot {
                            generation,
                            future: future.clone(),
                        },
                    );
                    (generation, future)
                }
            }
        };

        let result = future.await;

        if let Err(e) = &result {
            let mut slots = self.slots.lock();
            // A retry may already have replaced the failed slot
            if slots
                .get(&number)
                .is_some_and(|slot| slot.generation == generation)
            {
                tracing::debug!("Clearing failed slot for page {}: {}", number, e);
                slots.remove(&number);
            }
        }

        result
    }

    fn start_decode(&self, number: u32) -> PageFuture {
        self.decodes_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Starting decode of page {}", number);
        (self.loader)(number)
            .map(|result| result.map(Arc::new))
            .boxed()
            .shared()
    }

    /// Whether page `number` has been decoded successfully
    pub fn is_cached(&self, number: u32) -> bool {
        self.slots
            .lock()
            .get(&number)
            .and_then(|slot| slot.future.peek())
            .is_some_and(|result| result.is_ok())
    }

    /// Get cache statistics
    pub fn stats(&self) -> PageCacheStats {
        let slots = self.slots.lock();
        let cached = slots
            .values()
            .filter(|slot| matches!(slot.future.peek(), Some(Ok(_))))
            .count();
        PageCacheStats {
            page_count: self.page_count as usize,
            cached,
            in_flight: slots.len() - cached,
            decodes_started: self.decodes_started.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("page_count", &self.page_count)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Page cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCacheStats {
    /// Number of pages in the document
    pub page_count: usize,
    /// Pages decoded successfully
    pub cached: usize,
    /// Decodes started but not finished (or finished with an error not yet collected)
    pub in_flight: usize,
    /// Total decode attempts
    pub decodes_started: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn page(number: u32) -> IntermediatePage {
        IntermediatePage {
            id: format!("doc-page-{}", number),
            number,
            width: 100.0,
            height: 200.0,
            texts: Vec::new(),
        }
    }

    fn counting_loader(calls: Arc<AtomicUsize>, delay: Duration) -> PageLoader {
        Arc::new(move |number| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Ok(page(number))
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_decode() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PageCache::new(2, counting_loader(calls.clone(), Duration::from_millis(20)));

        let (a, b) = tokio::join!(cache.get(1), cache.get(1));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.number, 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_across_tasks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(PageCache::new(
            1,
            counting_loader(calls.clone(), Duration::from_millis(20)),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get(1).await })
            })
            .collect();
        let pages: Vec<_> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(pages.iter().all(|p| Arc::ptr_eq(p, &pages[0])));
    }

    #[tokio::test]
    async fn test_repeated_reads_are_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PageCache::new(3, counting_loader(calls.clone(), Duration::ZERO));

        let first = cache.get(2).await.unwrap();
        let second = cache.get(2).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_cached(2));
        assert!(!cache.is_cached(1));
    }

    #[tokio::test]
    async fn test_failure_is_shared_then_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader: PageLoader = {
            let calls = calls.clone();
            Arc::new(move |number| {
                let calls = calls.clone();
                async move {
                    let attempt = calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    if attempt == 0 {
                        Err(DocumentError::page_decode(number, "page released"))
                    } else {
                        Ok(page(number))
                    }
                }
                .boxed()
            })
        };
        let cache = PageCache::new(1, loader);

        let (a, b) = tokio::join!(cache.get(1), cache.get(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap_err(), b.unwrap_err());
        assert!(!cache.is_cached(1));

        let retried = cache.get(1).await.unwrap();
        assert_eq!(retried.number, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_pages() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PageCache::new(2, counting_loader(calls.clone(), Duration::ZERO));

        assert_eq!(cache.get(0).await.unwrap_err(), DocumentError::PageNotFound(0));
        assert_eq!(cache.get(3).await.unwrap_err(), DocumentError::PageNotFound(3));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stats() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PageCache::new(4, counting_loader(calls, Duration::ZERO));
        cache.get(1).await.unwrap();
        cache.get(4).await.unwrap();

        let stats = cache.stats();
        assert_eq!(stats.page_count, 4);
        assert_eq!(stats.cached, 2);
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.decodes_started, 2);
    }

    #[tokio::test]
    async fn test_from_pages() {
        let cache = PageCache::from_pages(vec![page(1), page(2)]);
        assert_eq!(cache.page_count(), 2);
        assert_eq!(cache.get(2).await.unwrap().id, "doc-page-2");
    }
}
