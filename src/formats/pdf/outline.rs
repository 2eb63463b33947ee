//! Outline resolution
//!
//! Converts the engine's outline tree into [`OutlineItem`]s, resolving each
//! destination into a page id or an external URL. A destination that cannot be
//! resolved leaves its node with `dest = None`; siblings and ancestors are
//! unaffected.

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};

use super::engine::{DestEntry, PdfDest, PdfDocumentProxy, PdfOutlineNode};
use crate::document::{page_id, OutlineDest, OutlineItem};

/// Resolves outline nodes of one open document
pub(crate) struct OutlineResolver<'a> {
    pdf: &'a dyn PdfDocumentProxy,
    document_id: &'a str,
    concurrency: usize,
}

impl<'a> OutlineResolver<'a> {
    pub(crate) fn new(pdf: &'a dyn PdfDocumentProxy, document_id: &'a str, concurrency: usize) -> Self {
        Self {
            pdf,
            document_id,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch and resolve the whole outline; `None` when the document has none
    pub(crate) async fn resolve_outline(&self) -> Option<Vec<OutlineItem>> {
        match self.pdf.get_outline().await {
            Ok(Some(nodes)) => Some(self.resolve_nodes(&nodes).await),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read outline of {}: {:#}", self.document_id, e);
                None
            }
        }
    }

    /// Resolve siblings, keeping source order
    pub(crate) fn resolve_nodes<'n>(
        &'n self,
        nodes: &'n [PdfOutlineNode],
    ) -> BoxFuture<'n, Vec<OutlineItem>> {
        // Collected first: a borrowing closure inside the stream is not `Send`
        let pending: Vec<_> = nodes.iter().map(|node| self.resolve_node(node)).collect();
        async move {
            futures::stream::iter(pending)
                .buffered(self.concurrency)
                .collect::<Vec<_>>()
                .await
        }
        .boxed()
    }

    async fn resolve_node(&self, node: &PdfOutlineNode) -> OutlineItem {
        let dest = match self.resolve_dest(node).await {
            Ok(dest) => dest,
            Err(e) => {
                tracing::warn!(
                    "Unresolved outline destination for {:?} in {}: {:#}",
                    node.title,
                    self.document_id,
                    e
                );
                None
            }
        };

        OutlineItem {
            content: node.title.clone(),
            dest,
            items: self.resolve_nodes(&node.items).await,
        }
    }

    async fn resolve_dest(&self, node: &PdfOutlineNode) -> anyhow::Result<Option<OutlineDest>> {
        if let Some(url) = &node.url {
            return Ok(Some(OutlineDest::Url {
                url: url.clone(),
                new_window: node.new_window.unwrap_or(false),
            }));
        }

        let explicit = match &node.dest {
            None => return Ok(None),
            Some(PdfDest::Named(name)) if is_external_url(name) => {
                return Ok(Some(OutlineDest::Url {
                    url: name.clone(),
                    new_window: node.new_window.unwrap_or(false),
                }));
            }
            Some(PdfDest::Named(name)) => self
                .pdf
                .get_destination(name)
                .await?
                .ok_or_else(|| anyhow::anyhow!("named destination {:?} not found", name))?,
            Some(PdfDest::Explicit(entries)) => entries.clone(),
        };

        let index = match explicit.first() {
            Some(DestEntry::Ref(page_ref)) => self.pdf.get_page_index(page_ref).await?,
            Some(DestEntry::Number(n)) if n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 => {
                *n as u32
            }
            other => anyhow::bail!("destination does not address a page: {:?}", other),
        };

        let page_count = self.pdf.num_pages();
        anyhow::ensure!(
            index < page_count,
            "page index {} out of range ({} pages)",
            index,
            page_count
        );

        Ok(Some(OutlineDest::Page {
            page_id: page_id(self.document_id, index + 1),
        }))
    }
}

fn is_external_url(dest: &str) -> bool {
    ["http://", "https://", "mailto:", "ftp://"]
        .iter()
        .any(|scheme| dest.starts_with(scheme))
}
