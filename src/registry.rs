//! Codec registry
//!
//! Holds the codecs a caller wants to use and hands input bytes to the first
//! one that accepts them. There is no global instance; build one per
//! application.

use std::sync::Arc;

use crate::config::Config;
use crate::document::{Codec, Document, DocumentResult};
use crate::formats::pdf::PdfEngine;
use crate::formats::{HtmlCodec, PdfCodec};

/// Ordered list of codecs
#[derive(Default, Clone)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in codecs: PDF (when an engine is given) then HTML
    ///
    /// PDF goes first because the HTML probe accepts almost any text.
    pub fn standard(config: &Config, pdf_engine: Option<Arc<dyn PdfEngine>>) -> Self {
        let mut registry = Self::new();
        if let Some(engine) = pdf_engine {
            registry.register(Arc::new(PdfCodec::with_config(engine, config.pdf.clone())));
        }
        registry.register(Arc::new(HtmlCodec::new().with_config(config.html.clone())));
        registry
    }

    /// Append a codec; earlier registrations are tried first
    pub fn register(&mut self, codec: Arc<dyn Codec>) -> &mut Self {
        tracing::debug!("Registered codec {} ({})", codec.name(), codec.format());
        self.codecs.push(codec);
        self
    }

    pub fn codecs(&self) -> &[Arc<dyn Codec>] {
        &self.codecs
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Decode with the first codec that accepts the bytes
    ///
    /// Codecs whose probe matches but whose `encode` fails or declines are
    /// skipped. Returns `None` when nothing could decode the input.
    pub async fn dispatch(&self, bytes: &[u8]) -> Option<Document> {
        for codec in &self.codecs {
            if !codec.probe(bytes) {
                continue;
            }
            match codec.encode(bytes).await {
                Ok(Some(document)) => {
                    tracing::debug!("Codec {} decoded document {}", codec.name(), document.id());
                    return Some(document);
                }
                Ok(None) => {
                    tracing::debug!("Codec {} declined input, trying next", codec.name());
                }
                Err(e) => {
                    tracing::warn!("Codec {} failed: {}, trying next", codec.name(), e);
                }
            }
        }

        tracing::debug!("No codec accepted {} bytes", bytes.len());
        None
    }

    /// Like [`dispatch`](Self::dispatch), but the first encode error is returned
    pub async fn try_dispatch(&self, bytes: &[u8]) -> DocumentResult<Option<Document>> {
        for codec in &self.codecs {
            if !codec.probe(bytes) {
                continue;
            }
            if let Some(document) = codec.encode(bytes).await? {
                return Ok(Some(document));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.codecs.iter().map(|codec| codec.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentError, DocumentFormat, IntermediateDocument, PageCache};
    use crate::formats::pdf::testing::{MockEngine, MockPdf};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts input starting with `prefix`, answering with `outcome`
    struct ScriptedCodec {
        name: &'static str,
        prefix: &'static [u8],
        outcome: Outcome,
        encodes: AtomicUsize,
    }

    #[derive(Clone, Copy)]
    enum Outcome {
        Decode,
        Decline,
        Fail,
    }

    impl ScriptedCodec {
        fn new(name: &'static str, prefix: &'static [u8], outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                name,
                prefix,
                outcome,
                encodes: AtomicUsize::new(0),
            })
        }

        fn encodes(&self) -> usize {
            self.encodes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Codec for ScriptedCodec {
        fn name(&self) -> &'static str {
            self.name
        }

        fn format(&self) -> DocumentFormat {
            DocumentFormat::Html
        }

        fn probe(&self, bytes: &[u8]) -> bool {
            bytes.starts_with(self.prefix)
        }

        async fn encode(&self, _bytes: &[u8]) -> DocumentResult<Option<Document>> {
            self.encodes.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Decode => Ok(Some(Document::new(
                    DocumentFormat::Html,
                    IntermediateDocument::new(self.name, "", PageCache::from_pages(Vec::new()), None),
                ))),
                Outcome::Decline => Ok(None),
                Outcome::Fail => Err(DocumentError::Html(self.name.into())),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = CodecRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.dispatch(b"anything").await.is_none());
        assert!(registry.try_dispatch(b"anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_codec_accepts_input() {
        let a = ScriptedCodec::new("a", b"A", Outcome::Decode);
        let mut registry = CodecRegistry::new();
        registry.register(a.clone());

        assert!(registry.dispatch(b"zzz").await.is_none());
        assert_eq!(a.encodes(), 0);
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let first = ScriptedCodec::new("first", b"", Outcome::Decode);
        let second = ScriptedCodec::new("second", b"", Outcome::Decode);
        let mut registry = CodecRegistry::new();
        registry.register(first.clone()).register(second.clone());

        let doc = registry.dispatch(b"x").await.unwrap();
        assert_eq!(doc.id(), "first");
        assert_eq!(second.encodes(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_skips_declining_and_failing_codecs() {
        let failing = ScriptedCodec::new("failing", b"", Outcome::Fail);
        let declining = ScriptedCodec::new("declining", b"", Outcome::Decline);
        let fallback = ScriptedCodec::new("fallback", b"", Outcome::Decode);
        let mut registry = CodecRegistry::new();
        registry
            .register(failing.clone())
            .register(declining.clone())
            .register(fallback.clone());

        let doc = registry.dispatch(b"x").await.unwrap();
        assert_eq!(doc.id(), "fallback");
        assert_eq!(failing.encodes(), 1);
        assert_eq!(declining.encodes(), 1);

        let err = registry.try_dispatch(b"x").await.unwrap_err();
        assert_eq!(err, DocumentError::Html("failing".into()));
    }

    #[tokio::test]
    async fn test_standard_registry_order() {
        let engine = Arc::new(MockEngine::new(Arc::new(MockPdf::new("std-fp", 1))));
        let registry = CodecRegistry::standard(&Config::default(), Some(engine as Arc<dyn PdfEngine>));

        let names: Vec<_> = registry.codecs().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["pdf", "html"]);

        let pdf = registry.dispatch(b"%PDF-1.7 body").await.unwrap();
        assert_eq!(pdf.format(), DocumentFormat::Pdf);
        assert_eq!(pdf.id(), "std-fp");

        let html = registry.dispatch(b"<p>hi</p>").await.unwrap();
        assert_eq!(html.format(), DocumentFormat::Html);

        assert!(registry.dispatch(b"\x00\x01\x02").await.is_none());
        assert_eq!(format!("{:?}", registry), r#"["pdf", "html"]"#);
    }

    #[tokio::test]
    async fn test_standard_registry_without_pdf_engine() {
        let registry = CodecRegistry::standard(&Config::default(), None);
        assert_eq!(registry.len(), 1);
        assert!(registry.dispatch(b"%PDF-1.7\x00binary").await.is_none());
    }
}
