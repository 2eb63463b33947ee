//! HTML codec
//!
//! HTML documents become a single page. With a DOM parser available every
//! body element carrying text becomes one run, styled from its inline `style`
//! attribute. Without one (or when parsing fails) the raw source is split into
//! lines, markup included.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::dom::{HtmlDomParser, LolHtmlDomParser, ParsedHtml};
use super::serialize::render_fragment;
use super::style::InlineStyle;
use crate::config::HtmlConfig;
use crate::document::{
    page_id, Codec, Document, DocumentError, DocumentFormat, DocumentResult, IntermediateDocument,
    IntermediatePage, IntermediateText, PageCache,
};

/// HTML implementation of [`Codec`]
pub struct HtmlCodec {
    dom: Option<Arc<dyn HtmlDomParser>>,
    config: HtmlConfig,
}

impl Default for HtmlCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlCodec {
    /// Codec using the lol_html DOM parser
    pub fn new() -> Self {
        Self {
            dom: Some(Arc::new(LolHtmlDomParser)),
            config: HtmlConfig::default(),
        }
    }

    /// Codec that always takes the line-splitting path
    pub fn without_dom() -> Self {
        Self {
            dom: None,
            config: HtmlConfig::default(),
        }
    }

    pub fn with_dom(mut self, dom: Arc<dyn HtmlDomParser>) -> Self {
        self.dom = Some(dom);
        self
    }

    pub fn with_config(mut self, config: HtmlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn has_dom(&self) -> bool {
        self.dom.is_some()
    }

    async fn parse(&self, source: String) -> Option<ParsedHtml> {
        let dom = self.dom.clone()?;
        let parsed = tokio::task::spawn_blocking(move || dom.parse(&source))
            .await
            .map_err(DocumentError::from)
            .and_then(|result| result);

        match parsed {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("HTML parse failed, splitting lines instead: {}", e);
                None
            }
        }
    }

    fn styled_runs(&self, page_id: &str, parsed: &ParsedHtml) -> Vec<IntermediateText> {
        parsed
            .elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                let style = element
                    .style
                    .as_deref()
                    .map(InlineStyle::parse)
                    .unwrap_or_default();

                let mut run = IntermediateText::new(
                    IntermediateText::run_id(page_id, index),
                    element.text.as_str(),
                );
                run.font_size = style.font_size.unwrap_or(self.config.default_font_size);
                run.font_weight = style.font_weight.unwrap_or(self.config.default_font_weight);
                run.font_family = style.font_family.unwrap_or_default();
                run.color = style.color;
                run.is_eol = true;
                run
            })
            .collect()
    }

    fn line_runs(&self, page_id: &str, source: &str) -> Vec<IntermediateText> {
        source
            .lines()
            .enumerate()
            .map(|(index, line)| {
                let mut run = IntermediateText::new(IntermediateText::run_id(page_id, index), line);
                run.font_size = self.config.default_font_size;
                run.font_weight = self.config.default_font_weight;
                run.is_eol = true;
                run
            })
            .collect()
    }
}

#[async_trait]
impl Codec for HtmlCodec {
    fn name(&self) -> &'static str {
        "html"
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Html
    }

    /// Any UTF-8 text without NUL bytes
    fn probe(&self, bytes: &[u8]) -> bool {
        !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
    }

    async fn encode(&self, bytes: &[u8]) -> DocumentResult<Option<Document>> {
        let source = String::from_utf8_lossy(bytes).into_owned();
        let id = Uuid::new_v4().to_string();
        let first_page = page_id(&id, 1);

        let (title, texts) = match self.parse(source.clone()).await {
            Some(parsed) => (
                parsed.title.clone().unwrap_or_default(),
                self.styled_runs(&first_page, &parsed),
            ),
            None => (String::new(), self.line_runs(&first_page, &source)),
        };

        tracing::debug!("Encoded HTML {} ({} runs)", id, texts.len());

        let page = IntermediatePage {
            id: first_page,
            number: 1,
            width: self.config.page_width,
            height: self.config.page_height,
            texts,
        };

        Ok(Some(Document::new(
            DocumentFormat::Html,
            IntermediateDocument::new(id, title, PageCache::from_pages(vec![page]), None),
        )))
    }

    async fn decode_to_html(&self, document: &IntermediateDocument) -> DocumentResult<String> {
        let pages = document.pages().await?;
        Ok(render_fragment(document.id(), &pages))
    }
}
