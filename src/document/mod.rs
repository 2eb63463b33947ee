//! Unified document abstraction
//!
//! This module provides the format-agnostic intermediate model every codec
//! produces, and the lazy page cache backing it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Document                           │
//! │   (id, title, outline, page getters, intermediate())    │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                      PageCache                          │
//! │   (page number → shared in-flight or finished decode)   │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!           ┌────────────────┼────────────────┐
//!           ▼                ▼                ▼
//!   ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//!   │  PdfCodec    │ │  HtmlCodec   │ │   Future     │
//!   │  page loader │ │  page loader │ │   formats    │
//!   └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use hamster_parser::document::Document;
//!
//! let doc: Document = registry.dispatch(&bytes).await.expect("unparseable");
//!
//! // Nothing is decoded until a page is requested
//! let getter = doc.get_page_by_page_number(1).unwrap();
//! let page = getter.load().await?;
//! println!("{}", page.pure_text());
//! ```

mod cache;
mod error;
mod intermediate;
mod traits;
mod types;

pub use cache::{PageCache, PageCacheStats, PageLoader};
pub use error::{DocumentError, DocumentResult, Result};
pub use intermediate::{Document, IntermediateDocument, PageGetter};
pub use traits::Codec;
pub use types::{
    page_id, parse_page_id, DocumentFormat, IntermediatePage, IntermediateText, OutlineDest,
    OutlineItem, TextDir, BOLD_FONT_WEIGHT, DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT,
};
