//! PDF format implementation
//!
//! This module provides the [`Codec`](crate::document::Codec) implementation
//! for PDF documents.
//!
//! # Architecture
//!
//! - [`PdfCodec`]: Opens documents, builds lazily decoded pages
//! - [`engine`]: The external engine surface the codec drives
//! - `outline`: Recursive outline destination resolution
//! - `MupdfEngine`: Engine adapter over MuPDF (`mupdf` feature)

mod codec;
pub mod engine;
#[cfg(feature = "mupdf")]
mod mupdf_engine;
mod outline;
#[cfg(test)]
pub(crate) mod testing;

pub use codec::{fingerprint, PdfCodec};
pub use engine::{PdfDocumentProxy, PdfEngine, PdfPageProxy};
#[cfg(feature = "mupdf")]
pub use mupdf_engine::MupdfEngine;
