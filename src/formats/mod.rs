//! Format-specific codecs
//!
//! Each format module provides a [`Codec`](crate::document::Codec)
//! implementation that turns source bytes into the intermediate model:
//!
//! - [`pdf`]: Driven by an external [`PdfEngine`](pdf::PdfEngine)
//! - [`html`]: lol_html DOM walk with a line-splitting fallback

pub mod html;
pub mod pdf;

pub use html::HtmlCodec;
pub use pdf::PdfCodec;
