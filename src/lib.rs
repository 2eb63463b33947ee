//! Hamster document parser
//!
//! Turns PDF and HTML sources into one paginated intermediate model with
//! positioned, styled text runs and a navigable outline.
//!
//! # Modules
//!
//! - `document`: Format-agnostic model, the `Codec` trait and the page cache
//! - `formats`: PDF and HTML codecs
//! - `registry`: Ordered codec dispatch
//! - `config`: Codec defaults, optionally read from the environment
//!
//! ```no_run
//! use hamster_parser::{CodecRegistry, Config};
//!
//! # async fn run(bytes: &[u8]) -> Option<()> {
//! let registry = CodecRegistry::standard(&Config::from_env(), None);
//! let document = registry.dispatch(bytes).await?;
//! for page in document.pages().await.ok()? {
//!     println!("{}", page.pure_text());
//! }
//! # Some(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod formats;
pub mod registry;

pub use config::Config;
pub use document::{Codec, Document, DocumentError, DocumentFormat, DocumentResult};
pub use formats::{HtmlCodec, PdfCodec};
pub use registry::CodecRegistry;
