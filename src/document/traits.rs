//! Codec trait
//!
//! Format-agnostic interface every source format implements.

use async_trait::async_trait;

use super::error::{DocumentError, Result};
use super::intermediate::{Document, IntermediateDocument};
use super::types::DocumentFormat;

/// Converts source bytes of one format into the intermediate model
///
/// Codecs are held by a [`CodecRegistry`](crate::registry::CodecRegistry) and
/// tried in registration order.
#[async_trait]
pub trait Codec: Send + Sync {
    /// Short codec name, used in logs
    fn name(&self) -> &'static str;

    /// Source format produced by this codec
    fn format(&self) -> DocumentFormat;

    /// Cheap acceptance check run before `encode`
    fn probe(&self, bytes: &[u8]) -> bool;

    /// Decode source bytes into a document
    ///
    /// `Ok(None)` means the codec declines the input.
    async fn encode(&self, bytes: &[u8]) -> Result<Option<Document>>;

    /// Serialize a document back into an HTML fragment
    async fn decode_to_html(&self, _document: &IntermediateDocument) -> Result<String> {
        Err(DocumentError::Unsupported(format!(
            "{} codec cannot serialize to HTML",
            self.name()
        )))
    }
}
