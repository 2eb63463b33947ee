//! HTML format implementation
//!
//! - [`HtmlCodec`]: Single-page documents from HTML source
//! - [`dom`]: DOM parsing capability and its lol_html implementation
//! - `style`: Inline style declarations
//! - `serialize`: Fragment output used by `decode_to_html`

mod codec;
pub mod dom;
mod serialize;
mod style;

pub use codec::HtmlCodec;
pub use dom::{ElementText, HtmlDomParser, LolHtmlDomParser, ParsedHtml};
pub use serialize::{render_fragment, DOCUMENT_CLASS, PAGE_CLASS};
pub use style::InlineStyle;
