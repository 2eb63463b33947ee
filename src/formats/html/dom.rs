//! DOM parsing capability
//!
//! The HTML codec only needs a handful of things from a DOM: the document
//! title, and the body text split into runs, each tagged with the element
//! (tag and inline style) that directly contains it. [`HtmlDomParser`] is that
//! capability; a codec built without one falls back to line splitting.
//!
//! [`LolHtmlDomParser`] implements it with lol_html's streaming rewriter. An
//! element stack is maintained from start/end tags; text chunks belong to the
//! innermost open element. Runs follow text order: consecutive chunks owned by
//! the same element share a run, and a change of owner starts a new one, so
//! `<p>a <b>b</b> c</p>` yields `a`, `b`, `c`. Elements whose end tag is
//! implied (`<p>a<p>b`) stay open until an ancestor closes, which still
//! attributes each text chunk to the nearest preceding element.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::{Element, EndTag};
use lol_html::{doc_text, element, rewrite_str, HandlerResult, RewriteStrSettings};

use crate::document::{DocumentError, DocumentResult};

/// Tags whose content is never rendered as text
const OPAQUE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// One stretch of text and the element directly containing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementText {
    /// Lowercase tag name
    pub tag: String,
    /// Raw `style` attribute
    pub style: Option<String>,
    /// Text content, entity-decoded and trimmed
    pub text: String,
}

/// Result of parsing one HTML string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHtml {
    /// `<title>` text, if any
    pub title: Option<String>,
    /// Non-empty text runs, in reading order
    pub elements: Vec<ElementText>,
}

/// Parses HTML into the element view the codec consumes
pub trait HtmlDomParser: Send + Sync {
    fn parse(&self, html: &str) -> DocumentResult<ParsedHtml>;
}

/// [`HtmlDomParser`] backed by lol_html
#[derive(Debug, Default, Clone, Copy)]
pub struct LolHtmlDomParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Text is owned by `owners[index]`
    Content(usize),
    Title,
    /// Text ignored (head, script, ...)
    Opaque,
}

struct Owner {
    tag: String,
    style: Option<String>,
}

#[derive(Default)]
struct WalkState {
    /// Open elements; the root frame stands for `<body>`
    stack: Vec<FrameKind>,
    /// Every content element in start-tag order
    owners: Vec<Owner>,
    /// Raw text runs as `(owner, text)`
    runs: Vec<(usize, String)>,
    title: Option<String>,
}

impl WalkState {
    fn new() -> Self {
        let mut state = WalkState::default();
        state.stack.push(FrameKind::Content(0));
        state.owners.push(Owner {
            tag: "body".to_string(),
            style: None,
        });
        state
    }

    fn push_text(&mut self, owner: usize, text: &str) {
        match self.runs.last_mut() {
            Some((last, run)) if *last == owner => run.push_str(text),
            _ => self.runs.push((owner, text.to_string())),
        }
    }
}

impl HtmlDomParser for LolHtmlDomParser {
    fn parse(&self, html: &str) -> DocumentResult<ParsedHtml> {
        let state = Rc::new(RefCell::new(WalkState::new()));

        let on_element = state.clone();
        let on_text = state.clone();

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", move |el: &mut Element<'_, '_>| {
                    let tag = el.tag_name().to_ascii_lowercase();
                    let style = el.get_attribute("style");

                    let Some(end_tag_handlers) = el.end_tag_handlers() else {
                        // Void element, nothing to collect
                        return Ok(());
                    };

                    let mut walk = on_element.borrow_mut();
                    let depth = walk.stack.len();

                    match tag.as_str() {
                        // Transparent wrappers
                        "html" => return Ok(()),
                        "body" => {
                            if let Some(root) = walk.owners.first_mut() {
                                root.style = style;
                            }
                            return Ok(());
                        }
                        "title" => walk.stack.push(FrameKind::Title),
                        t if OPAQUE_TAGS.contains(&t) => walk.stack.push(FrameKind::Opaque),
                        _ => {
                            let owner = walk.owners.len();
                            walk.owners.push(Owner {
                                tag: tag.clone(),
                                style,
                            });
                            walk.stack.push(FrameKind::Content(owner));
                        }
                    }
                    drop(walk);

                    let on_end = on_element.clone();
                    end_tag_handlers.push(Box::new(move |_end: &mut EndTag<'_>| -> HandlerResult {
                        on_end.borrow_mut().stack.truncate(depth);
                        Ok(())
                    }));
                    Ok(())
                })],
                document_content_handlers: vec![doc_text!(move |chunk| {
                    let mut walk = on_text.borrow_mut();
                    match walk.stack.last().copied() {
                        Some(FrameKind::Title) => walk
                            .title
                            .get_or_insert_with(String::new)
                            .push_str(chunk.as_str()),
                        Some(FrameKind::Content(owner)) => {
                            if !walk.stack.contains(&FrameKind::Opaque) {
                                walk.push_text(owner, chunk.as_str());
                            }
                        }
                        Some(FrameKind::Opaque) | None => {}
                    }
                    Ok(())
                })],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| DocumentError::Html(e.to_string()))?;

        let walk = state.replace(WalkState::default());
        let owners = walk.owners;

        let elements = walk
            .runs
            .into_iter()
            .filter_map(|(owner, raw)| {
                let text = html_escape::decode_html_entities(raw.trim()).into_owned();
                if text.is_empty() {
                    return None;
                }
                let owner = owners.get(owner)?;
                Some(ElementText {
                    tag: owner.tag.clone(),
                    style: owner.style.clone(),
                    text,
                })
            })
            .collect();

        let title = walk
            .title
            .map(|t| html_escape::decode_html_entities(t.trim()).into_owned())
            .filter(|t| !t.is_empty());

        Ok(ParsedHtml { title, elements })
    }
}
