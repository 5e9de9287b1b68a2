//! Paragraph text extraction using lol_html for streaming HTML processing
//!
//! Collects the text of every `p`, `div` and `span` element. Text inside a
//! nested match belongs to every enclosing match as well, so a `div` wrapping
//! two paragraphs yields the div's combined text followed by each paragraph.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::EndTag;
use lol_html::{doc_text, element, rewrite_str, EndTagHandler, RewriteStrSettings};

use crate::flow::{ContentBlock, TEXT_SPACING};

/// Elements whose text becomes a paragraph
const TEXT_ELEMENTS: &str = "p, div, span";

/// Elements whose content is never rendered
const HIDDEN_ELEMENTS: &str = "script, style, template";

/// Decode markup as UTF-8, dropping invalid byte sequences
pub fn decode_markup(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Extract text blocks from a document item's raw markup
///
/// Each non-empty element becomes a text block followed by a spacer.
pub fn extract_text_blocks(markup: &[u8]) -> Vec<ContentBlock> {
    let html = decode_markup(markup);
    extract_paragraphs(&html)
        .into_iter()
        .flat_map(|text| [ContentBlock::text(text), ContentBlock::spacer(TEXT_SPACING)])
        .collect()
}

/// Element texts in start-tag order, trimmed, empty ones removed
///
/// Never fails: if the rewriter rejects the input, nothing is returned.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let collector = Rc::new(RefCell::new(Collector::default()));
    let on_element = Rc::clone(&collector);
    let on_hidden = Rc::clone(&collector);
    let on_text = Rc::clone(&collector);

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(TEXT_ELEMENTS, move |el| {
                    let slot = on_element.borrow_mut().open();

                    if el.is_self_closing() {
                        on_element.borrow_mut().close(slot);
                        return Ok(());
                    }

                    match el.end_tag_handlers() {
                        Some(handlers) => {
                            let state = Rc::clone(&on_element);
                            let handler: EndTagHandler<'static> =
                                Box::new(move |_end: &mut EndTag<'_>| {
                                    state.borrow_mut().close(slot);
                                    Ok(())
                                });
                            handlers.push(handler);
                        }
                        None => on_element.borrow_mut().close(slot),
                    }
                    Ok(())
                }),
                // Script, style and template text is not visible
                element!(HIDDEN_ELEMENTS, move |el| {
                    if el.is_self_closing() {
                        return Ok(());
                    }
                    if let Some(handlers) = el.end_tag_handlers() {
                        on_hidden.borrow_mut().hidden += 1;
                        let state = Rc::clone(&on_hidden);
                        let handler: EndTagHandler<'static> =
                            Box::new(move |_end: &mut EndTag<'_>| {
                                let mut state = state.borrow_mut();
                                state.hidden = state.hidden.saturating_sub(1);
                                Ok(())
                            });
                        handlers.push(handler);
                    }
                    Ok(())
                }),
            ],
            document_content_handlers: vec![doc_text!(move |chunk| {
                on_text.borrow_mut().push_text(chunk.as_str());
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    );

    if let Err(e) = result {
        tracing::debug!("HTML text extraction failed: {}", e);
        return Vec::new();
    }

    let collector = collector.take();
    collector
        .texts
        .iter()
        .map(|raw| html_escape::decode_html_entities(raw).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Text accumulated per matched element
///
/// `texts` is indexed by slot, allocated when the start tag is seen, so the
/// output keeps start-tag order even though elements finish inner-first.
/// Text is dropped while `hidden` is non-zero.
#[derive(Default)]
struct Collector {
    texts: Vec<String>,
    open: Vec<usize>,
    hidden: usize,
}

impl Collector {
    fn open(&mut self) -> usize {
        let slot = self.texts.len();
        self.texts.push(String::new());
        self.open.push(slot);
        slot
    }

    /// Close `slot` and anything opened after it that was left unclosed
    fn close(&mut self, slot: usize) {
        if let Some(pos) = self.open.iter().position(|&s| s == slot) {
            self.open.truncate(pos);
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() || self.hidden > 0 {
            return;
        }
        for &slot in &self.open {
            self.texts[slot].push_str(text);
        }
    }
}
