//! Flow assembly
//!
//! Routes each archive item to the markup or image extractor and concatenates
//! the emitted blocks in item order.

use crate::epub::{ArchiveError, ItemKind, SourceItem};
use crate::html;
use crate::ocr::{extract_image_blocks, ImageOutcome, OcrService};

use super::types::{ContentBlock, FlowStats};

/// Ordered content produced from one EPUB
#[derive(Debug, Default)]
pub struct ContentFlow {
    blocks: Vec<ContentBlock>,
    stats: FlowStats,
}

impl ContentFlow {
    /// Whether any block was emitted
    pub fn found_content(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn stats(&self) -> FlowStats {
        self.stats
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }

    fn extend(&mut self, blocks: Vec<ContentBlock>) {
        for block in &blocks {
            match block {
                ContentBlock::Text { .. } => self.stats.text_blocks += 1,
                ContentBlock::Image { .. } => self.stats.image_blocks += 1,
                ContentBlock::Spacer { .. } => {}
            }
        }
        self.blocks.extend(blocks);
    }
}

/// Builds a [`ContentFlow`] from archive items
pub struct FlowAssembler<'a> {
    ocr: &'a OcrService,
}

impl<'a> FlowAssembler<'a> {
    pub fn new(ocr: &'a OcrService) -> Self {
        Self { ocr }
    }

    /// Consume items in order and collect their blocks
    ///
    /// Image failures are logged and skipped; an archive error ends assembly.
    pub async fn assemble<I>(&self, items: I) -> Result<ContentFlow, ArchiveError>
    where
        I: IntoIterator<Item = Result<SourceItem, ArchiveError>>,
    {
        let mut flow = ContentFlow::default();

        for item in items {
            let item = item?;
            flow.stats.items_scanned += 1;

            match item.kind {
                ItemKind::Document => {
                    flow.stats.documents += 1;
                    let blocks = html::extract_text_blocks(&item.data);
                    tracing::debug!(
                        path = %item.path,
                        blocks = blocks.len(),
                        "Extracted document text"
                    );
                    flow.extend(blocks);
                }
                ItemKind::Image => {
                    flow.stats.images += 1;
                    match extract_image_blocks(&item.data, self.ocr).await {
                        ImageOutcome::Extracted(blocks) => {
                            tracing::debug!(path = %item.path, "Extracted image");
                            flow.extend(blocks);
                        }
                        ImageOutcome::Skipped(reason) => {
                            flow.stats.images_skipped += 1;
                            tracing::warn!(
                                path = %item.path,
                                media_type = %item.media_type,
                                "Skipping image: {}",
                                reason
                            );
                        }
                    }
                }
                ItemKind::Other => {
                    flow.stats.other += 1;
                }
            }
        }

        Ok(flow)
    }
}
