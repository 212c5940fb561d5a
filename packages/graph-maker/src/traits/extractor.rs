//! Text extraction from raw document bytes.
//!
//! PDF parsing is out of scope for this crate; a PDF extractor is plugged in
//! through [`TextExtractor`]. The bundled [`PlainTextExtractor`] handles text
//! files and the output of PDF-to-text tools, which mark page boundaries
//! with form feeds.

use crate::error::Result;
use crate::types::document::Document;

/// Page separator emitted by common PDF-to-text converters.
pub const PAGE_BREAK: char = '\x0c';

/// Turns raw bytes into page text.
pub trait TextExtractor: Send + Sync {
    /// Extract one string per page.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;

    /// Build a document from raw bytes.
    ///
    /// Multi-page input uses character chunking per page; single-page input
    /// is treated as plain text with word chunking.
    fn to_document(&self, bytes: &[u8]) -> Result<Document> {
        let mut pages = self.extract_pages(bytes)?;
        if pages.len() == 1 {
            Ok(Document::new(pages.remove(0)))
        } else {
            Ok(Document::from_pages(pages))
        }
    }
}

/// UTF-8 text extractor (lossy), splitting pages on form feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text = String::from_utf8_lossy(bytes);
        let mut pages: Vec<String> = text
            .split(PAGE_BREAK)
            .map(str::to_string)
            .collect();

        // A trailing form feed closes the last page rather than opening one.
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkMode;

    #[test]
    fn test_single_page_text_uses_word_chunking() {
        let doc = PlainTextExtractor.to_document(b"hello world").unwrap();
        assert_eq!(doc.chunk_mode(), ChunkMode::Words);
        assert_eq!(doc.chunks(), ["hello world"]);
    }

    #[test]
    fn test_form_feed_splits_pages() {
        let pages = PlainTextExtractor
            .extract_pages(b"page one\x0cpage two\x0c")
            .unwrap();
        assert_eq!(pages, vec!["page one", "page two"]);

        let doc = PlainTextExtractor.to_document(b"page one\x0cpage two").unwrap();
        assert_eq!(doc.chunk_mode(), ChunkMode::Characters);
        assert_eq!(doc.pages().len(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let pages = PlainTextExtractor.extract_pages(&[b'a', 0xff, b'b']).unwrap();
        assert_eq!(pages, vec!["a\u{fffd}b"]);
    }
}
