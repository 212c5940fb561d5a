//! Document type - source text with lazily derived chunks.

use std::sync::OnceLock;

use uuid::Uuid;

use crate::chunking::{chunk_chars, pack_words, ChunkMode};

/// Default target chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// A document to be turned into graph content.
///
/// Plain text is a single page; PDF input arrives as one page per PDF page.
/// Chunks are derived on first access and cached. The cache is a write-once
/// cell: it is either uncomputed or holds the final chunk list, which never
/// changes afterwards because the source text is immutable.
#[derive(Debug)]
pub struct Document {
    doc_id: String,
    pages: Vec<String>,
    chunk_size: usize,
    mode: ChunkMode,
    chunks: OnceLock<Vec<String>>,
}

impl Document {
    /// Create a plain-text document with a generated id and word chunking.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            doc_id: Uuid::new_v4().to_string(),
            pages: vec![text.into()],
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: ChunkMode::Words,
            chunks: OnceLock::new(),
        }
    }

    /// Create a document from extracted page text.
    ///
    /// Uses character-offset chunking per page, the mode used for PDF input.
    pub fn from_pages(pages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            doc_id: Uuid::new_v4().to_string(),
            pages: pages.into_iter().map(Into::into).collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: ChunkMode::Characters,
            chunks: OnceLock::new(),
        }
    }

    /// Use a caller-supplied document id.
    pub fn with_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = doc_id.into();
        self
    }

    /// Set the target chunk size in characters.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunks = OnceLock::new();
        self
    }

    /// Set the chunking mode.
    pub fn with_chunk_mode(mut self, mode: ChunkMode) -> Self {
        self.mode = mode;
        self.chunks = OnceLock::new();
        self
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_mode(&self) -> ChunkMode {
        self.mode
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Full text, pages joined by newlines.
    pub fn text(&self) -> String {
        self.pages.join("\n")
    }

    /// Ordered chunks, computed on first call.
    pub fn chunks(&self) -> &[String] {
        self.chunks.get_or_init(|| self.create_chunks())
    }

    /// Whether chunks have been derived yet.
    pub fn is_chunked(&self) -> bool {
        self.chunks.get().is_some()
    }

    fn create_chunks(&self) -> Vec<String> {
        match self.mode {
            // Pages share one word stream; page breaks are whitespace.
            ChunkMode::Words => pack_words(
                self.pages.iter().flat_map(|p| p.split_whitespace()),
                self.chunk_size,
            ),
            ChunkMode::Characters => self
                .pages
                .iter()
                .flat_map(|p| chunk_chars(p, self.chunk_size))
                .collect(),
        }
    }
}
