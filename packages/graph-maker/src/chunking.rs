//! Chunking - split document text into bounded segments for the oracle.
//!
//! Two modes exist. [`chunk_words`] packs whitespace-separated words and is
//! the default for plain text. [`chunk_chars`] cuts fixed character windows
//! and is used for page text coming out of a PDF extractor.

use serde::{Deserialize, Serialize};

/// How a document's text is cut into chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMode {
    /// Greedy word packing; never splits a word.
    #[default]
    Words,

    /// Fixed character windows, applied per page.
    Characters,
}

/// Split text into chunks of approximately `chunk_size` characters.
///
/// Each word costs its length plus one for the joining space. A word that
/// would push a non-empty chunk past `chunk_size` starts a new chunk, so the
/// bound is soft: a single oversized word is emitted on its own.
pub fn chunk_words(text: &str, chunk_size: usize) -> Vec<String> {
    pack_words(text.split_whitespace(), chunk_size)
}

/// Word packing over an arbitrary word stream (pages share one stream).
pub(crate) fn pack_words<'a>(
    words: impl IntoIterator<Item = &'a str>,
    chunk_size: usize,
) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0usize;

    for word in words {
        let word_size = word.chars().count() + 1;
        if current_size + word_size > chunk_size && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            current_size = 0;
        }
        current.push(word);
        current_size += word_size;
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

/// Split text into consecutive windows of `chunk_size` characters.
///
/// Counts Unicode scalar values, so multi-byte text is never cut inside a
/// character. A `chunk_size` of zero is treated as one.
pub fn chunk_chars(text: &str, chunk_size: usize) -> Vec<String> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut count = 0usize;

    for (offset, _) in text.char_indices() {
        if count == size {
            chunks.push(text[start..offset].to_string());
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(text[start..].to_string());
    }

    chunks
}
