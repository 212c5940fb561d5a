//! Core trait abstractions.

pub mod extractor;
pub mod oracle;
pub mod sink;
