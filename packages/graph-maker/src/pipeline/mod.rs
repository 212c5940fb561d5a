//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Prompt construction for the extraction oracle
//! - Fail-open oracle invocation and response parsing
//! - Validated merging of partial graphs
//! - Per-document chunk processing (sequential or bounded-concurrent)

pub mod accumulate;
pub mod extract;
pub mod maker;
pub mod prompts;

pub use accumulate::{Accumulator, LabelPolicy, MergeReport, RecordPolicy};
pub use extract::{parse_extraction_response, strip_code_blocks, OracleAdapter, OracleConfig};
pub use maker::{GraphMaker, GraphMakerConfig, ProcessReport};
pub use prompts::{extract_prompt_hash, format_extract_prompt, EXTRACT_PROMPT, SYSTEM_PROMPT};
