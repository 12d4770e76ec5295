pub mod discover;
pub mod error;
pub mod index;
pub mod mapper;
pub mod pipeline;
pub mod query;
pub mod tokenizer;

use std::collections::HashMap;

/// Documents are identified by their file-system path as a string.
pub type DocId = String;

/// Term -> occurrences within one document.
pub type TermCounts = HashMap<String, u64>;

pub use error::{IndexError, Result};
pub use index::{ScoredDocument, SearchEngine};
pub use mapper::{map_document, DocumentCounts};
pub use pipeline::{build_index, build_index_with, IndexReport, PipelineConfig, SkippedDocument};
pub use query::{run_queries, OutputFormat};
