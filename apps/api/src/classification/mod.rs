// Request-path classification: choose the input text, then run inference.
// Extraction and inference are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod handlers;
pub mod inference;
pub mod selector;

pub use inference::classify;
pub use selector::{is_blank, select, ExtractedText, TextSource};
