//! Collaborators that feed the analyzer: label OCR and cellar sensors.
//!
//! Both are blocking capabilities injected by the host; the scanner runs them
//! off the async runtime with per-call timeouts.

mod scanner;

pub use scanner::{LabelScanner, ScanOutcome, ScanStatus, ScanTimeouts};

use anyhow::Result;

use crate::history::SensorSnapshot;

/// Extracts raw text from a label photograph.
pub trait TextExtractor: Send + Sync + 'static {
    /// `Ok(None)` when the image contains no text.
    fn extract_text(&self, image: &[u8]) -> Result<Option<String>>;
}

/// Reads the cellar sensors once.
pub trait SensorProbe: Send + Sync + 'static {
    fn read_snapshot(&self) -> Result<SensorSnapshot>;
}
