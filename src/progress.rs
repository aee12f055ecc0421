//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgress>`] via
//! [`crate::config::ConversionConfigBuilder::progress`] to receive an event
//! as each file in a directory batch is started, converted, skipped, or
//! fails. The callback approach keeps the library ignorant of how the host
//! application communicates: the CLI forwards events to a terminal progress
//! bar, but a server could just as well forward them to a channel or a
//! database record.
//!
//! All methods have default no-op implementations so callers only override
//! what they care about.

use std::path::Path;
use std::sync::Arc;

/// Called by the directory walker as it processes each file.
///
/// Files are processed strictly one at a time, so events for a given batch
/// arrive in order; the trait is still `Send + Sync` so one handle can be
/// shared between the batch and the caller's own threads.
pub trait BatchProgress: Send + Sync {
    /// Called once before the first file, with the number of markdown files
    /// the walk enumerated.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file's conversion request is built.
    /// `index` is 1-based.
    fn on_file_start(&self, index: usize, total_files: usize, input: &Path) {
        let _ = (index, total_files, input);
    }

    /// Called when a file's `.cook` output has been written.
    fn on_file_converted(&self, index: usize, total_files: usize, output: &Path, bytes: usize) {
        let _ = (index, total_files, output, bytes);
    }

    /// Called when a file is skipped because its output already exists.
    fn on_file_skipped(&self, index: usize, total_files: usize, output: &Path) {
        let _ = (index, total_files, output);
    }

    /// Called when a file's conversion fails. The batch continues.
    fn on_file_error(&self, index: usize, total_files: usize, input: &Path, error: &str) {
        let _ = (index, total_files, input, error);
    }

    /// Called once after the last file.
    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        let _ = (total_files, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl BatchProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressHandle = Arc<dyn BatchProgress>;
