//! Observable results of a conversion run.
//!
//! A directory batch never aborts on a single bad file, so its result is a
//! per-file ledger rather than a single value: every enumerated file ends
//! in exactly one [`FileOutcome`], and [`BatchOutput`] carries the ledger
//! plus aggregate [`BatchStats`]. Callers that only want the produced
//! paths use [`BatchOutput::converted_paths`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Terminal state of one markdown file in a conversion run.
///
/// There are no intermediate states: a file goes straight from
/// unconverted to converted, skipped, or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The `.cook` file was produced at the given path.
    Converted { output: PathBuf },
    /// The output already existed and was left untouched.
    Skipped { output: PathBuf },
    /// Conversion failed; the error was logged and the batch continued.
    Failed { input: PathBuf, error: String },
}

impl FileOutcome {
    /// Path of the produced output, if this file converted.
    pub fn output_path(&self) -> Option<&Path> {
        match self {
            FileOutcome::Converted { output } => Some(output),
            _ => None,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FileOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Aggregate counters for a directory batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Files for which a new `.cook` output was written.
    pub converted: usize,
    /// Files whose output already existed.
    pub skipped: usize,
    /// Files whose conversion failed.
    pub failed: usize,
    /// Wall-clock duration of the whole batch in milliseconds.
    pub total_duration_ms: u64,
}

/// Result of converting a directory tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// One outcome per enumerated markdown file, in traversal order.
    pub outcomes: Vec<FileOutcome>,
    /// Aggregate counters.
    pub stats: BatchStats,
}

impl BatchOutput {
    /// Paths of the outputs produced by this run, in traversal order.
    ///
    /// Skipped and failed files are excluded, matching the contract that a
    /// batch returns only the files it actually wrote.
    pub fn converted_paths(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.output_path().map(Path::to_path_buf))
            .collect()
    }
}
