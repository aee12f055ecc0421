//! Conversion entry points: one document, one file, or a directory tree.
//!
//! The pipeline is deliberately thin. For each document it builds a system
//! prompt from the Cooklang specification plus optional instructions, sends
//! the markdown as the user message through the injected
//! [`TextGenerator`], and writes the response verbatim to a sibling
//! `.cook` file. There is no retry, no post-processing, and no validation
//! of the generated Cooklang — the service's answer is the result.
//!
//! Files are processed strictly sequentially: a directory batch finishes
//! one service call before starting the next.

use crate::config::ConversionConfig;
use crate::error::Md2CookError;
use crate::generator::{OpenAiConfig, OpenAiGenerator, TextGenerator};
use crate::output::{BatchOutput, BatchStats, FileOutcome};
use crate::prompts::{build_system_prompt, COOKLANG_SPEC};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Convert one markdown document, in memory, to Cooklang.
///
/// This is the library-level primitive behind the file entry points; use
/// it when recipe text comes from somewhere other than the filesystem.
///
/// # Errors
/// [`Md2CookError::ApiKeyMissing`] when no generator is injected and no
/// credential can be resolved; [`Md2CookError::GenerationFailed`] when the
/// service call fails.
pub async fn convert_text(
    markdown: &str,
    config: &ConversionConfig,
) -> Result<String, Md2CookError> {
    let generator = resolve_generator(config)?;
    convert_text_with(generator.as_ref(), markdown, config).await
}

/// Convert a single markdown file to a sibling `.cook` file.
///
/// The output path is the input path with its extension swapped to
/// `.cook`. An output that already exists is never overwritten: the file
/// is reported as [`FileOutcome::Skipped`] and no service call is made.
///
/// # Errors
/// Usage errors ([`Md2CookError::InputNotFound`],
/// [`Md2CookError::NotMarkdown`]) are raised before any service call.
/// A service failure propagates as [`Md2CookError::GenerationFailed`].
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<FileOutcome, Md2CookError> {
    let generator = resolve_generator(config)?;
    convert_file_with(generator.as_ref(), path.as_ref(), config).await
}

/// Convert every markdown file under `root` to Cooklang.
///
/// Enumerates `*.md` files (recursively unless
/// [`ConversionConfig::recursive`] is off), in sorted order, and converts
/// each one in turn. A file whose conversion fails is logged and recorded
/// as [`FileOutcome::Failed`]; the batch carries on with the next file.
///
/// # Errors
/// Only fatal setup errors are returned: a root that is not a directory,
/// or no resolvable credential. Per-file failures live in the returned
/// [`BatchOutput`].
pub async fn convert_dir(
    root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchOutput, Md2CookError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Md2CookError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    let generator = resolve_generator(config)?;
    let files = collect_markdown_files(root, config.recursive);
    let total = files.len();
    info!("Found {} markdown files under {}", total, root.display());

    if let Some(ref cb) = config.progress {
        cb.on_batch_start(total);
    }

    let start = Instant::now();
    let mut outcomes = Vec::with_capacity(total);
    let mut stats = BatchStats::default();

    for (i, file) in files.iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = config.progress {
            cb.on_file_start(index, total, file);
        }

        match convert_file_with(generator.as_ref(), file, config).await {
            Ok(outcome @ FileOutcome::Converted { .. }) => {
                stats.converted += 1;
                if let (Some(cb), Some(output)) = (config.progress.as_ref(), outcome.output_path())
                {
                    let bytes = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
                    cb.on_file_converted(index, total, output, bytes as usize);
                }
                outcomes.push(outcome);
            }
            Ok(outcome @ FileOutcome::Skipped { .. }) => {
                stats.skipped += 1;
                if let (Some(cb), FileOutcome::Skipped { output }) =
                    (config.progress.as_ref(), &outcome)
                {
                    cb.on_file_skipped(index, total, output);
                }
                outcomes.push(outcome);
            }
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                warn!("Failed to convert {}: {}", file.display(), e);
                stats.failed += 1;
                if let Some(ref cb) = config.progress {
                    cb.on_file_error(index, total, file, &e.to_string());
                }
                outcomes.push(FileOutcome::Failed {
                    input: file.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress {
        cb.on_batch_complete(total, stats.converted);
    }
    info!(
        "Batch complete: {} converted, {} skipped, {} failed in {}ms",
        stats.converted, stats.skipped, stats.failed, stats.total_duration_ms
    );

    Ok(BatchOutput { outcomes, stats })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the generator, from most-specific to least-specific.
///
/// 1. **Pre-built generator** (`config.generator`) — the caller constructed
///    it entirely; used as-is. This is the seam tests and alternative
///    providers plug into.
/// 2. **Credential** — `config.api_key`, falling back to the
///    `OPENAI_API_KEY` environment variable, builds the default
///    [`OpenAiGenerator`] with the config's model, temperature, and
///    endpoint settings.
fn resolve_generator(config: &ConversionConfig) -> Result<Arc<dyn TextGenerator>, Md2CookError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
        .ok_or(Md2CookError::ApiKeyMissing)?;

    let mut oa_config = OpenAiConfig::new(api_key);
    oa_config.model = config.model.clone();
    oa_config.temperature = config.temperature;
    oa_config.max_tokens = config.max_tokens;
    oa_config.timeout_secs = config.api_timeout_secs;
    if let Some(ref base) = config.base_url {
        oa_config.base_url = base.clone();
    }

    Ok(Arc::new(OpenAiGenerator::new(oa_config)?))
}

async fn convert_text_with(
    generator: &dyn TextGenerator,
    markdown: &str,
    config: &ConversionConfig,
) -> Result<String, Md2CookError> {
    let spec = config.spec_text.as_deref().unwrap_or(COOKLANG_SPEC);
    let system_prompt = build_system_prompt(spec, config.instructions.as_deref());

    debug!(
        generator = generator.name(),
        document_bytes = markdown.len(),
        "converting document"
    );

    let cooklang = generator.generate(&system_prompt, markdown).await?;
    Ok(cooklang)
}

async fn convert_file_with(
    generator: &dyn TextGenerator,
    path: &Path,
    config: &ConversionConfig,
) -> Result<FileOutcome, Md2CookError> {
    if !path.exists() {
        return Err(Md2CookError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.extension().and_then(|e| e.to_str()) != Some("md") {
        return Err(Md2CookError::NotMarkdown {
            path: path.to_path_buf(),
        });
    }

    let output = output_path_for(path);
    if output.exists() {
        info!(
            "Skipping {} — {} already exists",
            path.display(),
            output.display()
        );
        return Ok(FileOutcome::Skipped { output });
    }

    let markdown =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Md2CookError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

    let cooklang = convert_text_with(generator, &markdown, config).await?;
    write_atomic(&output, &cooklang).await?;

    info!("Converted {} -> {}", path.display(), output.display());
    Ok(FileOutcome::Converted { output })
}

/// Derive the output path by swapping the extension to `.cook`.
fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("cook")
}

/// Enumerate `*.md` files under `root`, sorted for deterministic order.
fn collect_markdown_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect()
}

/// Write `content` atomically: temp file in the same directory, then rename.
async fn write_atomic(path: &Path, content: &str) -> Result<(), Md2CookError> {
    let tmp = path.with_extension("cook.tmp");

    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| Md2CookError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| Md2CookError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
