//! # md2cook
//!
//! Convert markdown-formatted recipes to [Cooklang](https://cooklang.org)
//! using an LLM chat-completion service.
//!
//! ## Why this crate?
//!
//! Recipes collected as markdown carry their structure implicitly — the
//! ingredient list and the steps are related only in a reader's head.
//! Cooklang makes that structure explicit and machine-readable, but the
//! translation is a judgement call (which words in a step are ingredients?
//! what quantity applies?). Rather than hand-writing a heuristic parser,
//! this crate sends the markdown plus the Cooklang specification to a
//! language model and writes back whatever it produces.
//!
//! ## Pipeline Overview
//!
//! ```text
//! recipe.md
//!  │
//!  ├─ 1. Prompt    Cooklang spec + optional instructions → system message
//!  ├─ 2. Generate  one chat-completion call per document (no retry)
//!  └─ 3. Output    response written verbatim to recipe.cook
//! ```
//!
//! Directory mode walks a tree, converts each `*.md` sequentially, skips
//! files whose `.cook` sibling already exists, and records (never raises
//! on) per-file failures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2cook::{convert_dir, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential from OPENAI_API_KEY
//!     let config = ConversionConfig::default();
//!     let batch = convert_dir("recipes/", &config).await?;
//!     for path in batch.converted_paths() {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Bring your own backend
//!
//! Everything upstream of the service call is injectable: implement
//! [`TextGenerator`] and pass it via
//! [`ConversionConfigBuilder::generator`](config::ConversionConfigBuilder::generator)
//! to run against any provider, a local model, or a test stub.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2cook` binary (clap + anyhow + indicatif + dotenvy) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2cook = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod generator;
pub mod output;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_dir, convert_file, convert_text};
pub use error::{GenerateError, Md2CookError};
pub use generator::{OpenAiConfig, OpenAiGenerator, TextGenerator};
pub use output::{BatchOutput, BatchStats, FileOutcome};
pub use progress::{BatchProgress, NoopProgress, ProgressHandle};
pub use prompts::{build_system_prompt, COOKLANG_SPEC};
