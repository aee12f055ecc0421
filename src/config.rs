//! Configuration types for markdown-to-Cooklang conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`],
//! built via its [`ConversionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share a config between the CLI and library
//! callers and to see in one place why two runs differ.

use crate::error::Md2CookError;
use crate::generator::TextGenerator;
use crate::progress::ProgressHandle;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2cook::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.2)
///     .instructions("convert to English")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Model identifier sent to the generation service. Default: `gpt-4o-mini`.
    pub model: String,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to the source recipe —
    /// conversion is transcription, not creative writing.
    pub temperature: f32,

    /// Optional cap on generated tokens. Default: `None` (service default).
    pub max_tokens: Option<u32>,

    /// Replacement for the bundled Cooklang specification text.
    /// `None` uses [`crate::prompts::COOKLANG_SPEC`].
    pub spec_text: Option<String>,

    /// Free-text instructions appended verbatim to the system prompt.
    pub instructions: Option<String>,

    /// Descend into subdirectories when converting a directory. Default: true.
    pub recursive: bool,

    /// API credential. `None` falls back to the `OPENAI_API_KEY`
    /// environment variable when the default generator is constructed.
    pub api_key: Option<String>,

    /// Endpoint base for the default generator. `None` uses the OpenAI API.
    pub base_url: Option<String>,

    /// Per-request HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Pre-constructed generator. Takes precedence over `api_key`/`base_url`
    /// and every sampling field above.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Progress callback fired during directory batches.
    pub progress: Option<ProgressHandle>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_owned(),
            temperature: 0.2,
            max_tokens: None,
            spec_text: None,
            instructions: None,
            recursive: true,
            api_key: None,
            base_url: None,
            api_timeout_secs: 60,
            generator: None,
            progress: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("spec_text", &self.spec_text.as_ref().map(|s| s.len()))
            .field("instructions", &self.instructions)
            .field("recursive", &self.recursive)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            spec_path: None,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    spec_path: Option<std::path::PathBuf>,
}

impl ConversionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    /// Replace the bundled Cooklang specification with the given text.
    pub fn spec_text(mut self, spec: impl Into<String>) -> Self {
        self.config.spec_text = Some(spec.into());
        self
    }

    /// Read the Cooklang specification from a file at build time.
    ///
    /// A missing or unreadable file fails [`build`](Self::build) fast with
    /// [`Md2CookError::SpecNotFound`] rather than on the first conversion.
    pub fn spec_path(mut self, path: impl AsRef<Path>) -> Self {
        self.spec_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn instructions(mut self, text: impl Into<String>) -> Self {
        self.config.instructions = Some(text.into());
        self
    }

    pub fn recursive(mut self, v: bool) -> Self {
        self.config.recursive = v;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn progress(mut self, progress: ProgressHandle) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ConversionConfig, Md2CookError> {
        if self.config.model.is_empty() {
            return Err(Md2CookError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }

        if let Some(path) = self.spec_path.take() {
            let spec = std::fs::read_to_string(&path)
                .map_err(|_| Md2CookError::SpecNotFound { path })?;
            self.config.spec_text = Some(spec);
        }

        Ok(self.config)
    }
}
