//! System prompts for markdown-to-Cooklang conversion.
//!
//! Centralising the prompt text here serves two purposes:
//!
//! 1. **Single source of truth** — changing how recipes are converted
//!    (tightening a rule, adjusting the framing) requires editing exactly
//!    one place.
//!
//! 2. **Testability** — unit tests can build and inspect prompts directly
//!    without calling a real generation service.
//!
//! Callers can replace the bundled specification via
//! [`crate::config::ConversionConfigBuilder::spec_text`] or
//! [`crate::config::ConversionConfigBuilder::spec_path`]; [`COOKLANG_SPEC`]
//! is used only when no override is provided.

/// The bundled Cooklang format specification, embedded at compile time.
///
/// This text is included in every system prompt so the model always has the
/// full target format in front of it.
pub const COOKLANG_SPEC: &str = include_str!("../assets/cooklang-spec.md");

/// Build the system prompt for one conversion request.
///
/// The prompt embeds the format specification and, when given, appends the
/// caller's custom instructions verbatim. The markdown document itself is
/// sent as the user message, never mixed into the system prompt.
pub fn build_system_prompt(spec: &str, instructions: Option<&str>) -> String {
    let mut prompt = format!(
        "Convert the following markdown recipe to cooklang format according to this specification:\n\n\
         {spec}\n\n\
         Follow the specification exactly when converting the recipe."
    );

    if let Some(extra) = instructions {
        if !extra.is_empty() {
            prompt.push_str("\n\nAdditional instructions:\n");
            prompt.push_str(extra);
        }
    }

    prompt
}
