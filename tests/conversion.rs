//! Integration tests for the conversion pipeline and directory walker.
//!
//! Every test runs against a stub [`TextGenerator`] — no network access,
//! no credentials. The stubs cover the three behaviours the pipeline has
//! to be correct about: a deterministic success, a capturing observer for
//! prompt assertions, and an injected failure.

use async_trait::async_trait;
use md2cook::{
    convert_dir, convert_file, ConversionConfig, FileOutcome, GenerateError, Md2CookError,
    TextGenerator,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// The deterministic Cooklang the echo stub always produces.
const STUB_OUTPUT: &str = ">> servings: 2\n\nAdd @water{1%l} to the #pot and bring to a boil.\n";

// ── Stub generators ──────────────────────────────────────────────────────────

/// Returns [`STUB_OUTPUT`] for every document and counts calls.
#[derive(Default)]
struct EchoGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo-stub"
    }

    async fn generate(
        &self,
        _system_prompt: &str,
        _user_text: &str,
    ) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(STUB_OUTPUT.to_string())
    }
}

/// Records every (system_prompt, user_text) pair it receives.
#[derive(Default)]
struct CapturingGenerator {
    requests: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl TextGenerator for CapturingGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String, GenerateError> {
        self.requests
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_text.to_string()));
        Ok(STUB_OUTPUT.to_string())
    }
}

/// Fails for any document containing `FAIL`, succeeds otherwise.
struct FlakyGenerator;

#[async_trait]
impl TextGenerator for FlakyGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_text: &str,
    ) -> Result<String, GenerateError> {
        if user_text.contains("FAIL") {
            return Err(GenerateError::Api {
                status: 500,
                message: "injected failure".into(),
            });
        }
        Ok(STUB_OUTPUT.to_string())
    }
}

// ── Test helpers ─────────────────────────────────────────────────────────────

fn config_with(generator: Arc<dyn TextGenerator>) -> ConversionConfig {
    ConversionConfig::builder()
        .generator(generator)
        .build()
        .unwrap()
}

fn write_recipe(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

// ── Directory batches ────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_converts_every_markdown_file() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("mains");
    std::fs::create_dir(&nested).unwrap();

    write_recipe(dir.path(), "soup.md", "# Soup\n- water");
    write_recipe(dir.path(), "stew.md", "# Stew\n- beef");
    write_recipe(&nested, "pie.md", "# Pie\n- apples");

    let config = config_with(Arc::new(EchoGenerator::default()));
    let batch = convert_dir(dir.path(), &config).await.unwrap();

    let paths = batch.converted_paths();
    assert_eq!(paths.len(), 3);
    assert_eq!(batch.stats.converted, 3);
    assert_eq!(batch.stats.skipped, 0);
    assert_eq!(batch.stats.failed, 0);

    for path in &paths {
        assert_eq!(path.extension().unwrap(), "cook");
        assert_eq!(std::fs::read_to_string(path).unwrap(), STUB_OUTPUT);
    }
}

#[tokio::test]
async fn existing_output_is_skipped_and_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    write_recipe(dir.path(), "soup.md", "# Soup\n- water");
    write_recipe(dir.path(), "stew.md", "# Stew\n- beef");
    let handwritten = dir.path().join("soup.cook");
    std::fs::write(&handwritten, "handwritten cooklang").unwrap();

    let echo = Arc::new(EchoGenerator::default());
    let config = config_with(echo.clone());
    let batch = convert_dir(dir.path(), &config).await.unwrap();

    // The pre-existing output was not touched.
    assert_eq!(
        std::fs::read_to_string(&handwritten).unwrap(),
        "handwritten cooklang"
    );

    // It is excluded from the produced list and reported as skipped.
    let paths = batch.converted_paths();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("stew.cook"));
    assert_eq!(batch.stats.skipped, 1);
    assert!(batch.outcomes.iter().any(FileOutcome::is_skipped));

    // Only the non-skipped file cost a service call.
    assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_failure_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_recipe(dir.path(), "good-one.md", "# Soup\n- water");
    write_recipe(dir.path(), "bad.md", "# FAIL\n- nothing");
    write_recipe(dir.path(), "good-two.md", "# Stew\n- beef");

    let config = config_with(Arc::new(FlakyGenerator));
    let batch = convert_dir(dir.path(), &config).await.unwrap();

    assert_eq!(batch.stats.converted, 2);
    assert_eq!(batch.stats.failed, 1);
    assert_eq!(batch.converted_paths().len(), 2);

    assert!(dir.path().join("good-one.cook").exists());
    assert!(dir.path().join("good-two.cook").exists());
    assert!(!dir.path().join("bad.cook").exists());

    let failed = batch
        .outcomes
        .iter()
        .find(|o| o.is_failed())
        .expect("one outcome must be a failure");
    match failed {
        FileOutcome::Failed { input, error } => {
            assert!(input.ends_with("bad.md"));
            assert!(error.contains("injected failure"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn non_recursive_ignores_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("drafts");
    std::fs::create_dir(&nested).unwrap();
    write_recipe(dir.path(), "soup.md", "# Soup");
    write_recipe(&nested, "draft.md", "# Draft");

    let config = ConversionConfig::builder()
        .generator(Arc::new(EchoGenerator::default()))
        .recursive(false)
        .build()
        .unwrap();
    let batch = convert_dir(dir.path(), &config).await.unwrap();

    assert_eq!(batch.stats.converted, 1);
    assert!(dir.path().join("soup.cook").exists());
    assert!(!nested.join("draft.cook").exists());
}

// ── Single files ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn stub_output_is_written_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_recipe(dir.path(), "soup.md", "# Soup\n- water");

    let config = config_with(Arc::new(EchoGenerator::default()));
    let outcome = convert_file(&input, &config).await.unwrap();

    let output = outcome.output_path().expect("file must convert");
    assert_eq!(std::fs::read_to_string(output).unwrap(), STUB_OUTPUT);
}

#[tokio::test]
async fn reconverting_a_file_skips_it() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_recipe(dir.path(), "soup.md", "# Soup\n- water");

    let echo = Arc::new(EchoGenerator::default());
    let config = config_with(echo.clone());

    let first = convert_file(&input, &config).await.unwrap();
    assert!(first.is_converted());

    let second = convert_file(&input, &config).await.unwrap();
    assert!(second.is_skipped());
    assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn instructions_reach_the_system_prompt_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_recipe(dir.path(), "soup.md", "# Soup\n- water");

    let capturing = Arc::new(CapturingGenerator::default());
    let config = ConversionConfig::builder()
        .generator(capturing.clone())
        .instructions("convert to English")
        .build()
        .unwrap();

    convert_file(&input, &config).await.unwrap();

    let requests = capturing.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (system_prompt, user_text) = &requests[0];
    assert!(
        system_prompt.contains("Additional instructions:\nconvert to English"),
        "instructions missing from system prompt:\n{system_prompt}"
    );
    assert_eq!(user_text, "# Soup\n- water");
}

#[tokio::test]
async fn spec_override_replaces_the_bundled_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_recipe(dir.path(), "soup.md", "# Soup\n- water");

    let capturing = Arc::new(CapturingGenerator::default());
    let config = ConversionConfig::builder()
        .generator(capturing.clone())
        .spec_text("MY CUSTOM SPEC BODY")
        .build()
        .unwrap();

    convert_file(&input, &config).await.unwrap();

    let requests = capturing.requests.lock().unwrap();
    assert!(requests[0].0.contains("MY CUSTOM SPEC BODY"));
}

// ── Usage errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_markdown_file_fails_before_any_service_call() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_recipe(dir.path(), "notes.txt", "not a recipe");

    let echo = Arc::new(EchoGenerator::default());
    let config = config_with(echo.clone());

    let err = convert_file(&input, &config).await.unwrap_err();
    assert!(matches!(err, Md2CookError::NotMarkdown { .. }));
    assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_input_is_a_usage_error() {
    let config = config_with(Arc::new(EchoGenerator::default()));

    let err = convert_file("/nonexistent/soup.md", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Md2CookError::InputNotFound { .. }));

    let err = convert_dir("/nonexistent/recipes", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Md2CookError::InputNotFound { .. }));
}

#[tokio::test]
async fn single_file_service_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_recipe(dir.path(), "bad.md", "# FAIL");

    let config = config_with(Arc::new(FlakyGenerator));
    let err = convert_file(&input, &config).await.unwrap_err();
    assert!(matches!(err, Md2CookError::GenerationFailed(_)));
    assert!(!dir.path().join("bad.cook").exists());
}
