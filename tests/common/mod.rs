//! Shared fixtures for the integration tests: on-disk case trees, in-process
//! pipelines and a recording notifier.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fixture_harness::{CaseSettingsTemplate, MutationPipeline, Notifier, PipelineError, Waves};
use tempfile::TempDir;

// ============================================================================
// CASE TREES
// ============================================================================

/// A temporary cases directory.
pub struct CaseTree {
    dir: TempDir,
}

impl CaseTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    pub fn dir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.path(relative)).unwrap();
        self
    }

    /// A `.ts` case with an empty settings file.
    pub fn case(&self, relative: &str, original: &str, expected: &str) -> &Self {
        self.file(&format!("{relative}/original.ts"), original)
            .file(&format!("{relative}/expected.ts"), expected)
            .file(&format!("{relative}/settings.json"), "{}")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }
}

pub fn ts_template() -> CaseSettingsTemplate {
    CaseSettingsTemplate::new("original.ts", "actual.ts", "expected.ts", "settings.json")
}

// ============================================================================
// PIPELINES
// ============================================================================

/// Replaces every occurrence of `from` with `to` in the target file.
pub struct ReplacePipeline {
    from: String,
    to: String,
    calls: AtomicUsize,
}

impl ReplacePipeline {
    pub fn new(from: &str, to: &str) -> Arc<Self> {
        Arc::new(Self {
            from: from.to_string(),
            to: to.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MutationPipeline for ReplacePipeline {
    async fn invoke(
        &self,
        target: &Path,
        _settings: &Path,
        _waves: Option<&Waves>,
    ) -> Result<(), PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let contents = tokio::fs::read_to_string(target).await?;
        tokio::fs::write(target, contents.replace(&self.from, &self.to)).await?;
        Ok(())
    }
}

/// One call seen by a [`RecordingPipeline`].
#[derive(Debug, Clone)]
pub struct Invocation {
    pub target: PathBuf,
    pub settings: PathBuf,
    pub waves: Option<Waves>,
    /// Target contents when the pipeline was called.
    pub contents: String,
}

/// Leaves the target untouched and records what it was given.
#[derive(Default)]
pub struct RecordingPipeline {
    invocations: Mutex<Vec<Invocation>>,
}

impl RecordingPipeline {
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl MutationPipeline for RecordingPipeline {
    async fn invoke(
        &self,
        target: &Path,
        settings: &Path,
        waves: Option<&Waves>,
    ) -> Result<(), PipelineError> {
        let contents = tokio::fs::read_to_string(target).await?;
        self.invocations.lock().unwrap().push(Invocation {
            target: target.to_path_buf(),
            settings: settings.to_path_buf(),
            waves: waves.cloned(),
            contents,
        });
        Ok(())
    }
}

/// Always fails with the given message.
pub struct FailingPipeline(pub &'static str);

#[async_trait]
impl MutationPipeline for FailingPipeline {
    async fn invoke(
        &self,
        _target: &Path,
        _settings: &Path,
        _waves: Option<&Waves>,
    ) -> Result<(), PipelineError> {
        Err(self.0.into())
    }
}

/// Panics instead of resolving.
pub struct PanickingPipeline;

#[async_trait]
impl MutationPipeline for PanickingPipeline {
    async fn invoke(
        &self,
        _target: &Path,
        _settings: &Path,
        _waves: Option<&Waves>,
    ) -> Result<(), PipelineError> {
        panic!("pipeline blew up");
    }
}

/// Overwrites the target with fixed contents.
pub struct WritePipeline(pub &'static str);

#[async_trait]
impl MutationPipeline for WritePipeline {
    async fn invoke(
        &self,
        target: &Path,
        _settings: &Path,
        _waves: Option<&Waves>,
    ) -> Result<(), PipelineError> {
        tokio::fs::write(target, self.0).await?;
        Ok(())
    }
}

// ============================================================================
// NOTIFIERS
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
