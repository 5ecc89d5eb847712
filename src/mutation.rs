//! The mutation pipeline seam.
//!
//! The harness never mutates files itself. It hands the path of the actual
//! file and the case's settings file to a [`MutationPipeline`], which rewrites
//! the target in place zero or more times and then resolves or fails.

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tokio::process::Command;

use crate::diagnostics::PipelineError;
use crate::settings::Waves;

static ARGUMENT_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(target|settings|waves)\}").expect("argument placeholder regex is valid")
});

#[async_trait]
pub trait MutationPipeline: Send + Sync {
    /// Mutates `target` in place according to `settings`.
    async fn invoke(
        &self,
        target: &Path,
        settings: &Path,
        waves: Option<&Waves>,
    ) -> Result<(), PipelineError>;
}

/// Runs an external program as the mutation pipeline.
///
/// Arguments may reference `{target}`, `{settings}` and `{waves}` (JSON).
/// Without a `{target}` placeholder, the target and settings paths are
/// appended as the final two arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPipeline {
    program: String,
    args: Vec<String>,
}

impl CommandPipeline {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits `argv` into program and arguments. `None` when `argv` is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self, target: &Path, settings: &Path, waves: Option<&Waves>) -> Vec<String> {
        let target = target.display().to_string();
        let settings = settings.display().to_string();
        let waves = waves.map(|w| w.to_string()).unwrap_or_default();

        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                ARGUMENT_PLACEHOLDER
                    .replace_all(arg, |caps: &Captures<'_>| match &caps[1] {
                        "target" => target.clone(),
                        "settings" => settings.clone(),
                        _ => waves.clone(),
                    })
                    .into_owned()
            })
            .collect();

        if !self.args.iter().any(|arg| arg.contains("{target}")) {
            args.push(target);
            args.push(settings);
        }
        args
    }
}

#[async_trait]
impl MutationPipeline for CommandPipeline {
    async fn invoke(
        &self,
        target: &Path,
        settings: &Path,
        waves: Option<&Waves>,
    ) -> Result<(), PipelineError> {
        let args = self.arguments(target, settings, waves);
        tracing::debug!(program = %self.program, ?args, "running mutation command");

        let output = Command::new(&self.program).args(&args).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )
            .into());
        }
        Ok(())
    }
}
