//! Case settings: the caller's template and its per-directory resolution.
//!
//! A [`CaseSettingsTemplate`] says how to find the fixture files inside any
//! case directory. [`resolve`] turns it into concrete paths for one directory.
//! Resolution happens when a case runs, never at discovery time, and the
//! result is not cached: accept mode rewrites the expected file on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::diagnostics::{HarnessError, Result};
use crate::pattern::{FileGlob, IncludeFilter};

/// Opaque wave configuration handed to the mutation pipeline untouched.
pub type Waves = serde_json::Value;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(name|stem|ext)\}").expect("placeholder regex is valid"));

// =============================================================================
// FILE NAMES
// =============================================================================

/// Name of an actual or expected file within a case directory.
///
/// A derived name is computed from the discovered original file's name, so one
/// template can cover cases whose output extension depends on the input's.
/// Derivations must be pure.
#[derive(Clone)]
pub enum FileName {
    Fixed(String),
    Derived(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl FileName {
    pub fn fixed(name: impl Into<String>) -> Self {
        FileName::Fixed(name.into())
    }

    pub fn derived<F>(derive: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        FileName::Derived(Arc::new(derive))
    }

    /// Builds a name from text with `{name}`, `{stem}` and `{ext}` placeholders.
    /// Text without placeholders is a fixed name.
    pub fn from_template(template: &str) -> Self {
        if !PLACEHOLDER.is_match(template) {
            return FileName::Fixed(template.to_string());
        }
        let template = template.to_string();
        FileName::derived(move |original| expand_placeholders(&template, original))
    }

    /// Computes the file name for a case whose original file is `original_name`.
    pub fn resolve(&self, original_name: &str) -> String {
        match self {
            FileName::Fixed(name) => name.clone(),
            FileName::Derived(derive) => derive(original_name),
        }
    }
}

impl fmt::Debug for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileName::Fixed(name) => f.debug_tuple("Fixed").field(name).finish(),
            FileName::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for FileName {
    fn from(name: &str) -> Self {
        FileName::Fixed(name.to_string())
    }
}

impl From<String> for FileName {
    fn from(name: String) -> Self {
        FileName::Fixed(name)
    }
}

fn expand_placeholders(template: &str, original: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "name" => original.to_string(),
            "stem" => stem.clone(),
            _ => ext.clone(),
        })
        .into_owned()
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// How to locate fixture files in every case directory, plus the run policies
/// shared by all cases.
#[derive(Debug, Clone)]
pub struct CaseSettingsTemplate {
    /// Indicator: exact file name or glob of the original file.
    pub original: String,
    pub actual: FileName,
    pub expected: FileName,
    pub settings: String,
    /// Overwrite expected files with actual output instead of comparing.
    pub accept: bool,
    /// Replacement for every `\r\n` or `\n` in the actual output.
    pub normalize_endlines: Option<String>,
    pub includes: IncludeFilter,
    pub waves: Option<Waves>,
}

impl CaseSettingsTemplate {
    pub fn new(
        original: impl Into<String>,
        actual: impl Into<FileName>,
        expected: impl Into<FileName>,
        settings: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            actual: actual.into(),
            expected: expected.into(),
            settings: settings.into(),
            accept: false,
            normalize_endlines: None,
            includes: IncludeFilter::default(),
            waves: None,
        }
    }

    pub fn with_accept(mut self, accept: bool) -> Self {
        self.accept = accept;
        self
    }

    pub fn with_normalize_endlines(mut self, replacement: impl Into<String>) -> Self {
        self.normalize_endlines = Some(replacement.into());
        self
    }

    pub fn with_includes(mut self, includes: IncludeFilter) -> Self {
        self.includes = includes;
        self
    }

    pub fn with_waves(mut self, waves: Waves) -> Self {
        self.waves = Some(waves);
        self
    }

    /// The compiled indicator glob that marks case directories.
    pub fn indicator(&self) -> Result<FileGlob> {
        FileGlob::new(&self.original)
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Concrete fixture paths for one case directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCaseSettings {
    pub original: PathBuf,
    pub actual: PathBuf,
    pub expected: PathBuf,
    pub settings: PathBuf,
    pub accept: bool,
    pub normalize_endlines: Option<String>,
    pub waves: Option<Waves>,
}

/// Resolves `template` against the case directory `case_path`.
///
/// Fails with [`HarnessError::CaseNotFound`] when no file matches the
/// original pattern. When a glob matches several files, the first in file-name
/// order wins.
pub fn resolve(template: &CaseSettingsTemplate, case_path: &Path) -> Result<ResolvedCaseSettings> {
    let original = find_original(template, case_path)?;
    let original_name = original
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ResolvedCaseSettings {
        actual: case_path.join(template.actual.resolve(&original_name)),
        expected: case_path.join(template.expected.resolve(&original_name)),
        settings: case_path.join(&template.settings),
        original,
        accept: template.accept,
        normalize_endlines: template.normalize_endlines.clone(),
        waves: template.waves.clone(),
    })
}

fn find_original(template: &CaseSettingsTemplate, case_path: &Path) -> Result<PathBuf> {
    let not_found = || HarnessError::CaseNotFound {
        pattern: template.original.clone(),
        directory: case_path.to_path_buf(),
    };

    let glob = template.indicator()?;
    if glob.is_literal() {
        let candidate = case_path.join(&template.original);
        return if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(not_found())
        };
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(case_path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| HarnessError::io("list", case_path, e.into()))?;
        if entry.file_type().is_file() && glob.is_match(&entry.file_name().to_string_lossy()) {
            matches.push(entry.into_path());
        }
    }

    let mut matches = matches.into_iter();
    let first = matches.next().ok_or_else(not_found)?;
    let ignored: Vec<_> = matches.map(|path| path.display().to_string()).collect();
    if !ignored.is_empty() {
        tracing::warn!(
            pattern = %template.original,
            chosen = %first.display(),
            ignored = ?ignored,
            "original pattern is ambiguous; using the first match"
        );
    }
    Ok(first)
}
