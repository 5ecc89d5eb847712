//! Harness configuration files.
//!
//! A configuration file describes a cases directory and its case template in
//! JSON (`.json`) or YAML (`.yaml`, `.yml`):
//!
//! ```yaml
//! cases: test/cases
//! original: "original.*"
//! actual: "actual.{ext}"
//! expected: "expected.{ext}"
//! settings: settings.json
//! normalize_endlines: "\n"
//! includes: ["^cases/rename"]
//! command: ["my-fixer", "--settings", "{settings}", "{target}"]
//! ```
//!
//! Actual and expected names may use the `{name}`, `{stem}` and `{ext}`
//! placeholders of [`FileName::from_template`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::{HarnessError, Result};
use crate::harness::DEFAULT_ROOT_LABEL;
use crate::pattern::IncludeFilter;
use crate::settings::{CaseSettingsTemplate, FileName, Waves};

pub const DEFAULT_ORIGINAL: &str = "original.*";
pub const DEFAULT_ACTUAL: &str = "actual.{ext}";
pub const DEFAULT_EXPECTED: &str = "expected.{ext}";
pub const DEFAULT_SETTINGS: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Root cases directory. Relative paths resolve against the config file.
    pub cases: Option<PathBuf>,
    pub label: Option<String>,
    pub original: Option<String>,
    pub actual: Option<String>,
    pub expected: Option<String>,
    pub settings: Option<String>,
    pub accept: bool,
    pub normalize_endlines: Option<String>,
    pub includes: Vec<String>,
    pub waves: Option<Waves>,
    /// Program and arguments of an external mutation command.
    pub command: Vec<String>,
}

impl HarnessConfig {
    /// Loads a configuration file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| HarnessError::io("read", path, e))?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut config: HarnessConfig = match extension.as_str() {
            "json" => serde_json::from_str(&text).map_err(|e| HarnessError::config(path, e))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&text).map_err(|e| HarnessError::config(path, e))?
            }
            other => {
                return Err(HarnessError::config(
                    path,
                    format!("unsupported configuration format '{other}' (expected json, yaml or yml)"),
                ))
            }
        };

        if let (Some(cases), Some(base)) = (config.cases.as_mut(), path.parent()) {
            if cases.is_relative() {
                let joined = base.join(&*cases);
                *cases = joined;
            }
        }
        Ok(config)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_ROOT_LABEL)
    }

    /// Builds the case template, filling unset names with the defaults.
    pub fn template(&self) -> Result<CaseSettingsTemplate> {
        let mut template = CaseSettingsTemplate::new(
            self.original.as_deref().unwrap_or(DEFAULT_ORIGINAL),
            FileName::from_template(self.actual.as_deref().unwrap_or(DEFAULT_ACTUAL)),
            FileName::from_template(self.expected.as_deref().unwrap_or(DEFAULT_EXPECTED)),
            self.settings.as_deref().unwrap_or(DEFAULT_SETTINGS),
        )
        .with_accept(self.accept)
        .with_includes(IncludeFilter::new(&self.includes)?);

        if let Some(replacement) = &self.normalize_endlines {
            template = template.with_normalize_endlines(replacement.clone());
        }
        if let Some(waves) = &self.waves {
            template = template.with_waves(waves.clone());
        }
        Ok(template)
    }
}
