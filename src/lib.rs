//! Fixture-driven discovery and execution for file-mutation engines.
//!
//! A cases directory is a tree of folders. Any folder holding a file that
//! matches the original-file pattern is a *case*; every other folder is a
//! *group*. Each case is run by copying the original file over the actual
//! file, letting a [`MutationPipeline`] rewrite it, and comparing the result
//! with the expected file (or overwriting the expected file in accept mode).

pub use crate::config::HarnessConfig;
pub use crate::diagnostics::{ErrorType, HarnessError, PipelineError, Result};
pub use crate::harness::{describe_mutation_cases, MutationCases};
pub use crate::hierarchy::{crawl, HierarchyNode};
pub use crate::mutation::{CommandPipeline, MutationPipeline};
pub use crate::pattern::{FileGlob, IncludeFilter};
pub use crate::registrar::{register, CaseBody, CaseFuture, Notifier, RunCase, TestHost, TracingNotifier};
pub use crate::runner::{normalize_endlines, run_case, CaseOutcome};
pub use crate::settings::{resolve, CaseSettingsTemplate, FileName, ResolvedCaseSettings, Waves};
pub use crate::suite::{CaseReport, CaseResult, RunSummary, Suite, SuiteEntry};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod harness;
pub mod hierarchy;
pub mod mutation;
pub mod pattern;
pub mod registrar;
pub mod runner;
pub mod settings;
pub mod suite;
