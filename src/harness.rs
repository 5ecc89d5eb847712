//! Public entry point: discover a cases directory and register it.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use fixture_harness::{describe_mutation_cases, CaseSettingsTemplate, CommandPipeline, Suite};
//!
//! # async fn demo() -> fixture_harness::Result<()> {
//! let template = CaseSettingsTemplate::new("original.ts", "actual.ts", "expected.ts", "settings.json");
//! let pipeline = Arc::new(CommandPipeline::new("my-fixer", vec![]));
//! let mut suite = Suite::default();
//! describe_mutation_cases(Path::new("test/cases"), pipeline, template, &mut suite)?;
//! let reports = suite.run(false).await;
//! assert!(!reports.is_empty());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::diagnostics::Result;
use crate::hierarchy::{crawl, HierarchyNode};
use crate::mutation::MutationPipeline;
use crate::registrar::{register, CaseFuture, Notifier, RunCase, TestHost, TracingNotifier};
use crate::runner::run_case;
use crate::settings::{resolve, CaseSettingsTemplate};

pub const DEFAULT_ROOT_LABEL: &str = "cases";

/// Discovery and registration of one cases directory.
#[derive(Clone)]
pub struct MutationCases {
    label: String,
    template: Arc<CaseSettingsTemplate>,
    pipeline: Arc<dyn MutationPipeline>,
    notifier: Arc<dyn Notifier>,
}

impl MutationCases {
    pub fn new(pipeline: Arc<dyn MutationPipeline>, template: CaseSettingsTemplate) -> Self {
        Self {
            label: DEFAULT_ROOT_LABEL.to_string(),
            template: Arc::new(template),
            pipeline,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Sets the group name of the root directory.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn template(&self) -> &CaseSettingsTemplate {
        &self.template
    }

    /// Crawls `cases_path` using the template's original pattern as indicator.
    pub fn discover(&self, cases_path: &Path) -> Result<HierarchyNode> {
        let indicator = self.template.indicator()?;
        crawl(&self.label, cases_path, &indicator)
    }

    /// Work for a case node: resolve its settings, then run it.
    pub fn case_runner(&self) -> RunCase {
        let template = Arc::clone(&self.template);
        let pipeline = Arc::clone(&self.pipeline);
        Arc::new(move |node: &HierarchyNode| -> CaseFuture {
            let template = Arc::clone(&template);
            let pipeline = Arc::clone(&pipeline);
            let directory = node.directory_path.clone();
            Box::pin(async move {
                let settings = resolve(&template, &directory)?;
                run_case(&settings, pipeline.as_ref()).await
            })
        })
    }

    /// Discovers `cases_path` and registers the whole tree with `host`.
    ///
    /// Discovery failures are returned; case failures surface only when the
    /// host runs the registered bodies.
    pub fn describe(&self, cases_path: &Path, host: &mut dyn TestHost) -> Result<()> {
        let root = self.discover(cases_path)?;
        tracing::debug!(
            cases = root.case_count(),
            directories = root.directory_count(),
            "discovered cases"
        );
        register(
            &root,
            &self.case_runner(),
            &self.template.includes,
            host,
            self.notifier.as_ref(),
        );
        Ok(())
    }
}

/// Discovers `cases_path` and registers every case with `host`, labelling
/// the root group `cases`.
pub fn describe_mutation_cases(
    cases_path: &Path,
    pipeline: Arc<dyn MutationPipeline>,
    template: CaseSettingsTemplate,
    host: &mut dyn TestHost,
) -> Result<()> {
    MutationCases::new(pipeline, template).describe(cases_path, host)
}
