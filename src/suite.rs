//! In-process host framework.
//!
//! [`Suite`] records registrations as a tree and runs the leaf bodies on the
//! tokio runtime. Each body runs in its own task, so a panicking pipeline
//! fails only its own case.

use tokio::task::{JoinError, JoinHandle};

use crate::diagnostics::{HarnessError, Result};
use crate::registrar::{CaseBody, TestHost};
use crate::runner::CaseOutcome;

// =============================================================================
// REGISTRATION
// =============================================================================

pub enum SuiteEntry {
    Group {
        name: String,
        entries: Vec<SuiteEntry>,
    },
    Case {
        name: String,
        body: CaseBody,
        skipped: bool,
    },
}

impl std::fmt::Debug for SuiteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuiteEntry::Group { name, entries } => f
                .debug_struct("Group")
                .field("name", name)
                .field("entries", entries)
                .finish(),
            SuiteEntry::Case { name, skipped, .. } => f
                .debug_struct("Case")
                .field("name", name)
                .field("skipped", skipped)
                .finish_non_exhaustive(),
        }
    }
}

/// Registered groups and cases, in registration order.
#[derive(Debug, Default)]
pub struct Suite {
    entries: Vec<SuiteEntry>,
}

impl TestHost for Suite {
    fn group(&mut self, name: &str, register: &mut dyn FnMut(&mut dyn TestHost)) {
        let mut group = Suite::default();
        register(&mut group);
        self.entries.push(SuiteEntry::Group {
            name: name.to_string(),
            entries: group.entries,
        });
    }

    fn test(&mut self, name: &str, body: CaseBody) {
        self.push_case(name, body, false);
    }

    fn skip(&mut self, name: &str, body: CaseBody) {
        self.push_case(name, body, true);
    }
}

impl Suite {
    fn push_case(&mut self, name: &str, body: CaseBody, skipped: bool) {
        self.entries.push(SuiteEntry::Case {
            name: name.to_string(),
            body,
            skipped,
        });
    }

    pub fn entries(&self) -> &[SuiteEntry] {
        &self.entries
    }

    /// Slash-joined path and skip flag of every registered case.
    pub fn case_paths(&self) -> Vec<(String, bool)> {
        let mut paths = Vec::new();
        collect_paths(&self.entries, "", &mut paths);
        paths
    }

    /// Runs every registered case and reports them in registration order.
    ///
    /// With `parallel`, all bodies are spawned at once; otherwise each body
    /// finishes before the next starts.
    pub async fn run(self, parallel: bool) -> Vec<CaseReport> {
        let mut pending = Vec::new();
        flatten(self.entries, "", &mut pending);

        let mut reports = Vec::with_capacity(pending.len());
        let mut running = Vec::new();
        for (path, name, body) in pending {
            let task = body.map(|body| tokio::spawn(body()));
            if parallel {
                running.push((path, name, task));
            } else {
                reports.push(finish(path, name, task).await);
            }
        }
        for (path, name, task) in running {
            reports.push(finish(path, name, task).await);
        }
        reports
    }
}

async fn finish(
    path: String,
    name: String,
    task: Option<JoinHandle<Result<CaseOutcome>>>,
) -> CaseReport {
    let result = match task {
        None => CaseResult::Skipped,
        Some(task) => match task.await {
            Ok(result) => CaseResult::from(result),
            Err(join_error) => CaseResult::Panicked(panic_message(join_error)),
        },
    };
    CaseReport::new(path, name, result)
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "case panicked".to_string())
}

type PendingCase = (String, String, Option<CaseBody>);

fn flatten(entries: Vec<SuiteEntry>, parent: &str, out: &mut Vec<PendingCase>) {
    for entry in entries {
        match entry {
            SuiteEntry::Group { name, entries } => flatten(entries, &join(parent, &name), out),
            SuiteEntry::Case {
                name,
                body,
                skipped,
            } => {
                let body = if skipped { None } else { Some(body) };
                out.push((join(parent, &name), name, body));
            }
        }
    }
}

fn collect_paths(entries: &[SuiteEntry], parent: &str, out: &mut Vec<(String, bool)>) {
    for entry in entries {
        match entry {
            SuiteEntry::Group { name, entries } => collect_paths(entries, &join(parent, name), out),
            SuiteEntry::Case { name, skipped, .. } => out.push((join(parent, name), *skipped)),
        }
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

// =============================================================================
// RESULTS
// =============================================================================

#[derive(Debug)]
pub enum CaseResult {
    Passed,
    Accepted { changed: bool },
    Skipped,
    Failed(HarnessError),
    /// The case body panicked.
    Panicked(String),
}

impl From<Result<CaseOutcome>> for CaseResult {
    fn from(result: Result<CaseOutcome>) -> Self {
        match result {
            Ok(CaseOutcome::Passed) => CaseResult::Passed,
            Ok(CaseOutcome::Accepted { changed }) => CaseResult::Accepted { changed },
            Err(error) => CaseResult::Failed(error),
        }
    }
}

#[derive(Debug)]
pub struct CaseReport {
    /// Slash-joined group path ending with the case name.
    pub path: String,
    pub name: String,
    pub result: CaseResult,
}

impl CaseReport {
    fn new(path: String, name: String, result: CaseResult) -> Self {
        Self { path, name, result }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.result, CaseResult::Failed(_) | CaseResult::Panicked(_))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub accepted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[CaseReport]) -> Self {
        let mut summary = RunSummary::default();
        for report in reports {
            match report.result {
                CaseResult::Passed => summary.passed += 1,
                CaseResult::Accepted { .. } => summary.accepted += 1,
                CaseResult::Skipped => summary.skipped += 1,
                CaseResult::Failed(_) | CaseResult::Panicked(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.passed + self.accepted + self.failed + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
