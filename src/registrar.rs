//! Registers a crawled hierarchy with a host test framework.
//!
//! Directories that are not cases become named groups; case directories become
//! leaf tests whose bodies run lazily, when the host executes them. An include
//! filter decides, per case, between a runnable and a skipped registration.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::diagnostics::Result;
use crate::hierarchy::HierarchyNode;
use crate::pattern::IncludeFilter;
use crate::runner::CaseOutcome;

/// The asynchronous work of one case.
pub type CaseFuture = Pin<Box<dyn Future<Output = Result<CaseOutcome>> + Send + 'static>>;

/// Deferred body of a leaf test. Nothing happens until the host calls it.
pub type CaseBody = Box<dyn FnOnce() -> CaseFuture + Send + 'static>;

/// Produces the work for a case node.
pub type RunCase = Arc<dyn Fn(&HierarchyNode) -> CaseFuture + Send + Sync>;

/// Registration primitives offered by a host test framework.
pub trait TestHost {
    /// Opens a named group; `register` performs the group's child registrations.
    fn group(&mut self, name: &str, register: &mut dyn FnMut(&mut dyn TestHost));

    /// Registers a named leaf test.
    fn test(&mut self, name: &str, body: CaseBody);

    /// Registers a named leaf test that is visible but never executed.
    fn skip(&mut self, name: &str, body: CaseBody);
}

/// Receives one-line advisories emitted while registering.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Forwards advisories to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Walks `root` and registers every group and case with `host`.
///
/// Paths matched by `includes` are the slash-joined group names from the root
/// label down to the case, e.g. `cases/groupA/sub`.
pub fn register(
    root: &HierarchyNode,
    run_case: &RunCase,
    includes: &IncludeFilter,
    host: &mut dyn TestHost,
    notifier: &dyn Notifier,
) {
    if includes.is_active() {
        notifier.notify(&format!(
            "Only running cases matching: {}",
            includes.describe()
        ));
    }
    register_node(root, run_case, includes, "", host);
}

fn register_node(
    node: &HierarchyNode,
    run_case: &RunCase,
    includes: &IncludeFilter,
    parent_path: &str,
    host: &mut dyn TestHost,
) {
    let path = join_path(parent_path, &node.group_name);

    if !node.contains_test {
        host.group(&node.group_name, &mut |host: &mut dyn TestHost| {
            for child in &node.children {
                register_node(child, run_case, includes, &path, host);
            }
        });
        return;
    }

    let body = case_body(node, run_case);
    if includes.allows(&path) {
        host.test(&node.group_name, body);
    } else {
        tracing::debug!(case = %path, "skipping case outside include filter");
        host.skip(&node.group_name, body);
    }
}

fn case_body(node: &HierarchyNode, run_case: &RunCase) -> CaseBody {
    let node = node.clone();
    let run_case = Arc::clone(run_case);
    Box::new(move || run_case(&node))
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
