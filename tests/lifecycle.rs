// Arrange, act and assert behaviour of individual cases.

mod common;

use std::sync::Arc;

use common::{
    ts_template, CaseTree, FailingPipeline, PanickingPipeline, RecordingPipeline, ReplacePipeline,
    WritePipeline,
};
use fixture_harness::{
    resolve, run_case, CaseOutcome, CaseReport, CaseResult, CaseSettingsTemplate, FileName,
    HarnessError, MutationCases, MutationPipeline, RunSummary, Suite,
};

async fn run_tree(
    tree: &CaseTree,
    pipeline: Arc<dyn MutationPipeline>,
    template: CaseSettingsTemplate,
) -> Vec<CaseReport> {
    let mut suite = Suite::default();
    MutationCases::new(pipeline, template)
        .describe(tree.root(), &mut suite)
        .unwrap();
    suite.run(false).await
}

#[tokio::test]
async fn rename_case_passes() {
    let tree = CaseTree::new();
    tree.case("rename", "let foo = 1;\n", "let bar = 1;\n");

    let settings = resolve(&ts_template(), &tree.path("rename")).unwrap();
    let pipeline = ReplacePipeline::new("foo", "bar");
    let outcome = run_case(&settings, pipeline.as_ref()).await.unwrap();

    assert_eq!(outcome, CaseOutcome::Passed);
    assert_eq!(tree.read("rename/actual.ts"), "let bar = 1;\n");
    assert_eq!(tree.read("rename/expected.ts"), "let bar = 1;\n");
    assert_eq!(tree.read("rename/original.ts"), "let foo = 1;\n");
}

#[tokio::test]
async fn pipeline_sees_a_fresh_copy_of_the_original() {
    let tree = CaseTree::new();
    tree.case("copy", "original text", "original text")
        .file("copy/actual.ts", "stale output from a previous run");

    let settings = resolve(&ts_template(), &tree.path("copy")).unwrap();
    let pipeline = RecordingPipeline::default();
    run_case(&settings, &pipeline).await.unwrap();

    let invocations = pipeline.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].contents, "original text");
    assert_eq!(invocations[0].target, tree.path("copy/actual.ts"));
    assert_eq!(invocations[0].settings, tree.path("copy/settings.json"));
    assert_eq!(invocations[0].waves, None);
}

#[tokio::test]
async fn waves_reach_the_pipeline_untouched() {
    let tree = CaseTree::new();
    tree.case("waves", "x", "x");
    let waves = serde_json::json!({ "maximum": 5, "order": ["a", "b"] });

    let settings = resolve(&ts_template().with_waves(waves.clone()), &tree.path("waves")).unwrap();
    let pipeline = RecordingPipeline::default();
    run_case(&settings, &pipeline).await.unwrap();

    assert_eq!(pipeline.invocations()[0].waves, Some(waves));
}

#[tokio::test]
async fn no_op_pipeline_fails_when_expected_differs() {
    let tree = CaseTree::new();
    tree.case("noop", "foo", "bar");

    let settings = resolve(&ts_template(), &tree.path("noop")).unwrap();
    let error = run_case(&settings, &RecordingPipeline::default())
        .await
        .unwrap_err();

    match error {
        HarnessError::Assertion {
            expected_path,
            expected,
            actual,
        } => {
            assert_eq!(expected_path, tree.path("noop/expected.ts"));
            assert_eq!(expected, "bar");
            assert_eq!(actual, "foo");
        }
        other => panic!("expected an assertion failure, got {other:?}"),
    }
}

#[tokio::test]
async fn rerunning_a_passing_case_is_idempotent() {
    let tree = CaseTree::new();
    tree.case("again", "foo foo", "bar bar");
    let pipeline = ReplacePipeline::new("foo", "bar");

    for _ in 0..2 {
        let reports = run_tree(&tree, pipeline.clone(), ts_template()).await;
        assert!(matches!(reports[0].result, CaseResult::Passed));
        assert_eq!(tree.read("again/actual.ts"), "bar bar");
    }
    assert_eq!(pipeline.calls(), 2);
}

#[tokio::test]
async fn accept_mode_rewrites_the_baseline_then_plain_run_passes() {
    let tree = CaseTree::new();
    tree.case("accept", "foo", "outdated");
    let pipeline = ReplacePipeline::new("foo", "bar");

    let reports = run_tree(&tree, pipeline.clone(), ts_template().with_accept(true)).await;
    assert!(matches!(
        reports[0].result,
        CaseResult::Accepted { changed: true }
    ));
    assert_eq!(tree.read("accept/expected.ts"), "bar");

    let reports = run_tree(&tree, pipeline, ts_template()).await;
    assert!(matches!(reports[0].result, CaseResult::Passed));
}

#[tokio::test]
async fn missing_expected_file_fails_before_the_pipeline_runs() {
    let tree = CaseTree::new();
    tree.file("bare/original.ts", "foo");

    let settings = resolve(&ts_template(), &tree.path("bare")).unwrap();
    let pipeline = ReplacePipeline::new("foo", "bar");
    let error = run_case(&settings, pipeline.as_ref()).await.unwrap_err();

    assert!(matches!(error, HarnessError::Io { action: "read", .. }));
    assert_eq!(pipeline.calls(), 0);
}

#[tokio::test]
async fn normalization_rewrites_actual_but_not_expected() {
    let tree = CaseTree::new();
    tree.case("endlines", "a\r\nb\nc", "a\nb\nc");

    let template = ts_template().with_normalize_endlines("\n");
    let reports = run_tree(&tree, Arc::new(RecordingPipeline::default()), template).await;

    assert!(matches!(reports[0].result, CaseResult::Passed));
    assert_eq!(tree.read("endlines/actual.ts"), "a\nb\nc");
}

#[tokio::test]
async fn without_normalization_line_endings_must_match_exactly() {
    let tree = CaseTree::new();
    tree.case("endlines", "a\r\nb", "a\nb");

    let reports = run_tree(&tree, Arc::new(RecordingPipeline::default()), ts_template()).await;
    assert!(matches!(
        reports[0].result,
        CaseResult::Failed(HarnessError::Assertion { .. })
    ));
}

#[tokio::test]
async fn missing_original_reports_could_not_find() {
    let tree = CaseTree::new();
    tree.file("vanished/original.ts", "foo")
        .file("vanished/expected.ts", "foo");

    let mut suite = Suite::default();
    MutationCases::new(Arc::new(RecordingPipeline::default()), ts_template())
        .describe(tree.root(), &mut suite)
        .unwrap();
    std::fs::remove_file(tree.path("vanished/original.ts")).unwrap();

    let reports = suite.run(false).await;
    let CaseResult::Failed(error) = &reports[0].result else {
        panic!("expected failure, got {:?}", reports[0].result);
    };
    assert!(error.to_string().starts_with("could not find a file matching 'original.ts'"));
}

#[tokio::test]
async fn pipeline_errors_pass_through_unchanged() {
    let tree = CaseTree::new();
    tree.case("broken", "foo", "bar");

    let reports = run_tree(&tree, Arc::new(FailingPipeline("parser exploded")), ts_template()).await;
    let CaseResult::Failed(error) = &reports[0].result else {
        panic!("expected failure, got {:?}", reports[0].result);
    };
    assert!(matches!(error, HarnessError::Pipeline { .. }));
    assert_eq!(error.to_string(), "parser exploded");
    assert!(std::error::Error::source(error).is_none());
}

#[tokio::test]
async fn accept_mode_reports_an_unchanged_baseline() {
    let tree = CaseTree::new();
    tree.case("stable", "foo", "bar");

    let settings = resolve(&ts_template().with_accept(true), &tree.path("stable")).unwrap();
    let pipeline = ReplacePipeline::new("foo", "bar");
    let outcome = run_case(&settings, pipeline.as_ref()).await.unwrap();

    assert_eq!(outcome, CaseOutcome::Accepted { changed: false });
    assert_eq!(tree.read("stable/expected.ts"), "bar");
}

#[tokio::test]
async fn ambiguous_original_glob_takes_the_first_name_in_order() {
    let tree = CaseTree::new();
    tree.file("mixed/original.ts", "ts source")
        .file("mixed/original.js", "js source")
        .file("mixed/expected.txt", "js source");

    let template =
        CaseSettingsTemplate::new("original.*", "actual.txt", "expected.txt", "settings.json");
    let settings = resolve(&template, &tree.path("mixed")).unwrap();
    assert_eq!(settings.original, tree.path("mixed/original.js"));

    let outcome = run_case(&settings, &RecordingPipeline::default()).await.unwrap();
    assert_eq!(outcome, CaseOutcome::Passed);
}

#[tokio::test]
async fn panicking_pipeline_fails_only_its_own_case() {
    let tree = CaseTree::new();
    tree.case("a", "foo", "foo").case("b", "foo", "foo");

    let mut suite = Suite::default();
    MutationCases::new(Arc::new(PanickingPipeline), ts_template())
        .describe(&tree.path("a"), &mut suite)
        .unwrap();
    MutationCases::new(Arc::new(RecordingPipeline::default()), ts_template())
        .with_label("sibling")
        .describe(&tree.path("b"), &mut suite)
        .unwrap();

    let reports = suite.run(false).await;
    assert_eq!(reports.len(), 2);
    match &reports[0].result {
        CaseResult::Panicked(message) => assert_eq!(message, "pipeline blew up"),
        other => panic!("expected a panic report, got {other:?}"),
    }
    assert_eq!(reports[1].path, "sibling");
    assert!(matches!(reports[1].result, CaseResult::Passed));
    assert_eq!(RunSummary::from_reports(&reports).failed, 1);
}

#[tokio::test]
async fn derived_names_follow_the_original_extension() {
    let tree = CaseTree::new();
    tree.file("compile/original.ts", "const a = 1;")
        .file("compile/expected.js", "var a = 1;")
        .file("compile/settings.json", "{}");

    let template = CaseSettingsTemplate::new(
        "original.*",
        FileName::derived(|original: &str| {
            original.replace("original", "actual").replace(".ts", ".js")
        }),
        FileName::from_template("expected.js"),
        "settings.json",
    );
    let settings = resolve(&template, &tree.path("compile")).unwrap();
    assert_eq!(settings.original, tree.path("compile/original.ts"));
    assert_eq!(settings.actual, tree.path("compile/actual.js"));

    let outcome = run_case(&settings, &WritePipeline("var a = 1;")).await.unwrap();
    assert_eq!(outcome, CaseOutcome::Passed);
}

#[tokio::test]
async fn one_failing_case_does_not_stop_the_others() {
    let tree = CaseTree::new();
    tree.case("a", "foo", "bar").case("b", "foo", "wrong").case("c", "foo", "bar");

    let reports = run_tree(&tree, ReplacePipeline::new("foo", "bar"), ts_template()).await;
    let summary = RunSummary::from_reports(&reports);

    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.has_failures());
    assert_eq!(reports[1].path, "cases/b");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parallel_runs_report_in_registration_order() {
    let tree = CaseTree::new();
    for name in ["a", "b", "c", "d"] {
        tree.case(name, "foo", "bar");
    }

    let mut suite = Suite::default();
    MutationCases::new(ReplacePipeline::new("foo", "bar"), ts_template())
        .describe(tree.root(), &mut suite)
        .unwrap();
    let reports = suite.run(true).await;

    let paths: Vec<_> = reports.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["cases/a", "cases/b", "cases/c", "cases/d"]);
    assert!(reports.iter().all(|r| matches!(r.result, CaseResult::Passed)));
}
