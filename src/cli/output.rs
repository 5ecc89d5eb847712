//! Console reporting for a finished run.
//!
//! One status line per case, followed by details for every failure: a line
//! diff for assertion failures and a rendered diagnostic for everything else.
//! All functions write to a [`WriteColor`] so tests can capture plain output.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

use crate::diagnostics::HarnessError;
use crate::suite::{CaseReport, CaseResult, RunSummary};

// ============================================================================
// COLOUR SELECTION
// ============================================================================

/// Colours only when stderr is a terminal.
pub fn color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

// ============================================================================
// REPORTS
// ============================================================================

pub fn print_reports<W: WriteColor>(out: &mut W, reports: &[CaseReport]) -> io::Result<()> {
    for report in reports {
        print_status(out, report)?;
    }

    let failures: Vec<&CaseReport> = reports.iter().filter(|r| r.is_failure()).collect();
    for report in &failures {
        writeln!(out)?;
        print_failure(out, report)?;
    }

    writeln!(out)?;
    print_summary(out, &RunSummary::from_reports(reports))?;
    if !failures.is_empty() {
        writeln!(out, "failed cases:")?;
        for report in failures {
            writeln!(out, "    {}", report.path)?;
        }
    }
    Ok(())
}

fn print_status<W: WriteColor>(out: &mut W, report: &CaseReport) -> io::Result<()> {
    let (label, color) = match report.result {
        CaseResult::Passed => ("PASS", Color::Green),
        CaseResult::Accepted { .. } => ("ACCEPT", Color::Cyan),
        CaseResult::Skipped => ("SKIP", Color::Yellow),
        CaseResult::Failed(_) | CaseResult::Panicked(_) => ("FAIL", Color::Red),
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label:>6}")?;
    out.reset()?;
    match report.result {
        CaseResult::Accepted { changed: false } => {
            writeln!(out, " {} (baseline unchanged)", report.path)
        }
        _ => writeln!(out, " {}", report.path),
    }
}

fn print_failure<W: WriteColor>(out: &mut W, report: &CaseReport) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    writeln!(out, "--- {} ---", report.path)?;
    out.reset()?;

    match &report.result {
        CaseResult::Failed(HarnessError::Assertion {
            expected_path,
            expected,
            actual,
        }) => {
            writeln!(out, "mutated output does not match '{}'", expected_path.display())?;
            let changeset = Changeset::new(expected, actual, "\n");
            print_diff(out, &changeset.diffs)
        }
        CaseResult::Failed(error) => {
            let rendered = render_diagnostic(error, out.supports_color());
            write!(out, "{rendered}")
        }
        CaseResult::Panicked(message) => writeln!(out, "case panicked: {message}"),
        _ => Ok(()),
    }
}

pub fn print_summary<W: WriteColor>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    let color = if summary.has_failures() {
        Color::Red
    } else {
        Color::Green
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{} cases:", summary.total())?;
    out.reset()?;
    writeln!(
        out,
        " {} passed, {} accepted, {} failed, {} skipped",
        summary.passed, summary.accepted, summary.failed, summary.skipped
    )
}

/// Renders a fatal error, e.g. a discovery failure, before exiting.
pub fn print_error<W: WriteColor>(out: &mut W, error: &HarnessError) -> io::Result<()> {
    let rendered = render_diagnostic(error, out.supports_color());
    write!(out, "{rendered}")
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn render_diagnostic(diagnostic: &dyn Diagnostic, color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let mut rendered = String::new();
    match GraphicalReportHandler::new_themed(theme).render_report(&mut rendered, diagnostic) {
        Ok(()) => rendered,
        Err(_) => format!("{diagnostic}\n"),
    }
}

fn print_diff<W: WriteColor>(out: &mut W, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                out.reset()?;
                for line in x.lines() {
                    writeln!(out, " {line}")?;
                }
            }
            Difference::Add(ref x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                for line in x.lines() {
                    writeln!(out, "+{line}")?;
                }
            }
            Difference::Rem(ref x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                for line in x.lines() {
                    writeln!(out, "-{line}")?;
                }
            }
        }
    }
    out.reset()
}
