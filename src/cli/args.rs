//! Command-line arguments for the `fixture-harness` binary.
//!
//! Every option mirrors a field of [`HarnessConfig`](crate::config::HarnessConfig);
//! values given on the command line take precedence over a `--config` file.

use std::path::PathBuf;

use clap::Parser;

use crate::settings::Waves;

#[derive(Debug, Parser)]
#[command(
    name = "fixture-harness",
    version,
    about = "Discover fixture case directories and run a mutation command against each one."
)]
pub struct HarnessArgs {
    /// Root cases directory.
    pub cases: Option<PathBuf>,

    /// JSON or YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Group name of the root directory.
    #[arg(long)]
    pub label: Option<String>,

    /// Original file name or glob, e.g. `original.*`.
    #[arg(long)]
    pub original: Option<String>,

    /// Actual file name; may use `{name}`, `{stem}` and `{ext}`.
    #[arg(long)]
    pub actual: Option<String>,

    /// Expected file name; may use `{name}`, `{stem}` and `{ext}`.
    #[arg(long)]
    pub expected: Option<String>,

    /// Settings file name.
    #[arg(long)]
    pub settings: Option<String>,

    /// Overwrite expected files with the actual output instead of comparing.
    #[arg(long)]
    pub accept: bool,

    /// Replace every line ending in the actual output with this string.
    /// Understands the `\n`, `\r`, `\t` and `\\` escapes.
    #[arg(long, value_name = "STR", value_parser = parse_escaped)]
    pub normalize_endlines: Option<String>,

    /// Only run cases whose slash-joined path matches this regex. Repeatable.
    #[arg(short, long = "include", value_name = "REGEX")]
    pub includes: Vec<String>,

    /// Wave configuration passed to the mutation command, as JSON.
    #[arg(long, value_name = "JSON", value_parser = parse_waves)]
    pub waves: Option<Waves>,

    /// Run case bodies concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Mutation command and its arguments, after `--`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

fn parse_waves(raw: &str) -> Result<Waves, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid waves JSON: {e}"))
}

fn parse_escaped(raw: &str) -> Result<String, String> {
    Ok(unescape(raw))
}

/// Expands `\n`, `\r`, `\t` and `\\`. Other backslashes are kept as written.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.peek() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('\\') => '\\',
            _ => {
                out.push('\\');
                continue;
            }
        };
        chars.next();
        out.push(escaped);
    }
    out
}
