//! File-name globs and include filters.
//!
//! Globs are compiled to anchored regexes over a single file name:
//! - `*` matches any run of characters, `?` exactly one
//! - `[abc]`, `[a-z]`, `[!abc]` are character classes
//! - `{ts,tsx}` is an alternation
//! - everything else is literal text

use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;

use crate::diagnostics::{HarnessError, Result};

// =============================================================================
// FILE GLOBS
// =============================================================================

/// A compiled file-name glob, used for case indicators and original files.
#[derive(Debug, Clone)]
pub struct FileGlob {
    pattern: String,
    regex: Regex,
}

impl FileGlob {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(&glob_to_regex(pattern)).map_err(|source| HarnessError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// True when the pattern names exactly one file.
    pub fn is_literal(&self) -> bool {
        !self.pattern.contains(['*', '?', '[', '{'])
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }
}

impl std::fmt::Display for FileGlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    let mut chars = glob.chars().peekable();
    let mut alternation_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => match take_class(&mut chars) {
                Some(class) => out.push_str(&class),
                None => out.push_str(r"\["),
            },
            '{' => {
                alternation_depth += 1;
                out.push_str("(?:");
            }
            ',' if alternation_depth > 0 => out.push('|'),
            '}' if alternation_depth > 0 => {
                alternation_depth -= 1;
                out.push(')');
            }
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    // An unclosed `{` leaves an unbalanced group, which the regex compiler rejects.
    out.push('$');
    out
}

/// Consumes a `[...]` class if it is closed; leaves `chars` untouched otherwise.
fn take_class(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut lookahead = chars.clone();
    let mut class = String::from("[");
    if matches!(lookahead.peek(), Some('!' | '^')) {
        lookahead.next();
        class.push('^');
    }

    let mut first = true;
    loop {
        let c = lookahead.next()?;
        if c == ']' && !first {
            class.push(']');
            *chars = lookahead;
            return Some(class);
        }
        first = false;
        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
            class.push('\\');
        }
        class.push(c);
    }
}

// =============================================================================
// INCLUDE FILTERS
// =============================================================================

/// Whitelist of regexes matched against a case's slash-joined group path.
///
/// An empty filter runs every case. A non-empty filter runs a case when any
/// pattern matches its path; nothing ever forces a skip on its own.
#[derive(Debug, Clone, Default)]
pub struct IncludeFilter {
    patterns: Vec<Regex>,
}

impl IncludeFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| HarnessError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn from_regexes(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn is_active(&self) -> bool {
        !self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn allows(&self, path: &str) -> bool {
        !self.is_active() || self.patterns.iter().any(|pattern| pattern.is_match(path))
    }

    /// Patterns in `/source/` form, comma separated.
    pub fn describe(&self) -> String {
        self.patterns
            .iter()
            .map(|pattern| format!("/{}/", pattern.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
