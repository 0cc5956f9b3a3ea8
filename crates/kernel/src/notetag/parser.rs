//! Notetag extraction from free-text annotations.
//!
//! A notetag is a self-closing, bracket-delimited segment:
//!
//! ```text
//! <Bonus atk 5 />
//!
//! <Script on-open>
//! gainGold(100)
//! playSe("Chest1")
//! />
//! ```
//!
//! The single-line form yields a tag name and arguments. The multi-line form
//! also yields the interior lines verbatim as `children`. Extraction is best
//! effort: text that doesn't fit the grammar is skipped, never an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A `<` directly followed by a tag name, then anything up to the first `/>`.
///
/// The span may cross lines and may contain `<`. A `<` followed by whitespace
/// (as in `gold < 100`) never opens a tag.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static NOTETAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<([^\s<>/].*?)/>").expect("valid regex literal"));

/// One parsed notetag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotetagRecord {
    /// The name right after `<`.
    pub tag: String,
    /// Whitespace-separated tokens after the name.
    pub args: Vec<String>,
    /// Interior lines of the multi-line form; absent for single-line tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

impl NotetagRecord {
    /// Build a single-line record.
    pub fn new<I, S>(tag: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tag: tag.into(),
            args: args.into_iter().map(Into::into).collect(),
            children: None,
        }
    }

    /// Attach multi-line children.
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = Some(children.into_iter().map(Into::into).collect());
        self
    }

    /// Argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Extract every notetag from `text`, in order of appearance.
pub fn parse_notetags(text: &str) -> Vec<NotetagRecord> {
    NOTETAG
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|inner| parse_span(inner.as_str()))
        .collect()
}

fn parse_span(inner: &str) -> Option<NotetagRecord> {
    if !inner.contains('\n') {
        let (tag, args) = parse_header(inner)?;
        return Some(NotetagRecord {
            tag,
            args,
            children: None,
        });
    }

    let lines: Vec<&str> = inner
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let (header, rest) = lines.split_first()?;
    // The last line is the one holding `/>` and is dropped.
    let (_, interior) = rest.split_last()?;

    let (tag, args) = parse_header(header)?;
    Some(NotetagRecord {
        tag,
        args,
        children: Some(interior.iter().map(|line| (*line).to_string()).collect()),
    })
}

fn parse_header(line: &str) -> Option<(String, Vec<String>)> {
    let line = line.trim();
    let line = line.strip_suffix('>').unwrap_or(line);
    let mut tokens = line.split_whitespace().map(str::to_string);
    let tag = tokens.next()?;
    Some((tag, tokens.collect()))
}
