//! Render [`Entry`] records back into raw-log text.
//!
//! The output is accepted by [`super::parser`] and parses back to an equal
//! record, so parse → write → parse is stable.
//!
//! Header order is fixed: `commit`, `tree`, `parent`*, `author`,
//! `committer`, then extra headers sorted by key. Multi-line extra values
//! are written as one header line followed by space-prefixed continuation
//! lines.

use super::Entry;

/// Raw-log lines for one record, without terminators.
///
/// The last line is the blank line that closes the record.
#[must_use]
pub fn to_raw_lines(entry: &Entry) -> Vec<String> {
    let mut lines = Vec::with_capacity(6 + entry.parents.len() + entry.message.len());
    lines.push(format!("commit {}", entry.id));
    lines.push(format!("tree {}", entry.tree));
    lines.extend(entry.parents.iter().map(|p| format!("parent {p}")));
    lines.push(format!("author {}", entry.author));
    lines.push(format!("committer {}", entry.committer));

    for (key, value) in &entry.extra {
        let mut value_lines = value.split('\n');
        let first = value_lines.next().unwrap_or_default();
        lines.push(format!("{key} {first}"));
        lines.extend(value_lines.map(|rest| format!(" {rest}")));
    }

    lines.push(String::new());
    lines.extend(entry.message.iter().map(|m| format!("    {m}")));
    lines.push(String::new());
    lines
}

/// One record as newline-terminated text.
#[must_use]
pub fn write_entry(entry: &Entry) -> String {
    let mut out = String::new();
    for line in to_raw_lines(entry) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Concatenate records into a complete raw log.
#[must_use]
pub fn write_log<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries.into_iter().map(write_entry).collect()
}
