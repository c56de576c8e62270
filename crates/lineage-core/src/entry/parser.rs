//! Streaming raw-log parser.
//!
//! Turns the line-oriented output of `git log --all --format=raw` into
//! [`Entry`] records. The core is [`EntryParser`], a three-state machine
//! (`Initial`, `BuildingHeaders`, `BuildingMessage`) that is fed one line at
//! a time and holds only the record under construction plus the most recent
//! header (so continuation lines can still be appended to it).
//!
//! # Modes
//!
//! - **Push**: call [`EntryParser::push`] for every line, then
//!   [`EntryParser::finish`] at end of input.
//! - **Pull**: wrap any line iterator with [`parse_lines`] and iterate
//!   [`Entries`].
//! - **Chunked push**: [`ChunkFeeder`] accepts arbitrary text chunks (as read
//!   from a pipe) and keeps the incomplete trailing line in a residual buffer.
//! - **Reader**: [`parse_reader`] pulls lines from any [`BufRead`].
//!
//! All modes produce the same records for the same text.
//!
//! # Irregularities Tolerated
//!
//! - Input that ends inside a message block without a final blank line: the
//!   blank line is synthesized so the last record is still emitted.
//! - A record with no message block at all, where the next `commit` header
//!   follows the header/blank-line pair directly: the current record is
//!   completed with an empty message and the `commit` line starts the next.
//!
//! # Line Input
//!
//! Lines passed to [`EntryParser::push`] must not carry their terminator.
//! Use [`normalize_line`] to strip it and replace stray carriage returns.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::mem;

use tracing::{debug, trace};

use super::{Entry, Signature, SignatureError};
use crate::config::ParserConfig;
use crate::error::ErrorCode;

/// Indent that prefixes every message line.
const MESSAGE_INDENT: &str = "    ";

/// Header line that opens a new record.
const COMMIT_PREFIX: &str = "commit ";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while parsing raw-log lines.
///
/// Every variant carries the 1-based number of the line where the problem
/// was detected. A parse error aborts the record in progress.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Header line without a `<key> <value>` shape.
    #[error("line {line}: header is not '<key> <value>': '{text}'")]
    MalformedHeader { line: usize, text: String },

    /// Continuation line (leading space) with no header before it.
    #[error("line {line}: continuation line has no preceding header")]
    OrphanContinuation { line: usize },

    /// A single-valued header appeared twice in one record.
    #[error("line {line}: duplicate '{key}' header")]
    DuplicateHeader { line: usize, key: String },

    /// Message line not indented by four spaces.
    #[error("line {line}: message line is not indented by four spaces: '{text}'")]
    MalformedMessageLine { line: usize, text: String },

    /// A completed record lacks one of `commit`, `tree`, `author`, `committer`.
    #[error("line {line}: record is missing its '{key}' header")]
    MissingHeader { line: usize, key: &'static str },

    /// `author` / `committer` value that is not `<name> <secs> <±HHMM>`.
    #[error("line {line}: invalid {key} signature: {source}")]
    InvalidSignature {
        line: usize,
        key: String,
        #[source]
        source: SignatureError,
    },
}

impl ParseError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedHeader { .. } => ErrorCode::MalformedHeader,
            Self::OrphanContinuation { .. } => ErrorCode::OrphanContinuation,
            Self::DuplicateHeader { .. } => ErrorCode::DuplicateHeader,
            Self::MalformedMessageLine { .. } => ErrorCode::MalformedMessageLine,
            Self::MissingHeader { .. } => ErrorCode::MissingHeader,
            Self::InvalidSignature { .. } => ErrorCode::InvalidSignature,
        }
    }

    /// Line number the error refers to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::MalformedHeader { line, .. }
            | Self::OrphanContinuation { line }
            | Self::DuplicateHeader { line, .. }
            | Self::MalformedMessageLine { line, .. }
            | Self::MissingHeader { line, .. }
            | Self::InvalidSignature { line, .. } => *line,
        }
    }
}

/// Errors from [`parse_reader`]: either the reader failed or the text did.
#[derive(Debug, thiserror::Error)]
pub enum LogReadError {
    #[error("failed to read commit log: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LogReadError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::LogReadFailed,
            Self::Parse(err) => err.code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Line normalization
// ---------------------------------------------------------------------------

/// Strip one trailing `\n` / `\r\n` and replace any remaining `\r` with a
/// space.
///
/// Borrows when nothing needs replacing.
#[must_use]
pub fn normalize_line(line: &str) -> Cow<'_, str> {
    let trimmed = strip_terminator(line);
    if trimmed.contains('\r') {
        Cow::Owned(trimmed.replace('\r', " "))
    } else {
        Cow::Borrowed(trimmed)
    }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn prepare_line(line: &str, normalize: bool) -> Cow<'_, str> {
    if normalize {
        normalize_line(line)
    } else {
        Cow::Borrowed(strip_terminator(line))
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Where the parser is within the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Between records; blank lines are skipped.
    Initial,
    /// Reading `<key> <value>` header lines.
    BuildingHeaders,
    /// Reading four-space-indented message lines.
    BuildingMessage,
}

/// Most recent header line, kept open so continuation lines can extend it.
#[derive(Debug)]
struct PendingHeader {
    key: String,
    value: String,
    line: usize,
}

/// Record under construction.
#[derive(Debug, Default)]
struct Draft {
    id: Option<String>,
    tree: Option<String>,
    parents: Vec<String>,
    author: Option<Signature>,
    committer: Option<Signature>,
    message: Vec<String>,
    extra: BTreeMap<String, String>,
    started_at: usize,
}

impl Draft {
    fn starting_at(line: usize) -> Self {
        Self {
            started_at: line,
            ..Self::default()
        }
    }

    fn apply(&mut self, header: PendingHeader) -> Result<(), ParseError> {
        let PendingHeader { key, value, line } = header;
        match key.as_str() {
            "commit" => set_once(&mut self.id, value, &key, line),
            "tree" => set_once(&mut self.tree, value, &key, line),
            "parent" => {
                self.parents.push(value);
                Ok(())
            }
            "author" | "committer" => {
                let signature = Signature::parse(&value).map_err(|source| {
                    ParseError::InvalidSignature {
                        line,
                        key: key.clone(),
                        source,
                    }
                })?;
                let slot = if key == "author" {
                    &mut self.author
                } else {
                    &mut self.committer
                };
                set_once(slot, signature, &key, line)
            }
            _ => {
                if self.extra.contains_key(&key) {
                    return Err(ParseError::DuplicateHeader { line, key });
                }
                self.extra.insert(key, value);
                Ok(())
            }
        }
    }

    fn into_entry(self) -> Result<Entry, ParseError> {
        let line = self.started_at;
        let missing = |key| ParseError::MissingHeader { line, key };
        Ok(Entry {
            id: self.id.ok_or_else(|| missing("commit"))?,
            tree: self.tree.ok_or_else(|| missing("tree"))?,
            parents: self.parents,
            author: self.author.ok_or_else(|| missing("author"))?,
            committer: self.committer.ok_or_else(|| missing("committer"))?,
            message: self.message,
            extra: self.extra,
        })
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str, line: usize) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::DuplicateHeader {
            line,
            key: key.to_string(),
        });
    }
    *slot = Some(value);
    Ok(())
}

/// Push-mode raw-log parser.
///
/// Feed lines with [`push`](Self::push); each call yields at most one
/// completed [`Entry`]. Call [`finish`](Self::finish) at end of input to
/// flush the final record.
///
/// After an error the record in progress is discarded and the parser is
/// back in [`ParserState::Initial`].
#[derive(Debug)]
pub struct EntryParser {
    state: ParserState,
    line_no: usize,
    draft: Draft,
    pending: Option<PendingHeader>,
}

impl Default for EntryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ParserState::Initial,
            line_no: 0,
            draft: Draft::default(),
            pending: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ParserState {
        self.state
    }

    /// Number of lines pushed so far.
    #[must_use]
    pub const fn lines_seen(&self) -> usize {
        self.line_no
    }

    /// Feed one line (without its terminator).
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for malformed headers, orphan continuation
    /// lines, duplicate single-valued headers, invalid signatures, missing
    /// required headers, and unindented message lines.
    pub fn push(&mut self, line: &str) -> Result<Option<Entry>, ParseError> {
        self.line_no += 1;
        let result = self.step(line);
        if result.is_err() {
            self.reset();
        }
        result
    }

    /// Signal end of input.
    ///
    /// Synthesizes the missing trailing blank line, so a record whose
    /// message (or header block) runs into end of input is still emitted.
    /// Returns `Ok(None)` when no record was in progress.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the final record is incomplete or its
    /// last header is invalid.
    pub fn finish(&mut self) -> Result<Option<Entry>, ParseError> {
        let result = match self.state {
            ParserState::Initial => Ok(None),
            ParserState::BuildingHeaders | ParserState::BuildingMessage => {
                trace!(line = self.line_no, "synthesizing trailing blank line");
                self.complete().map(Some)
            }
        };
        self.reset();
        result
    }

    fn step(&mut self, line: &str) -> Result<Option<Entry>, ParseError> {
        match self.state {
            ParserState::Initial => {
                if line.is_empty() {
                    return Ok(None);
                }
                self.begin_record();
                self.header_line(line)?;
                Ok(None)
            }
            ParserState::BuildingHeaders => {
                if line.is_empty() {
                    self.flush_pending()?;
                    trace!(line = self.line_no, "headers complete");
                    self.state = ParserState::BuildingMessage;
                } else {
                    self.header_line(line)?;
                }
                Ok(None)
            }
            ParserState::BuildingMessage => {
                if line.is_empty() {
                    let entry = self.complete()?;
                    self.state = ParserState::Initial;
                    return Ok(Some(entry));
                }
                if let Some(text) = line.strip_prefix(MESSAGE_INDENT) {
                    self.draft.message.push(text.to_string());
                    return Ok(None);
                }
                if line.starts_with(COMMIT_PREFIX) {
                    let entry = self.complete()?;
                    debug!(id = %entry.id, "record has no message block");
                    self.begin_record();
                    self.header_line(line)?;
                    return Ok(Some(entry));
                }
                Err(ParseError::MalformedMessageLine {
                    line: self.line_no,
                    text: line.to_string(),
                })
            }
        }
    }

    fn begin_record(&mut self) {
        self.draft = Draft::starting_at(self.line_no);
        self.pending = None;
        self.state = ParserState::BuildingHeaders;
    }

    fn header_line(&mut self, line: &str) -> Result<(), ParseError> {
        let Some((key, value)) = line.split_once(' ') else {
            return Err(ParseError::MalformedHeader {
                line: self.line_no,
                text: line.to_string(),
            });
        };

        if key.is_empty() {
            let Some(pending) = self.pending.as_mut() else {
                return Err(ParseError::OrphanContinuation { line: self.line_no });
            };
            pending.value.push('\n');
            pending.value.push_str(value);
            return Ok(());
        }

        self.flush_pending()?;
        self.pending = Some(PendingHeader {
            key: key.to_string(),
            value: value.to_string(),
            line: self.line_no,
        });
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<(), ParseError> {
        match self.pending.take() {
            Some(header) => self.draft.apply(header),
            None => Ok(()),
        }
    }

    fn complete(&mut self) -> Result<Entry, ParseError> {
        self.flush_pending()?;
        let entry = mem::take(&mut self.draft).into_entry()?;
        trace!(id = %entry.id, parents = entry.parents.len(), "record complete");
        Ok(entry)
    }

    fn reset(&mut self) {
        self.state = ParserState::Initial;
        self.draft = Draft::default();
        self.pending = None;
    }
}

// ---------------------------------------------------------------------------
// Pull mode
// ---------------------------------------------------------------------------

/// Iterator of records parsed from a line iterator.
///
/// Finite and not restartable: after the first error, or after the input is
/// exhausted, it yields `None`.
#[derive(Debug)]
pub struct Entries<I> {
    lines: I,
    parser: EntryParser,
    done: bool,
}

/// Parse records from any sequence of lines (without terminators).
#[must_use]
pub fn parse_lines<I, S>(lines: I) -> Entries<I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Entries {
        lines: lines.into_iter(),
        parser: EntryParser::new(),
        done: false,
    }
}

impl<I, S> Iterator for Entries<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<Entry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for line in self.lines.by_ref() {
            match self.parser.push(line.as_ref()) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        self.done = true;
        self.parser.finish().transpose()
    }
}

// ---------------------------------------------------------------------------
// Chunked push mode
// ---------------------------------------------------------------------------

/// Push-mode parser for raw text chunks.
///
/// Chunks may split lines anywhere; the incomplete tail is held in a
/// residual buffer until its newline arrives (or until [`finish`]).
///
/// [`finish`]: Self::finish
#[derive(Debug)]
pub struct ChunkFeeder {
    parser: EntryParser,
    residual: String,
    normalize: bool,
}

impl Default for ChunkFeeder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkFeeder {
    /// Feeder that normalizes carriage returns.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&ParserConfig::default())
    }

    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            parser: EntryParser::new(),
            residual: String::new(),
            normalize: config.normalize_carriage_returns,
        }
    }

    /// Feed a chunk of text and return every record it completed.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] raised by a complete line in the
    /// chunk. Records completed earlier in the same chunk are discarded.
    pub fn push_chunk(&mut self, chunk: &str) -> Result<Vec<Entry>, ParseError> {
        self.residual.push_str(chunk);

        let mut completed = Vec::new();
        let mut consumed = 0;
        let mut outcome = Ok(());
        while let Some(offset) = self.residual[consumed..].find('\n') {
            let end = consumed + offset + 1;
            let line = prepare_line(&self.residual[consumed..end], self.normalize);
            consumed = end;
            match self.parser.push(&line) {
                Ok(Some(entry)) => completed.push(entry),
                Ok(None) => {}
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        self.residual.drain(..consumed);

        outcome.map(|()| completed)
    }

    /// Flush the residual line, synthesize the trailing blank line, and
    /// return any records that completed.
    ///
    /// # Errors
    ///
    /// Same as [`EntryParser::push`] and [`EntryParser::finish`].
    pub fn finish(&mut self) -> Result<Vec<Entry>, ParseError> {
        let mut completed = Vec::new();
        if !self.residual.is_empty() {
            let tail = mem::take(&mut self.residual);
            let line = prepare_line(&tail, self.normalize);
            if let Some(entry) = self.parser.push(&line)? {
                completed.push(entry);
            }
        }
        if let Some(entry) = self.parser.finish()? {
            completed.push(entry);
        }
        Ok(completed)
    }
}

// ---------------------------------------------------------------------------
// Reader mode
// ---------------------------------------------------------------------------

/// Iterator of records read from a [`BufRead`].
#[derive(Debug)]
pub struct ReaderEntries<R> {
    reader: R,
    buf: String,
    parser: EntryParser,
    normalize: bool,
    done: bool,
}

/// Parse records straight from a reader, one line at a time.
///
/// Honors [`ParserConfig::normalize_carriage_returns`].
#[must_use]
pub fn parse_reader<R: BufRead>(reader: R, config: &ParserConfig) -> ReaderEntries<R> {
    ReaderEntries {
        reader,
        buf: String::new(),
        parser: EntryParser::new(),
        normalize: config.normalize_carriage_returns,
        done: false,
    }
}

impl<R: BufRead> Iterator for ReaderEntries<R> {
    type Item = Result<Entry, LogReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return self.parser.finish().map_err(LogReadError::from).transpose();
                }
                Ok(_) => {
                    let line = prepare_line(&self.buf, self.normalize);
                    match self.parser.push(&line) {
                        Ok(Some(entry)) => return Some(Ok(entry)),
                        Ok(None) => {}
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err.into()));
                        }
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: &str = "author Ada <ada@example.com> 1700000000 +0000";
    const COMMITTER: &str = "committer Ada <ada@example.com> 1700000100 +0000";

    fn header(id: &str, parents: &[&str]) -> Vec<String> {
        let mut lines = vec![format!("commit {id}"), format!("tree t{id}")];
        lines.extend(parents.iter().map(|p| format!("parent {p}")));
        lines.push(AUTHOR.to_string());
        lines.push(COMMITTER.to_string());
        lines
    }

    fn push_all(parser: &mut EntryParser, lines: &[String]) -> Vec<Entry> {
        let mut out = Vec::new();
        for line in lines {
            if let Some(entry) = parser.push(line).expect("push") {
                out.push(entry);
            }
        }
        out
    }

    #[test]
    fn single_record_with_message() {
        let mut lines = header("c1", &[]);
        lines.push(String::new());
        lines.push("    First line".into());
        lines.push("    second line".into());
        lines.push(String::new());

        let mut parser = EntryParser::new();
        let entries = push_all(&mut parser, &lines);
        assert_eq!(entries.len(), 1);
        assert_eq!(parser.state(), ParserState::Initial);
        assert!(parser.finish().expect("finish").is_none());

        let entry = &entries[0];
        assert_eq!(entry.id, "c1");
        assert_eq!(entry.tree, "tc1");
        assert!(entry.parents.is_empty());
        assert_eq!(entry.author.time, 1_700_000_000);
        assert_eq!(entry.committer.time, 1_700_000_100);
        assert_eq!(entry.message, vec!["First line", "second line"]);
    }

    #[test]
    fn parents_accumulate_in_order() {
        let mut lines = header("m", &["p1", "p2", "p3"]);
        lines.push(String::new());
        lines.push(String::new());

        let entries: Vec<Entry> = parse_lines(&lines)
            .collect::<Result<_, _>>()
            .expect("parse");
        assert_eq!(entries[0].parents, vec!["p1", "p2", "p3"]);
        assert!(entries[0].message.is_empty());
    }

    #[test]
    fn states_progress_through_a_record() {
        let mut parser = EntryParser::new();
        assert_eq!(parser.state(), ParserState::Initial);
        parser.push("commit c1").expect("push");
        assert_eq!(parser.state(), ParserState::BuildingHeaders);
        for line in &header("c1", &[])[1..] {
            parser.push(line).expect("push");
        }
        parser.push("").expect("push");
        assert_eq!(parser.state(), ParserState::BuildingMessage);
        parser.push("    msg").expect("push");
        assert!(parser.push("").expect("push").is_some());
        assert_eq!(parser.state(), ParserState::Initial);
        assert_eq!(parser.lines_seen(), 7);
    }

    #[test]
    fn finish_synthesizes_trailing_blank_line() {
        let mut lines = header("c1", &[]);
        lines.push(String::new());
        lines.push("    only line".into());

        let mut parser = EntryParser::new();
        assert!(push_all(&mut parser, &lines).is_empty());
        let entry = parser.finish().expect("finish").expect("entry");
        assert_eq!(entry.message, vec!["only line"]);
        assert_eq!(parser.state(), ParserState::Initial);
    }

    #[test]
    fn commit_line_ends_messageless_record() {
        let mut lines = header("c1", &[]);
        lines.push(String::new());
        lines.extend(header("c2", &["c1"]));
        lines.push(String::new());
        lines.push("    second".into());
        lines.push(String::new());

        let entries: Vec<Entry> = parse_lines(&lines)
            .collect::<Result<_, _>>()
            .expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "c1");
        assert!(entries[0].message.is_empty());
        assert_eq!(entries[1].id, "c2");
        assert_eq!(entries[1].parents, vec!["c1"]);
        assert_eq!(entries[1].message, vec!["second"]);
    }

    #[test]
    fn leading_blank_lines_are_skipped() {
        let mut lines = vec![String::new(), String::new()];
        lines.extend(header("c1", &[]));
        let entries: Vec<Entry> = parse_lines(&lines)
            .collect::<Result<_, _>>()
            .expect("parse");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn continuation_lines_join_with_newline() {
        let mut lines = header("c1", &[]);
        lines.push("gpgsig -----BEGIN PGP SIGNATURE-----".into());
        lines.push(" ".into());
        lines.push(" iQEzBAABCAAdFiEE".into());
        lines.push(" -----END PGP SIGNATURE-----".into());
        lines.push("encoding ISO-8859-1".into());
        lines.push(String::new());
        lines.push("    signed".into());

        let entry = parse_lines(&lines)
            .next()
            .expect("one entry")
            .expect("parse");
        assert_eq!(
            entry.extra["gpgsig"],
            "-----BEGIN PGP SIGNATURE-----\n\niQEzBAABCAAdFiEE\n-----END PGP SIGNATURE-----"
        );
        assert_eq!(entry.extra["encoding"], "ISO-8859-1");
    }

    #[test]
    fn header_without_separator_is_fatal() {
        let mut parser = EntryParser::new();
        parser.push("commit c1").expect("push");
        let err = parser.push("tree").expect_err("must fail");
        assert_eq!(
            err,
            ParseError::MalformedHeader {
                line: 2,
                text: "tree".into()
            }
        );
        assert_eq!(err.code(), ErrorCode::MalformedHeader);
        assert_eq!(parser.state(), ParserState::Initial);
    }

    #[test]
    fn continuation_without_header_is_fatal() {
        let mut parser = EntryParser::new();
        let err = parser.push(" dangling").expect_err("must fail");
        assert_eq!(err, ParseError::OrphanContinuation { line: 1 });
    }

    #[test]
    fn duplicate_single_valued_headers_are_fatal() {
        for dup in ["commit c9", "tree t9", AUTHOR, COMMITTER, "mergetag x"] {
            let mut lines = header("c1", &[]);
            lines.push("mergetag object abc".into());
            lines.push(dup.to_string());
            lines.push(String::new());

            let err = parse_lines(&lines)
                .find_map(Result::err)
                .unwrap_or_else(|| panic!("expected duplicate error for {dup}"));
            assert!(
                matches!(err, ParseError::DuplicateHeader { .. }),
                "unexpected error for {dup}: {err}"
            );
            assert_eq!(err.line(), lines.len() - 1);
        }
    }

    #[test]
    fn unindented_message_line_is_fatal() {
        let mut lines = header("c1", &[]);
        lines.push(String::new());
        lines.push("  two spaces".into());

        let results: Vec<_> = parse_lines(&lines).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0],
            Err(ParseError::MalformedMessageLine {
                line: 6,
                text: "  two spaces".into()
            })
        );
    }

    #[test]
    fn missing_required_header_is_fatal() {
        let lines = ["commit c1", "tree t", AUTHOR, ""];
        let err = parse_lines(lines)
            .next()
            .expect("result")
            .expect_err("missing committer");
        assert_eq!(
            err,
            ParseError::MissingHeader {
                line: 1,
                key: "committer"
            }
        );
    }

    #[test]
    fn invalid_signature_is_fatal() {
        let lines = ["commit c1", "tree t", "author Nobody", COMMITTER, ""];
        let err = parse_lines(lines)
            .next()
            .expect("result")
            .expect_err("bad author");
        assert!(matches!(
            err,
            ParseError::InvalidSignature { line: 3, ref key, .. } if key == "author"
        ));
    }

    #[test]
    fn pull_iterator_stops_after_error() {
        let lines = ["commit c1", "tree", "commit c2"];
        let mut entries = parse_lines(lines);
        assert!(matches!(entries.next(), Some(Err(_))));
        assert!(entries.next().is_none());
        assert!(entries.next().is_none());
    }

    #[test]
    fn normalize_line_strips_terminators_and_carriage_returns() {
        assert_eq!(normalize_line("abc\n"), "abc");
        assert_eq!(normalize_line("abc\r\n"), "abc");
        assert_eq!(normalize_line("a\rb\r\n"), "a b");
        assert!(matches!(normalize_line("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn chunk_feeder_handles_split_lines() {
        let text = format!(
            "{}\n\n    hello\n\n{}\n\n    world",
            header("c1", &[]).join("\n"),
            header("c2", &["c1"]).join("\n"),
        );

        let mut feeder = ChunkFeeder::new();
        let mut entries = Vec::new();
        for chunk in text.as_bytes().chunks(7) {
            let chunk = std::str::from_utf8(chunk).expect("ascii");
            entries.extend(feeder.push_chunk(chunk).expect("chunk"));
        }
        entries.extend(feeder.finish().expect("finish"));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, vec!["hello"]);
        assert_eq!(entries[1].message, vec!["world"]);
    }

    #[test]
    fn chunk_feeder_replaces_carriage_returns() {
        let text = format!(
            "{}\r\n\r\n    a\rb\r\n",
            header("c1", &[]).join("\r\n")
        );
        let mut feeder = ChunkFeeder::new();
        let mut entries = feeder.push_chunk(&text).expect("chunk");
        entries.extend(feeder.finish().expect("finish"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, vec!["a b"]);
    }

    #[test]
    fn reader_mode_matches_pull_mode() {
        let mut lines = header("c1", &[]);
        lines.push(String::new());
        lines.push("    one".into());
        lines.push(String::new());
        lines.extend(header("c2", &["c1"]));
        lines.push(String::new());
        lines.push("    two".into());
        let text = lines.join("\n");

        let from_reader: Vec<Entry> = parse_reader(text.as_bytes(), &ParserConfig::default())
            .collect::<Result<_, _>>()
            .expect("reader");
        let from_lines: Vec<Entry> = parse_lines(&lines)
            .collect::<Result<_, _>>()
            .expect("lines");
        assert_eq!(from_reader, from_lines);
    }

    #[test]
    fn reader_mode_reports_parse_errors() {
        let text = "commit c1\nbogus\n";
        let mut entries = parse_reader(text.as_bytes(), &ParserConfig::default());
        let err = entries.next().expect("result").expect_err("bad header");
        assert_eq!(err.code(), ErrorCode::MalformedHeader);
        assert!(entries.next().is_none());
    }
}
