//! Commit records produced by the raw-log parser.
//!
//! This module defines [`Entry`], the full record for one commit, its
//! [`Signature`] (author / committer), and the lossy [`Summary`] projection
//! used for cheaper graph work.
//!
//! # Raw Log Format
//!
//! Records come from `git log --all --format=raw` style output:
//!
//! ```text
//! commit <id>
//! tree <id>
//! parent <id>            (0..N lines)
//! author <name> <unix-seconds> <±HHMM>
//! committer <name> <unix-seconds> <±HHMM>
//! <extra-key> <value>    (0..N lines)
//!
//!     <message line>     (4-space indented, 0..N lines)
//!
//! ```
//!
//! Parsing lives in [`parser`]; the inverse direction lives in [`writer`].

pub mod parser;
pub mod summary;
pub mod writer;

pub use parser::{
    ChunkFeeder, Entries, EntryParser, LogReadError, ParseError, normalize_line, parse_lines,
    parse_reader,
};
pub use summary::{Summary, tag_for};
pub use writer::{to_raw_lines, write_entry, write_log};

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::seed::Seed;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Author or committer of a commit.
///
/// `name` keeps everything before the timestamp verbatim, so it normally
/// includes the `<email>` part as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Name (and email) exactly as it appears in the log.
    pub name: String,
    /// Seconds since the Unix epoch.
    pub time: i64,
    /// Timezone offset from UTC in minutes (`+0130` is `90`).
    pub offset_minutes: i32,
}

/// Reasons a signature value fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("expected '<name> <unix-seconds> <±HHMM>'")]
    Shape,
    #[error("timestamp is not an integer: '{0}'")]
    Timestamp(String),
    #[error("timezone is not ±HHMM: '{0}'")]
    Timezone(String),
}

impl Signature {
    #[must_use]
    pub fn new(name: impl Into<String>, time: i64, offset_minutes: i32) -> Self {
        Self {
            name: name.into(),
            time,
            offset_minutes,
        }
    }

    /// Parse `"<name> <unix-seconds> <±HHMM>"`.
    ///
    /// The name may contain spaces; the last two space-separated tokens are
    /// the timestamp and the offset.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] when either trailing token is malformed.
    pub fn parse(value: &str) -> Result<Self, SignatureError> {
        let mut parts = value.rsplitn(3, ' ');
        let (Some(zone), Some(secs), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SignatureError::Shape);
        };

        let time = secs
            .parse::<i64>()
            .map_err(|_| SignatureError::Timestamp(secs.to_string()))?;
        let offset_minutes =
            parse_offset(zone).ok_or_else(|| SignatureError::Timezone(zone.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            time,
            offset_minutes,
        })
    }

    /// The timestamp in the signer's own timezone.
    ///
    /// Returns `None` when the timestamp or offset is outside what chrono
    /// can represent.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.offset_minutes.checked_mul(60)?)?;
        let utc = DateTime::from_timestamp(self.time, 0)?;
        Some(utc.with_timezone(&offset))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.offset_minutes < 0 { '-' } else { '+' };
        let abs = self.offset_minutes.unsigned_abs();
        write!(
            f,
            "{} {} {}{:02}{:02}",
            self.name,
            self.time,
            sign,
            abs / 60,
            abs % 60
        )
    }
}

/// Parse a `±HHMM` offset into minutes.
fn parse_offset(zone: &str) -> Option<i32> {
    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One commit as read from the raw log.
///
/// Parent identifiers are opaque: they may name records that appear later
/// in the stream, or records that are not in the batch at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Commit identifier (conventionally 40 hex digits).
    pub id: String,
    /// Tree identifier.
    pub tree: String,
    /// Parent identifiers in declared order. Empty for a root commit.
    pub parents: Vec<String>,
    pub author: Signature,
    pub committer: Signature,
    /// Message lines with the four-space indent removed.
    pub message: Vec<String>,
    /// Any other header keys, e.g. `gpgsig` or `encoding`.
    ///
    /// Multi-line values are joined with `\n`.
    pub extra: BTreeMap<String, String>,
}

impl Entry {
    /// First message line, or `""` when the message is empty.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// The later of the author and committer timestamps.
    #[must_use]
    pub fn latest_time(&self) -> i64 {
        self.author.time.max(self.committer.time)
    }
}

impl Seed for Entry {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn parents(&self) -> &[String] {
        &self.parents
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.subject())
    }
}
