//! Compact, lossy projection of an [`Entry`].
//!
//! A [`Summary`] replaces string identifiers with 63-bit integer tags,
//! collapses author/committer into one timestamp, and keeps only the
//! message subject. Graph work over summaries avoids string hashing and
//! most allocation.
//!
//! # Collision Risk
//!
//! A tag is the first 16 hex digits of the identifier with the top bit
//! cleared. That is not collision-free: adversarial inputs or very large
//! histories can map two commits to the same tag, in which case graph
//! construction reports a duplicate id. Use summaries only where exact
//! resolution is not required for correctness.

use serde::{Deserialize, Serialize};

use super::Entry;
use crate::seed::Seed;

/// Mask that keeps a tag non-negative when viewed as `i64`.
const TAG_MASK: u64 = i64::MAX as u64;

/// Number of leading hex digits folded into a tag.
const TAG_HEX_DIGITS: usize = 16;

/// Condense an identifier into a 63-bit tag.
///
/// Identifiers with at least 16 leading hex digits use those digits
/// directly. Anything else (short or non-hex ids) is folded through BLAKE3.
#[must_use]
pub fn tag_for(id: &str) -> u64 {
    let prefix = id.get(..TAG_HEX_DIGITS);
    let hex = prefix.and_then(|p| u64::from_str_radix(p, 16).ok());
    let raw = hex.unwrap_or_else(|| {
        let digest = blake3::hash(id.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_be_bytes(head)
    });
    raw & TAG_MASK
}

/// Compact commit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Summary {
    /// 63-bit identifier tag.
    pub tag: u64,
    /// Parent tags in declared order.
    pub parents: Vec<u64>,
    /// Later of the author and committer timestamps.
    pub time: i64,
    /// First message line.
    pub subject: String,
}

impl From<&Entry> for Summary {
    fn from(entry: &Entry) -> Self {
        Self {
            tag: tag_for(&entry.id),
            parents: entry.parents.iter().map(|p| tag_for(p)).collect(),
            time: entry.latest_time(),
            subject: entry.subject().to_string(),
        }
    }
}

impl From<Entry> for Summary {
    fn from(entry: Entry) -> Self {
        Self::from(&entry)
    }
}

impl Seed for Summary {
    type Id = u64;

    fn id(&self) -> &u64 {
        &self.tag
    }

    fn parents(&self) -> &[u64] {
        &self.parents
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::entry::Signature;

    #[test]
    fn hex_id_uses_leading_digits() {
        let id = "8000000000000001ffffffffffffffffffffffff";
        // Top bit of 0x8000_0000_0000_0001 is cleared.
        assert_eq!(tag_for(id), 1);

        let id = "0123456789abcdef0000000000000000deadbeef";
        assert_eq!(tag_for(id), 0x0123_4567_89ab_cdef);
    }

    #[test]
    fn short_or_non_hex_ids_still_get_non_negative_tags() {
        for id in ["c1", "not-a-hash-at-all-really", ""] {
            let tag = tag_for(id);
            assert!(i64::try_from(tag).is_ok(), "tag for {id:?} must fit i64");
        }
        assert_eq!(tag_for("c1"), tag_for("c1"));
        assert_ne!(tag_for("c1"), tag_for("c2"));
    }

    #[test]
    fn summary_collapses_entry() {
        let entry = Entry {
            id: "aaaaaaaaaaaaaaaa0000000000000000000000aa".into(),
            tree: "t".into(),
            parents: vec!["bbbbbbbbbbbbbbbb0000000000000000000000bb".into()],
            author: Signature::new("A <a>", 100, 0),
            committer: Signature::new("C <c>", 50, 0),
            message: vec!["subject".into(), "body".into()],
            extra: BTreeMap::new(),
        };

        let summary = Summary::from(&entry);
        assert_eq!(summary.tag, 0x2aaa_aaaa_aaaa_aaaa);
        assert_eq!(summary.parents, vec![0x3bbb_bbbb_bbbb_bbbb]);
        assert_eq!(summary.time, 100);
        assert_eq!(summary.subject, "subject");
        assert_eq!(*Seed::id(&summary), summary.tag);
    }
}
