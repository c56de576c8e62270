use std::fmt;

/// Machine-readable error codes shared by the parser and the graph engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    LogReadFailed,
    MalformedHeader,
    OrphanContinuation,
    DuplicateHeader,
    MalformedMessageLine,
    MissingHeader,
    InvalidSignature,
    DuplicateId,
    MissingParent,
    NodeNotFound,
    KeyNotFound,
    CycleDetected,
    OwnerMismatch,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::LogReadFailed => "E1002",
            Self::MalformedHeader => "E2001",
            Self::OrphanContinuation => "E2002",
            Self::DuplicateHeader => "E2003",
            Self::MalformedMessageLine => "E2004",
            Self::MissingHeader => "E2005",
            Self::InvalidSignature => "E2006",
            Self::DuplicateId => "E3001",
            Self::MissingParent => "E3002",
            Self::NodeNotFound => "E3003",
            Self::KeyNotFound => "E3004",
            Self::CycleDetected => "E4001",
            Self::OwnerMismatch => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::LogReadFailed => "Failed to read commit log",
            Self::MalformedHeader => "Malformed header line",
            Self::OrphanContinuation => "Continuation line without a header",
            Self::DuplicateHeader => "Duplicate single-valued header",
            Self::MalformedMessageLine => "Malformed message line",
            Self::MissingHeader => "Required header missing",
            Self::InvalidSignature => "Invalid author/committer signature",
            Self::DuplicateId => "Duplicate commit identifier",
            Self::MissingParent => "Parent commit not in batch",
            Self::NodeNotFound => "Commit not in graph",
            Self::KeyNotFound => "No value stored for commit",
            Self::CycleDetected => "Commit graph contains a cycle",
            Self::OwnerMismatch => "Node belongs to a different graph",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .lineage/config.toml and retry."),
            Self::LogReadFailed => Some("Check that the log source is readable UTF-8 text."),
            Self::MalformedHeader
            | Self::OrphanContinuation
            | Self::DuplicateHeader
            | Self::MalformedMessageLine
            | Self::MissingHeader
            | Self::InvalidSignature => {
                Some("Produce the log with `git log --all --format=raw` and feed it unmodified.")
            }
            Self::DuplicateId => Some("Deduplicate the batch before building the graph."),
            Self::MissingParent => {
                Some("Include the full history, or enable pruning for partial histories.")
            }
            Self::NodeNotFound | Self::KeyNotFound => None,
            Self::CycleDetected => Some("The input is not a DAG; check how the batch was assembled."),
            Self::OwnerMismatch => {
                Some("Look nodes up in the graph the collection was created for.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 14] = [
        ErrorCode::ConfigParseError,
        ErrorCode::LogReadFailed,
        ErrorCode::MalformedHeader,
        ErrorCode::OrphanContinuation,
        ErrorCode::DuplicateHeader,
        ErrorCode::MalformedMessageLine,
        ErrorCode::MissingHeader,
        ErrorCode::InvalidSignature,
        ErrorCode::DuplicateId,
        ErrorCode::MissingParent,
        ErrorCode::NodeNotFound,
        ErrorCode::KeyNotFound,
        ErrorCode::CycleDetected,
        ErrorCode::OwnerMismatch,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let raw = code.code();
            assert_eq!(raw.len(), 5);
            assert!(raw.starts_with('E'));
            assert!(raw.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(ErrorCode::CycleDetected.to_string(), "E4001");
    }
}
