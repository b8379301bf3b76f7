//! Error taxonomy for the Panchang pipeline.
//!
//! Only two kinds of failure are distinguished, and neither is ever surfaced
//! to an API caller: `FormatError` stays inside the time utilities, and
//! `SourceError` makes the assembler fall through to the calculated path.

use thiserror::Error;

// ---

/// A clock string that does not match `H:MM` / `HH:MM` with in-range parts.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed clock time {input:?}: expected H:MM or HH:MM")]
pub struct FormatError {
    pub input: String,
}

/// Transport-level failure talking to the external Panchang authority site.
///
/// `Timeout` is a specific `Unavailable` cause, kept separate only so logs
/// can tell the two apart. Missing fields in an otherwise successful fetch
/// are never an error; the extractor just returns a sparse map.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("panchang source unavailable: {0}")]
    Unavailable(String),

    #[error("panchang source timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },
}
