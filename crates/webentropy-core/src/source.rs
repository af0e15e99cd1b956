//! Source definitions and the per-source outcome record.
//!
//! Sources are heterogeneous — a local CSPRNG sample, plain HTTP endpoints,
//! and one endpoint fetched through a tiered size fallback — but every one of
//! them reduces to exactly one [`SourceOutcome`] per invocation. The
//! orchestrator only ever sees the uniform record.

use serde::{Deserialize, Serialize};

/// Category label attached to a source. Labels are not mutually exclusive;
/// the policy engine keys off them to decide mandatoriness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Produced on this machine with no network dependency.
    Local,
    /// The externally-sourced randomness anchor (drand).
    Anchor,
    /// Member of the Radar ranking-aggregate group.
    Radar,
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Anchor => write!(f, "anchor"),
            Self::Radar => write!(f, "radar"),
        }
    }
}

/// Domain-specific sanity check over a response body.
///
/// A validator receives the raw body text and may reject it with a message.
/// Bodies that do not parse as the structure a validator expects must be
/// accepted — validators guard semantics, they do not enforce formats.
pub type Validator = fn(&str) -> Result<(), String>;

/// How a source's bytes are obtained.
pub enum SourceKind {
    /// A sample from the OS CSPRNG; length comes from the harvest config.
    Local,
    /// One GET against a fixed URL.
    Plain { url: String },
    /// The same logical endpoint tried at descending item-count limits,
    /// first success wins.
    Tiered {
        tiers: &'static [usize],
        url_for: fn(usize) -> String,
    },
}

/// One registry entry: a logical source and how to drive it.
pub struct SourceSpec {
    /// Stable identifier, unique within the registry.
    pub id: &'static str,
    pub kind: SourceKind,
    pub tags: &'static [SourceTag],
    /// Advisory flag surfaced in diagnostics. The policy engine decides real
    /// mandatoriness by tag, never by this field.
    pub required: bool,
    /// Whether the request must carry the Radar bearer credential. Sources
    /// with this set fail immediately when no credential is configured.
    pub needs_credential: bool,
    pub validator: Option<Validator>,
}

/// Terminal result of one source for one invocation.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub id: String,
    /// True only if the call (or local generation) succeeded AND the
    /// validator, if any, accepted the body.
    pub ok: bool,
    /// Raw payload, present iff `ok`. Never serialized; the response
    /// assembler strips it before anything leaves the pipeline.
    pub data: Option<Vec<u8>>,
    /// Length of `data`, or 0 on failure.
    pub bytes: usize,
    /// Wall-clock time of the attempt that produced this outcome.
    pub duration_ms: u64,
    pub tags: Vec<SourceTag>,
    pub required: bool,
    /// Human-readable failure reason, present iff `!ok`.
    pub error: Option<String>,
    /// HTTP status, present whenever a response was received — on failures
    /// with non-success status codes as well as on validator rejections.
    pub status: Option<u16>,
}

impl SourceOutcome {
    pub fn success(
        id: &str,
        data: Vec<u8>,
        duration_ms: u64,
        tags: &[SourceTag],
        required: bool,
        status: Option<u16>,
    ) -> Self {
        let bytes = data.len();
        Self {
            id: id.to_string(),
            ok: true,
            data: Some(data),
            bytes,
            duration_ms,
            tags: tags.to_vec(),
            required,
            error: None,
            status,
        }
    }

    pub fn failure(
        id: &str,
        error: String,
        duration_ms: u64,
        tags: &[SourceTag],
        required: bool,
        status: Option<u16>,
    ) -> Self {
        Self {
            id: id.to_string(),
            ok: false,
            data: None,
            bytes: 0,
            duration_ms,
            tags: tags.to_vec(),
            required,
            error: Some(error),
            status,
        }
    }

    pub fn has_tag(&self, tag: SourceTag) -> bool {
        self.tags.contains(&tag)
    }
}
