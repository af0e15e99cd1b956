//! Response assembly.
//!
//! Converts pipeline state into the externally visible result object. Raw
//! payloads never appear here — diagnostics carry byte counts, not bytes —
//! and failure responses carry no digest fields at all, not a placeholder.

use serde::{Deserialize, Serialize};

use crate::digest::DigestResult;
use crate::harvest::HarvestResult;
use crate::policy::PolicyFailure;
use crate::source::{SourceOutcome, SourceTag};

/// Externally visible per-source diagnostics: everything in the outcome
/// record except the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub id: String,
    pub ok: bool,
    pub bytes: usize,
    pub duration_ms: u64,
    pub tags: Vec<SourceTag>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&SourceOutcome> for SourceReport {
    fn from(outcome: &SourceOutcome) -> Self {
        Self {
            id: outcome.id.clone(),
            ok: outcome.ok,
            bytes: outcome.bytes,
            duration_ms: outcome.duration_ms,
            tags: outcome.tags.clone(),
            required: outcome.required,
            error: outcome.error.clone(),
            status: outcome.status,
        }
    }
}

/// The final result object for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestResponse {
    pub success: bool,
    pub sources: Vec<SourceReport>,
    /// Number of sources that failed, success path included.
    pub error_source_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn reports(result: &HarvestResult) -> Vec<SourceReport> {
    result.outcomes.iter().map(SourceReport::from).collect()
}

/// Assemble the success response.
pub fn success(result: &HarvestResult, digest: &DigestResult) -> (u16, HarvestResponse) {
    (
        200,
        HarvestResponse {
            success: true,
            sources: reports(result),
            error_source_count: result.failed_count(),
            digest_hex: Some(digest.hex.clone()),
            digest_base64: Some(digest.base64.clone()),
            digest_provider: Some(digest.provider.to_string()),
            error: None,
        },
    )
}

/// Assemble the terminal failure response.
pub fn failure(result: &HarvestResult, failure: PolicyFailure) -> (u16, HarvestResponse) {
    (
        500,
        HarvestResponse {
            success: false,
            sources: reports(result),
            error_source_count: result.failed_count(),
            digest_hex: None,
            digest_base64: None,
            digest_provider: None,
            error: Some(failure.to_string()),
        },
    )
}
