//! Harvest orchestration and the pipeline entry point.
//!
//! Every registered source is launched at once; the orchestrator suspends
//! only at the join point, so one slow source never delays another's start
//! and one failure never cancels another's in-flight call. Outcomes come
//! back in registry order regardless of completion order — that order, and
//! nothing about timing, feeds the digest.

use futures::future::join_all;

use crate::config::HarvestConfig;
use crate::digest;
use crate::fetch::run_source;
use crate::logging::EventSink;
use crate::policy;
use crate::registry;
use crate::response::{self, HarvestResponse};
use crate::source::{SourceOutcome, SourceSpec, SourceTag};
use crate::transport::{HttpTransport, Transport};

/// All outcomes of one invocation, in registry order.
pub struct HarvestResult {
    pub outcomes: Vec<SourceOutcome>,
}

impl HarvestResult {
    /// Number of sources that did not produce usable bytes.
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.ok).count()
    }

    /// Whether the external randomness anchor succeeded.
    pub fn anchor_ok(&self) -> bool {
        self.tag_ok(SourceTag::Anchor)
    }

    /// Whether the local CSPRNG sample succeeded.
    pub fn local_ok(&self) -> bool {
        self.tag_ok(SourceTag::Local)
    }

    /// Whether at least one Radar-group source succeeded.
    pub fn radar_ok(&self) -> bool {
        self.tag_ok(SourceTag::Radar)
    }

    /// Total bytes across successful sources.
    pub fn successful_bytes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).map(|o| o.bytes).sum()
    }

    fn tag_ok(&self, tag: SourceTag) -> bool {
        self.outcomes.iter().any(|o| o.ok && o.has_tag(tag))
    }
}

/// Run every source concurrently and wait for all terminal outcomes.
pub async fn harvest(
    transport: &dyn Transport,
    specs: &[SourceSpec],
    config: &HarvestConfig,
    sink: &dyn EventSink,
) -> HarvestResult {
    sink.event("harvest.start", &[("sources", specs.len().to_string())]);

    // join_all preserves input order, which is what makes registry order
    // the concatenation order.
    let outcomes = join_all(
        specs
            .iter()
            .map(|spec| run_source(transport, spec, config, sink)),
    )
    .await;

    let result = HarvestResult { outcomes };
    sink.event(
        "harvest.done",
        &[
            ("failed", result.failed_count().to_string()),
            ("bytes", result.successful_bytes().to_string()),
        ],
    );
    result
}

/// The single operation the core exposes: harvest the default registry,
/// apply the policy, and either hash or classify the failure.
///
/// Returns an HTTP-style status (200 or 500) paired with the JSON-ready
/// result object.
pub async fn harvest_and_hash_with(
    transport: &dyn Transport,
    config: &HarvestConfig,
    sink: &dyn EventSink,
) -> (u16, HarvestResponse) {
    let specs = registry::default_registry();
    let result = harvest(transport, &specs, config, sink).await;

    match policy::evaluate(&result) {
        Err(reason) => {
            sink.event("policy.fail", &[("error", reason.to_string())]);
            response::failure(&result, reason)
        }
        Ok(()) => {
            let buffer = digest::concat_successful(&result.outcomes);
            let digest = digest::compute_digest(&buffer, config.force_soft_digest);
            sink.event(
                "digest.done",
                &[
                    ("provider", digest.provider.to_string()),
                    ("preimage_bytes", buffer.len().to_string()),
                ],
            );
            response::success(&result, &digest)
        }
    }
}

/// [`harvest_and_hash_with`] over a fresh production transport. Every
/// invocation starts cold — no connection or cache state is carried over.
pub async fn harvest_and_hash(
    config: &HarvestConfig,
    sink: &dyn EventSink,
) -> (u16, HarvestResponse) {
    match HttpTransport::new(config.source_timeout) {
        Ok(transport) => harvest_and_hash_with(&transport, config, sink).await,
        Err(err) => {
            sink.event("harvest.fail", &[("error", err.to_string())]);
            (
                500,
                HarvestResponse {
                    success: false,
                    sources: Vec::new(),
                    error_source_count: 0,
                    digest_hex: None,
                    digest_base64: None,
                    digest_provider: None,
                    error: Some(err.to_string()),
                },
            )
        }
    }
}
