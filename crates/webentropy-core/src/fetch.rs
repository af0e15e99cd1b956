//! The uniform source driver: single-source fetch, tiered fallback, local
//! generation.
//!
//! Every [`SourceSpec`] variant funnels through [`run_source`], which always
//! returns exactly one [`SourceOutcome`] — success or classified failure —
//! and never escalates a per-source problem into a process error.

use std::time::Instant;

use crate::config::HarvestConfig;
use crate::logging::EventSink;
use crate::source::{SourceKind, SourceOutcome, SourceSpec, Validator};
use crate::transport::Transport;

/// Drive one registered source to its terminal outcome.
pub async fn run_source(
    transport: &dyn Transport,
    spec: &SourceSpec,
    config: &HarvestConfig,
    sink: &dyn EventSink,
) -> SourceOutcome {
    let outcome = match &spec.kind {
        SourceKind::Local => generate_local(spec, config.local_sample_bytes),
        SourceKind::Plain { url } => match credential_headers(spec, config) {
            Ok(headers) => fetch_once(transport, spec, url, &headers, spec.validator).await,
            Err(outcome) => outcome,
        },
        SourceKind::Tiered { tiers, url_for } => match credential_headers(spec, config) {
            Ok(headers) => fetch_tiered(transport, spec, tiers, *url_for, &headers).await,
            Err(outcome) => outcome,
        },
    };

    emit(sink, &outcome);
    outcome
}

/// Resolve the bearer credential for sources that need one. A missing
/// credential is a terminal outcome, decided before any network I/O.
fn credential_headers(
    spec: &SourceSpec,
    config: &HarvestConfig,
) -> Result<Vec<(String, String)>, SourceOutcome> {
    if !spec.needs_credential {
        return Ok(Vec::new());
    }
    match &config.radar_token {
        Some(token) => Ok(vec![(
            "Authorization".to_string(),
            format!("Bearer {token}"),
        )]),
        None => Err(SourceOutcome::failure(
            spec.id,
            "radar API credential not configured".to_string(),
            0,
            spec.tags,
            spec.required,
            None,
        )),
    }
}

/// One timeout-bound call, classified into the uniform outcome record.
async fn fetch_once(
    transport: &dyn Transport,
    spec: &SourceSpec,
    url: &str,
    headers: &[(String, String)],
    validator: Option<Validator>,
) -> SourceOutcome {
    let start = Instant::now();
    let response = match transport.get(url, headers).await {
        Ok(response) => response,
        Err(err) => {
            return SourceOutcome::failure(
                spec.id,
                err.to_string(),
                elapsed_ms(start),
                spec.tags,
                spec.required,
                None,
            );
        }
    };

    if !response.is_success() {
        return SourceOutcome::failure(
            spec.id,
            format!("HTTP {}", response.status),
            elapsed_ms(start),
            spec.tags,
            spec.required,
            Some(response.status),
        );
    }

    if let Some(validate) = validator
        && let Err(reason) = validate(&response.body)
    {
        return SourceOutcome::failure(
            spec.id,
            reason,
            elapsed_ms(start),
            spec.tags,
            spec.required,
            Some(response.status),
        );
    }

    SourceOutcome::success(
        spec.id,
        response.body.into_bytes(),
        elapsed_ms(start),
        spec.tags,
        spec.required,
        Some(response.status),
    )
}

/// Try descending tiers sequentially: first success wins, otherwise the
/// outcome of the last attempted tier stands, so diagnostics describe the
/// final, most-constrained attempt.
async fn fetch_tiered(
    transport: &dyn Transport,
    spec: &SourceSpec,
    tiers: &[usize],
    url_for: fn(usize) -> String,
    headers: &[(String, String)],
) -> SourceOutcome {
    let mut last: Option<SourceOutcome> = None;
    for &limit in tiers {
        let url = url_for(limit);
        let outcome = fetch_once(transport, spec, &url, headers, spec.validator).await;
        if outcome.ok {
            return outcome;
        }
        last = Some(outcome);
    }
    last.unwrap_or_else(|| {
        SourceOutcome::failure(
            spec.id,
            "no tiers configured".to_string(),
            0,
            spec.tags,
            spec.required,
            None,
        )
    })
}

/// Local CSPRNG sample. A platform without a usable secure-random primitive
/// yields a source failure, not a crash — the policy engine decides whether
/// that is fatal.
fn generate_local(spec: &SourceSpec, n: usize) -> SourceOutcome {
    let start = Instant::now();
    let mut buf = vec![0u8; n];
    match getrandom::fill(&mut buf) {
        Ok(()) => SourceOutcome::success(spec.id, buf, elapsed_ms(start), spec.tags, spec.required, None),
        Err(err) => SourceOutcome::failure(
            spec.id,
            format!("OS CSPRNG unavailable: {err}"),
            elapsed_ms(start),
            spec.tags,
            spec.required,
            None,
        ),
    }
}

fn emit(sink: &dyn EventSink, outcome: &SourceOutcome) {
    if outcome.ok {
        sink.event(
            "source.ok",
            &[
                ("id", outcome.id.clone()),
                ("bytes", outcome.bytes.to_string()),
                ("duration_ms", outcome.duration_ms.to_string()),
            ],
        );
    } else {
        sink.event(
            "source.fail",
            &[
                ("id", outcome.id.clone()),
                (
                    "error",
                    outcome.error.clone().unwrap_or_else(|| "unknown".to_string()),
                ),
                ("duration_ms", outcome.duration_ms.to_string()),
            ],
        );
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NullSink;
    use crate::source::SourceTag;
    use crate::transport::testing::MockTransport;
    use crate::transport::TransportError;
    use std::time::Duration;

    fn plain_spec(id: &'static str, url: &str, validator: Option<Validator>) -> SourceSpec {
        SourceSpec {
            id,
            kind: SourceKind::Plain {
                url: url.to_string(),
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator,
        }
    }

    fn reject_short(body: &str) -> Result<(), String> {
        if body.len() < 4 {
            Err("body too short".to_string())
        } else {
            Ok(())
        }
    }

    #[tokio::test]
    async fn plain_success_carries_body_bytes() {
        let t = MockTransport::new().ok("feed", 200, "abcdef");
        let spec = plain_spec("feed", "https://example.com/feed", None);
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(o.ok);
        assert_eq!(o.bytes, 6);
        assert_eq!(o.data.as_deref(), Some(b"abcdef".as_slice()));
        assert_eq!(o.status, Some(200));
    }

    #[tokio::test]
    async fn transport_error_is_recorded_without_status() {
        let t = MockTransport::new().fail("feed", TransportError::Failed("dns error".into()));
        let spec = plain_spec("feed", "https://example.com/feed", None);
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(!o.ok);
        assert_eq!(o.bytes, 0);
        assert_eq!(o.error.as_deref(), Some("dns error"));
        assert!(o.status.is_none());
    }

    #[tokio::test]
    async fn timeout_is_a_classified_failure() {
        let t = MockTransport::new().fail(
            "feed",
            TransportError::TimedOut(Duration::from_millis(5000)),
        );
        let spec = plain_spec("feed", "https://example.com/feed", None);
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(!o.ok);
        assert_eq!(o.error.as_deref(), Some("timed out after 5000 ms"));
    }

    #[tokio::test]
    async fn http_error_status_is_kept() {
        let t = MockTransport::new().ok("feed", 503, "overloaded");
        let spec = plain_spec("feed", "https://example.com/feed", None);
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(!o.ok);
        assert_eq!(o.error.as_deref(), Some("HTTP 503"));
        assert_eq!(o.status, Some(503));
    }

    #[tokio::test]
    async fn validator_rejection_fails_the_source_but_keeps_status() {
        let t = MockTransport::new().ok("feed", 200, "ab");
        let spec = plain_spec("feed", "https://example.com/feed", Some(reject_short));
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(!o.ok);
        assert_eq!(o.bytes, 0);
        assert_eq!(o.error.as_deref(), Some("body too short"));
        assert_eq!(o.status, Some(200));
    }

    #[tokio::test]
    async fn tiered_stops_at_first_success() {
        fn url_for(limit: usize) -> String {
            format!("https://example.com/rank?limit={limit}")
        }
        // 512 and 256 rejected, 128 succeeds.
        let t = MockTransport::new()
            .ok("limit=512", 400, "too big")
            .ok("limit=256", 400, "too big")
            .ok("limit=128", 200, "payload");
        let spec = SourceSpec {
            id: "rank",
            kind: SourceKind::Tiered {
                tiers: &[512, 256, 128],
                url_for,
            },
            tags: &[SourceTag::Radar],
            required: true,
            needs_credential: false,
            validator: None,
        };
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(o.ok);
        assert_eq!(o.data.as_deref(), Some(b"payload".as_slice()));
        assert_eq!(t.requested("limit="), 3);
    }

    #[tokio::test]
    async fn tiered_does_not_continue_past_a_success() {
        fn url_for(limit: usize) -> String {
            format!("https://example.com/rank?limit={limit}")
        }
        let t = MockTransport::new().ok("limit=", 200, "rich");
        let spec = SourceSpec {
            id: "rank",
            kind: SourceKind::Tiered {
                tiers: &[512, 256, 128],
                url_for,
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator: None,
        };
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(o.ok);
        assert_eq!(t.requested("limit="), 1, "no tier may run after a success");
        assert_eq!(t.requested("limit=512"), 1);
    }

    #[tokio::test]
    async fn tiered_all_failing_returns_the_last_tier() {
        fn url_for(limit: usize) -> String {
            format!("https://example.com/rank?limit={limit}")
        }
        let t = MockTransport::new()
            .fail("limit=512", TransportError::Failed("reset by peer".into()))
            .ok("limit=256", 500, "boom")
            .ok("limit=128", 429, "slow down");
        let spec = SourceSpec {
            id: "rank",
            kind: SourceKind::Tiered {
                tiers: &[512, 256, 128],
                url_for,
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator: None,
        };
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(!o.ok);
        // Exactly the last tier's failure, not an earlier one.
        assert_eq!(o.error.as_deref(), Some("HTTP 429"));
        assert_eq!(o.status, Some(429));
        assert_eq!(t.requested("limit="), 3);
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network_io() {
        let t = MockTransport::new().ok("radar", 200, "{}");
        let spec = SourceSpec {
            id: "radar_attacks",
            kind: SourceKind::Plain {
                url: "https://api.cloudflare.com/radar/attacks".to_string(),
            },
            tags: &[SourceTag::Radar],
            required: true,
            needs_credential: true,
            validator: None,
        };
        let config = HarvestConfig::default(); // no token
        let o = run_source(&t, &spec, &config, &NullSink).await;
        assert!(!o.ok);
        assert_eq!(o.error.as_deref(), Some("radar API credential not configured"));
        assert_eq!(t.requested("radar"), 0, "credential gate must precede I/O");
    }

    #[tokio::test]
    async fn local_generator_yields_the_configured_sample() {
        let t = MockTransport::new();
        let spec = SourceSpec {
            id: "local_csprng",
            kind: SourceKind::Local,
            tags: &[SourceTag::Local],
            required: true,
            needs_credential: false,
            validator: None,
        };
        let o = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert!(o.ok);
        assert_eq!(o.bytes, 64);
        assert!(o.status.is_none());
        // Two samples must differ — the CSPRNG is not a constant.
        let o2 = run_source(&t, &spec, &HarvestConfig::default(), &NullSink).await;
        assert_ne!(o.data, o2.data);
    }
}
