//! The ordered source registry.
//!
//! Registry order is the concatenation order — the only ordering that may
//! influence the digest. Completion order is irrelevant by contract.
//!
//! Endpoint URLs are configuration data; these are the defaults the service
//! ships with. The local CSPRNG sample always comes first so the digest
//! preimage starts with bytes no external observer controls.

use crate::source::{SourceKind, SourceSpec, SourceTag};

/// Identifier of the local CSPRNG source.
pub const LOCAL_SOURCE_ID: &str = "local_csprng";
/// Identifier of the mandatory external randomness anchor.
pub const ANCHOR_SOURCE_ID: &str = "drand";

/// Descending item-count limits for the Radar ranking endpoint: ask for the
/// richest dataset first, settle for less if the endpoint rejects the size.
pub const RADAR_RANKING_TIERS: &[usize] = &[512, 256, 128];

fn radar_ranking_url(limit: usize) -> String {
    format!("https://api.cloudflare.com/client/v4/radar/ranking/top?limit={limit}&format=json")
}

/// Build the default registry, in concatenation order.
pub fn default_registry() -> Vec<SourceSpec> {
    vec![
        SourceSpec {
            id: LOCAL_SOURCE_ID,
            kind: SourceKind::Local,
            tags: &[SourceTag::Local],
            required: true,
            needs_credential: false,
            validator: None,
        },
        SourceSpec {
            id: ANCHOR_SOURCE_ID,
            kind: SourceKind::Plain {
                url: "https://api.drand.sh/public/latest".to_string(),
            },
            tags: &[SourceTag::Anchor],
            required: true,
            needs_credential: false,
            validator: Some(validate_drand),
        },
        SourceSpec {
            id: "radar_ranking",
            kind: SourceKind::Tiered {
                tiers: RADAR_RANKING_TIERS,
                url_for: radar_ranking_url,
            },
            tags: &[SourceTag::Radar],
            required: true,
            needs_credential: true,
            validator: Some(validate_radar),
        },
        SourceSpec {
            id: "radar_attacks",
            kind: SourceKind::Plain {
                url: "https://api.cloudflare.com/client/v4/radar/attacks/layer7/summary/vector"
                    .to_string(),
            },
            tags: &[SourceTag::Radar],
            required: true,
            needs_credential: true,
            validator: Some(validate_radar),
        },
        SourceSpec {
            id: "nist_beacon",
            kind: SourceKind::Plain {
                url: "https://beacon.nist.gov/beacon/2.0/pulse/last".to_string(),
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator: Some(validate_nist),
        },
        SourceSpec {
            id: "blockchain_tip",
            kind: SourceKind::Plain {
                url: "https://blockchain.info/q/latesthash".to_string(),
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator: None,
        },
        SourceSpec {
            id: "usgs_quakes",
            kind: SourceKind::Plain {
                url: "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson"
                    .to_string(),
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator: None,
        },
        SourceSpec {
            id: "wikimedia_recent",
            kind: SourceKind::Plain {
                url: "https://en.wikipedia.org/w/api.php?action=query&list=recentchanges&rcprop=title%7Cids%7Ctimestamp&rclimit=50&format=json"
                    .to_string(),
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator: None,
        },
        SourceSpec {
            id: "hn_topstories",
            kind: SourceKind::Plain {
                url: "https://hacker-news.firebaseio.com/v0/topstories.json".to_string(),
            },
            tags: &[],
            required: false,
            needs_credential: false,
            validator: None,
        },
    ]
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------
//
// Validators are sanity checks, not format enforcers: a body that does not
// parse as JSON is accepted as raw payload.

fn validate_drand(body: &str) -> Result<(), String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    match value.get("randomness").and_then(|r| r.as_str()) {
        Some(r) if !r.is_empty() => Ok(()),
        _ => Err("drand pulse missing randomness field".to_string()),
    }
}

fn validate_radar(body: &str) -> Result<(), String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    match value.get("success").and_then(|s| s.as_bool()) {
        Some(false) => Err("radar response reported success=false".to_string()),
        _ => Ok(()),
    }
}

fn validate_nist(body: &str) -> Result<(), String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    match value
        .get("pulse")
        .and_then(|p| p.get("outputValue"))
        .and_then(|o| o.as_str())
    {
        Some(o) if !o.is_empty() => Ok(()),
        _ => Err("beacon pulse missing outputValue".to_string()),
    }
}
