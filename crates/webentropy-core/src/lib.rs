//! # webentropy-core
//!
//! **One request in, one verifiable freshness digest out.**
//!
//! `webentropy-core` harvests byte payloads from a fixed registry of public
//! internet beacons — the drand randomness anchor, the Cloudflare Radar
//! ranking aggregate, seismic and blockchain feeds — mixes in a local
//! CSPRNG sample, and reduces the survivors to a single SHA-256 digest with
//! deterministic byte ordering.
//!
//! ## Quick Start
//!
//! ```no_run
//! use webentropy_core::{harvest_and_hash, HarvestConfig, LogSink};
//!
//! # async fn demo() {
//! let config = HarvestConfig::from_env();
//! let (status, body) = harvest_and_hash(&config, &LogSink).await;
//! assert!(status == 200 || status == 500);
//! if let Some(hex) = &body.digest_hex {
//!     println!("freshness token: {hex}");
//! }
//! # }
//! ```
//!
//! ## Architecture
//!
//! Registry → concurrent fetch → policy → concatenate → digest → response
//!
//! Every source yields exactly one [`SourceOutcome`], success or classified
//! failure. The policy engine tolerates a bounded number of failures but
//! insists on the core randomness pair (anchor OR local CSPRNG) and on at
//! least one Radar-group success. Only then is the concatenation — always
//! in registry order, never in completion order — hashed by one of two
//! SHA-256 providers, with the provider label surfaced for audit.
//!
//! Each invocation is stateless: fresh transport, fresh outcomes, nothing
//! persisted.

pub mod config;
pub mod digest;
pub mod fetch;
pub mod harvest;
pub mod logging;
pub mod policy;
pub mod registry;
pub mod response;
pub mod source;
pub mod transport;

pub use config::HarvestConfig;
pub use digest::{DigestProvider, DigestResult, compute_digest, concat_successful};
pub use harvest::{HarvestResult, harvest, harvest_and_hash, harvest_and_hash_with};
pub use logging::{EventSink, LogSink, NullSink};
pub use policy::{MAX_FAILED_SOURCES, PolicyFailure};
pub use registry::{ANCHOR_SOURCE_ID, LOCAL_SOURCE_ID, RADAR_RANKING_TIERS, default_registry};
pub use response::{HarvestResponse, SourceReport};
pub use source::{SourceKind, SourceOutcome, SourceSpec, SourceTag, Validator};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
