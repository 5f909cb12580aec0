//! Geocoding: Nominatim HTTP adapter and the rate-limited resolution client.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::rate_limit::RateGate;
use crate::traits::{AddressSearch, SearchError};

/// Minimum spacing between Nominatim requests (usage policy: at most one
/// request per second, plus headroom).
pub const NOMINATIM_MIN_INTERVAL: std::time::Duration = std::time::Duration::from_millis(1100);

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "delivery-planner/0.2".to_string(),
            timeout_secs: 10,
        }
    }
}

/// HTTP adapter for the Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }
}

impl AddressSearch for NominatimClient {
    fn search(&self, query: &str) -> Result<Vec<(f64, f64)>, SearchError> {
        let url = format!("{}/search", self.config.base_url);
        let places = self
            .client
            .get(url)
            .query(&[("format", "json"), ("q", query)])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<NominatimPlace>>())?;

        // Nominatim serializes coordinates as strings; candidates that do
        // not parse are dropped rather than failing the whole result set.
        Ok(places
            .into_iter()
            .filter_map(|place| {
                let lat = place.lat.parse::<f64>().ok()?;
                let lon = place.lon.parse::<f64>().ok()?;
                Some((lat, lon))
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Outcome of a single rate-limited attempt (after any transport retry).
enum Resolution {
    Found((f64, f64)),
    /// The service answered and had no match. Final; never retried.
    NoMatch,
    /// The service could not be reached even after one retry.
    Unreachable,
}

/// Rate-limited resolution over any [`AddressSearch`] backend.
///
/// Every outbound attempt waits on the shared gate first, including the
/// locality fallback and the transport retry, so each consumes one
/// rate-limit slot. Share one gate (via `Arc`) across every client that
/// talks to the same external service.
#[derive(Debug)]
pub struct GeocodingClient<S> {
    backend: S,
    gate: Arc<RateGate>,
}

impl<S: AddressSearch> GeocodingClient<S> {
    pub fn new(backend: S, gate: Arc<RateGate>) -> Self {
        Self { backend, gate }
    }

    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    /// Resolves a query to its best candidate, retrying once on transport
    /// failure. Confirmed empty results are permanent no-matches.
    pub fn resolve(&self, query: &str) -> Option<(f64, f64)> {
        match self.attempt_with_retry(query) {
            Resolution::Found(coords) => Some(coords),
            Resolution::NoMatch | Resolution::Unreachable => None,
        }
    }

    /// Resolves the full-address query; when the service confirms there is
    /// no match, makes exactly one more attempt with the narrowed
    /// locality-only query.
    pub fn resolve_with_fallback(&self, query: &str, locality_query: Option<&str>) -> Option<(f64, f64)> {
        match self.attempt_with_retry(query) {
            Resolution::Found(coords) => Some(coords),
            Resolution::NoMatch => {
                let fallback = locality_query?;
                warn!(query, fallback, "address not found, retrying with locality only");
                match self.attempt_with_retry(fallback) {
                    Resolution::Found(coords) => Some(coords),
                    Resolution::NoMatch | Resolution::Unreachable => None,
                }
            }
            Resolution::Unreachable => None,
        }
    }

    fn attempt_with_retry(&self, query: &str) -> Resolution {
        match self.attempt(query) {
            Ok(candidates) => return first_candidate(candidates),
            Err(err) => {
                warn!(query, error = %err, "geocoding transport error, retrying once");
            }
        }
        match self.attempt(query) {
            Ok(candidates) => first_candidate(candidates),
            Err(err) => {
                warn!(query, error = %err, "geocoding unreachable, giving up on address");
                Resolution::Unreachable
            }
        }
    }

    fn attempt(&self, query: &str) -> Result<Vec<(f64, f64)>, SearchError> {
        self.gate.wait();
        debug!(query, "geocoding lookup");
        self.backend.search(query)
    }
}

fn first_candidate(candidates: Vec<(f64, f64)>) -> Resolution {
    match candidates.first() {
        Some(coords) => Resolution::Found(*coords),
        None => Resolution::NoMatch,
    }
}
