//! Seams to the external services the planner orchestrates.
//!
//! These are intentionally minimal. Concrete adapters (Nominatim, OSRM, the
//! durable cache file) live in their own modules; tests substitute in-memory
//! stubs.

use std::fmt;

use crate::path::PathGeometry;

/// External free-text address search (e.g. Nominatim).
///
/// An `Ok(vec![])` is a confirmed no-match from the service; `Err` means the
/// service could not be reached or answered garbage. Callers treat the two
/// differently (transport errors may be retried, empty results are final).
pub trait AddressSearch {
    /// Returns candidate coordinates, best match first, as (lat, lng).
    fn search(&self, query: &str) -> Result<Vec<(f64, f64)>, SearchError>;
}

/// Transport-level failure talking to the address search service.
#[derive(Debug, Clone)]
pub struct SearchError {
    pub message: String,
}

impl SearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "address search failed: {}", self.message)
    }
}

impl std::error::Error for SearchError {}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::new(err.to_string())
    }
}

/// External open-path trip optimizer (e.g. the OSRM Trip API).
pub trait TripService {
    /// Optimizes a visit order starting from `origin` with no return leg.
    ///
    /// `stops` are (lat, lng). Any failure (network, non-Ok status code,
    /// malformed body) is a single `TripError`; the planner does not retry.
    fn trip(&self, origin: (f64, f64), stops: &[(f64, f64)]) -> Result<TripPlan, TripError>;
}

/// A successful optimization result.
#[derive(Debug, Clone)]
pub struct TripPlan {
    /// Visiting rank for each submitted stop, 0-indexed with the origin
    /// excluded: `stop_ranks[i]` is the position of submitted stop `i`.
    pub stop_ranks: Vec<usize>,
    /// Road-following path from the origin through every stop.
    pub geometry: PathGeometry,
}

/// Failure talking to the trip optimizer.
#[derive(Debug, Clone)]
pub struct TripError {
    pub message: String,
}

impl TripError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trip optimization failed: {}", self.message)
    }
}

impl std::error::Error for TripError {}

impl From<reqwest::Error> for TripError {
    fn from(err: reqwest::Error) -> Self {
        TripError::new(err.to_string())
    }
}

/// Key-value store mapping normalized address queries to coordinates.
///
/// Keys are compared case-insensitively. Entries never expire: resolved
/// coordinates for a given query are treated as permanently valid, so
/// retention is the backend's documented choice rather than a policy of this
/// trait.
pub trait CoordinateStore {
    fn get(&self, key: &str) -> Option<(f64, f64)>;

    /// Last-write-wins; concurrent puts for the same key are expected to
    /// carry identical values.
    fn put(&self, key: &str, coords: (f64, f64));
}

// The cache and the external clients are shared across concurrent planner
// invocations, so the seams forward through Arc.

impl<S: AddressSearch + ?Sized> AddressSearch for std::sync::Arc<S> {
    fn search(&self, query: &str) -> Result<Vec<(f64, f64)>, SearchError> {
        self.as_ref().search(query)
    }
}

impl<T: TripService + ?Sized> TripService for std::sync::Arc<T> {
    fn trip(&self, origin: (f64, f64), stops: &[(f64, f64)]) -> Result<TripPlan, TripError> {
        self.as_ref().trip(origin, stops)
    }
}

impl<C: CoordinateStore + ?Sized> CoordinateStore for std::sync::Arc<C> {
    fn get(&self, key: &str) -> Option<(f64, f64)> {
        self.as_ref().get(key)
    }

    fn put(&self, key: &str, coords: (f64, f64)) {
        self.as_ref().put(key, coords)
    }
}

/// Receives stop status changes and forwards them to the order store.
///
/// The planner never persists order state itself.
pub trait StatusSink {
    fn stop_completed(&self, order_id: &str, status: crate::model::DeliveryStatus);
}
