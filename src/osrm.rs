//! OSRM Trip API adapter for open-path route optimization.

use serde::Deserialize;
use tracing::debug;

use crate::path::PathGeometry;
use crate::traits::{TripError, TripPlan, TripService};

/// Stops the optimizer left unmatched sort after every ranked stop.
const UNRANKED: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct OsrmTripConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmTripConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 15,
        }
    }
}

/// HTTP adapter for the OSRM `/trip` endpoint.
#[derive(Debug, Clone)]
pub struct OsrmTripClient {
    config: OsrmTripConfig,
    client: reqwest::blocking::Client,
}

impl OsrmTripClient {
    pub fn new(config: OsrmTripConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl TripService for OsrmTripClient {
    fn trip(&self, origin: (f64, f64), stops: &[(f64, f64)]) -> Result<TripPlan, TripError> {
        // OSRM takes lon,lat pairs; source=first pins the route start to the
        // origin and roundtrip=false leaves the driver at the last stop.
        let coords = std::iter::once(&origin)
            .chain(stops.iter())
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/trip/v1/{}/{}?overview=full&geometries=geojson&source=first&roundtrip=false",
            self.config.base_url, self.config.profile, coords
        );
        debug!(stops = stops.len(), "requesting trip optimization");

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmTripResponse>())?;

        plan_from_response(response, stops.len())
    }
}

fn plan_from_response(response: OsrmTripResponse, stop_count: usize) -> Result<TripPlan, TripError> {
    if response.code != "Ok" {
        return Err(TripError::new(format!(
            "optimizer answered code {:?}",
            response.code
        )));
    }
    let trip = response
        .trips
        .first()
        .ok_or_else(|| TripError::new("optimizer answered no trips"))?;

    // waypoints come back in submission order: index 0 is the origin, the
    // rest are the stops. waypoint_index is the visiting rank including the
    // origin, so stop ranks shift down by one.
    let stop_ranks = (0..stop_count)
        .map(|i| {
            response
                .waypoints
                .get(i + 1)
                .map(|wp| wp.waypoint_index.saturating_sub(1))
                .unwrap_or(UNRANKED)
        })
        .collect();

    Ok(TripPlan {
        stop_ranks,
        geometry: PathGeometry::from_geojson(&trip.geometry.coordinates),
    })
}

#[derive(Debug, Deserialize)]
struct OsrmTripResponse {
    code: String,
    #[serde(default)]
    trips: Vec<OsrmTrip>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmTrip {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    waypoint_index: usize,
}
