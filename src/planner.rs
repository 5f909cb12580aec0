//! Route plan builder: resolves order addresses and reconciles the
//! optimizer's visiting order back onto them.
//!
//! The builder never fails outright. Addresses that cannot be resolved
//! reduce the located count, an optimizer failure degrades to discovery
//! order with a straight-line path, and zero resolvable orders yield an
//! empty plan.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::address::{self, NormalizedAddress};
use crate::cache::JsonFileStore;
use crate::geocode::{GeocodingClient, NominatimClient, NominatimConfig, NOMINATIM_MIN_INTERVAL};
use crate::model::{CustomerProfile, Order, RoutePlan, Stop};
use crate::osrm::{OsrmTripClient, OsrmTripConfig};
use crate::path::PathGeometry;
use crate::rate_limit::RateGate;
use crate::traits::{AddressSearch, CoordinateStore, TripService};

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Warehouse (lat, lng), the fixed start of every route.
    pub depot: (f64, f64),
    pub depot_label: String,
    /// Regional qualifier appended to every geocoding query to bias results
    /// toward the service area.
    pub region: String,
    /// Queries at or below this length are skipped as unresolvable.
    pub min_query_len: usize,
    /// Overall budget for the resolution phase. Once exceeded, remaining
    /// lookups are abandoned and the plan is built from the stops already
    /// resolved. `None` means no limit.
    pub deadline: Option<Duration>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            // Calle Holanda 1, Illescas.
            depot: (40.1182, -3.8566),
            depot_label: "Almacén, Calle Holanda 1, Illescas".to_string(),
            region: "Toledo, Spain".to_string(),
            min_query_len: 5,
            deadline: None,
        }
    }
}

/// Orchestrates address resolution, caching, and trip optimization into a
/// [`RoutePlan`]. One logical worker per invocation; geocoding lookups are
/// strictly serialized behind the shared rate gate.
#[derive(Debug)]
pub struct RoutePlanner<S, T, C> {
    geocoder: GeocodingClient<S>,
    trips: T,
    cache: C,
    config: PlannerConfig,
}

impl RoutePlanner<NominatimClient, OsrmTripClient, JsonFileStore> {
    /// Wires the planner to the live Nominatim and OSRM services with a
    /// durable cache file.
    pub fn with_live_services(
        cache_path: impl Into<std::path::PathBuf>,
        config: PlannerConfig,
    ) -> Result<Self, reqwest::Error> {
        let gate = Arc::new(RateGate::new(NOMINATIM_MIN_INTERVAL));
        let nominatim = NominatimClient::new(NominatimConfig::default())?;
        let osrm = OsrmTripClient::new(OsrmTripConfig::default())?;
        Ok(Self::new(
            GeocodingClient::new(nominatim, gate),
            osrm,
            JsonFileStore::open(cache_path),
            config,
        ))
    }
}

impl<S, T, C> RoutePlanner<S, T, C>
where
    S: AddressSearch,
    T: TripService,
    C: CoordinateStore,
{
    pub fn new(geocoder: GeocodingClient<S>, trips: T, cache: C, config: PlannerConfig) -> Self {
        Self {
            geocoder,
            trips,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Builds a complete route plan for the given orders.
    ///
    /// Long-running: every not-yet-cached address costs one rate-limit slot
    /// (more when the locality fallback or a transport retry fires).
    /// `profile_lookup` supplies the customer profile for orders that
    /// reference one; it is consulted for the fallback address and for the
    /// stop's display name and phone.
    pub fn build_route_plan<P>(&self, orders: &[Order], profile_lookup: P) -> RoutePlan
    where
        P: Fn(&str) -> Option<CustomerProfile>,
    {
        let total = orders.len();
        if orders.is_empty() {
            return RoutePlan::empty(self.config.depot, self.config.depot_label.clone(), 0);
        }

        let mut stops = self.resolve_stops(orders, &profile_lookup);
        let located = stops.len();
        debug!(located, total, "address resolution finished");

        if stops.is_empty() {
            return RoutePlan::empty(self.config.depot, self.config.depot_label.clone(), total);
        }

        let coords: Vec<(f64, f64)> = stops.iter().map(|stop| stop.coords).collect();
        let (path, optimized) = match self.trips.trip(self.config.depot, &coords) {
            Ok(plan) => {
                for (stop, rank) in stops.iter_mut().zip(&plan.stop_ranks) {
                    stop.rank = *rank;
                }
                // Stable sort: unranked stops keep their discovery order at
                // the tail.
                stops.sort_by_key(|stop| stop.rank);
                (plan.geometry, true)
            }
            Err(err) => {
                warn!(error = %err, "trip optimization failed, keeping discovery order");
                (PathGeometry::straight_line(self.config.depot, &coords), false)
            }
        };

        RoutePlan {
            depot: self.config.depot,
            depot_label: self.config.depot_label.clone(),
            stops,
            path,
            located,
            total,
            optimized,
        }
    }

    /// Resolving phase: one stop per order whose address resolves, in input
    /// order. Ranks start out as discovery order.
    fn resolve_stops<P>(&self, orders: &[Order], profile_lookup: &P) -> Vec<Stop>
    where
        P: Fn(&str) -> Option<CustomerProfile>,
    {
        let started = Instant::now();
        let mut stops = Vec::new();

        for order in orders {
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() > deadline {
                    warn!(
                        resolved = stops.len(),
                        "resolution deadline exceeded, building plan from stops resolved so far"
                    );
                    break;
                }
            }

            let profile = order
                .customer_ref
                .as_deref()
                .and_then(|customer_ref| profile_lookup(customer_ref));
            let normalized = address::normalize(order, profile.as_ref(), &self.config.region);

            if normalized.query.len() <= self.config.min_query_len {
                warn!(order_id = %order.id, "no usable address on order, skipping");
                continue;
            }

            match self.resolve_coords(&normalized) {
                Some(coords) => {
                    let rank = stops.len();
                    stops.push(build_stop(order, profile.as_ref(), &normalized, coords, rank));
                }
                None => {
                    warn!(order_id = %order.id, query = %normalized.query, "address could not be located");
                }
            }
        }

        stops
    }

    /// Cache-then-client resolution with write-through. The cache entry is
    /// keyed by the full normalized query even when the locality fallback
    /// produced the coordinates.
    fn resolve_coords(&self, normalized: &NormalizedAddress) -> Option<(f64, f64)> {
        let key = normalized.cache_key();
        if let Some(coords) = self.cache.get(&key) {
            debug!(query = %normalized.query, "geocode cache hit");
            return Some(coords);
        }

        let locality_query = normalized
            .locality
            .as_deref()
            .map(|town| address::locality_query(town, &self.config.region));
        let coords = self
            .geocoder
            .resolve_with_fallback(&normalized.query, locality_query.as_deref())?;

        self.cache.put(&key, coords);
        Some(coords)
    }
}

fn build_stop(
    order: &Order,
    profile: Option<&CustomerProfile>,
    normalized: &NormalizedAddress,
    coords: (f64, f64),
    rank: usize,
) -> Stop {
    let customer_label = profile
        .and_then(|p| p.full_name.clone())
        .or_else(|| order.customer_ref.clone())
        .unwrap_or_else(|| order.id.clone());

    Stop {
        order_id: order.id.clone(),
        invoice_number: order.invoice_number.clone(),
        customer_label,
        phone: profile.and_then(|p| p.phone.clone()),
        full_address: normalized.full_address.clone(),
        secondary: normalized.secondary.clone(),
        coords,
        package_count: order.package_count(),
        rank,
    }
}
