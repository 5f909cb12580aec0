//! delivery-planner core
//!
//! Turns confirmed orders with free-text shipping addresses into an ordered,
//! drivable delivery route from a fixed depot: geocoding with caching and
//! rate-limit discipline, open-path trip optimization, and graceful
//! degradation when either external service fails.

pub mod traits;
pub mod model;
pub mod address;
pub mod cache;
pub mod rate_limit;
pub mod geocode;
pub mod osrm;
pub mod path;
pub mod planner;
