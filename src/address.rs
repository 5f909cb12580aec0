//! Address normalization: canonical geocoding queries from order fields.
//!
//! Shipping fields on the order win over the customer profile; a bare town is
//! the last resort. The query carries a fixed regional qualifier so the
//! geocoder biases results toward the service area. Pure functions, no side
//! effects.

use crate::model::{CustomerProfile, Order};

/// Canonical address derived from one order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedAddress {
    /// Geocoding query, comma-joined with the regional qualifier appended.
    /// Empty when no usable address fragment exists.
    pub query: String,
    /// Human-readable address for display (street, town, postal code).
    pub full_address: String,
    /// Secondary line (floor, door).
    pub secondary: Option<String>,
    /// Town used for the locality-only fallback query.
    pub locality: Option<String>,
}

impl NormalizedAddress {
    /// Cache key: the query compared case-insensitively.
    pub fn cache_key(&self) -> String {
        self.query.to_lowercase()
    }
}

/// Builds the normalized address for an order, consulting the profile only
/// when the order carries no shipping fields.
pub fn normalize(
    order: &Order,
    profile: Option<&CustomerProfile>,
    region: &str,
) -> NormalizedAddress {
    let locality = order
        .shipping_town
        .clone()
        .filter(|town| !town.trim().is_empty())
        .or_else(|| {
            profile
                .and_then(|p| p.town.clone())
                .filter(|town| !town.trim().is_empty())
        });

    if let Some(street) = non_empty(order.shipping_address.as_deref()) {
        return NormalizedAddress {
            query: join_parts(&[Some(street), locality.as_deref(), Some(region)]),
            full_address: display_address(
                street,
                order.shipping_town.as_deref(),
                order.shipping_postal_code.as_deref(),
            ),
            secondary: non_empty(order.shipping_address2.as_deref()).map(str::to_string),
            locality,
        };
    }

    if let Some(profile) = profile {
        if let Some(street) = non_empty(profile.address.as_deref()) {
            return NormalizedAddress {
                query: join_parts(&[Some(street), locality.as_deref(), Some(region)]),
                full_address: display_address(
                    street,
                    profile.town.as_deref(),
                    profile.postal_code.as_deref(),
                ),
                secondary: non_empty(profile.floor_door.as_deref()).map(str::to_string),
                locality,
            };
        }
    }

    if let Some(town) = non_empty(order.shipping_town.as_deref()) {
        return NormalizedAddress {
            query: join_parts(&[Some(town), Some(region)]),
            full_address: town.to_string(),
            secondary: None,
            locality,
        };
    }

    NormalizedAddress::default()
}

/// Locality-only query for the geocoding fallback.
pub fn locality_query(town: &str, region: &str) -> String {
    join_parts(&[Some(town), Some(region)])
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Comma-joins the non-empty parts, which also trims stray separators and
/// collapses the doubled ones a missing middle part would leave behind.
fn join_parts(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .filter_map(|part| non_empty(*part))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_address(street: &str, town: Option<&str>, postal_code: Option<&str>) -> String {
    let tail = [town, postal_code]
        .into_iter()
        .filter_map(non_empty)
        .collect::<Vec<_>>()
        .join(" ");

    if tail.is_empty() {
        street.to_string()
    } else {
        format!("{}, {}", street, tail)
    }
}
