//! Data model for orders, customer profiles, and built route plans.
//!
//! Required vs. optional fields are explicit here; the planner never falls
//! back through untyped field chains. Orders are read-only inputs: the
//! planner derives [`Stop`]s from them and never mutates an order in place.

use serde::{Deserialize, Serialize};

use crate::path::PathGeometry;
use crate::traits::StatusSink;

/// One product line on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
}

/// A confirmed order as handed over by the order store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub invoice_number: Option<String>,
    pub items: Vec<LineItem>,
    /// Street and number of the shipping address, if recorded on the order.
    pub shipping_address: Option<String>,
    /// Secondary address line (floor, door).
    pub shipping_address2: Option<String>,
    pub shipping_town: Option<String>,
    pub shipping_postal_code: Option<String>,
    /// Reference to the customer profile, used as the address fallback for
    /// legacy orders without shipping fields.
    pub customer_ref: Option<String>,
}

impl Order {
    /// Total package count across all line items.
    pub fn package_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Customer profile, the address source for orders without shipping fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Floor/door line stored on the profile.
    pub floor_door: Option<String>,
    pub town: Option<String>,
    pub postal_code: Option<String>,
}

/// Order status values understood by the order store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

/// A resolved delivery destination derived from one order.
#[derive(Debug, Clone, Serialize)]
pub struct Stop {
    pub order_id: String,
    pub invoice_number: Option<String>,
    /// Customer full name when the profile has one, otherwise the raw
    /// customer reference.
    pub customer_label: String,
    pub phone: Option<String>,
    /// Human-readable address for display (street, town, postal code).
    pub full_address: String,
    /// Secondary line (floor, door), shown under the address.
    pub secondary: Option<String>,
    /// Resolved (lat, lng).
    pub coords: (f64, f64),
    /// Sum of line-item quantities.
    pub package_count: u32,
    /// Visiting rank assigned by the optimizer, or discovery order when
    /// optimization was degraded.
    pub rank: usize,
}

/// The built route: depot, stops in visiting order, and a drawable path.
///
/// Rebuilt in full on every invocation; never persisted. The depot is not a
/// stop — it is carried separately and conceptually occupies position 0.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    /// Depot (lat, lng), the fixed start of the route.
    pub depot: (f64, f64),
    pub depot_label: String,
    /// Stops sorted by visiting rank.
    pub stops: Vec<Stop>,
    pub path: PathGeometry,
    /// How many orders resolved to coordinates.
    pub located: usize,
    /// How many orders were submitted.
    pub total: usize,
    /// False when the optimizer failed and the plan fell back to discovery
    /// order with a straight-line path.
    pub optimized: bool,
}

impl RoutePlan {
    /// An empty plan: no stops, no path. A valid terminal state, not an
    /// error.
    pub fn empty(depot: (f64, f64), depot_label: impl Into<String>, total: usize) -> Self {
        Self {
            depot,
            depot_label: depot_label.into(),
            stops: Vec::new(),
            path: PathGeometry::empty(),
            located: 0,
            total,
            optimized: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Forwards a status change for a stop on this plan to the order store.
    ///
    /// Returns false when the order is not a stop on this plan; nothing is
    /// forwarded in that case.
    pub fn complete_stop(
        &self,
        order_id: &str,
        status: DeliveryStatus,
        sink: &dyn StatusSink,
    ) -> bool {
        if self.stops.iter().any(|stop| stop.order_id == order_id) {
            sink.stop_completed(order_id, status);
            true
        } else {
            false
        }
    }
}
