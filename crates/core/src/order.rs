//! Immutable order records.
//!
//! An order is assembled exactly once per successful checkout submission and
//! never mutated by the client afterwards; status transitions past the
//! initial value happen operator-side, outside this system. Line items are
//! copied by value at submission time so later cart edits cannot alter a
//! submitted order.

use crate::cart::CartLine;
use crate::catalog::ProductId;
use crate::checkout::{CustomerDetails, PaymentMode};
use crate::user::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Collision-resistant order identifier (random UUID v4, 32 lowercase hex
/// characters without hyphens). Replaces the legacy timestamp+random scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Initial status assigned at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Cash on delivery: nothing has been paid yet.
    Pending,
    /// UPI/card: payment asserted by the user, not verified by this system.
    Paid,
}

/// One line of an order, snapshotted by value from the cart.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}

/// A finalized order, owned by the order sink after persistence.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub lines: Vec<OrderLine>,
    /// Grand total, rounded to 2 decimal places at assembly.
    pub total: Decimal,
    pub customer: CustomerDetails,
    pub payment_mode: PaymentMode,
    pub status: OrderStatus,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
