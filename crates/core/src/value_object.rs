//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one with the new values.
///
/// - **Value Object**: `Price(89999)` equals any other `Price(89999)`
/// - **Entity**: `Product { id: 1, .. }` is the same product whatever its fields say
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A monetary amount in minor currency units (cents).
///
/// On the wire a price travels as a decimal number (`899.99`); internally it is
/// an exact integer so comparisons and range filters never see float drift.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(i64);

impl ValueObject for Price {}

impl Price {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(DomainError::invalid_argument("price must be a finite number"));
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return Err(DomainError::invalid_argument("price is out of range"));
        }
        Ok(Self(cents as i64))
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0 as f64 / 100.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
