use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ValueObject};

/// Stock position of one product: on-hand quantity, optional low-stock
/// threshold, and the persisted low-stock flag.
///
/// The flag is recomputed only while a threshold is present. Without one the
/// previously stored flag is carried forward unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    quantity: i64,
    threshold: Option<i64>,
    low_stock: bool,
}

impl ValueObject for StockLevel {}

impl StockLevel {
    /// A fresh stock level (flag starts cleared, then derived).
    pub fn new(quantity: i64, threshold: Option<i64>) -> Self {
        Self {
            quantity,
            threshold,
            low_stock: false,
        }
        .recomputed()
    }

    /// Rehydrate exactly what was persisted, without recomputing.
    pub fn restore(quantity: i64, threshold: Option<i64>, low_stock: bool) -> Self {
        Self {
            quantity,
            threshold,
            low_stock,
        }
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn threshold(&self) -> Option<i64> {
        self.threshold
    }

    pub fn is_low_stock(&self) -> bool {
        self.low_stock
    }

    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    pub fn with_threshold(self, threshold: Option<i64>) -> Self {
        Self { threshold, ..self }.recomputed()
    }

    /// Compute the level after `movement`, leaving `self` untouched.
    pub fn apply(&self, movement: StockMovement) -> DomainResult<StockLevel> {
        let quantity = movement.resulting_quantity(self.quantity)?;
        Ok(Self { quantity, ..*self }.recomputed())
    }

    fn recomputed(mut self) -> Self {
        if let Some(threshold) = self.threshold {
            self.low_stock = self.quantity <= threshold;
        }
        self
    }
}

/// Command: a requested change to on-hand quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum StockMovement {
    /// Replace the quantity.
    Set(i64),
    /// Add to the quantity (no upper bound beyond integer range).
    Increase(i64),
    /// Remove from the quantity; never below zero.
    Decrease(i64),
}

impl StockMovement {
    pub fn amount(&self) -> i64 {
        match *self {
            StockMovement::Set(q) | StockMovement::Increase(q) | StockMovement::Decrease(q) => q,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StockMovement::Set(_) => "set",
            StockMovement::Increase(_) => "increase",
            StockMovement::Decrease(_) => "decrease",
        }
    }

    /// Amounts are non-negative for every movement kind.
    pub fn validate(&self) -> DomainResult<()> {
        if self.amount() < 0 {
            return Err(DomainError::invalid_argument(match self {
                StockMovement::Set(_) => "Quantity cannot be negative",
                StockMovement::Increase(_) | StockMovement::Decrease(_) => {
                    "Quantity delta cannot be negative"
                }
            }));
        }
        Ok(())
    }

    pub fn resulting_quantity(&self, current: i64) -> DomainResult<i64> {
        self.validate()?;
        match *self {
            StockMovement::Set(q) => Ok(q),
            StockMovement::Increase(delta) => current
                .checked_add(delta)
                .ok_or_else(|| DomainError::invalid_argument("inventory quantity overflow")),
            StockMovement::Decrease(delta) => match current.checked_sub(delta) {
                Some(next) if next >= 0 => Ok(next),
                _ => Err(DomainError::insufficient_inventory(current, delta)),
            },
        }
    }
}

/// Event: StockAdjusted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub movement: StockMovement,
    pub previous: StockLevel,
    pub current: StockLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_level_derives_flag_from_threshold() {
        assert!(!StockLevel::new(50, Some(10)).is_low_stock());
        assert!(StockLevel::new(10, Some(10)).is_low_stock());
        assert!(StockLevel::new(0, Some(1)).is_low_stock());
        assert!(!StockLevel::new(0, None).is_low_stock());
    }

    #[test]
    fn absent_threshold_keeps_previous_flag() {
        let level = StockLevel::restore(3, None, true);
        let next = level.apply(StockMovement::Increase(100)).unwrap();
        assert_eq!(next.quantity(), 103);
        assert!(next.is_low_stock(), "flag must be carried over, not cleared");

        let cleared = StockLevel::new(5, Some(10)).with_threshold(None);
        assert!(cleared.is_low_stock());
    }

    #[test]
    fn decrease_below_zero_reports_current_and_requested() {
        let level = StockLevel::new(5, Some(10));
        let err = level.apply(StockMovement::Decrease(10)).unwrap_err();
        assert_eq!(err, DomainError::InsufficientInventory { current: 5, requested: 10 });
        assert_eq!(level.quantity(), 5);
    }

    #[test]
    fn decrease_to_exactly_zero_is_allowed() {
        let level = StockLevel::new(5, Some(1));
        let next = level.apply(StockMovement::Decrease(5)).unwrap();
        assert_eq!(next.quantity(), 0);
        assert!(next.is_low_stock());
    }

    #[test]
    fn negative_amounts_are_invalid_arguments() {
        let level = StockLevel::new(5, None);
        for movement in [
            StockMovement::Set(-1),
            StockMovement::Increase(-1),
            StockMovement::Decrease(-1),
        ] {
            assert!(matches!(
                level.apply(movement),
                Err(DomainError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn increase_overflow_is_rejected() {
        let level = StockLevel::new(i64::MAX, None);
        assert!(matches!(
            level.apply(StockMovement::Increase(1)),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: with a threshold set, the flag always matches `quantity <= threshold`.
            #[test]
            fn flag_tracks_quantity_when_threshold_is_set(
                start in 0i64..10_000,
                threshold in 1i64..500,
                moves in proptest::collection::vec((0u8..3, 0i64..1_000), 0..20)
            ) {
                let mut level = StockLevel::new(start, Some(threshold));
                for (kind, amount) in moves {
                    let movement = match kind {
                        0 => StockMovement::Set(amount),
                        1 => StockMovement::Increase(amount),
                        _ => StockMovement::Decrease(amount),
                    };
                    if let Ok(next) = level.apply(movement) {
                        level = next;
                    }
                    prop_assert!(level.quantity() >= 0);
                    prop_assert_eq!(level.is_low_stock(), level.quantity() <= threshold);
                }
            }

            /// Property: decrease then increase by the same delta restores the quantity.
            #[test]
            fn decrease_then_increase_round_trips(
                start in 0i64..10_000,
                delta in 0i64..10_000,
            ) {
                let level = StockLevel::new(start, Some(10));
                match level.apply(StockMovement::Decrease(delta)) {
                    Ok(lower) => {
                        let back = lower.apply(StockMovement::Increase(delta)).unwrap();
                        prop_assert_eq!(back.quantity(), start);
                        prop_assert_eq!(back.is_low_stock(), level.is_low_stock());
                    }
                    Err(e) => {
                        prop_assert!(delta > start);
                        prop_assert_eq!(e, DomainError::insufficient_inventory(start, delta));
                    }
                }
            }
        }
    }
}
