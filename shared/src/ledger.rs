//! Stock ledger rules
//!
//! Stock is never stored: the balance of a lot in a bin is the signed sum of
//! the movements touching that (bin, lot) pair. [`StockLedger`] holds such
//! balances for a set of bins and decides whether a new movement may be
//! appended:
//!
//! - the movement has the shape its type requires (which bins, positive weight)
//! - no bin ends up holding positive stock of two different lots ("no mixing")
//! - no (bin, lot) balance goes negative

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BinLotStock, InventoryMovement, MovementType, RecordMovementInput};

/// Marker carried by every mixing rejection, from the service and from the database trigger
pub const MIXING_MARKER: &str = "BIN_MIXING";

/// Marker carried by every negative-stock rejection
pub const INSUFFICIENT_STOCK_MARKER: &str = "INSUFFICIENT_STOCK";

/// Reasons a movement may not enter the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerViolation {
    #[error("movement weight must be positive, got {0}")]
    NonPositiveWeight(Decimal),

    #[error("{movement_type} movement {reason}")]
    InvalidShape {
        movement_type: MovementType,
        reason: &'static str,
    },

    #[error("BIN_MIXING: bin {bin_id} already holds lot {occupant_lot_id}, cannot add lot {incoming_lot_id}")]
    Mixing {
        bin_id: Uuid,
        occupant_lot_id: Uuid,
        incoming_lot_id: Uuid,
    },

    #[error("INSUFFICIENT_STOCK: bin {bin_id} holds {available} kg of lot {lot_id}, {requested} kg requested")]
    InsufficientStock {
        bin_id: Uuid,
        lot_id: Uuid,
        available: Decimal,
        requested: Decimal,
    },

    #[error("stock of lot {lot_id} in bin {bin_id} is out of range")]
    Overflow { bin_id: Uuid, lot_id: Uuid },
}

/// The ledger-relevant part of a movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub movement_type: MovementType,
    pub lot_id: Uuid,
    pub from_bin_id: Option<Uuid>,
    pub to_bin_id: Option<Uuid>,
    pub weight_kg: Decimal,
}

impl MovementDraft {
    pub fn receive(lot_id: Uuid, to_bin_id: Uuid, weight_kg: Decimal) -> Self {
        Self {
            movement_type: MovementType::Receive,
            lot_id,
            from_bin_id: None,
            to_bin_id: Some(to_bin_id),
            weight_kg,
        }
    }

    pub fn transfer(lot_id: Uuid, from_bin_id: Uuid, to_bin_id: Uuid, weight_kg: Decimal) -> Self {
        Self {
            movement_type: MovementType::Transfer,
            lot_id,
            from_bin_id: Some(from_bin_id),
            to_bin_id: Some(to_bin_id),
            weight_kg,
        }
    }

    pub fn sale_out(lot_id: Uuid, from_bin_id: Uuid, weight_kg: Decimal) -> Self {
        Self {
            movement_type: MovementType::SaleOut,
            lot_id,
            from_bin_id: Some(from_bin_id),
            to_bin_id: None,
            weight_kg,
        }
    }

    /// Positive adjustments add to `to_bin`, negative ones remove from `from_bin`
    pub fn adjustment(lot_id: Uuid, bin_id: Uuid, delta_kg: Decimal) -> Self {
        let (from_bin_id, to_bin_id) = if delta_kg.is_sign_negative() {
            (Some(bin_id), None)
        } else {
            (None, Some(bin_id))
        };
        Self {
            movement_type: MovementType::Adjustment,
            lot_id,
            from_bin_id,
            to_bin_id,
            weight_kg: delta_kg.abs(),
        }
    }

    /// Check which bins the movement type requires
    pub fn validate_shape(&self) -> Result<(), LedgerViolation> {
        if self.weight_kg <= Decimal::ZERO {
            return Err(LedgerViolation::NonPositiveWeight(self.weight_kg));
        }

        let shape_error = |reason| LedgerViolation::InvalidShape {
            movement_type: self.movement_type,
            reason,
        };

        match (self.movement_type, self.from_bin_id, self.to_bin_id) {
            (MovementType::Receive, None, Some(_)) => Ok(()),
            (MovementType::Receive, _, _) => Err(shape_error("needs a destination bin and no source bin")),
            (MovementType::Transfer, Some(from), Some(to)) if from == to => {
                Err(shape_error("cannot use the same bin as source and destination"))
            }
            (MovementType::Transfer, Some(_), Some(_)) => Ok(()),
            (MovementType::Transfer, _, _) => Err(shape_error("needs both a source and a destination bin")),
            (MovementType::SaleOut, Some(_), None) => Ok(()),
            (MovementType::SaleOut, _, _) => Err(shape_error("needs a source bin and no destination bin")),
            (MovementType::Adjustment, Some(_), None) | (MovementType::Adjustment, None, Some(_)) => Ok(()),
            (MovementType::Adjustment, _, _) => Err(shape_error("needs exactly one bin")),
        }
    }

    /// Signed balance changes per (bin, lot)
    pub fn effects(&self) -> Vec<(Uuid, Uuid, Decimal)> {
        let mut effects = Vec::with_capacity(2);
        if let Some(from) = self.from_bin_id {
            effects.push((from, self.lot_id, -self.weight_kg));
        }
        if let Some(to) = self.to_bin_id {
            effects.push((to, self.lot_id, self.weight_kg));
        }
        effects
    }

    /// Bins whose balances must be known to check this movement, ascending
    pub fn touched_bins(&self) -> Vec<Uuid> {
        let mut bins: Vec<Uuid> = self.from_bin_id.into_iter().chain(self.to_bin_id).collect();
        bins.sort();
        bins.dedup();
        bins
    }
}

impl From<&InventoryMovement> for MovementDraft {
    fn from(m: &InventoryMovement) -> Self {
        Self {
            movement_type: m.movement_type,
            lot_id: m.lot_id,
            from_bin_id: m.from_bin_id,
            to_bin_id: m.to_bin_id,
            weight_kg: m.weight_kg,
        }
    }
}

impl From<&RecordMovementInput> for MovementDraft {
    fn from(input: &RecordMovementInput) -> Self {
        Self {
            movement_type: input.movement_type,
            lot_id: input.lot_id,
            from_bin_id: input.from_bin_id,
            to_bin_id: input.to_bin_id,
            weight_kg: input.weight_kg,
        }
    }
}

/// Per-(bin, lot) balances
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLedger {
    balances: BTreeMap<(Uuid, Uuid), Decimal>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stock view rows
    pub fn from_stock<I>(rows: I) -> Result<Self, LedgerViolation>
    where
        I: IntoIterator<Item = BinLotStock>,
    {
        let mut ledger = Self::new();
        for row in rows {
            let key = (row.bin_id, row.lot_id);
            let summed = ledger.stock(row.bin_id, row.lot_id).checked_add(row.stock_kg).ok_or(
                LedgerViolation::Overflow {
                    bin_id: row.bin_id,
                    lot_id: row.lot_id,
                },
            )?;
            ledger.balances.insert(key, summed);
        }
        Ok(ledger)
    }

    /// Sum movements without checking them, the way the stock view does
    pub fn replay<'a, I>(movements: I) -> Result<Self, LedgerViolation>
    where
        I: IntoIterator<Item = &'a MovementDraft>,
    {
        let mut ledger = Self::new();
        for draft in movements {
            ledger.add_effects(draft)?;
        }
        Ok(ledger)
    }

    pub fn stock(&self, bin_id: Uuid, lot_id: Uuid) -> Decimal {
        self.balances
            .get(&(bin_id, lot_id))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Lots with positive stock in a bin
    pub fn lots_in_bin(&self, bin_id: Uuid) -> Vec<Uuid> {
        self.balances
            .range((bin_id, Uuid::nil())..=(bin_id, Uuid::from_u128(u128::MAX)))
            .filter(|(_, kg)| **kg > Decimal::ZERO)
            .map(|((_, lot), _)| *lot)
            .collect()
    }

    /// The lot currently occupying a bin, if any
    pub fn occupant(&self, bin_id: Uuid) -> Option<Uuid> {
        self.lots_in_bin(bin_id).into_iter().next()
    }

    /// Total positive stock of a lot across all known bins
    pub fn lot_total(&self, lot_id: Uuid) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, lot), kg)| *lot == lot_id && **kg > Decimal::ZERO)
            .fold(Decimal::ZERO, |total, (_, kg)| total.saturating_add(*kg))
    }

    /// Decide whether `draft` may be appended
    pub fn check(&self, draft: &MovementDraft) -> Result<(), LedgerViolation> {
        draft.validate_shape()?;

        for (bin_id, lot_id, delta) in draft.effects() {
            let available = self.stock(bin_id, lot_id);
            let after = available
                .checked_add(delta)
                .ok_or(LedgerViolation::Overflow { bin_id, lot_id })?;
            if delta.is_sign_negative() {
                if after < Decimal::ZERO {
                    return Err(LedgerViolation::InsufficientStock {
                        bin_id,
                        lot_id,
                        available,
                        requested: -delta,
                    });
                }
            } else if let Some(occupant) = self
                .lots_in_bin(bin_id)
                .into_iter()
                .find(|occupant| *occupant != lot_id)
            {
                return Err(LedgerViolation::Mixing {
                    bin_id,
                    occupant_lot_id: occupant,
                    incoming_lot_id: lot_id,
                });
            }
        }
        Ok(())
    }

    /// Check and, when allowed, apply `draft`
    pub fn apply(&mut self, draft: &MovementDraft) -> Result<(), LedgerViolation> {
        self.check(draft)?;
        self.add_effects(draft)
    }

    /// Check that removing an already-recorded movement keeps every balance
    /// non-negative and does not bring a lot back into a bin another lot now holds
    pub fn check_removal(&self, draft: &MovementDraft) -> Result<(), LedgerViolation> {
        for (bin_id, lot_id, delta) in draft.effects() {
            let available = self.stock(bin_id, lot_id);
            let after = available
                .checked_sub(delta)
                .ok_or(LedgerViolation::Overflow { bin_id, lot_id })?;
            if delta > Decimal::ZERO {
                if after < Decimal::ZERO {
                    return Err(LedgerViolation::InsufficientStock {
                        bin_id,
                        lot_id,
                        available,
                        requested: delta,
                    });
                }
            } else if let Some(occupant) = self
                .lots_in_bin(bin_id)
                .into_iter()
                .find(|occupant| *occupant != lot_id)
            {
                return Err(LedgerViolation::Mixing {
                    bin_id,
                    occupant_lot_id: occupant,
                    incoming_lot_id: lot_id,
                });
            }
        }
        Ok(())
    }

    /// Non-zero balances as stock view rows, ordered by bin then lot
    pub fn rows(&self) -> Vec<BinLotStock> {
        self.balances
            .iter()
            .filter(|(_, kg)| !kg.is_zero())
            .map(|((bin_id, lot_id), kg)| BinLotStock {
                bin_id: *bin_id,
                lot_id: *lot_id,
                stock_kg: *kg,
            })
            .collect()
    }

    /// All-or-nothing: no balance changes when one of them would overflow
    fn add_effects(&mut self, draft: &MovementDraft) -> Result<(), LedgerViolation> {
        let updated = draft
            .effects()
            .into_iter()
            .map(|(bin_id, lot_id, delta)| {
                self.stock(bin_id, lot_id)
                    .checked_add(delta)
                    .map(|kg| ((bin_id, lot_id), kg))
                    .ok_or(LedgerViolation::Overflow { bin_id, lot_id })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.balances.extend(updated);
        Ok(())
    }
}
