//! Pricing rules and the tariff registry.
//!
//! A [`PricingRule`] prices calls to one destination, either at a flat rate
//! (`Regular`) or with a percentage discount (`Benefit`). Rules are validated
//! on construction and never change afterwards.

use std::fmt;

use crate::Amount;
use crate::model::{Destination, limits};

mod error;
pub use error::{CostOverflow, RuleError, TariffNotFound};

mod registry;
pub use registry::{TariffRegistry, TariffStats};

/// How a rule derives its price from the base price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleKind {
    /// Flat rate, no discount.
    Regular,
    /// Discounted rate; `discount_percent` is within [1, 99].
    Benefit { discount_percent: f64 },
}

/// Per-minute pricing for a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRule {
    destination: Destination,
    base_price: Amount,
    kind: RuleKind,
}

impl PricingRule {
    pub const REGULAR_LABEL: &'static str = "Regular";
    pub const BENEFIT_LABEL: &'static str = "Benefit";

    /// Flat-rate rule. Fails with [`RuleError::InvalidTariff`] unless the
    /// price passes [`limits::is_valid_price`].
    pub fn regular(destination: Destination, price: f64) -> Result<Self, RuleError> {
        Ok(Self {
            destination,
            base_price: Self::validate_price(price)?,
            kind: RuleKind::Regular,
        })
    }

    /// Discounted rule. The price is validated first, then the discount.
    pub fn benefit(
        destination: Destination,
        price: f64,
        discount_percent: f64,
    ) -> Result<Self, RuleError> {
        let base_price = Self::validate_price(price)?;
        if !discount_percent.is_finite() || !limits::DISCOUNT_PERCENT.contains(&discount_percent)
        {
            return Err(RuleError::InvalidDiscount(discount_percent));
        }
        Ok(Self {
            destination,
            base_price,
            kind: RuleKind::Benefit { discount_percent },
        })
    }

    fn validate_price(price: f64) -> Result<Amount, RuleError> {
        if !limits::is_valid_price(price) {
            return Err(RuleError::InvalidTariff(price));
        }
        Ok(Amount::from_float(price))
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn base_price(&self) -> Amount {
        self.base_price
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn discount_percent(&self) -> Option<f64> {
        match self.kind {
            RuleKind::Regular => None,
            RuleKind::Benefit { discount_percent } => Some(discount_percent),
        }
    }

    /// Cost of a call lasting `minutes`.
    pub fn calculate_cost(&self, minutes: u32) -> Result<Amount, CostOverflow> {
        let full = self
            .base_price
            .checked_times(minutes)
            .ok_or(CostOverflow)?;
        Ok(self.apply_discount(full))
    }

    /// Price of one minute after any discount.
    pub fn effective_price_per_minute(&self) -> Amount {
        self.apply_discount(self.base_price)
    }

    fn apply_discount(&self, amount: Amount) -> Amount {
        match self.kind {
            RuleKind::Regular => amount,
            RuleKind::Benefit { discount_percent } => amount.discounted(discount_percent),
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self.kind {
            RuleKind::Regular => Self::REGULAR_LABEL,
            RuleKind::Benefit { .. } => Self::BENEFIT_LABEL,
        }
    }
}

impl fmt::Display for PricingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} per minute ({})",
            self.destination,
            self.base_price,
            self.type_label()
        )?;
        if let RuleKind::Benefit { discount_percent } = self.kind {
            write!(
                f,
                ", discount {discount_percent:.1}%, {} per minute after discount",
                self.effective_price_per_minute()
            )?;
        }
        Ok(())
    }
}
