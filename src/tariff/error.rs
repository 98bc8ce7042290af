//! Error types for tariffs and pricing rules.

use thiserror::Error;

use crate::model::Destination;

/// Validation failure while building a pricing rule or its destination.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("invalid destination '{0}': use 1-50 letters, spaces or hyphens")]
    InvalidDestination(String),

    #[error("invalid price per minute {0}: must be above 0 and at most 1000, to 4 decimals")]
    InvalidTariff(f64),

    #[error("invalid discount {0}%: must be between 1 and 99")]
    InvalidDiscount(f64),
}

/// No tariff is registered for the destination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no tariff set for {0}")]
pub struct TariffNotFound(pub Destination);

/// A call cost or a total does not fit in an [`Amount`](crate::Amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cost exceeds the largest representable amount")]
pub struct CostOverflow;
