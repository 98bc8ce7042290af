//! Error types for exchange operations.

use thiserror::Error;

use crate::tariff::{CostOverflow, RuleError, TariffNotFound};

/// Error returned by [`Exchange::apply`](super::Exchange::apply) and the
/// client lookups of [`Exchange`](super::Exchange).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExchangeError {
    #[error("invalid tariff: {0}")]
    Rule(#[from] RuleError),

    #[error(transparent)]
    TariffNotFound(#[from] TariffNotFound),

    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("client '{0}' rejected: empty or already registered")]
    ClientRejected(String),

    #[error(transparent)]
    CostOverflow(#[from] CostOverflow),
}
