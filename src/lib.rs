//! Telephone-exchange billing: per-destination tariffs, client call
//! records and cost aggregation.

pub mod amount;
pub mod console;
pub mod csv;
pub mod exchange;
pub mod model;
pub mod tariff;

pub use amount::Amount;
pub use exchange::{Client, Exchange, ExchangeError};
pub use model::{CallRecord, City, CityName, Command, Destination};
pub use tariff::{
    CostOverflow, PricingRule, RuleError, RuleKind, TariffNotFound, TariffRegistry,
};
