use tracing::debug;

use crate::Amount;
use crate::model::{CallRecord, Destination};
use crate::tariff::{CostOverflow, TariffRegistry};

/// A subscriber of the exchange and the calls they made, in call order.
#[derive(Debug, Clone)]
pub struct Client {
    last_name: String,
    calls: Vec<CallRecord>,
}

impl Client {
    pub fn new(last_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            calls: Vec::new(),
        }
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    pub fn add_call(&mut self, destination: Destination, minutes: u32) {
        self.calls.push(CallRecord::new(destination, minutes));
    }

    /// Sum of the cost of every priced call.
    ///
    /// Calls to a destination without a tariff are skipped and contribute nothing.
    pub fn total_cost(&self, tariffs: &TariffRegistry) -> Result<Amount, CostOverflow> {
        let mut total = Amount::ZERO;
        for call in &self.calls {
            let Some(rule) = tariffs.rule(&call.destination) else {
                debug!(
                    client = %self.last_name,
                    destination = %call.destination,
                    minutes = call.minutes,
                    "call skipped, no tariff"
                );
                continue;
            };
            let cost = rule.calculate_cost(call.minutes)?;
            total = total.checked_add(cost).ok_or(CostOverflow)?;
        }
        Ok(total)
    }

    /// Number of calls [`Client::total_cost`] leaves out.
    pub fn unpriced_calls(&self, tariffs: &TariffRegistry) -> usize {
        self.calls
            .iter()
            .filter(|call| !tariffs.has_tariff(&call.destination))
            .count()
    }
}
