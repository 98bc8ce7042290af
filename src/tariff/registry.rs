use std::collections::HashMap;

use tracing::debug;

use super::{PricingRule, RuleError, RuleKind, TariffNotFound};
use crate::Amount;
use crate::model::Destination;

/// Tariffs by destination. At most one rule per destination; setting a
/// tariff again replaces the previous one.
#[derive(Debug, Default, Clone)]
pub struct TariffRegistry {
    rules: HashMap<Destination, PricingRule>,
}

/// Summary of the registered tariffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TariffStats {
    pub total: usize,
    pub regular: usize,
    pub benefit: usize,
    /// Mean effective price per minute, `None` when there are no tariffs.
    pub average_price: Option<Amount>,
}

impl TariffRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a regular tariff, returning the rule it replaced.
    pub fn set_tariff(
        &mut self,
        destination: Destination,
        price_per_minute: f64,
    ) -> Result<Option<PricingRule>, RuleError> {
        let rule = PricingRule::regular(destination, price_per_minute)?;
        Ok(self.set_rule(rule))
    }

    /// Insert or replace the rule for its destination.
    pub fn set_rule(&mut self, rule: PricingRule) -> Option<PricingRule> {
        let previous = self.rules.insert(rule.destination().clone(), rule);
        if let Some(old) = &previous {
            debug!(destination = %old.destination(), "tariff replaced");
        }
        previous
    }

    pub fn has_tariff(&self, destination: &Destination) -> bool {
        self.rules.contains_key(destination)
    }

    /// Effective price per minute for the destination.
    pub fn get_tariff(&self, destination: &Destination) -> Result<Amount, TariffNotFound> {
        self.rule(destination)
            .map(PricingRule::effective_price_per_minute)
            .ok_or_else(|| TariffNotFound(destination.clone()))
    }

    pub fn rule(&self, destination: &Destination) -> Option<&PricingRule> {
        self.rules.get(destination)
    }

    /// All tariffs, in no particular order.
    pub fn list_all(&self) -> impl Iterator<Item = (&Destination, &PricingRule)> + '_ {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Mean effective price per minute, `None` when empty.
    pub fn average_price(&self) -> Option<Amount> {
        let sum = Amount::checked_sum(
            self.rules
                .values()
                .map(PricingRule::effective_price_per_minute),
        )?;
        sum.average(self.rules.len())
    }

    pub fn stats(&self) -> TariffStats {
        let benefit = self
            .rules
            .values()
            .filter(|rule| matches!(rule.kind(), RuleKind::Benefit { .. }))
            .count();
        TariffStats {
            total: self.rules.len(),
            regular: self.rules.len() - benefit,
            benefit,
            average_price: self.average_price(),
        }
    }
}
