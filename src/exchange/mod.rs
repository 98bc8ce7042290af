//! The exchange directory.
//!
//! The exchange owns the registered clients and the tariff registry used to
//! price their calls. It answers per-client and aggregate cost queries and
//! applies [`Command`]s, one at a time or from an async stream.

use std::collections::HashMap;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::Amount;
use crate::model::{Command, Destination};
use crate::tariff::{CostOverflow, PricingRule, TariffNotFound, TariffRegistry};

mod client;
pub use client::Client;

mod error;
pub use error::ExchangeError;

/// Clients in registration order plus the tariffs that price their calls.
#[derive(Debug, Default)]
pub struct Exchange {
    tariffs: TariffRegistry,
    clients: Vec<Client>,
    /// Lowercased last name -> position in `clients`
    by_name: HashMap<String, usize>,
}

fn name_key(last_name: &str) -> String {
    last_name.trim().to_lowercase()
}

/// Public API
impl Exchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tariffs(tariffs: TariffRegistry) -> Self {
        Self {
            tariffs,
            ..Self::default()
        }
    }

    pub fn tariffs(&self) -> &TariffRegistry {
        &self.tariffs
    }

    pub fn tariffs_mut(&mut self) -> &mut TariffRegistry {
        &mut self.tariffs
    }

    /// Register a client. Returns `false` for a blank name or a name already
    /// registered, ignoring case.
    pub fn add_client(&mut self, last_name: &str) -> bool {
        let key = name_key(last_name);
        if key.is_empty() || self.by_name.contains_key(&key) {
            return false;
        }
        self.by_name.insert(key, self.clients.len());
        self.clients.push(Client::new(last_name.trim()));
        true
    }

    /// Case-insensitive lookup.
    pub fn find_client(&self, last_name: &str) -> Option<&Client> {
        self.by_name
            .get(&name_key(last_name))
            .map(|&idx| &self.clients[idx])
    }

    /// Record a call. Returns `false`, changing nothing, if the client is unknown.
    ///
    /// The destination is not checked against the tariffs here.
    pub fn register_call(
        &mut self,
        last_name: &str,
        destination: Destination,
        minutes: u32,
    ) -> bool {
        match self.by_name.get(&name_key(last_name)) {
            Some(&idx) => {
                self.clients[idx].add_call(destination, minutes);
                true
            }
            None => false,
        }
    }

    pub fn cost_for_client(&self, last_name: &str) -> Result<Amount, ExchangeError> {
        let client = self
            .find_client(last_name)
            .ok_or_else(|| ExchangeError::ClientNotFound(last_name.to_string()))?;
        Ok(client.total_cost(&self.tariffs)?)
    }

    pub fn total_cost_all_calls(&self) -> Result<Amount, CostOverflow> {
        self.clients.iter().try_fold(Amount::ZERO, |total, client| {
            let cost = client.total_cost(&self.tariffs)?;
            total.checked_add(cost).ok_or(CostOverflow)
        })
    }

    /// Last names in registration order.
    pub fn list_clients(&self) -> impl Iterator<Item = &str> + '_ {
        self.clients.iter().map(Client::last_name)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Run the exchange over a stream of commands
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            // a rejected command never stops the run; apply already logged it
            let _ = self.apply(command);
        }
    }

    /// Apply a single command on top of the current state
    pub fn apply(&mut self, command: Command) -> Result<(), ExchangeError> {
        let result = match &command {
            Command::SetTariff { destination, price } => self
                .tariffs
                .set_tariff(destination.clone(), *price)
                .map(|_| ())
                .map_err(ExchangeError::from),
            Command::SetBenefitTariff {
                destination,
                price,
                discount,
            } => PricingRule::benefit(destination.clone(), *price, *discount)
                .map(|rule| {
                    self.tariffs.set_rule(rule);
                })
                .map_err(ExchangeError::from),
            Command::AddClient { last_name } => {
                if self.add_client(last_name) {
                    Ok(())
                } else {
                    Err(ExchangeError::ClientRejected(last_name.clone()))
                }
            }
            Command::RegisterCall {
                last_name,
                destination,
                minutes,
            } => self.apply_call(last_name, destination, *minutes),
        };
        Self::log_result(&command, &result);
        result
    }
}

/// Private API
impl Exchange {
    /// Calls to destinations without a tariff are refused before the client
    /// lookup, the same order the console asks in.
    fn apply_call(
        &mut self,
        last_name: &str,
        destination: &Destination,
        minutes: u32,
    ) -> Result<(), ExchangeError> {
        if !self.tariffs.has_tariff(destination) {
            return Err(TariffNotFound(destination.clone()).into());
        }
        if !self.register_call(last_name, destination.clone(), minutes) {
            return Err(ExchangeError::ClientNotFound(last_name.to_string()));
        }
        Ok(())
    }

    /// Small helper to log `apply` results
    fn log_result(command: &Command, result: &Result<(), ExchangeError>) {
        let (kind, subject) = match command {
            Command::SetTariff { destination, .. } => ("tariff", destination.to_string()),
            Command::SetBenefitTariff { destination, .. } => ("benefit", destination.to_string()),
            Command::AddClient { last_name } => ("client", last_name.clone()),
            Command::RegisterCall { last_name, .. } => ("call", last_name.clone()),
        };
        match result {
            Ok(()) => info!(subject = %subject, "{kind} applied"),
            Err(e) => info!(subject = %subject, reason = %e, "{kind} skipped"),
        }
    }
}
