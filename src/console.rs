//! Interactive menu over any line-based input and output.
//!
//! Invalid input re-prompts; end of input ends the session.

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::exchange::Exchange;
use crate::model::{City, Destination, limits};
use crate::tariff::{PricingRule, TariffRegistry};

/// Tariffs the console starts with.
pub const SEED_TARIFFS: [(City, f64); 2] = [(City::Minsk, 0.5), (City::Gomel, 0.4)];

const CURRENCY: &str = "rub.";

const MENU: &str = "
==== ATC menu ====
1) Set regular tariff
2) Set benefit tariff
3) List tariffs
4) Tariff statistics
5) Clear all tariffs
6) Add client
7) List clients
8) Register call
9) Cost for client
10) Total cost of all calls
0) Exit";

/// Exchange with [`SEED_TARIFFS`] loaded.
pub fn seeded_exchange() -> Exchange {
    let mut tariffs = TariffRegistry::new();
    for (city, price) in SEED_TARIFFS {
        if let Err(e) = tariffs.set_tariff(city.into(), price) {
            warn!(city = %city, reason = %e, "seed tariff rejected");
        }
    }
    Exchange::with_tariffs(tariffs)
}

pub struct Console<R, W> {
    input: R,
    output: W,
    exchange: Exchange,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, exchange: Exchange) -> Self {
        Self {
            input,
            output,
            exchange,
        }
    }

    pub fn into_exchange(self) -> Exchange {
        self.exchange
    }

    /// Serve menu requests until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            "ATC billing started, {} tariffs loaded.",
            self.exchange.tariffs().len()
        )?;
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.read_int("Choose an item: ", 0..=10)? else {
                break;
            };
            let completed = match choice {
                1 => self.set_regular_tariff()?,
                2 => self.set_benefit_tariff()?,
                3 => self.list_tariffs()?,
                4 => self.tariff_stats()?,
                5 => self.clear_tariffs()?,
                6 => self.add_client()?,
                7 => self.list_clients()?,
                8 => self.register_call()?,
                9 => self.cost_for_client()?,
                10 => self.total_cost()?,
                _ => break, // 0
            };
            if completed.is_none() {
                break;
            }
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }
}

/// Menu actions. Each returns `None` when input ran out mid-action.
impl<R: BufRead, W: Write> Console<R, W> {
    fn set_regular_tariff(&mut self) -> io::Result<Option<()>> {
        let Some(destination) = self.read_destination()? else {
            return Ok(None);
        };
        let Some(price) = self.read_price()? else {
            return Ok(None);
        };
        match self.exchange.tariffs_mut().set_tariff(destination, price) {
            Ok(_) => writeln!(self.output, "Regular tariff set.")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(Some(()))
    }

    fn set_benefit_tariff(&mut self) -> io::Result<Option<()>> {
        let Some(destination) = self.read_destination()? else {
            return Ok(None);
        };
        let Some(price) = self.read_price()? else {
            return Ok(None);
        };
        let Some(discount) = self.read_float("Discount (%): ", |d| {
            limits::DISCOUNT_PERCENT.contains(&d)
        })?
        else {
            return Ok(None);
        };
        match PricingRule::benefit(destination, price, discount) {
            Ok(rule) => {
                self.exchange.tariffs_mut().set_rule(rule);
                writeln!(self.output, "Benefit tariff set.")?;
            }
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(Some(()))
    }

    fn list_tariffs(&mut self) -> io::Result<Option<()>> {
        let mut rules: Vec<_> = self.exchange.tariffs().list_all().map(|(_, r)| r).collect();
        if rules.is_empty() {
            writeln!(self.output, "No tariffs set.")?;
            return Ok(Some(()));
        }
        rules.sort_by_key(|rule| rule.destination().to_string().to_lowercase());
        writeln!(self.output, "Tariffs ({CURRENCY} per minute):")?;
        for (i, rule) in rules.iter().enumerate() {
            writeln!(self.output, "  {}. {rule}", i + 1)?;
        }
        Ok(Some(()))
    }

    fn tariff_stats(&mut self) -> io::Result<Option<()>> {
        let stats = self.exchange.tariffs().stats();
        let Some(average) = stats.average_price else {
            writeln!(self.output, "No tariffs set.")?;
            return Ok(Some(()));
        };
        writeln!(self.output, "Tariffs: {}", stats.total)?;
        writeln!(self.output, "Regular: {}", stats.regular)?;
        writeln!(self.output, "Benefit: {}", stats.benefit)?;
        writeln!(
            self.output,
            "Average price after discounts: {average} {CURRENCY} per minute"
        )?;
        Ok(Some(()))
    }

    fn clear_tariffs(&mut self) -> io::Result<Option<()>> {
        self.exchange.tariffs_mut().clear();
        writeln!(self.output, "All tariffs removed.")?;
        Ok(Some(()))
    }

    fn add_client(&mut self) -> io::Result<Option<()>> {
        let Some(name) = self.read_non_empty("Client last name: ")? else {
            return Ok(None);
        };
        if self.exchange.add_client(&name) {
            writeln!(self.output, "Client added.")?;
        } else {
            writeln!(self.output, "Client not added (duplicate name).")?;
        }
        Ok(Some(()))
    }

    fn list_clients(&mut self) -> io::Result<Option<()>> {
        if self.exchange.clients().is_empty() {
            writeln!(self.output, "No clients registered.")?;
            return Ok(Some(()));
        }
        writeln!(self.output, "Clients:")?;
        for name in self.exchange.list_clients() {
            writeln!(self.output, "  - {name}")?;
        }
        Ok(Some(()))
    }

    fn register_call(&mut self) -> io::Result<Option<()>> {
        let Some(name) = self.read_non_empty("Client last name: ")? else {
            return Ok(None);
        };
        let Some(destination) = self.read_destination()? else {
            return Ok(None);
        };
        if !self.exchange.tariffs().has_tariff(&destination) {
            writeln!(
                self.output,
                "No tariff set for {destination}. Set a tariff first."
            )?;
            return Ok(Some(()));
        }
        let prompt = format!(
            "Call duration in minutes ({}..{}): ",
            limits::CALL_MINUTES.start(),
            limits::CALL_MINUTES.end()
        );
        let Some(minutes) = self.read_int(&prompt, limits::CALL_MINUTES)? else {
            return Ok(None);
        };
        if self.exchange.register_call(&name, destination, minutes) {
            writeln!(self.output, "Call registered.")?;
        } else {
            writeln!(self.output, "Client not found.")?;
        }
        Ok(Some(()))
    }

    fn cost_for_client(&mut self) -> io::Result<Option<()>> {
        let Some(name) = self.read_non_empty("Client last name: ")? else {
            return Ok(None);
        };
        match self.exchange.cost_for_client(&name) {
            Ok(cost) => writeln!(self.output, "Total cost for {name}: {cost} {CURRENCY}")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(Some(()))
    }

    fn total_cost(&mut self) -> io::Result<Option<()>> {
        match self.exchange.total_cost_all_calls() {
            Ok(cost) => writeln!(self.output, "Total cost of all calls: {cost} {CURRENCY}")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(Some(()))
    }
}

/// Input helpers. `Ok(None)` means end of input.
impl<R: BufRead, W: Write> Console<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn read_non_empty(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            let Some(line) = self.read_line(prompt)? else {
                return Ok(None);
            };
            if !line.is_empty() {
                return Ok(Some(line));
            }
            writeln!(self.output, "Empty input is not allowed.")?;
        }
    }

    fn read_int<T>(
        &mut self,
        prompt: &str,
        range: std::ops::RangeInclusive<T>,
    ) -> io::Result<Option<T>>
    where
        T: std::str::FromStr + PartialOrd + std::fmt::Display,
    {
        loop {
            let Some(line) = self.read_non_empty(prompt)? else {
                return Ok(None);
            };
            match line.parse::<T>() {
                Ok(value) if range.contains(&value) => return Ok(Some(value)),
                Ok(_) => writeln!(
                    self.output,
                    "Value must be in [{}, {}].",
                    range.start(),
                    range.end()
                )?,
                Err(_) => writeln!(
                    self.output,
                    "Enter a whole number from {} to {}.",
                    range.start(),
                    range.end()
                )?,
            }
        }
    }

    /// Accepts `,` as the decimal separator.
    fn read_float(
        &mut self,
        prompt: &str,
        valid: impl Fn(f64) -> bool,
    ) -> io::Result<Option<f64>> {
        loop {
            let Some(line) = self.read_non_empty(prompt)? else {
                return Ok(None);
            };
            match line.replace(',', ".").parse::<f64>() {
                Ok(value) if value.is_finite() && valid(value) => return Ok(Some(value)),
                Ok(_) => writeln!(self.output, "Value out of range.")?,
                Err(_) => writeln!(self.output, "Enter a number.")?,
            }
        }
    }

    fn read_price(&mut self) -> io::Result<Option<f64>> {
        let prompt = format!(
            "Price per minute ({CURRENCY}, up to {}): ",
            limits::MAX_PRICE_PER_MINUTE
        );
        self.read_float(&prompt, limits::is_valid_price)
    }

    fn read_destination(&mut self) -> io::Result<Option<Destination>> {
        writeln!(self.output, "Cities:")?;
        for city in City::ALL {
            writeln!(self.output, "  {}) {city}", city.index())?;
        }
        loop {
            let Some(line) = self.read_non_empty("City number or name: ")? else {
                return Ok(None);
            };
            match Destination::from_selection(&line) {
                Ok(destination) => return Ok(Some(destination)),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }
}
