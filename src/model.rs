//! Core domain types for the exchange.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::tariff::RuleError;

/// Accepted bounds for values entered at the input boundary.
pub mod limits {
    use std::ops::RangeInclusive;

    use crate::Amount;

    /// Call duration in minutes (one day at most).
    pub const CALL_MINUTES: RangeInclusive<u32> = 1..=1440;
    /// Upper bound for a price per minute; the lower bound is exclusive zero.
    pub const MAX_PRICE_PER_MINUTE: f64 = 1000.0;
    /// Benefit discount, in percent.
    pub const DISCOUNT_PERCENT: RangeInclusive<f64> = 1.0..=99.0;
    /// Length of a free-text city name, in characters.
    pub const CITY_NAME_CHARS: RangeInclusive<usize> = 1..=50;

    /// Finite, at most [`MAX_PRICE_PER_MINUTE`] and still positive once
    /// rounded to [`Amount`] precision.
    pub fn is_valid_price(price: f64) -> bool {
        price.is_finite()
            && price <= MAX_PRICE_PER_MINUTE
            && Amount::from_float(price).is_positive()
    }
}

/// Cities known to the exchange, numbered from 1 in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum City {
    Minsk = 1,
    Gomel,
    Grodno,
    Brest,
    Mogilev,
    Vitebsk,
}

impl City {
    pub const ALL: [City; 6] = [
        City::Minsk,
        City::Gomel,
        City::Grodno,
        City::Brest,
        City::Mogilev,
        City::Vitebsk,
    ];

    /// 1-based position in [`City::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<City> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            City::Minsk => "Minsk",
            City::Gomel => "Gomel",
            City::Grodno => "Grodno",
            City::Brest => "Brest",
            City::Mogilev => "Mogilev",
            City::Vitebsk => "Vitebsk",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<City> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|city| city.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated free-text city name.
///
/// Letters (any alphabet), spaces and hyphens only, with at least one letter.
/// Compares and hashes case-insensitively; keeps the original spelling for display.
#[derive(Debug, Clone)]
pub struct CityName {
    display: String,
    key: String,
}

impl CityName {
    pub fn parse(input: &str) -> Result<Self, RuleError> {
        let name = input.trim();
        let invalid = || RuleError::InvalidDestination(input.to_string());

        if !limits::CITY_NAME_CHARS.contains(&name.chars().count()) {
            return Err(invalid());
        }
        if !name
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '-')
        {
            return Err(invalid());
        }
        if !name.chars().any(char::is_alphabetic) {
            return Err(invalid());
        }

        Ok(Self {
            display: name.to_string(),
            key: name.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl PartialEq for CityName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CityName {}

impl Hash for CityName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// A billable target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    City(City),
    Named(CityName),
}

impl Destination {
    /// Parse a menu selection: an integer picks a [`City`] by index,
    /// anything else is parsed as a name.
    pub fn from_selection(input: &str) -> Result<Self, RuleError> {
        match input.trim().parse::<usize>() {
            Ok(index) => City::from_index(index)
                .map(Destination::City)
                .ok_or_else(|| RuleError::InvalidDestination(input.to_string())),
            Err(_) => input.parse(),
        }
    }
}

impl FromStr for Destination {
    type Err = RuleError;

    /// Names of enumerated cities resolve to [`Destination::City`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(city) = City::from_name(s) {
            return Ok(Destination::City(city));
        }
        CityName::parse(s).map(Destination::Named)
    }
}

impl From<City> for Destination {
    fn from(city: City) -> Self {
        Destination::City(city)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::City(city) => fmt::Display::fmt(city, f),
            Destination::Named(name) => fmt::Display::fmt(name, f),
        }
    }
}

/// A single call made by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub destination: Destination,
    pub minutes: u32,
}

impl CallRecord {
    pub fn new(destination: Destination, minutes: u32) -> Self {
        Self {
            destination,
            minutes,
        }
    }
}

/// A request against the exchange, as produced by the batch reader.
#[derive(Debug, Clone)]
pub enum Command {
    /// Set a regular (flat) tariff for a destination.
    SetTariff { destination: Destination, price: f64 },
    /// Set a benefit (discounted) tariff for a destination.
    SetBenefitTariff {
        destination: Destination,
        price: f64,
        discount: f64,
    },
    /// Register a new client.
    AddClient { last_name: String },
    /// Record a call for an existing client.
    RegisterCall {
        last_name: String,
        destination: Destination,
        minutes: u32,
    },
}
