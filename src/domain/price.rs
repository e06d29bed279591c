//! Ticket price
//!
//! Domain primitive for section prices. Prices are validated and rounded at
//! construction time, so an invalid or over-precise price cannot exist in a
//! stored section.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places kept on a price
const PRICE_SCALE: u32 = 2;

/// TicketPrice is a non-negative amount with exactly two decimal places.
///
/// # Invariants
/// - Value is never negative (free sections are allowed)
/// - Value is rounded half-up (away from zero) to 2 decimal places
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use ticken_ledger::domain::TicketPrice;
///
/// let price: TicketPrice = "12.345".parse().unwrap();
/// assert_eq!(price.value(), Decimal::new(1235, 2));
/// assert_eq!(price.to_string(), "12.35");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketPrice(Decimal);

/// Errors that can occur when creating a TicketPrice
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("ticket price must not be negative (got {0})")]
    Negative(Decimal),

    #[error("invalid ticket price format: {0}")]
    ParseError(String),
}

impl TicketPrice {
    /// Create a price, rounding half-up to 2 decimal places.
    ///
    /// # Errors
    /// - `PriceError::Negative` if the rounded value is below zero
    pub fn new(value: Decimal) -> Result<Self, PriceError> {
        let mut rounded =
            value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);

        if rounded.is_sign_negative() && !rounded.is_zero() {
            return Err(PriceError::Negative(value));
        }

        // normalize -0.00 and scale so equal prices compare and print the same
        if rounded.is_zero() {
            rounded = Decimal::ZERO;
        }
        rounded.rescale(PRICE_SCALE);

        Ok(Self(rounded))
    }

    /// A free ticket
    pub fn free() -> Self {
        Self(Decimal::new(0, PRICE_SCALE))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for TicketPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for TicketPrice {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|e| PriceError::ParseError(format!("{trimmed:?}: {e}")))?;
        TicketPrice::new(decimal)
    }
}

impl TryFrom<String> for TicketPrice {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TicketPrice::from_str(&value)
    }
}

impl From<TicketPrice> for String {
    fn from(price: TicketPrice) -> Self {
        price.to_string()
    }
}
