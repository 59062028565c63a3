//! Conversion between human-readable decimal amounts and token base units.
use core::fmt;

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};

use crate::error::{Error, Result};

/// Decimal count of the native currency and of every token this client
/// knows about.
pub const NATIVE_DECIMALS: u8 = 18;

/// Parses a non-negative decimal `text` into base units of a token with
/// `decimals` fractional digits.
///
/// # Errors
///
/// * [`Error::InvalidInput`] - If `text` is empty, negative, not a plain
///   decimal number or has more fractional digits than `decimals`.
pub fn parse_amount(text: &str, decimals: u8) -> Result<U256> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::invalid_input("amount must not be empty"));
    }
    if text.starts_with('-') {
        return Err(Error::invalid_input("amount must not be negative"));
    }

    let (int, frac) = text.split_once('.').unwrap_or((text, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let empty = int.is_empty() && frac.is_empty();
    if empty || !is_digits(int) || !is_digits(frac) {
        return Err(Error::invalid_input(format!("`{text}` is not a number")));
    }
    if frac.len() > usize::from(decimals) {
        return Err(Error::invalid_input(format!(
            "`{text}` has more than {decimals} decimal places"
        )));
    }

    let int = if int.is_empty() { "0" } else { int };
    let normalized =
        if frac.is_empty() { int.to_owned() } else { format!("{int}.{frac}") };

    parse_units(&normalized, decimals)
        .map(alloy::primitives::utils::ParseUnits::get_absolute)
        .map_err(|e| Error::invalid_input(format!("`{text}`: {e}")))
}

/// Renders `value` base units as a decimal string.
///
/// Trailing fractional zeros are dropped, but one fractional digit is always
/// kept: `10^18` renders as `"1.0"` at 18 decimals.
#[must_use]
pub fn format_amount(value: U256, decimals: u8) -> String {
    let Ok(formatted) = format_units(value, decimals) else {
        return value.to_string();
    };

    match formatted.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            let frac = if frac.is_empty() { "0" } else { frac };
            format!("{int}.{frac}")
        }
        None => format!("{formatted}.0"),
    }
}

/// Parses an amount of native currency (18 decimals).
///
/// # Errors
///
/// See [`parse_amount`].
pub fn parse_ether(text: &str) -> Result<U256> {
    parse_amount(text, NATIVE_DECIMALS)
}

/// Formats an amount of native currency (18 decimals).
#[must_use]
pub fn format_ether(value: U256) -> String {
    format_amount(value, NATIVE_DECIMALS)
}

/// An amount of some token, kept in base units together with the token's
/// decimal count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    raw: U256,
    decimals: u8,
}

impl Amount {
    /// Wraps `raw` base units of a token with `decimals` decimals.
    #[must_use]
    pub const fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Wraps `raw` base units of an 18-decimal token.
    #[must_use]
    pub const fn from_wei(raw: U256) -> Self {
        Self::new(raw, NATIVE_DECIMALS)
    }

    /// Parses a human-readable decimal.
    ///
    /// # Errors
    ///
    /// See [`parse_amount`].
    pub fn parse(text: &str, decimals: u8) -> Result<Self> {
        parse_amount(text, decimals).map(|raw| Self::new(raw, decimals))
    }

    /// Base units.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.raw
    }

    /// Decimal count of the token.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.raw, self.decimals))
    }
}
