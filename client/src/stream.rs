//! Vesting stream records as read from the contract.
use alloy::primitives::{Address, U256};

use crate::{
    error::{Error, Result},
    progress::{progress, Progress, Schedule},
    units::Amount,
};

/// Identifier the contract assigns to a stream.
pub type StreamId = U256;

/// Asset a stream pays out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// The chain's native currency, encoded on-chain as [`Address::ZERO`].
    Native,
    /// An ERC-20 token contract.
    Erc20(Address),
}

impl Token {
    /// Address passed to the contract for this token.
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Token::Native => Address::ZERO,
            Token::Erc20(address) => *address,
        }
    }

    /// Short label: `native_symbol` for the native currency, an abbreviated
    /// address otherwise.
    #[must_use]
    pub fn label(&self, native_symbol: &str) -> String {
        match self {
            Token::Native => native_symbol.to_owned(),
            Token::Erc20(address) => short_address(address),
        }
    }
}

impl From<Address> for Token {
    fn from(address: Address) -> Self {
        if address.is_zero() {
            Token::Native
        } else {
            Token::Erc20(address)
        }
    }
}

/// One vesting schedule, as a point-in-time snapshot of contract state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VestingStream {
    /// Stream identifier.
    pub id: StreamId,
    /// Account that created (and funded) the stream.
    pub creator: Address,
    /// Account the tokens vest to.
    pub recipient: Address,
    /// ERC-20 token address, or [`Address::ZERO`] for the native currency.
    pub token_address: Address,
    /// Total amount locked in the stream.
    pub total_amount: Amount,
    /// Amount already claimed by the recipient.
    pub amount_claimed: Amount,
    /// Vesting start, Unix seconds.
    pub start_time: u64,
    /// Seconds after `start_time` before anything can be claimed.
    pub cliff_duration: u64,
    /// Seconds over which the amount vests, from the end of the cliff.
    pub stream_duration: u64,
    /// Whether the stream was cancelled. Terminal.
    pub is_cancelled: bool,
}

impl VestingStream {
    /// Asset this stream pays out.
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from(self.token_address)
    }

    /// Whether the stream pays out the native currency.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.token() == Token::Native
    }

    /// Timing parameters of the stream.
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        Schedule {
            start_time: self.start_time,
            cliff_duration: self.cliff_duration,
            stream_duration: self.stream_duration,
            is_cancelled: self.is_cancelled,
        }
    }

    /// Progress at `now`.
    #[must_use]
    pub fn progress(&self, now: u64) -> Progress {
        progress(&self.schedule(), now)
    }

    /// Estimate of the amount claimable at `now`. Zero once cancelled.
    #[must_use]
    pub fn claimable_preview(&self, now: u64) -> Amount {
        let raw = if self.is_cancelled {
            U256::ZERO
        } else {
            self.schedule()
                .vested_preview(self.total_amount.raw(), now)
                .saturating_sub(self.amount_claimed.raw())
        };
        Amount::new(raw, self.total_amount.decimals())
    }
}

/// Parses a `0x`-prefixed, 40-hex-digit account address.
///
/// # Errors
///
/// * [`Error::InvalidInput`] - If `text` is not a well-formed address.
pub fn parse_address(field: &str, text: &str) -> Result<Address> {
    let text = text.trim();
    let well_formed = text.len() == 42
        && text.starts_with("0x")
        && text[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if !well_formed {
        return Err(Error::invalid_input(format!(
            "Invalid address format for {field}: `{text}`"
        )));
    }
    text.parse().map_err(|e| {
        Error::invalid_input(format!("Invalid address format for {field}: {e}"))
    })
}

/// Abbreviates `address` as `0x123456...abcdef`.
#[must_use]
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..8], &full[full.len() - 6..])
}
