//! Raw create-stream form input and its validation.
use crate::{
    error::{Error, Result},
    gateway::CreateStream,
};

/// Stream durations offered as presets, in seconds.
pub mod durations {
    /// 90 days.
    pub const THREE_MONTHS: u64 = 7_776_000;
    /// 180 days.
    pub const SIX_MONTHS: u64 = 15_552_000;
    /// 365 days.
    pub const ONE_YEAR: u64 = 31_536_000;
    /// 730 days.
    pub const TWO_YEARS: u64 = 63_072_000;

    /// Every preset with its label, shortest first.
    pub const PRESETS: [(&str, u64); 4] = [
        ("3 months", THREE_MONTHS),
        ("6 months", SIX_MONTHS),
        ("1 year", ONE_YEAR),
        ("2 years", TWO_YEARS),
    ];
}

/// Create-stream form fields, exactly as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateStreamForm {
    /// Recipient address.
    pub recipient: String,
    /// ERC-20 token address. Ignored for native streams.
    pub token_address: String,
    /// Decimal amount, in whole tokens.
    pub total_amount: String,
    /// Vesting start, Unix seconds.
    pub start_time: String,
    /// Cliff, in seconds.
    pub cliff_duration: String,
    /// Vesting duration after the cliff, in seconds.
    pub stream_duration: String,
    /// Whether the stream pays out the native currency.
    pub is_native_token: bool,
}

impl Default for CreateStreamForm {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            token_address: String::new(),
            total_amount: String::new(),
            start_time: String::new(),
            cliff_duration: "0".to_owned(),
            stream_duration: String::new(),
            is_native_token: false,
        }
    }
}

impl CreateStreamForm {
    /// Checks every field and shapes the contract request.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] - Naming the first malformed field.
    pub fn validate(&self) -> Result<CreateStream> {
        let start_time = seconds("start time", &self.start_time)?;
        let cliff_duration = seconds("cliff duration", &self.cliff_duration)?;
        let stream_duration =
            seconds("stream duration", &self.stream_duration)?;

        CreateStream::new(
            &self.recipient,
            &self.token_address,
            &self.total_amount,
            start_time,
            cliff_duration,
            stream_duration,
            self.is_native_token,
        )
    }

    /// Sets the stream duration to one of the [`durations`] presets.
    pub fn set_stream_duration(&mut self, seconds: u64) {
        self.stream_duration = seconds.to_string();
    }

    /// Clears the form back to its defaults, keeping the token choice.
    pub fn reset(&mut self) {
        let is_native_token = self.is_native_token;
        *self = Self { is_native_token, ..Self::default() };
    }
}

fn seconds(field: &str, text: &str) -> Result<u64> {
    let text = text.trim();
    text.parse().map_err(|_| {
        Error::invalid_input(format!(
            "{field} must be a whole number of seconds, got `{text}`"
        ))
    })
}
