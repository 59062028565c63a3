//! Failures surfaced by the client.
//!
//! Every variant renders a message that can be shown to the user as-is, and
//! none of them is retried automatically.
use crate::pending::PendingKey;

/// Convenience alias for results produced by this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// An error that occurred while shaping, submitting or decoding a call to
/// the vesting contract.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A form field or argument was malformed. Raised before any external
    /// call is made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The user or the wallet policy refused to sign.
    #[error("Transaction was rejected")]
    WalletDeclined,
    /// The wallet is connected to a different chain than the target network.
    #[error(
        "wrong network: expected chain {expected}, wallet is on chain {actual}"
    )]
    NetworkMismatch {
        /// Chain id of the target network.
        expected: u64,
        /// Chain id the wallet reported.
        actual: u64,
    },
    /// Switching to (or registering) the target network failed.
    #[error("failed to switch network: {0}")]
    NetworkSwitchFailed(String),
    /// The contract rejected the call.
    #[error("{reason}")]
    CallReverted {
        /// Human-readable revert reason, when one could be recovered.
        reason: String,
    },
    /// Transport failure, timeout or a response of unexpected shape.
    #[error("call failed: {0}")]
    CallFailed(String),
    /// No authenticated account is available.
    #[error("Please connect your wallet first")]
    NotConnected,
    /// An operation with the same key is still in flight.
    #[error("an operation on {0} is already pending")]
    AlreadyPending(PendingKey),
}

impl Error {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    pub(crate) fn reverted(reason: impl Into<String>) -> Self {
        Error::CallReverted { reason: reason.into() }
    }

    pub(crate) fn call_failed(message: impl ToString) -> Self {
        Error::CallFailed(message.to_string())
    }
}
