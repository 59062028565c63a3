//! Contract gateway: the five logical operations of the vesting contract.
//!
//! The gateway converts human-readable amounts to base units, encodes calls,
//! hands them to a [`Transport`] and decodes whatever comes back into named
//! records. State-changing operations return once the transaction is
//! included; refreshing any cached view afterwards is up to the caller.
use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::{SolCall, SolValue},
};

use crate::{
    error::{Error, Result},
    stream::{parse_address, StreamId, Token, VestingStream},
    units::{Amount, NATIVE_DECIMALS},
};

pub mod abi;
mod transport;

pub use abi::TokenVesting;
pub use transport::{Confirmation, RpcTransport, Transport, USER_REJECTED_CODE};

use abi::{STREAM_DETAILS_ARITY, WORD_BYTES};

/// Validated arguments of a `createStream` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateStream {
    /// Account the tokens vest to.
    pub recipient: Address,
    /// Asset paid out.
    pub token: Token,
    /// Total amount in base units.
    pub total_amount: Amount,
    /// Vesting start, Unix seconds.
    pub start_time: u64,
    /// Seconds after `start_time` before anything can be claimed.
    pub cliff_duration: u64,
    /// Seconds over which the amount vests, from the end of the cliff.
    pub stream_duration: u64,
}

impl CreateStream {
    /// Shapes a `createStream` request from user input.
    ///
    /// When `is_native` is set the stream pays out the native currency and
    /// `token_address` is ignored.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] - If an address or the amount is malformed,
    ///   or `stream_duration` is zero.
    pub fn new(
        recipient: &str,
        token_address: &str,
        total_amount: &str,
        start_time: u64,
        cliff_duration: u64,
        stream_duration: u64,
        is_native: bool,
    ) -> Result<Self> {
        let recipient = parse_address("recipient", recipient)?;
        let token = if is_native {
            Token::Native
        } else {
            Token::from(parse_address("token address", token_address)?)
        };
        let total_amount = Amount::parse(total_amount, NATIVE_DECIMALS)?;
        if stream_duration == 0 {
            return Err(Error::invalid_input(
                "stream duration must be at least one second",
            ));
        }

        Ok(Self {
            recipient,
            token,
            total_amount,
            start_time,
            cliff_duration,
            stream_duration,
        })
    }

    /// Calldata for this request.
    #[must_use]
    pub fn call(&self) -> TokenVesting::createStreamCall {
        TokenVesting::createStreamCall {
            recipient: self.recipient,
            tokenAddress: self.token.address(),
            totalAmount: self.total_amount.raw(),
            startTime: U256::from(self.start_time),
            cliffDuration: U256::from(self.cliff_duration),
            streamDuration: U256::from(self.stream_duration),
        }
    }

    /// Wei attached to the call: the whole amount for a native stream, zero
    /// for an ERC-20 stream.
    #[must_use]
    pub fn value(&self) -> U256 {
        match self.token {
            Token::Native => self.total_amount.raw(),
            Token::Erc20(_) => U256::ZERO,
        }
    }
}

/// Typed access to the vesting contract through a [`Transport`].
#[derive(Clone, Debug)]
pub struct Gateway<T> {
    transport: T,
}

impl<T: Transport> Gateway<T> {
    /// Creates a gateway over `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Creates a new vesting stream and waits for it to be included.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`].
    pub async fn create_stream(
        &self,
        request: &CreateStream,
    ) -> Result<Confirmation> {
        tracing::debug!(
            recipient = %request.recipient,
            token = %request.token.address(),
            amount = %request.total_amount,
            "creating stream"
        );
        let confirmation =
            self.send(&request.call(), request.value()).await?;
        tracing::info!(tx_hash = %confirmation.tx_hash, "stream created");
        Ok(confirmation)
    }

    /// Claims the tokens vested so far on stream `id`.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`].
    pub async fn claim_tokens(&self, id: StreamId) -> Result<Confirmation> {
        tracing::debug!(%id, "claiming tokens");
        let confirmation = self
            .send(&TokenVesting::claimTokensCall { streamId: id }, U256::ZERO)
            .await?;
        tracing::info!(%id, tx_hash = %confirmation.tx_hash, "tokens claimed");
        Ok(confirmation)
    }

    /// Cancels stream `id`. Only its creator may do so.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`].
    pub async fn cancel_stream(&self, id: StreamId) -> Result<Confirmation> {
        tracing::debug!(%id, "cancelling stream");
        let confirmation = self
            .send(&TokenVesting::cancelStreamCall { streamId: id }, U256::ZERO)
            .await?;
        let tx_hash = confirmation.tx_hash;
        tracing::info!(%id, %tx_hash, "stream cancelled");
        Ok(confirmation)
    }

    /// Identifiers of every stream paying out to `recipient`, in contract
    /// order.
    ///
    /// # Errors
    ///
    /// * [`Error::CallFailed`] - On transport failure or malformed return
    ///   data.
    pub async fn recipient_streams(
        &self,
        recipient: Address,
    ) -> Result<Vec<StreamId>> {
        let data = self
            .call(&TokenVesting::getRecipientStreamsCall { recipient })
            .await?;
        Vec::<U256>::abi_decode(&data).map_err(|e| {
            Error::call_failed(format!("malformed stream id list: {e}"))
        })
    }

    /// Full record of stream `id`.
    ///
    /// # Errors
    ///
    /// * [`Error::CallFailed`] - On transport failure, or if the return data
    ///   is not exactly the nine-field stream record.
    pub async fn stream_details(&self, id: StreamId) -> Result<VestingStream> {
        let data = self
            .call(&TokenVesting::getStreamDetailsCall { streamId: id })
            .await?;
        decode_stream(id, &data)
    }

    async fn call<C: SolCall>(&self, call: &C) -> Result<Bytes> {
        self.transport.call(call.abi_encode().into()).await
    }

    async fn send<C: SolCall>(
        &self,
        call: &C,
        value: U256,
    ) -> Result<Confirmation> {
        self.transport.send(call.abi_encode().into(), value).await
    }
}

/// Decodes `getStreamDetails` return data into a named record.
///
/// # Errors
///
/// * [`Error::CallFailed`] - If `data` does not hold exactly nine ABI words,
///   a word is out of range for its field, or a time does not fit in `u64`.
pub fn decode_stream(id: StreamId, data: &[u8]) -> Result<VestingStream> {
    if data.len() != STREAM_DETAILS_ARITY * WORD_BYTES {
        return Err(Error::call_failed(format!(
            "stream #{id}: expected {STREAM_DETAILS_ARITY} fields, \
             got {} bytes",
            data.len()
        )));
    }

    let details =
        TokenVesting::getStreamDetailsCall::abi_decode_returns_validate(data)
            .map_err(|e| {
                let reason = format!("stream #{id}: malformed record: {e}");
                Error::call_failed(reason)
            })?;

    let seconds = |field: &str, value: U256| {
        u64::try_from(value).map_err(|_| {
            Error::call_failed(format!(
                "stream #{id}: {field} {value} does not fit in 64 bits"
            ))
        })
    };

    Ok(VestingStream {
        id,
        creator: details.creator,
        recipient: details.recipient,
        token_address: details.tokenAddress,
        total_amount: Amount::from_wei(details.totalAmount),
        amount_claimed: Amount::from_wei(details.amountClaimed),
        start_time: seconds("start time", details.startTime)?,
        cliff_duration: seconds("cliff duration", details.cliffDuration)?,
        stream_duration: seconds("stream duration", details.streamDuration)?,
        is_cancelled: details.isCancelled,
    })
}
