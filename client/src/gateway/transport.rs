//! Seam between the gateway and the chain.
use alloy::{
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{PendingTransactionError, Provider},
    rpc::types::TransactionRequest,
    sol_types::{Revert, SolError},
    transports::{RpcError, TransportErrorKind},
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// EIP-1193 code for a request the user rejected.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Inclusion proof of a state-changing call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    /// Hash of the mined transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in, when the node reports it.
    pub block_number: Option<u64>,
}

/// Access to the deployed vesting contract.
///
/// Implementations receive ABI-encoded calldata and return raw return data;
/// encoding and decoding stay in [`crate::gateway::Gateway`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes a read-only call and returns the raw return data.
    async fn call(&self, input: Bytes) -> Result<Bytes>;

    /// Signs and submits a state-changing call carrying `value` wei, then
    /// waits until it is included.
    ///
    /// # Errors
    ///
    /// * [`Error::WalletDeclined`] - If signing was refused.
    /// * [`Error::CallReverted`] - If the contract rejected the call, or the
    ///   mined receipt reports failure.
    /// * [`Error::CallFailed`] - On transport failure.
    async fn send(&self, input: Bytes, value: U256) -> Result<Confirmation>;
}

/// [`Transport`] over an `alloy` provider. The provider's wallet signs.
#[derive(Clone, Debug)]
pub struct RpcTransport<P> {
    provider: P,
    contract: Address,
}

impl<P> RpcTransport<P> {
    /// Talks to the vesting contract at `contract` through `provider`.
    pub fn new(provider: P, contract: Address) -> Self {
        Self { provider, contract }
    }

    /// Address of the vesting contract.
    pub fn contract(&self) -> Address {
        self.contract
    }
}

#[async_trait]
impl<P: Provider> Transport for RpcTransport<P> {
    async fn call(&self, input: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(input);
        self.provider.call(tx).await.map_err(|e| classify(&e))
    }

    async fn send(&self, input: Bytes, value: U256) -> Result<Confirmation> {
        let tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(input)
            .with_value(value);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify(&e))?;
        tracing::debug!(tx_hash = %pending.tx_hash(), "transaction submitted");

        let receipt = pending.get_receipt().await.map_err(|e| match e {
            PendingTransactionError::TransportError(e) => classify(&e),
            e => Error::call_failed(e),
        })?;

        if !receipt.status() {
            return Err(Error::reverted("Transaction failed"));
        }

        Ok(Confirmation {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
        })
    }
}

/// Maps an RPC failure onto the client's error taxonomy.
pub(crate) fn classify(err: &RpcError<TransportErrorKind>) -> Error {
    let Some(payload) = err.as_error_resp() else {
        return classify_message(&err.to_string());
    };

    if payload.code == USER_REJECTED_CODE {
        return Error::WalletDeclined;
    }

    let reason = payload
        .as_revert_data()
        .and_then(|data| Revert::abi_decode(&data).ok())
        .map(|revert| revert.reason);
    match reason {
        Some(reason) => Error::reverted(reason),
        None => classify_message(&payload.message),
    }
}

/// Classifies a wallet or node error by its message.
pub(crate) fn classify_message(message: &str) -> Error {
    static REVERT_REASON: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"execution reverted: ([^"]*)"#)
            .expect("revert reason pattern should compile")
    });

    let lowercase = message.to_lowercase();
    let declined = ["user rejected", "user denied"];
    if declined.iter().any(|pattern| lowercase.contains(pattern)) {
        Error::WalletDeclined
    } else if lowercase.contains("insufficient funds") {
        Error::reverted("Insufficient funds for transaction")
    } else if lowercase.contains("execution reverted") {
        let reason = REVERT_REASON
            .captures(message)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim())
            .filter(|reason| !reason.is_empty())
            .unwrap_or("Transaction reverted");
        Error::reverted(reason)
    } else {
        Error::call_failed(message)
    }
}
