//! Authenticated wallet session.
//!
//! The wallet itself (custody, signing UI, login methods) is external. This
//! module only drives it through [`WalletProvider`] and keeps track of which
//! account is connected.
use std::sync::atomic::{AtomicBool, Ordering};

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    gateway::RpcTransport,
    network::NetworkDescriptor,
};

/// Error reported by a wallet, with an EIP-1193 style code.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct WalletError {
    /// Numeric error code.
    pub code: i64,
    /// Wallet-provided message.
    pub message: String,
}

impl WalletError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The wallet does not support the requested method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The wallet does not know the requested chain.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// The wallet failed internally, e.g. its node was unreachable.
    pub const INTERNAL: i64 = -32603;

    /// Creates a new wallet error.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

/// Wallet and authentication primitives the client relies on.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Authenticates the user.
    async fn login(&self) -> Result<(), WalletError>;

    /// Ends the authenticated session.
    async fn logout(&self) -> Result<(), WalletError>;

    /// Connected accounts; the first one is the active account.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Chain the wallet is currently connected to.
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Asks the wallet to switch to `chain_id`.
    ///
    /// Fails with [`WalletError::UNRECOGNIZED_CHAIN`] if the wallet does not
    /// know the chain yet.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Asks the wallet to register `network`.
    async fn add_chain(
        &self,
        network: &NetworkDescriptor,
    ) -> Result<(), WalletError>;
}

/// Wallet session with an explicit connect/disconnect lifecycle.
#[derive(Debug)]
pub struct Session<W> {
    wallet: W,
    account: Option<Address>,
}

impl<W: WalletProvider> Session<W> {
    /// Creates a disconnected session over `wallet`.
    pub fn new(wallet: W) -> Self {
        Self { wallet, account: None }
    }

    /// The wallet driving this session.
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Logs in and selects the wallet's first account.
    ///
    /// # Errors
    ///
    /// * [`Error::WalletDeclined`] - If the user refused to log in.
    /// * [`Error::NotConnected`] - If the wallet exposes no account.
    /// * [`Error::CallFailed`] - On any other wallet failure.
    pub async fn connect(&mut self) -> Result<Address> {
        self.wallet.login().await.map_err(wallet_failure)?;
        let account = self
            .wallet
            .accounts()
            .await
            .map_err(wallet_failure)?
            .first()
            .copied()
            .ok_or(Error::NotConnected)?;

        tracing::info!(%account, "wallet connected");
        self.account = Some(account);
        Ok(account)
    }

    /// Logs out and forgets the account.
    ///
    /// The account is forgotten even if the wallet fails to log out.
    ///
    /// # Errors
    ///
    /// * [`Error::CallFailed`] - If the wallet failed to log out.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(account) = self.account.take() {
            tracing::info!(%account, "wallet disconnected");
        }
        self.wallet.logout().await.map_err(wallet_failure)
    }

    /// Whether an account is connected.
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// The connected account.
    ///
    /// # Errors
    ///
    /// * [`Error::NotConnected`] - If no account is connected.
    pub fn account(&self) -> Result<Address> {
        self.account.ok_or(Error::NotConnected)
    }

    /// Checks that the wallet is on `network`.
    ///
    /// # Errors
    ///
    /// * [`Error::NetworkMismatch`] - If the wallet is on another chain.
    /// * [`Error::CallFailed`] - If the wallet could not report its chain.
    pub async fn check_network(
        &self,
        network: &NetworkDescriptor,
    ) -> Result<()> {
        let actual = self.wallet.chain_id().await.map_err(wallet_failure)?;
        if actual == network.chain_id {
            Ok(())
        } else {
            Err(Error::NetworkMismatch { expected: network.chain_id, actual })
        }
    }

    /// Makes sure the wallet is on `network`, switching to it and registering
    /// it with the wallet first if needed.
    ///
    /// # Errors
    ///
    /// * [`Error::NetworkSwitchFailed`] - If the wallet refused to switch or
    ///   register the network, or is still on another chain afterwards.
    pub async fn ensure_network(
        &self,
        network: &NetworkDescriptor,
    ) -> Result<()> {
        match self.check_network(network).await {
            Ok(()) => return Ok(()),
            Err(Error::NetworkMismatch { actual, .. }) => {
                tracing::info!(
                    from = actual,
                    to = network.chain_id,
                    "switching network"
                );
            }
            Err(e) => return Err(switch_failure(&e)),
        }

        match self.wallet.switch_chain(network.chain_id).await {
            Ok(()) => {}
            Err(e) if e.code == WalletError::UNRECOGNIZED_CHAIN => {
                let chain = &network.chain_name;
                tracing::info!(%chain, "registering network");
                self.wallet
                    .add_chain(network)
                    .await
                    .map_err(|e| switch_failure(&e))?;
            }
            Err(e) => return Err(switch_failure(&e)),
        }

        self.check_network(network).await.map_err(|e| switch_failure(&e))
    }
}

fn wallet_failure(e: WalletError) -> Error {
    if e.code == WalletError::USER_REJECTED {
        Error::WalletDeclined
    } else {
        Error::CallFailed(e.to_string())
    }
}

fn switch_failure(e: &impl ToString) -> Error {
    Error::NetworkSwitchFailed(e.to_string())
}

/// [`WalletProvider`] backed by a local private key and an HTTP endpoint.
///
/// It has nothing to ask a user, so logging in always succeeds, and it cannot
/// move to another network.
pub struct LocalWallet {
    signer: PrivateKeySigner,
    provider: DynProvider,
    authenticated: AtomicBool,
}

impl LocalWallet {
    /// Wallet for `signer` connected to `rpc_url`.
    pub fn new(signer: PrivateKeySigner, rpc_url: Url) -> Self {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(rpc_url)
            .erased();
        Self { signer, provider, authenticated: AtomicBool::new(false) }
    }

    /// Wallet for the hex-encoded private key `private_key`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] - If `private_key` is malformed.
    pub fn from_private_key(private_key: &str, rpc_url: Url) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|_| Error::invalid_input("malformed private key"))?;
        Ok(Self::new(signer, rpc_url))
    }

    /// Address of the local account.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Transport to the vesting contract at `contract`, signing with this
    /// wallet.
    pub fn transport(&self, contract: Address) -> RpcTransport<DynProvider> {
        RpcTransport::new(self.provider.clone(), contract)
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address())
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn login(&self) -> Result<(), WalletError> {
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn logout(&self) -> Result<(), WalletError> {
        self.authenticated.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.authenticated.load(Ordering::SeqCst) {
            Ok(vec![self.address()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::new(WalletError::INTERNAL, e.to_string()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        Err(WalletError::new(
            WalletError::UNSUPPORTED_METHOD,
            format!("a local wallet cannot switch to chain {chain_id:#x}"),
        ))
    }

    async fn add_chain(
        &self,
        network: &NetworkDescriptor,
    ) -> Result<(), WalletError> {
        Err(WalletError::new(
            WalletError::UNSUPPORTED_METHOD,
            format!("a local wallet cannot register {}", network.chain_name),
        ))
    }
}
