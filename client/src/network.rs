//! Target network the client expects the wallet to be connected to.
use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// Chain id of the HyperEVM testnet.
pub const HYPEREVM_TESTNET_CHAIN_ID: u64 = 0x3e6;

/// Native currency metadata, as wallets expect it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Display name, e.g. `Hype`.
    pub name: String,
    /// Ticker symbol, e.g. `HYPE`.
    pub symbol: String,
    /// Decimal count.
    pub decimals: u8,
}

/// Description of the network the vesting contract lives on.
///
/// Only used to ask the wallet to switch to (or register) the network and to
/// build explorer links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkDescriptor {
    /// Chain id.
    pub chain_id: u64,
    /// Display name.
    pub chain_name: String,
    /// Native currency metadata.
    pub native_currency: NativeCurrency,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Block explorer base URL.
    pub block_explorer: String,
}

/// Parameters of a `wallet_addEthereumChain` request (EIP-3085).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// `0x`-prefixed hexadecimal chain id.
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// Native currency metadata.
    pub native_currency: NativeCurrency,
    /// JSON-RPC endpoints.
    pub rpc_urls: Vec<String>,
    /// Block explorer base URLs.
    pub block_explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    /// HyperEVM testnet.
    #[must_use]
    pub fn hyperevm_testnet() -> Self {
        Self {
            chain_id: HYPEREVM_TESTNET_CHAIN_ID,
            chain_name: "HyperEVM".to_owned(),
            native_currency: NativeCurrency {
                name: "Hype".to_owned(),
                symbol: "HYPE".to_owned(),
                decimals: 18,
            },
            rpc_url: "https://rpc.hyperliquid-testnet.xyz/evm".to_owned(),
            block_explorer: "https://app.hyperliquid-testnet.xyz/explorer"
                .to_owned(),
        }
    }

    /// `0x`-prefixed hexadecimal chain id, as wallets report it.
    #[must_use]
    pub fn hex_chain_id(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Request body registering this network with a wallet, i.e. the
    /// parameter of a browser wallet's `wallet_addEthereumChain` request.
    #[must_use]
    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.hex_chain_id(),
            chain_name: self.chain_name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: vec![self.rpc_url.clone()],
            block_explorer_urls: vec![self.block_explorer.clone()],
        }
    }

    /// Explorer page of transaction `hash`.
    #[must_use]
    pub fn tx_link(&self, hash: &TxHash) -> String {
        format!("{}/tx/{hash}", self.explorer_base())
    }

    /// Explorer page of `address`.
    #[must_use]
    pub fn address_link(&self, address: &Address) -> String {
        format!("{}/address/{address}", self.explorer_base())
    }

    fn explorer_base(&self) -> &str {
        self.block_explorer.trim_end_matches('/')
    }
}

impl Default for NetworkDescriptor {
    fn default() -> Self {
        Self::hyperevm_testnet()
    }
}
