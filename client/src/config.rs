//! Runtime configuration loaded from the environment.
use alloy::{primitives::Address, transports::http::reqwest::Url};
use dotenv::dotenv;
use eyre::{bail, WrapErr};

use crate::network::NetworkDescriptor;

/// JSON-RPC endpoint of the target network.
pub const RPC_URL: &str = "RPC_URL";
/// Address of the deployed vesting contract.
pub const VESTING_CONTRACT_ADDRESS: &str = "VESTING_CONTRACT_ADDRESS";
/// Optional chain id override, decimal or `0x`-hex.
pub const CHAIN_ID: &str = "CHAIN_ID";
/// Optional network display name override.
pub const CHAIN_NAME: &str = "CHAIN_NAME";
/// Optional block explorer override.
pub const BLOCK_EXPLORER_URL: &str = "BLOCK_EXPLORER_URL";

/// Where the client talks to, and what it expects to find there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Vesting contract address.
    pub contract: Address,
    /// Network the wallet is expected to be on.
    pub network: NetworkDescriptor,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// If a required variable is missing or any variable is malformed.
    pub fn from_env() -> eyre::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from the variables returned by `lookup`,
    /// on top of the HyperEVM testnet defaults.
    ///
    /// # Errors
    ///
    /// If a required variable is missing or any variable is malformed.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> eyre::Result<Self> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| eyre::eyre!("Load {name} env var"))
        };

        let rpc_url: Url = required(RPC_URL)?
            .parse()
            .wrap_err_with(|| format!("Parse {RPC_URL}"))?;
        let contract: Address = required(VESTING_CONTRACT_ADDRESS)?
            .trim()
            .parse()
            .wrap_err_with(|| format!("Parse {VESTING_CONTRACT_ADDRESS}"))?;

        let mut network = NetworkDescriptor {
            rpc_url: rpc_url.to_string(),
            ..NetworkDescriptor::hyperevm_testnet()
        };
        if let Some(chain_id) = lookup(CHAIN_ID) {
            network.chain_id = parse_chain_id(&chain_id)
                .wrap_err_with(|| format!("Parse {CHAIN_ID}"))?;
        }
        if let Some(name) = lookup(CHAIN_NAME) {
            network.chain_name = name;
        }
        if let Some(explorer) = lookup(BLOCK_EXPLORER_URL) {
            let explorer: Url = explorer
                .parse()
                .wrap_err_with(|| format!("Parse {BLOCK_EXPLORER_URL}"))?;
            network.block_explorer = explorer.to_string();
        }

        Ok(Self { rpc_url, contract, network })
    }
}

fn parse_chain_id(text: &str) -> eyre::Result<u64> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    match parsed {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => bail!("chain id must not be zero"),
        Err(e) => {
            Err(e).wrap_err_with(|| format!("`{text}` is not a chain id"))
        }
    }
}
