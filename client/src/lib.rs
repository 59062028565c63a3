/*!
# Hyper Vesting

Client for a linear token-vesting contract with an optional cliff, deployed on
HyperEVM.

The contract is authoritative for balances, access control and vesting math.
This crate shapes requests for it, decodes what it returns, keeps a snapshot
of the connected account's streams and previews their progress locally.

## Usage

```ignore
use hyper_vesting::{
    config::Config, dashboard::Dashboard, gateway::Gateway,
    session::LocalWallet,
};

let config = Config::from_env()?;
let rpc_url = config.rpc_url.clone();
let wallet = LocalWallet::from_private_key(&private_key, rpc_url)?;
let gateway = Gateway::new(wallet.transport(config.contract));

let mut dashboard = Dashboard::new(gateway, wallet, config.network);
dashboard.connect().await?;
for stream in dashboard.streams().await {
    println!("#{}: {}", stream.id, stream.progress(now).status);
}
```
*/

#![allow(clippy::module_name_repetitions)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod form;
pub mod gateway;
pub mod network;
pub mod notifications;
pub mod pending;
pub mod progress;
pub mod session;
pub mod stream;
pub mod ticker;
pub mod units;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
