//! Unit-testing utilities: an in-memory vesting contract spoken to through
//! ABI-encoded calls, a scripted wallet and a manual clock.
use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use alloy::{
    primitives::{address, Address, Bytes, B256, U256},
    sol_types::{SolInterface, SolValue},
};
use async_trait::async_trait;
use tokio::sync::watch;

use crate::{
    error::{Error, Result},
    gateway::{Confirmation, TokenVesting::TokenVestingCalls, Transport},
    network::{AddChainParams, NetworkDescriptor},
    progress::Schedule,
    session::{WalletError, WalletProvider},
    ticker::Clock,
};

pub(crate) const ALICE: Address =
    address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
pub(crate) const BOB: Address =
    address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

#[derive(Clone, Debug)]
struct Record {
    creator: Address,
    recipient: Address,
    token: Address,
    total: U256,
    claimed: U256,
    schedule: Schedule,
}

#[derive(Debug, Default)]
struct ChainState {
    now: u64,
    next_id: u64,
    streams: BTreeMap<U256, Record>,
    failing_details: HashSet<U256>,
    truncated_details: HashSet<U256>,
    decline_next_send: bool,
    last_value: U256,
    sends: u64,
    gate: Option<watch::Sender<bool>>,
}

/// In-memory stand-in for the deployed vesting contract.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeChain {
    state: Arc<Mutex<ChainState>>,
}

impl FakeChain {
    pub(crate) fn new(now: u64) -> Self {
        let chain = Self::default();
        chain.state().now = now;
        chain
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    /// Transport acting on behalf of `caller`.
    pub(crate) fn transport(&self, caller: Address) -> FakeTransport {
        FakeTransport { chain: self.clone(), caller }
    }

    pub(crate) fn set_now(&self, now: u64) {
        self.state().now = now;
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn seed_stream(
        &self,
        creator: Address,
        recipient: Address,
        token: Address,
        total: u64,
        start_time: u64,
        cliff_duration: u64,
        stream_duration: u64,
    ) -> U256 {
        self.state().insert(Record {
            creator,
            recipient,
            token,
            total: U256::from(total),
            claimed: U256::ZERO,
            schedule: Schedule {
                start_time,
                cliff_duration,
                stream_duration,
                is_cancelled: false,
            },
        })
    }

    /// Makes every `getStreamDetails(id)` call fail at the transport level.
    pub(crate) fn fail_details(&self, id: U256) {
        self.state().failing_details.insert(id);
    }

    /// Makes `getStreamDetails(id)` return only eight words.
    pub(crate) fn truncate_details(&self, id: U256) {
        self.state().truncated_details.insert(id);
    }

    pub(crate) fn heal(&self) {
        let mut state = self.state();
        state.failing_details.clear();
        state.truncated_details.clear();
    }

    /// Parks every read-only call until [`Self::resume_calls`].
    pub(crate) fn pause_calls(&self) {
        self.state().gate = Some(watch::Sender::new(false));
    }

    pub(crate) fn resume_calls(&self) {
        if let Some(gate) = self.state().gate.take() {
            gate.send_replace(true);
        }
    }

    pub(crate) fn decline_next_send(&self) {
        self.state().decline_next_send = true;
    }

    pub(crate) fn last_value(&self) -> U256 {
        self.state().last_value
    }

    pub(crate) fn sends(&self) -> u64 {
        self.state().sends
    }
}

impl ChainState {
    fn insert(&mut self, record: Record) -> U256 {
        self.next_id += 1;
        let id = U256::from(self.next_id);
        self.streams.insert(id, record);
        id
    }

    fn stream(&mut self, id: U256) -> Result<&mut Record> {
        self.streams
            .get_mut(&id)
            .ok_or_else(|| Error::reverted("Stream does not exist"))
    }

    fn execute(
        &mut self,
        caller: Address,
        call: TokenVestingCalls,
        value: U256,
    ) -> Result<()> {
        let now = self.now;
        match call {
            TokenVestingCalls::createStream(call) => {
                let expected = if call.tokenAddress.is_zero() {
                    call.totalAmount
                } else {
                    U256::ZERO
                };
                if value != expected {
                    return Err(Error::reverted("Incorrect native amount"));
                }
                let seconds = |v: U256| u64::try_from(v).unwrap();
                self.insert(Record {
                    creator: caller,
                    recipient: call.recipient,
                    token: call.tokenAddress,
                    total: call.totalAmount,
                    claimed: U256::ZERO,
                    schedule: Schedule {
                        start_time: seconds(call.startTime),
                        cliff_duration: seconds(call.cliffDuration),
                        stream_duration: seconds(call.streamDuration),
                        is_cancelled: false,
                    },
                });
            }
            TokenVestingCalls::claimTokens(call) => {
                let stream = self.stream(call.streamId)?;
                if stream.recipient != caller {
                    return Err(Error::reverted("Only recipient can claim"));
                }
                if stream.schedule.is_cancelled {
                    return Err(Error::reverted("Stream is cancelled"));
                }
                let vested = stream.schedule.vested_preview(stream.total, now);
                if vested <= stream.claimed {
                    return Err(Error::reverted("No tokens to claim"));
                }
                stream.claimed = vested;
            }
            TokenVestingCalls::cancelStream(call) => {
                let stream = self.stream(call.streamId)?;
                if stream.creator != caller {
                    return Err(Error::reverted("Only creator can cancel"));
                }
                if stream.schedule.is_cancelled {
                    return Err(Error::reverted("Stream already cancelled"));
                }
                stream.schedule.is_cancelled = true;
            }
            _ => return Err(Error::call_failed("not a state-changing call")),
        }
        Ok(())
    }

    fn query(&self, call: TokenVestingCalls) -> Result<Bytes> {
        match call {
            TokenVestingCalls::getRecipientStreams(call) => {
                let ids: Vec<U256> = self
                    .streams
                    .iter()
                    .filter(|(_, s)| s.recipient == call.recipient)
                    .map(|(id, _)| *id)
                    .collect();
                Ok(ids.abi_encode().into())
            }
            TokenVestingCalls::getStreamDetails(call) => {
                let id = call.streamId;
                if self.failing_details.contains(&id) {
                    return Err(Error::call_failed("connection reset"));
                }
                let s = self.streams.get(&id).ok_or_else(|| {
                    Error::reverted("Stream does not exist")
                })?;
                let mut data = (
                    s.creator,
                    s.recipient,
                    s.token,
                    s.total,
                    s.claimed,
                    U256::from(s.schedule.start_time),
                    U256::from(s.schedule.cliff_duration),
                    U256::from(s.schedule.stream_duration),
                    s.schedule.is_cancelled,
                )
                    .abi_encode_params();
                if self.truncated_details.contains(&id) {
                    data.truncate(8 * 32);
                }
                Ok(data.into())
            }
            _ => Err(Error::call_failed("not a view call")),
        }
    }
}

/// [`Transport`] into a [`FakeChain`] with a fixed caller.
#[derive(Clone, Debug)]
pub(crate) struct FakeTransport {
    chain: FakeChain,
    caller: Address,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn call(&self, input: Bytes) -> Result<Bytes> {
        let call = TokenVestingCalls::abi_decode(&input)
            .map_err(|e| Error::call_failed(e))?;
        let gate =
            self.chain.state().gate.as_ref().map(watch::Sender::subscribe);
        if let Some(mut gate) = gate {
            // A dropped gate means the calls were resumed.
            let _ = gate.wait_for(|open| *open).await;
        }
        self.chain.state().query(call)
    }

    async fn send(&self, input: Bytes, value: U256) -> Result<Confirmation> {
        let call = TokenVestingCalls::abi_decode(&input)
            .map_err(|e| Error::call_failed(e))?;
        let mut state = self.chain.state();
        if std::mem::take(&mut state.decline_next_send) {
            return Err(Error::WalletDeclined);
        }
        state.execute(self.caller, call, value)?;
        state.last_value = value;
        state.sends += 1;
        Ok(Confirmation {
            tx_hash: B256::with_last_byte(
                u8::try_from(state.sends).unwrap_or(u8::MAX),
            ),
            block_number: Some(state.sends),
        })
    }
}

#[derive(Debug)]
struct WalletState {
    authenticated: bool,
    accounts: Vec<Address>,
    chain_id: u64,
    known_chains: HashSet<u64>,
    decline_login: bool,
    refuse_switch: bool,
    calls: Vec<&'static str>,
    added: Vec<AddChainParams>,
}

/// Scripted [`WalletProvider`].
#[derive(Clone, Debug)]
pub(crate) struct FakeWallet {
    state: Arc<Mutex<WalletState>>,
}

impl FakeWallet {
    pub(crate) fn new(account: Address, chain_id: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(WalletState {
                authenticated: false,
                accounts: vec![account],
                chain_id,
                known_chains: HashSet::from([chain_id]),
                decline_login: false,
                refuse_switch: false,
                calls: Vec::new(),
                added: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, WalletState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn knows_chain(self, chain_id: u64) -> Self {
        self.state().known_chains.insert(chain_id);
        self
    }

    pub(crate) fn declining_login(self) -> Self {
        self.state().decline_login = true;
        self
    }

    pub(crate) fn refusing_switch(self) -> Self {
        self.state().refuse_switch = true;
        self
    }

    pub(crate) fn chain(&self) -> u64 {
        self.state().chain_id
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    /// `wallet_addEthereumChain` requests received, as sent over the wire.
    pub(crate) fn added(&self) -> Vec<AddChainParams> {
        self.state().added.clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn login(&self) -> Result<(), WalletError> {
        let mut state = self.state();
        state.calls.push("login");
        if state.decline_login {
            return Err(rejected());
        }
        state.authenticated = true;
        Ok(())
    }

    async fn logout(&self) -> Result<(), WalletError> {
        let mut state = self.state();
        state.calls.push("logout");
        state.authenticated = false;
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        let state = self.state();
        if state.authenticated {
            Ok(state.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.state().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut state = self.state();
        state.calls.push("switch_chain");
        if state.refuse_switch {
            return Err(rejected());
        }
        if !state.known_chains.contains(&chain_id) {
            return Err(WalletError::new(
                WalletError::UNRECOGNIZED_CHAIN,
                format!("Unrecognized chain ID {chain_id:#x}"),
            ));
        }
        state.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(
        &self,
        network: &NetworkDescriptor,
    ) -> Result<(), WalletError> {
        let mut state = self.state();
        state.calls.push("add_chain");
        if state.refuse_switch {
            return Err(rejected());
        }

        // Goes through JSON like a browser wallet request would.
        let json = serde_json::to_string(&network.add_chain_params())
            .map_err(internal)?;
        let params: AddChainParams = serde_json::from_str(&json)
            .map_err(internal)?;
        let chain_id = params
            .chain_id
            .strip_prefix("0x")
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .ok_or_else(|| {
                internal(format!("bad chainId {}", params.chain_id))
            })?;

        state.known_chains.insert(chain_id);
        state.chain_id = chain_id;
        state.added.push(params);
        Ok(())
    }
}

fn internal(e: impl ToString) -> WalletError {
    WalletError::new(WalletError::INTERNAL, e.to_string())
}

fn rejected() -> WalletError {
    WalletError::new(WalletError::USER_REJECTED, "User rejected the request.")
}

/// [`Clock`] moved by hand.
#[derive(Clone, Debug, Default)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn at(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub(crate) fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}
