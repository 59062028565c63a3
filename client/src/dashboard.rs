//! Application controller tying the wallet session, the contract gateway,
//! the stream directory and the notification log together.
//!
//! Every state-changing operation follows the same flow: validate, mark the
//! target as pending, submit and wait for inclusion, record a notification,
//! then refresh the directory.
use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy::primitives::Address;
use tokio::sync::RwLock;

use crate::{
    directory::{self, StreamDirectory},
    error::{Error, Result},
    form::CreateStreamForm,
    gateway::{Confirmation, Gateway, Transport},
    network::NetworkDescriptor,
    notifications::{
        Notification, NotificationFilter, NotificationKind, NotificationLog,
    },
    pending::{PendingKey, PendingSet},
    progress::Progress,
    session::{Session, WalletProvider},
    stream::{short_address, StreamId, VestingStream},
    ticker::{Clock, ProgressTicker, SystemClock, TICK},
};

/// Outcome of a confirmed state-changing operation.
#[derive(Debug)]
pub struct Submitted {
    /// Inclusion receipt.
    pub confirmation: Confirmation,
    /// Explorer page of the transaction.
    pub explorer_link: String,
    /// Result of the directory refresh that followed.
    ///
    /// A failed refresh does not undo the operation; the previous snapshot
    /// is kept and the caller may refresh again.
    pub refreshed: Result<()>,
}

/// Client state for one wallet and one vesting contract.
#[derive(Debug)]
pub struct Dashboard<T, W, C = SystemClock> {
    gateway: Gateway<T>,
    session: Session<W>,
    network: NetworkDescriptor,
    clock: C,
    directory: RwLock<StreamDirectory>,
    notifications: Mutex<NotificationLog>,
    pending: PendingSet,
}

impl<T: Transport, W: WalletProvider> Dashboard<T, W> {
    /// Creates a disconnected dashboard on the wall clock.
    pub fn new(
        gateway: Gateway<T>,
        wallet: W,
        network: NetworkDescriptor,
    ) -> Self {
        Self {
            gateway,
            session: Session::new(wallet),
            network,
            clock: SystemClock,
            directory: RwLock::default(),
            notifications: Mutex::default(),
            pending: PendingSet::default(),
        }
    }
}

impl<T: Transport, W: WalletProvider, C: Clock> Dashboard<T, W, C> {
    /// Replaces the clock used for progress and notification timestamps.
    pub fn with_clock<D: Clock>(self, clock: D) -> Dashboard<T, W, D> {
        Dashboard {
            gateway: self.gateway,
            session: self.session,
            network: self.network,
            clock,
            directory: self.directory,
            notifications: self.notifications,
            pending: self.pending,
        }
    }

    /// The wallet session.
    pub fn session(&self) -> &Session<W> {
        &self.session
    }

    /// The target network.
    pub fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    /// Connects the wallet, moves it to the target network and loads the
    /// account's streams.
    ///
    /// Streams are read through the gateway, not the wallet, so they are
    /// loaded even when the wallet stays on another network.
    ///
    /// # Errors
    ///
    /// * [`Error::WalletDeclined`] - If the user refused to log in.
    /// * [`Error::NetworkSwitchFailed`] - If the wallet could not be moved to
    ///   the target network. The session stays connected.
    /// * Any error of [`Dashboard::refresh`].
    pub async fn connect(&mut self) -> Result<Address> {
        let account = self.session.connect().await?;
        let switched = self.session.ensure_network(&self.network).await;
        let refreshed = self.refresh().await;
        switched?;
        refreshed?;
        Ok(account)
    }

    /// Disconnects the wallet and drops the cached streams.
    ///
    /// # Errors
    ///
    /// * [`Error::CallFailed`] - If the wallet failed to log out. The
    ///   session is torn down regardless.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.directory.get_mut().clear();
        self.session.disconnect().await
    }

    /// Asks the wallet to move to the target network.
    ///
    /// # Errors
    ///
    /// * [`Error::NetworkSwitchFailed`] - If the wallet refused.
    pub async fn switch_network(&self) -> Result<()> {
        self.session.ensure_network(&self.network).await
    }

    /// Reloads the connected account's streams.
    ///
    /// The snapshot stays readable while the streams are being fetched.
    ///
    /// # Errors
    ///
    /// * [`Error::NotConnected`] - If no wallet is connected.
    /// * Any error of [`directory::resolve`]; the previous snapshot is kept.
    pub async fn refresh(&self) -> Result<()> {
        let account = self.session.account()?;
        let resolved = directory::resolve(&self.gateway, account).await;
        self.directory.write().await.apply(account, resolved)
    }

    /// Snapshot of the connected account's streams.
    pub async fn streams(&self) -> Vec<VestingStream> {
        self.directory.read().await.streams().to_vec()
    }

    /// Stream `id` from the snapshot.
    pub async fn stream(&self, id: StreamId) -> Option<VestingStream> {
        self.directory.read().await.get(id).cloned()
    }

    /// Creates the stream described by `form`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] - If a form field is malformed.
    /// * [`Error::AlreadyPending`] - If a creation is already in flight.
    /// * [`Error::NotConnected`] - If no wallet is connected.
    /// * [`Error::NetworkMismatch`] - If the wallet is on another chain.
    /// * Any error of [`Gateway::create_stream`].
    pub async fn create_stream(
        &self,
        form: &CreateStreamForm,
    ) -> Result<Submitted> {
        let request = form.validate()?;
        let _guard = self.pending.begin(PendingKey::Create)?;
        self.ready().await?;

        let confirmation = self.gateway.create_stream(&request).await?;
        self.notify(
            NotificationKind::StreamCreated,
            "Stream created",
            format!(
                "Streaming {} {} to {}",
                request.total_amount,
                request.token.label(&self.network.native_currency.symbol),
                short_address(&request.recipient),
            ),
        );
        Ok(self.submitted(confirmation).await)
    }

    /// Claims the tokens vested so far on stream `id`.
    ///
    /// # Errors
    ///
    /// * [`Error::AlreadyPending`] - If an operation on `id` is in flight.
    /// * [`Error::NotConnected`] - If no wallet is connected.
    /// * [`Error::NetworkMismatch`] - If the wallet is on another chain.
    /// * Any error of [`Gateway::claim_tokens`].
    pub async fn claim(&self, id: StreamId) -> Result<Submitted> {
        let _guard = self.pending.begin(PendingKey::Stream(id))?;
        self.ready().await?;

        let confirmation = self.gateway.claim_tokens(id).await?;
        self.notify(
            NotificationKind::TokensClaimed,
            "Tokens claimed",
            format!("Claimed vested tokens from stream #{id}"),
        );
        Ok(self.submitted(confirmation).await)
    }

    /// Cancels stream `id`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] - If the snapshot shows `id` as cancelled.
    /// * [`Error::AlreadyPending`] - If an operation on `id` is in flight.
    /// * [`Error::NotConnected`] - If no wallet is connected.
    /// * [`Error::NetworkMismatch`] - If the wallet is on another chain.
    /// * Any error of [`Gateway::cancel_stream`].
    pub async fn cancel(&self, id: StreamId) -> Result<Submitted> {
        if self.stream(id).await.is_some_and(|s| s.is_cancelled) {
            return Err(Error::invalid_input(format!(
                "stream #{id} is already cancelled"
            )));
        }
        let _guard = self.pending.begin(PendingKey::Stream(id))?;
        self.ready().await?;

        let confirmation = self.gateway.cancel_stream(id).await?;
        self.notify(
            NotificationKind::StreamCancelled,
            "Stream cancelled",
            format!("Stream #{id} was cancelled"),
        );
        Ok(self.submitted(confirmation).await)
    }

    /// Whether an operation on `key` is in flight.
    pub fn is_pending(&self, key: PendingKey) -> bool {
        self.pending.is_pending(key)
    }

    /// Notifications selected by `filter`, newest first.
    pub fn notifications(
        &self,
        filter: NotificationFilter,
    ) -> Vec<Notification> {
        self.log().filter(filter).cloned().collect()
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.log().unread_count()
    }

    /// Marks notification `id` as read.
    pub fn mark_read(&self, id: u64) {
        self.log().mark_read(id);
    }

    /// Progress of stream `id` at `now`, if it is in the snapshot.
    pub async fn progress(&self, id: StreamId, now: u64) -> Option<Progress> {
        self.stream(id).await.map(|s| s.progress(now))
    }

    async fn ready(&self) -> Result<()> {
        self.session.account()?;
        self.session.check_network(&self.network).await
    }

    async fn submitted(&self, confirmation: Confirmation) -> Submitted {
        Submitted {
            confirmation,
            explorer_link: self.network.tx_link(&confirmation.tx_hash),
            refreshed: self.refresh().await,
        }
    }

    fn notify(&self, kind: NotificationKind, title: &str, message: String) {
        let now = self.clock.now();
        self.log().record(kind, title, message, now);
    }

    fn log(&self) -> MutexGuard<'_, NotificationLog> {
        self.notifications.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Transport, W: WalletProvider, C: Clock + Clone> Dashboard<T, W, C> {
    /// Starts a ticker publishing the progress of stream `id` every second.
    ///
    /// The ticker stops when dropped. Returns `None` if `id` is not in the
    /// snapshot.
    pub async fn watch(&self, id: StreamId) -> Option<ProgressTicker> {
        let schedule = self.stream(id).await?.schedule();
        Some(ProgressTicker::spawn(schedule, self.clock.clone(), TICK))
    }
}
