//! Cached snapshot of the streams paying out to the connected account.
use alloy::primitives::Address;
use futures::future::try_join_all;

use crate::{
    error::Result,
    gateway::{Gateway, Transport},
    stream::{StreamId, VestingStream},
};

/// Resolves every stream paying out to `recipient`, in contract order.
///
/// Detail fetches run concurrently. A single failing fetch fails the whole
/// resolution.
///
/// # Errors
///
/// Any error of [`Gateway::recipient_streams`] or
/// [`Gateway::stream_details`].
pub async fn resolve<T: Transport>(
    gateway: &Gateway<T>,
    recipient: Address,
) -> Result<Vec<VestingStream>> {
    let ids = gateway.recipient_streams(recipient).await?;
    tracing::debug!(%recipient, count = ids.len(), "resolving streams");
    try_join_all(ids.into_iter().map(|id| gateway.stream_details(id))).await
}

/// Point-in-time copy of the connected account's streams.
///
/// The snapshot is stale after any state-changing call and must be
/// refreshed explicitly. It is replaced as a whole, never patched.
#[derive(Clone, Debug, Default)]
pub struct StreamDirectory {
    streams: Vec<VestingStream>,
}

impl StreamDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-resolves the streams of `recipient` and replaces the snapshot.
    ///
    /// On failure the previous snapshot is kept untouched.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub async fn refresh<T: Transport>(
        &mut self,
        gateway: &Gateway<T>,
        recipient: Address,
    ) -> Result<()> {
        let resolved = resolve(gateway, recipient).await;
        self.apply(recipient, resolved)
    }

    /// Installs the outcome of a [`resolve`] for `recipient`: the snapshot
    /// is replaced on success and kept on failure.
    ///
    /// # Errors
    ///
    /// The error of `resolved`, if any.
    pub fn apply(
        &mut self,
        recipient: Address,
        resolved: Result<Vec<VestingStream>>,
    ) -> Result<()> {
        match resolved {
            Ok(streams) => {
                tracing::info!(
                    %recipient,
                    count = streams.len(),
                    "streams refreshed"
                );
                self.replace(streams);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    %recipient,
                    error = %e,
                    kept = self.streams.len(),
                    "refresh failed, keeping previous streams"
                );
                Err(e)
            }
        }
    }

    /// Replaces the snapshot with `streams`.
    pub fn replace(&mut self, streams: Vec<VestingStream>) {
        self.streams = streams;
    }

    /// Streams of the snapshot, in contract order.
    #[must_use]
    pub fn streams(&self) -> &[VestingStream] {
        &self.streams
    }

    /// Stream `id`, if present in the snapshot.
    #[must_use]
    pub fn get(&self, id: StreamId) -> Option<&VestingStream> {
        self.streams.iter().find(|s| s.id == id)
    }

    /// Drops the snapshot.
    pub fn clear(&mut self) {
        self.streams.clear();
    }

    /// Number of streams in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
