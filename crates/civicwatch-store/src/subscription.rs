//! Live-query deliveries.

use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::document::Document;
use crate::store_trait::{RemoteStoreError, RemoteStoreResult};

/// One delivery from a live query: the full current matching document
/// set, in query order.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
	pub docs: Vec<Document>,
}

impl ChangeSet {
	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}
}

/// Stream of [`ChangeSet`] deliveries for one subscription.
///
/// The first call to [`ChangeSetStream::next`] yields the snapshot taken
/// at subscribe time; later calls wait for pushed deliveries. Dropping
/// the stream unregisters the listener. A listener that falls behind the
/// backend's fan-out buffer observes a single
/// [`RemoteStoreError::Transport`] delivery and then continues with the
/// next available change-set.
pub struct ChangeSetStream {
	initial: Option<ChangeSet>,
	inner: BroadcastStream<ChangeSet>,
}

impl ChangeSetStream {
	pub(crate) fn new(initial: ChangeSet, receiver: broadcast::Receiver<ChangeSet>) -> Self {
		Self {
			initial: Some(initial),
			inner: BroadcastStream::new(receiver),
		}
	}

	/// Next delivery, or `None` once the backend shuts the channel down.
	pub async fn next(&mut self) -> Option<RemoteStoreResult<ChangeSet>> {
		if let Some(initial) = self.initial.take() {
			return Some(Ok(initial));
		}
		match self.inner.next().await {
			Some(Ok(change_set)) => Some(Ok(change_set)),
			Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => Some(Err(
				RemoteStoreError::Transport(format!("listener lagged {skipped} deliveries behind")),
			)),
			None => None,
		}
	}
}
