//! Change feed for the character table.
//!
//! Each subscriber owns an unbounded queue fed under the store lock, so it
//! sees every committed version exactly once and in commit order.

use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::models::Character;

/// Full contents of the table at one committed version.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub characters: Arc<Vec<Character>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl Deref for Snapshot {
    type Target = [Character];

    fn deref(&self) -> &Self::Target {
        &self.characters
    }
}

/// Infinite stream of table snapshots. Ends only if the store is dropped.
#[derive(Debug)]
pub struct CharacterFeed {
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl CharacterFeed {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Self { rx }
    }

    /// Wait for the next emission.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Next already-emitted snapshot, without waiting.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }

    /// Drain everything already emitted and return the newest, if any.
    pub fn try_latest(&mut self) -> Option<Snapshot> {
        let mut latest = None;
        while let Some(snapshot) = self.try_next() {
            latest = Some(snapshot);
        }
        latest
    }
}

impl Stream for CharacterFeed {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Listener list owned by the store.
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<mpsc::UnboundedSender<Snapshot>>,
}

impl Subscribers {
    /// Register a subscriber and hand it `current` as its first emission.
    pub(crate) fn subscribe(&mut self, current: Snapshot) -> CharacterFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive here, send cannot fail
        let _ = tx.send(current);
        self.senders.push(tx);
        CharacterFeed::new(rx)
    }

    /// Push a snapshot to every live subscriber, pruning dropped ones.
    pub(crate) fn publish(&mut self, snapshot: &Snapshot) {
        self.senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
