//! In-process bus built on a tokio broadcast channel.
//!
//! Every subscriber sees every message and filters on its own channel set,
//! which mirrors broker-side filtering closely enough for tests and
//! single-process runs. No serialization; payloads are passed as-is.
//!
//! The bus closes (subscribers get `Ok(None)`) once the [`LocalBus`] and all
//! of its publishers are dropped.

use ahash::AHashSet;
use async_trait::async_trait;
use qt_core::Result;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{BusMessage, BusPublisher, BusSubscriber};

const DEFAULT_CAPACITY: usize = 4096;

/// Factory for publishers and subscribers sharing one in-process bus.
#[derive(Debug, Clone)]
pub struct LocalBus {
    tx: broadcast::Sender<BusMessage>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus whose per-subscriber backlog holds `capacity` messages.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publisher(&self) -> LocalPublisher {
        LocalPublisher { tx: self.tx.clone() }
    }

    /// New subscriber with an empty channel set.
    pub fn subscriber(&self) -> LocalSubscriber {
        LocalSubscriber { rx: self.tx.subscribe(), channels: AHashSet::new() }
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishing handle for a [`LocalBus`].
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    tx: broadcast::Sender<BusMessage>,
}

#[async_trait]
impl BusPublisher for LocalPublisher {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        // Publishing to a channel nobody listens on is not an error on a
        // real broker either.
        if self.tx.send(BusMessage::new(channel, payload)).is_err() {
            debug!("no local subscribers for '{channel}'");
        }
        Ok(())
    }
}

/// Subscription on a [`LocalBus`].
#[derive(Debug)]
pub struct LocalSubscriber {
    rx: broadcast::Receiver<BusMessage>,
    channels: AHashSet<String>,
}

impl LocalSubscriber {
    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }
}

#[async_trait]
impl BusSubscriber for LocalSubscriber {
    async fn subscribe(&mut self, channels: &[String]) -> Result<()> {
        for channel in channels {
            if self.channels.insert(channel.clone()) {
                debug!("local subscribe '{channel}'");
            }
        }
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<BusMessage>> {
        loop {
            match self.rx.recv().await {
                Ok(msg) if self.channels.contains(&msg.channel) => return Ok(Some(msg)),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("local subscriber lagged, {n} message(s) dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(None),
            }
        }
    }
}
