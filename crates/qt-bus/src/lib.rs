//! # qt-bus
//!
//! Pub/sub message bus clients used by strategies.
//!
//! The runtime only depends on the [`BusPublisher`] and [`BusSubscriber`]
//! traits, so the transport can be swapped without touching strategy code.
//!
//! | Transport  | Module      | Use                                        |
//! |------------|-------------|--------------------------------------------|
//! | In-process | `local`     | tests, backtests, single-process setups    |
//! | Redis      | `redis_bus` | production: shared broker across processes |
//!
//! ## Channels
//!
//! - `trader_cmd`: order commands from every strategy
//! - `<prefix><ticker>`: market data, one channel per ticker
//! - `<strategy_id>`: order responses for one strategy

pub mod local;
pub mod redis_bus;

use async_trait::async_trait;
use qt_core::Result;

pub use local::{LocalBus, LocalPublisher, LocalSubscriber};
pub use redis_bus::{RedisPublisher, RedisSubscriber};

/// One message received from a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Channel the message was published on.
    pub channel: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self { channel: channel.into(), payload: payload.into() }
    }
}

/// Publishing half of a bus connection.
///
/// Implementations take `&self` so one publisher can be shared by the
/// outbound command task and tooling.
#[async_trait]
pub trait BusPublisher: Send + Sync {
    /// Publish `payload` unmodified on `channel`.
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()>;
}

/// Subscribing half of a bus connection.
///
/// Owned exclusively by one strategy runtime. Only `Send` is required since
/// the receive loop is the only user.
#[async_trait]
pub trait BusSubscriber: Send {
    /// Add `channels` to the subscription set. Already-subscribed channels
    /// are ignored.
    async fn subscribe(&mut self, channels: &[String]) -> Result<()>;

    /// Wait for the next message on any subscribed channel.
    ///
    /// Returns `Ok(None)` once the subscription is closed.
    async fn next_message(&mut self) -> Result<Option<BusMessage>>;
}
