//! Background task that publishes queued commands on `trader_cmd`.
//!
//! Transient bus failures are retried with a fresh [`Backoff`] per command.
//! A command that still cannot be published is reported at error level with
//! its order id and reason; it is never dropped silently. That report and
//! [`PublisherStats`] are the only record of it: the sender already returned
//! `Ok` when the command was queued.

use qt_bus::BusPublisher;
use qt_core::TRADER_CMD_TOPIC;
use qt_core::backoff::{Backoff, BackoffConfig, retry};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::outbound::OutboundReceiver;

/// Counters returned when the publisher task exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublisherStats {
    pub published: u64,
    pub failed: u64,
}

/// Spawn the publisher task.
///
/// The task runs until every [`OrderSender`](crate::OrderSender) clone is
/// dropped and the queue is drained.
pub fn spawn_command_publisher<P>(
    publisher: P,
    rx: OutboundReceiver,
    backoff: BackoffConfig,
) -> JoinHandle<PublisherStats>
where
    P: BusPublisher + 'static,
{
    tokio::spawn(run_command_publisher(publisher, rx, backoff))
}

/// Drain `rx`, publishing each command. See [`spawn_command_publisher`].
pub async fn run_command_publisher<P: BusPublisher>(
    publisher: P,
    mut rx: OutboundReceiver,
    backoff: BackoffConfig,
) -> PublisherStats {
    let mut stats = PublisherStats::default();

    while let Some(cmd) = rx.recv().await {
        let mut policy = Backoff::from_config(&backoff);
        let publisher = &publisher;
        let payload = cmd.payload.as_slice();

        let result = retry(&mut policy, "publish command", move || {
            publisher.publish(TRADER_CMD_TOPIC, payload)
        })
        .await;

        match result {
            Ok(()) => {
                stats.published += 1;
                debug!("order {} for '{}' published", cmd.user_order_id, cmd.ticker);
            }
            Err(e) => {
                stats.failed += 1;
                error!("order {} for '{}' NOT published: {e}", cmd.user_order_id, cmd.ticker);
            }
        }
    }

    info!("command publisher exiting: published={}, failed={}", stats.published, stats.failed);
    stats
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use qt_bus::{BusSubscriber, LocalBus};
    use qt_core::{ContractTable, Direction, NewOrder, Offset, OrderRequest, OrderType, QtError, Result};

    use super::*;
    use crate::OrderSender;

    fn contracts() -> Arc<ContractTable> {
        let csv = "ticker,exchange,name,product_type,size,price_tick\nIF2309,CFFEX,IF Contract,0,300,0.2\n";
        Arc::new(ContractTable::from_reader(Cursor::new(csv)).unwrap())
    }

    #[tokio::test]
    async fn publishes_exactly_one_command() {
        let bus = LocalBus::new();
        let mut cmd_sub = bus.subscriber();
        cmd_sub.subscribe(&[TRADER_CMD_TOPIC.to_string()]).await.unwrap();

        let (sender, rx) = OrderSender::new("ABC", contracts(), 16);
        let task = spawn_command_publisher(bus.publisher(), rx, BackoffConfig::default());

        sender
            .send_order(&NewOrder::new("IF2309", Direction::Buy, Offset::Open, OrderType::Fak, 1, 4000.0))
            .unwrap();
        assert!(sender.buy_open("NOPE", 1, 1.0, OrderType::Fak).is_err());
        drop(sender);

        let stats = task.await.unwrap();
        assert_eq!(stats, PublisherStats { published: 1, failed: 0 });

        drop(bus);
        let msg = cmd_sub.next_message().await.unwrap().unwrap();
        assert_eq!(msg.channel, TRADER_CMD_TOPIC);
        let req = OrderRequest::decode(&msg.payload).unwrap();
        assert_eq!(req.ticker_index, 1);
        assert_eq!(req.volume, 1);
        assert_eq!(req.price, 4000.0);
        assert!(cmd_sub.next_message().await.unwrap().is_none());
    }

    /// Fails the first `failures` publishes with a connection error.
    struct FlakyPublisher {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl BusPublisher for FlakyPublisher {
        async fn publish(&self, _channel: &str, _payload: &[u8]) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                Err(QtError::Connection("broker down".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures() {
        let (sender, rx) = OrderSender::new("ABC", contracts(), 4);
        sender.buy_open("IF2309", 1, 4000.0, OrderType::Fak).unwrap();
        drop(sender);

        let flaky = FlakyPublisher { failures: 2, calls: AtomicU32::new(0) };
        let stats = run_command_publisher(flaky, rx, BackoffConfig::default()).await;
        assert_eq!(stats, PublisherStats { published: 1, failed: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn reports_exhausted_retries() {
        let (sender, rx) = OrderSender::new("ABC", contracts(), 4);
        // Queue acceptance is all the caller sees.
        assert!(sender.buy_open("IF2309", 1, 4000.0, OrderType::Fak).is_ok());
        drop(sender);

        let dead = FlakyPublisher { failures: u32::MAX, calls: AtomicU32::new(0) };
        let backoff = BackoffConfig { initial_ms: 1, max_ms: 4, max_retries: 3 };
        let stats = run_command_publisher(dead, rx, backoff).await;
        assert_eq!(stats, PublisherStats { published: 0, failed: 1 });
    }
}
