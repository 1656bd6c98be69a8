//! Redis pub/sub transport.
//!
//! # Reconnect contract
//!
//! Both halves reconnect lazily with the configured [`Backoff`]:
//!
//! - [`RedisPublisher`] drops its connection after a failed publish and
//!   reopens it on the next call. Retrying the publish itself is the caller's
//!   job (the outbound command task does it with backoff).
//! - [`RedisSubscriber`] detects a dead pub/sub stream, reconnects with
//!   backoff and re-subscribes every channel it has seen. When retries run out
//!   `next_message` fails with `QtError::Connection`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use futures_util::StreamExt;
use qt_core::backoff::{Backoff, retry};
use qt_core::{QtError, Result};
use redis::AsyncCommands;
use redis::aio::{MultiplexedConnection, PubSub};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{BusMessage, BusPublisher, BusSubscriber};

fn conn_err(e: redis::RedisError) -> QtError {
    QtError::Connection(e.to_string())
}

fn open_client(url: &str) -> Result<redis::Client> {
    redis::Client::open(url).map_err(|e| QtError::Config(format!("bad bus url '{url}': {e}")))
}

// ---------------------------------------------------------------------------
// RedisPublisher
// ---------------------------------------------------------------------------

/// Publishing half of a Redis bus connection.
pub struct RedisPublisher {
    client: redis::Client,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisPublisher {
    /// Connect to `url`, retrying with `backoff` until the broker answers.
    pub async fn connect(url: &str, backoff: &mut Backoff) -> Result<Self> {
        let client = open_client(url)?;
        let conn = retry(backoff, "redis publisher connect", || {
            let client = client.clone();
            async move { client.get_multiplexed_async_connection().await.map_err(conn_err) }
        })
        .await?;
        info!("redis publisher connected to {url}");
        Ok(Self { client, conn: Mutex::new(Some(conn)) })
    }
}

#[async_trait]
impl BusPublisher for RedisPublisher {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        let mut guard = self.conn.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => {
                debug!("redis publisher reconnecting");
                self.client.get_multiplexed_async_connection().await.map_err(conn_err)?
            }
        };

        let receivers: i64 = conn.publish(channel, payload).await.map_err(conn_err)?;
        debug!("published {} bytes on '{channel}' to {receivers} receiver(s)", payload.len());
        *guard = Some(conn);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RedisSubscriber
// ---------------------------------------------------------------------------

/// Subscribing half of a Redis bus connection.
pub struct RedisSubscriber {
    client: redis::Client,
    pubsub: Option<PubSub>,
    channels: BTreeSet<String>,
    backoff: Backoff,
}

impl RedisSubscriber {
    /// Connect to `url`. The backoff policy is kept for later reconnects.
    pub async fn connect(url: &str, mut backoff: Backoff) -> Result<Self> {
        let client = open_client(url)?;
        let pubsub = open_pubsub(&client, &[], &mut backoff).await?;
        info!("redis subscriber connected to {url}");
        Ok(Self { client, pubsub: Some(pubsub), channels: BTreeSet::new(), backoff })
    }

    async fn reconnect(&mut self) -> Result<()> {
        let channels: Vec<String> = self.channels.iter().cloned().collect();
        let pubsub = open_pubsub(&self.client, &channels, &mut self.backoff).await?;
        info!("redis subscriber reconnected, {} channel(s) restored", channels.len());
        self.pubsub = Some(pubsub);
        Ok(())
    }
}

async fn open_pubsub(
    client: &redis::Client,
    channels: &[String],
    backoff: &mut Backoff,
) -> Result<PubSub> {
    retry(backoff, "redis subscriber connect", || {
        let client = client.clone();
        let channels = channels.to_vec();
        async move {
            let mut pubsub = client.get_async_pubsub().await.map_err(conn_err)?;
            for channel in &channels {
                pubsub.subscribe(channel.as_str()).await.map_err(conn_err)?;
            }
            Ok(pubsub)
        }
    })
    .await
}

#[async_trait]
impl BusSubscriber for RedisSubscriber {
    async fn subscribe(&mut self, channels: &[String]) -> Result<()> {
        let fresh: Vec<&String> = channels.iter().filter(|c| !self.channels.contains(*c)).collect();
        if fresh.is_empty() {
            return Ok(());
        }

        if let Some(pubsub) = self.pubsub.as_mut() {
            for channel in &fresh {
                if let Err(e) = pubsub.subscribe(channel.as_str()).await {
                    // The channel is remembered below and restored on reconnect.
                    warn!("redis subscribe '{channel}' failed: {e}");
                    self.pubsub = None;
                    break;
                }
                debug!("redis subscribe '{channel}'");
            }
        }

        self.channels.extend(fresh.into_iter().cloned());
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<BusMessage>> {
        loop {
            if self.pubsub.is_none() {
                self.reconnect().await?;
            }
            let Some(pubsub) = self.pubsub.as_mut() else {
                continue;
            };

            let next = {
                let stream = pubsub.on_message();
                futures_util::pin_mut!(stream);
                stream.next().await
            };

            match next {
                Some(msg) => {
                    return Ok(Some(BusMessage::new(
                        msg.get_channel_name(),
                        msg.get_payload_bytes(),
                    )));
                }
                None => {
                    warn!("redis pub/sub stream ended, reconnecting");
                    self.pubsub = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    // Nothing listens on port 1, so every connect is refused right away.
    const DEAD_URL: &str = "redis://127.0.0.1:1";

    fn quick_backoff() -> Backoff {
        Backoff::new(Duration::from_millis(1), Duration::from_millis(2), 2)
    }

    #[tokio::test]
    async fn publisher_connect_gives_up_with_connection_error() {
        let mut backoff = quick_backoff();
        let err = RedisPublisher::connect(DEAD_URL, &mut backoff).await.err().unwrap();
        assert!(matches!(err, QtError::Connection(_)), "got {err:?}");
        assert!(err.is_transient());
        assert_eq!(backoff.attempts(), 2);
    }

    #[tokio::test]
    async fn subscriber_connect_gives_up_with_connection_error() {
        let err = RedisSubscriber::connect(DEAD_URL, quick_backoff()).await.err().unwrap();
        assert!(matches!(err, QtError::Connection(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_url_is_config_error() {
        let err = RedisPublisher::connect("not a url", &mut quick_backoff()).await.err().unwrap();
        assert!(matches!(err, QtError::Config(_)), "got {err:?}");
        let err = RedisSubscriber::connect("not a url", quick_backoff()).await.err().unwrap();
        assert!(matches!(err, QtError::Config(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn publish_without_broker_is_transient_and_keeps_no_connection() {
        let publisher = RedisPublisher { client: open_client(DEAD_URL).unwrap(), conn: Mutex::new(None) };
        let err = publisher.publish("trader_cmd", b"cmd").await.unwrap_err();
        assert!(err.is_transient(), "got {err:?}");
        assert!(publisher.conn.lock().await.is_none());
    }

    #[tokio::test]
    async fn lost_subscription_keeps_channels_and_fails_after_retries() {
        let mut subscriber = RedisSubscriber {
            client: open_client(DEAD_URL).unwrap(),
            pubsub: None,
            channels: BTreeSet::new(),
            backoff: quick_backoff(),
        };

        let channels = vec!["grid".to_string(), "IF2309".to_string()];
        subscriber.subscribe(&channels).await.unwrap();
        subscriber.subscribe(&channels[..1]).await.unwrap();
        assert_eq!(subscriber.channels.iter().collect::<Vec<_>>(), ["IF2309", "grid"]);

        let err = subscriber.next_message().await.unwrap_err();
        assert!(matches!(err, QtError::Connection(_)), "got {err:?}");
        assert!(subscriber.pubsub.is_none());
    }
}
