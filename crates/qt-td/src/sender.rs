//! Order sender used by strategies.
//!
//! Encodes orders and hands the bytes to the outbound queue. Every call
//! returns a structured result: an order is either queued for publishing on
//! `trader_cmd`, or the caller learns why it was not.

use std::sync::Arc;

use qt_core::{ContractTable, Direction, NewOrder, Offset, OrderType, QtError, Result};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

use crate::encoder::OrderRequestEncoder;
use crate::outbound::{OutboundCommand, OutboundReceiver, OutboundSender};

/// Encodes and enqueues order commands for one strategy.
#[derive(Debug, Clone)]
pub struct OrderSender {
    strategy_id: String,
    encoder: OrderRequestEncoder,
    tx: OutboundSender,
}

impl OrderSender {
    /// Create a sender with a bounded outbound queue of `capacity` commands.
    ///
    /// Returns the sender and the queue receiver that the publisher task
    /// should drain.
    pub fn new(
        strategy_id: impl Into<String>,
        contracts: Arc<ContractTable>,
        capacity: usize,
    ) -> (Self, OutboundReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        let sender = Self {
            strategy_id: strategy_id.into(),
            encoder: OrderRequestEncoder::new(contracts),
            tx,
        };
        (sender, rx)
    }

    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    pub fn contracts(&self) -> &Arc<ContractTable> {
        self.encoder.contracts()
    }

    /// Encode `order` and queue it for publishing.
    ///
    /// - unknown ticker → `EncodingSkipped`, nothing queued
    /// - queue at capacity → `OutboundQueueFull`
    /// - publisher gone → `OutboundClosed`
    ///
    /// `Ok` means the command was queued, not that it reached the bus. A
    /// command the publisher task later fails to deliver is logged at error
    /// level and counted in [`PublisherStats`](crate::PublisherStats); the
    /// strategy sees no order response for it.
    pub fn send_order(&self, order: &NewOrder) -> Result<()> {
        info!(
            "send_order ticker={} {} {} {} volume={} price={} user_order_id={}",
            order.ticker,
            order.direction,
            order.offset,
            order.order_type,
            order.volume,
            order.price,
            order.user_order_id
        );

        let payload = self.encoder.encode(order, &self.strategy_id).map_err(|e| {
            warn!("order for '{}' skipped: {e}", order.ticker);
            QtError::EncodingSkipped { ticker: order.ticker.clone(), reason: e.to_string() }
        })?;

        let cmd = OutboundCommand {
            user_order_id: order.user_order_id,
            ticker: order.ticker.clone(),
            payload,
        };
        match self.tx.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(cmd)) => {
                warn!("outbound queue full, order {} for '{}' rejected", cmd.user_order_id, cmd.ticker);
                Err(QtError::OutboundQueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(QtError::OutboundClosed),
        }
    }

    pub fn buy_open(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.send_order(&NewOrder::new(ticker, Direction::Buy, Offset::Open, order_type, volume, price))
    }

    pub fn buy_close(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.send_order(&NewOrder::new(
            ticker,
            Direction::Buy,
            Offset::CloseToday,
            order_type,
            volume,
            price,
        ))
    }

    pub fn sell_open(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.send_order(&NewOrder::new(ticker, Direction::Sell, Offset::Open, order_type, volume, price))
    }

    pub fn sell_close(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.send_order(&NewOrder::new(
            ticker,
            Direction::Sell,
            Offset::CloseToday,
            order_type,
            volume,
            price,
        ))
    }

    /// Order cancellation has no wire message yet.
    pub fn cancel_order(&self, order_id: u64) -> Result<()> {
        warn!("cancel_order({order_id}) rejected: no cancel command on the wire");
        Err(QtError::Unsupported("cancel_order"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use qt_core::OrderRequest;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;

    fn contracts() -> Arc<ContractTable> {
        let csv = "ticker,exchange,name,product_type,size,price_tick\nIF2309,CFFEX,IF Contract,0,300,0.2\n";
        Arc::new(ContractTable::from_reader(Cursor::new(csv)).unwrap())
    }

    #[test]
    fn queues_encoded_command() {
        let (sender, mut rx) = OrderSender::new("ABC", contracts(), 8);
        sender
            .send_order(&NewOrder::new("IF2309", Direction::Buy, Offset::Open, OrderType::Fak, 1, 4000.0))
            .unwrap();

        let cmd = rx.try_recv().unwrap();
        let req = OrderRequest::decode(&cmd.payload).unwrap();
        assert_eq!(req.ticker_index, 1);
        assert_eq!(req.direction, Direction::Buy);
        assert_eq!(req.offset, Offset::Open);
        assert_eq!(req.order_type, OrderType::Fak);
        assert_eq!(req.volume, 1);
        assert_eq!(req.price, 4000.0);
        assert_eq!(req.strategy_id_str(), "ABC");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn unknown_ticker_queues_nothing() {
        let (sender, mut rx) = OrderSender::new("ABC", contracts(), 8);
        for ticker in ["", "IF2310", "if2309"] {
            let err = sender.buy_open(ticker, 1, 1.0, OrderType::Fak).unwrap_err();
            assert!(matches!(err, QtError::EncodingSkipped { ticker: ref t, .. } if t == ticker));
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn full_queue_fails_closed() {
        let (sender, _rx) = OrderSender::new("ABC", contracts(), 1);
        sender.buy_open("IF2309", 1, 4000.0, OrderType::Fak).unwrap();
        let err = sender.buy_open("IF2309", 1, 4000.0, OrderType::Fak).unwrap_err();
        assert!(matches!(err, QtError::OutboundQueueFull));
    }

    #[test]
    fn closed_queue_reported() {
        let (sender, rx) = OrderSender::new("ABC", contracts(), 1);
        drop(rx);
        let err = sender.sell_open("IF2309", 1, 4000.0, OrderType::Fok).unwrap_err();
        assert!(matches!(err, QtError::OutboundClosed));
    }

    #[test]
    fn close_helpers_use_close_today() {
        let (sender, mut rx) = OrderSender::new("", contracts(), 4);
        sender.buy_close("IF2309", 2, 3990.0, OrderType::Limit).unwrap();
        sender.sell_close("IF2309", 3, 4010.0, OrderType::Fak).unwrap();

        let buy = OrderRequest::decode(&rx.try_recv().unwrap().payload).unwrap();
        assert_eq!((buy.direction, buy.offset), (Direction::Buy, Offset::CloseToday));
        let sell = OrderRequest::decode(&rx.try_recv().unwrap().payload).unwrap();
        assert_eq!((sell.direction, sell.offset), (Direction::Sell, Offset::CloseToday));
        assert_eq!(sell.strategy_id, [0u8; 16]);
    }

    #[test]
    fn cancel_is_unsupported() {
        let (sender, mut rx) = OrderSender::new("ABC", contracts(), 1);
        assert!(matches!(sender.cancel_order(12), Err(QtError::Unsupported("cancel_order"))));
        assert!(rx.try_recv().is_err());
    }
}
