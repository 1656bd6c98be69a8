//! Handle passed to every strategy callback.

use qt_core::{ContractTable, NewOrder, OrderType, Result, strategy_id_from_bytes, strategy_id_to_bytes};
use qt_td::OrderSender;
use tracing::debug;

/// Order entry and subscription management for one strategy.
///
/// Subscriptions requested here are applied by the runtime right after the
/// current callback returns.
#[derive(Debug)]
pub struct StrategyContext {
    sender: OrderSender,
    md_channel_prefix: String,
    pending_subscriptions: Vec<String>,
}

impl StrategyContext {
    pub fn new(sender: OrderSender, md_channel_prefix: impl Into<String>) -> Self {
        Self {
            sender,
            md_channel_prefix: md_channel_prefix.into(),
            pending_subscriptions: Vec::new(),
        }
    }

    pub fn strategy_id(&self) -> &str {
        self.sender.strategy_id()
    }

    /// Channel the execution service answers on, or `None` without a
    /// strategy id.
    ///
    /// This is the id as it appears on the wire, i.e. cut to 16 bytes.
    pub fn response_channel(&self) -> Option<String> {
        let id = self.strategy_id();
        if id.is_empty() {
            return None;
        }
        Some(strategy_id_from_bytes(&strategy_id_to_bytes(id)))
    }

    pub fn contracts(&self) -> &ContractTable {
        self.sender.contracts()
    }

    /// Market-data channel for `ticker`.
    pub fn md_channel(&self, ticker: &str) -> String {
        format!("{}{ticker}", self.md_channel_prefix)
    }

    /// Subscribe to market data for exactly these tickers.
    pub fn subscribe<I, S>(&mut self, tickers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ticker in tickers {
            let channel = self.md_channel(ticker.as_ref());
            debug!("subscription requested: '{channel}'");
            self.pending_subscriptions.push(channel);
        }
    }

    pub(crate) fn take_pending_subscriptions(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_subscriptions)
    }

    pub fn send_order(&self, order: &NewOrder) -> Result<()> {
        self.sender.send_order(order)
    }

    pub fn buy_open(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.sender.buy_open(ticker, volume, price, order_type)
    }

    pub fn buy_close(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.sender.buy_close(ticker, volume, price, order_type)
    }

    pub fn sell_open(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.sender.sell_open(ticker, volume, price, order_type)
    }

    pub fn sell_close(&self, ticker: &str, volume: u32, price: f64, order_type: OrderType) -> Result<()> {
        self.sender.sell_close(ticker, volume, price, order_type)
    }

    pub fn cancel_order(&self, order_id: u64) -> Result<()> {
        self.sender.cancel_order(order_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn ctx(strategy_id: &str, prefix: &str) -> StrategyContext {
        let (sender, _rx) = OrderSender::new(strategy_id, Arc::new(ContractTable::default()), 4);
        StrategyContext::new(sender, prefix)
    }

    #[test]
    fn subscribe_uses_explicit_tickers() {
        let mut c = ctx("grid", "md-");
        c.subscribe(["IF2309", "rb2310"]);
        c.subscribe(vec![String::from("au2312")]);
        assert_eq!(c.take_pending_subscriptions(), vec!["md-IF2309", "md-rb2310", "md-au2312"]);
        assert!(c.take_pending_subscriptions().is_empty());
    }

    #[test]
    fn response_channel_follows_wire_id() {
        assert_eq!(ctx("", "").response_channel(), None);
        assert_eq!(ctx("grid", "").response_channel().as_deref(), Some("grid"));
        assert_eq!(
            ctx("a_very_long_strategy_name", "").response_channel().as_deref(),
            Some("a_very_long_stra")
        );
    }
}
