//! Strategy framework.
//!
//! A [`Strategy`] implements callbacks; a [`StrategyRuntime`] owns the bus
//! subscription and calls them. Orders go out through the
//! [`StrategyContext`], which wraps a [`qt_td::OrderSender`].
//!
//! ```text
//!   bus ──► StrategyRuntime ──► Strategy::on_tick / on_order_rsp
//!                                   │
//!                                   ▼
//!                           StrategyContext::send_order ──► outbound queue
//! ```

pub mod context;
pub mod runtime;
pub mod strategy;

pub use context::StrategyContext;
pub use runtime::{Route, RunStats, RuntimeState, StrategyRuntime, classify};
pub use strategy::Strategy;
