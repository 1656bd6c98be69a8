//! Strategy callback trait.

use qt_core::{OrderResponse, Tick};
use tracing::debug;

use crate::context::StrategyContext;

/// Callbacks a trading strategy overrides.
///
/// All callbacks run on the runtime's receive loop, one at a time. They get
/// the [`StrategyContext`] to subscribe to tickers and send orders; sends are
/// queued, so a callback never waits on the bus.
///
/// # Lifecycle
///
/// 1. [`on_init`](Strategy::on_init): once, before the loop starts. The usual
///    place to call [`StrategyContext::subscribe`].
/// 2. [`on_tick`](Strategy::on_tick) / [`on_order_rsp`](Strategy::on_order_rsp)
///    for each inbound message.
/// 3. [`on_exit`](Strategy::on_exit): once, however the loop ends (closed
///    subscription, bus error, or the run future being dropped).
pub trait Strategy: Send {
    fn on_init(&mut self, _ctx: &mut StrategyContext) {}

    fn on_tick(&mut self, _ctx: &mut StrategyContext, tick: &Tick) {
        debug!("on_tick ticker_index={} last_price={}", tick.ticker_index, tick.last_price);
    }

    fn on_order_rsp(&mut self, _ctx: &mut StrategyContext, _rsp: &OrderResponse) {}

    fn on_exit(&mut self, _ctx: &mut StrategyContext) {}
}
