//! Logging strategy behind the `watch` subcommand.

use qt_core::{OrderResponse, Tick};
use qt_strategy::{Strategy, StrategyContext};
use tracing::{info, warn};

/// Subscribes to a fixed ticker set and logs everything it receives.
pub struct TickLogger {
    tickers: Vec<String>,
    ticks: u64,
}

impl TickLogger {
    pub fn new(tickers: Vec<String>) -> Self {
        Self { tickers, ticks: 0 }
    }
}

impl Strategy for TickLogger {
    fn on_init(&mut self, ctx: &mut StrategyContext) {
        for ticker in &self.tickers {
            if ctx.contracts().get_by_ticker(ticker).is_err() {
                warn!("'{ticker}' is not in the contract table");
            }
        }
        ctx.subscribe(&self.tickers);
    }

    fn on_tick(&mut self, ctx: &mut StrategyContext, tick: &Tick) {
        self.ticks += 1;
        let ticker = ctx.contracts().get_by_index(tick.ticker_index).map_or("?", |c| c.ticker.as_str());
        info!(
            "{ticker} last={} vol={} bid={}x{} ask={}x{}",
            tick.last_price, tick.volume, tick.bid_price, tick.bid_volume, tick.ask_price, tick.ask_volume
        );
    }

    fn on_order_rsp(&mut self, _ctx: &mut StrategyContext, rsp: &OrderResponse) {
        if rsp.is_rejected() {
            warn!("order {} rejected, error_code={}", rsp.user_order_id, rsp.error_code);
        } else {
            info!(
                "order {} (id {}) traded {}/{} @ {} completed={}",
                rsp.user_order_id,
                rsp.order_id,
                rsp.traded_volume,
                rsp.original_volume,
                rsp.this_traded_price,
                rsp.completed
            );
        }
    }

    fn on_exit(&mut self, _ctx: &mut StrategyContext) {
        info!("watch finished after {} tick(s)", self.ticks);
    }
}
