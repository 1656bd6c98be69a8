//! Strategy runtime: subscription setup and the receive/dispatch loop.
//!
//! # State machine
//!
//! ```text
//! Init ──on_init + subscribe──► Subscribed ──► Running ──closed / error / drop──► Exit
//! ```
//!
//! Every message is routed by its channel: the strategy's own response
//! channel goes to `on_order_rsp`, everything else to `on_tick`. Payloads
//! that fail to decode are logged and skipped; they never stop the loop.
//! `on_exit` is called from a drop guard, so it runs on every exit path.

use std::fmt;

use qt_bus::BusSubscriber;
use qt_core::{OrderResponse, Result, Tick};
use tracing::{debug, error, info, warn};

use crate::context::StrategyContext;
use crate::strategy::Strategy;

/// Runtime lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Init,
    Subscribed,
    Running,
    Exit,
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::Subscribed => write!(f, "SUBSCRIBED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Exit => write!(f, "EXIT"),
        }
    }
}

/// Dispatch path for one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    OrderResponse,
    Tick,
}

/// Route a message by its channel. Total: every channel maps to one route.
#[inline]
pub fn classify(channel: &str, response_channel: Option<&str>) -> Route {
    match response_channel {
        Some(rsp) if rsp == channel => Route::OrderResponse,
        _ => Route::Tick,
    }
}

/// Message counters returned by [`StrategyRuntime::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub order_responses: u64,
    pub decode_errors: u64,
}

/// Drives one strategy instance over its own bus subscription.
pub struct StrategyRuntime<B> {
    subscriber: B,
    ctx: StrategyContext,
    state: RuntimeState,
}

impl<B: BusSubscriber> StrategyRuntime<B> {
    pub fn new(ctx: StrategyContext, subscriber: B) -> Self {
        Self { subscriber, ctx, state: RuntimeState::Init }
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn context(&self) -> &StrategyContext {
        &self.ctx
    }

    /// Run `strategy` until the subscription closes (`Ok`) or the bus fails
    /// (`Err`). `on_exit` is invoked before this returns, and also if the
    /// returned future is dropped mid-run.
    pub async fn run<S: Strategy + ?Sized>(&mut self, strategy: &mut S) -> Result<RunStats> {
        let response_channel = self.ctx.response_channel();
        let mut stats = RunStats::default();

        let guard = ExitGuard { strategy, ctx: &mut self.ctx, state: &mut self.state };
        set_state(guard.state, RuntimeState::Init);

        // INIT → SUBSCRIBED
        guard.strategy.on_init(guard.ctx);
        if let Some(rsp) = &response_channel {
            self.subscriber.subscribe(std::slice::from_ref(rsp)).await?;
        }
        apply_subscriptions(&mut self.subscriber, guard.ctx).await?;
        set_state(guard.state, RuntimeState::Subscribed);

        // SUBSCRIBED → RUNNING
        set_state(guard.state, RuntimeState::Running);
        loop {
            let msg = match self.subscriber.next_message().await {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    info!("subscription closed");
                    break;
                }
                Err(e) => {
                    error!("receive failed: {e}");
                    return Err(e);
                }
            };

            match classify(&msg.channel, response_channel.as_deref()) {
                Route::OrderResponse => match OrderResponse::decode(&msg.payload) {
                    Ok(rsp) => {
                        stats.order_responses += 1;
                        guard.strategy.on_order_rsp(guard.ctx, &rsp);
                    }
                    Err(e) => {
                        stats.decode_errors += 1;
                        warn!("skipping order response on '{}': {e}", msg.channel);
                    }
                },
                Route::Tick => match Tick::decode(&msg.payload) {
                    Ok(tick) => {
                        stats.ticks += 1;
                        guard.strategy.on_tick(guard.ctx, &tick);
                    }
                    Err(e) => {
                        stats.decode_errors += 1;
                        warn!("skipping tick on '{}': {e}", msg.channel);
                    }
                },
            }

            apply_subscriptions(&mut self.subscriber, guard.ctx).await?;
        }

        info!(
            "run finished: ticks={}, order_responses={}, decode_errors={}",
            stats.ticks, stats.order_responses, stats.decode_errors
        );
        Ok(stats)
    }
}

async fn apply_subscriptions<B: BusSubscriber>(subscriber: &mut B, ctx: &mut StrategyContext) -> Result<()> {
    let channels = ctx.take_pending_subscriptions();
    if channels.is_empty() {
        return Ok(());
    }
    info!("subscribing {channels:?}");
    subscriber.subscribe(&channels).await
}

fn set_state(state: &mut RuntimeState, next: RuntimeState) {
    debug!("runtime {state} → {next}");
    *state = next;
}

/// Calls `on_exit` and marks the runtime `Exit` when dropped.
struct ExitGuard<'a, S: Strategy + ?Sized> {
    strategy: &'a mut S,
    ctx: &'a mut StrategyContext,
    state: &'a mut RuntimeState,
}

impl<S: Strategy + ?Sized> Drop for ExitGuard<'_, S> {
    fn drop(&mut self) {
        info!("strategy exiting from {}", self.state);
        self.strategy.on_exit(self.ctx);
        set_state(self.state, RuntimeState::Exit);
    }
}
