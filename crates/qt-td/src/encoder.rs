//! Order request encoding.
//!
//! Resolves the order's ticker to its contract index and lays the command out
//! in the fixed wire format (see [`qt_core::types::protocol`]).

use std::sync::Arc;

use qt_core::{ContractTable, NewOrder, OrderRequest, Result, strategy_id_to_bytes};

/// Builds NEW_ORDER command buffers.
#[derive(Debug, Clone)]
pub struct OrderRequestEncoder {
    contracts: Arc<ContractTable>,
}

impl OrderRequestEncoder {
    pub fn new(contracts: Arc<ContractTable>) -> Self {
        Self { contracts }
    }

    /// Encode `order` on behalf of `strategy_id`.
    ///
    /// Fails with `UnknownTicker` when the ticker is not in the contract
    /// table; no buffer is produced in that case.
    pub fn encode(&self, order: &NewOrder, strategy_id: &str) -> Result<Vec<u8>> {
        let contract = self.contracts.get_by_ticker(&order.ticker)?;

        let req = OrderRequest {
            strategy_id: strategy_id_to_bytes(strategy_id),
            user_order_id: order.user_order_id,
            ticker_index: contract.ticker_index,
            direction: order.direction,
            offset: order.offset,
            order_type: order.order_type,
            volume: order.volume,
            price: order.price,
        };
        Ok(req.to_bytes())
    }

    pub fn contracts(&self) -> &Arc<ContractTable> {
        &self.contracts
    }
}
