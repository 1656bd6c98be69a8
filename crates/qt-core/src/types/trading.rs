//! Trading-related data structures: order parameters and order responses.
//!
//! [`NewOrder`] flows from a strategy to the order sender; [`OrderResponse`]
//! is published by the execution service on the strategy's response channel.
//!
//! # OrderResponse schema v1 (56 bytes, little-endian)
//!
//! | Offset | Size | Field             |
//! |--------|------|-------------------|
//! | 0      | 4    | version (= 1)     |
//! | 4      | 4    | user_order_id     |
//! | 8      | 8    | order_id          |
//! | 16     | 4    | ticker_index      |
//! | 20     | 4    | direction         |
//! | 24     | 4    | offset            |
//! | 28     | 4    | original_volume   |
//! | 32     | 4    | traded_volume     |
//! | 36     | 4    | this_traded       |
//! | 40     | 4    | error_code (i32)  |
//! | 44     | 4    | completed (0/1)   |
//! | 48     | 8    | this_traded_price |

use serde::{Deserialize, Serialize};

use crate::error::{QtError, Result};

use super::enums::{Direction, Offset, OrderType};
use super::wire::{WireWriter, read_f64_le, read_i32_le, read_u32_le, read_u64_le};

// ---------------------------------------------------------------------------
// New order (strategy → order sender)
// ---------------------------------------------------------------------------

/// Parameters of a new order, before ticker resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub ticker: String,
    pub direction: Direction,
    pub offset: Offset,
    pub order_type: OrderType,
    pub volume: u32,
    pub price: f64,
    /// Strategy-assigned id echoed back in order responses.
    pub user_order_id: u32,
}

impl NewOrder {
    pub fn new(
        ticker: impl Into<String>,
        direction: Direction,
        offset: Offset,
        order_type: OrderType,
        volume: u32,
        price: f64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            direction,
            offset,
            order_type,
            volume,
            price,
            user_order_id: 0,
        }
    }

    pub fn with_user_order_id(mut self, user_order_id: u32) -> Self {
        self.user_order_id = user_order_id;
        self
    }
}

// ---------------------------------------------------------------------------
// Order response (execution service → strategy)
// ---------------------------------------------------------------------------

/// Schema version written by [`OrderResponse::to_bytes`].
pub const ORDER_RSP_SCHEMA_VERSION: u32 = 1;

/// Encoded size of a v1 order response.
pub const ORDER_RSP_LEN: usize = 56;

/// Order status update for one order of this strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub user_order_id: u32,
    /// Execution-service order id.
    pub order_id: u64,
    pub ticker_index: u32,
    pub direction: Direction,
    pub offset: Offset,
    pub original_volume: u32,
    /// Cumulative traded volume.
    pub traded_volume: u32,
    /// Volume traded by the fill this response reports (0 for acks/cancels).
    pub this_traded: u32,
    pub this_traded_price: f64,
    /// 0 means no error.
    pub error_code: i32,
    /// No further responses will follow for this order.
    pub completed: bool,
}

impl OrderResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(QtError::Decode(format!(
                "order response too short: {} bytes",
                data.len()
            )));
        }
        let version = read_u32_le(data, 0);
        if version != ORDER_RSP_SCHEMA_VERSION {
            return Err(QtError::Decode(format!(
                "unsupported order response schema version {version}"
            )));
        }
        if data.len() < ORDER_RSP_LEN {
            return Err(QtError::Decode(format!(
                "order response v{version} needs {ORDER_RSP_LEN} bytes, got {}",
                data.len()
            )));
        }

        let direction = read_u32_le(data, 20);
        let offset = read_u32_le(data, 24);

        Ok(Self {
            user_order_id: read_u32_le(data, 4),
            order_id: read_u64_le(data, 8),
            ticker_index: read_u32_le(data, 16),
            direction: Direction::from_code(direction)
                .ok_or_else(|| QtError::Decode(format!("bad direction {direction}")))?,
            offset: Offset::from_code(offset)
                .ok_or_else(|| QtError::Decode(format!("bad offset {offset}")))?,
            original_volume: read_u32_le(data, 28),
            traded_volume: read_u32_le(data, 32),
            this_traded: read_u32_le(data, 36),
            error_code: read_i32_le(data, 40),
            completed: read_u32_le(data, 44) != 0,
            this_traded_price: read_f64_le(data, 48),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        WireWriter::with_capacity(ORDER_RSP_LEN)
            .u32(ORDER_RSP_SCHEMA_VERSION)
            .u32(self.user_order_id)
            .u64(self.order_id)
            .u32(self.ticker_index)
            .u32(self.direction.code())
            .u32(self.offset.code())
            .u32(self.original_volume)
            .u32(self.traded_volume)
            .u32(self.this_traded)
            .i32(self.error_code)
            .u32(u32::from(self.completed))
            .f64(self.this_traded_price)
            .finish()
    }

    pub fn is_rejected(&self) -> bool {
        self.error_code != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill() -> OrderResponse {
        OrderResponse {
            user_order_id: 9,
            order_id: 1_000_001,
            ticker_index: 1,
            direction: Direction::Buy,
            offset: Offset::Open,
            original_volume: 2,
            traded_volume: 1,
            this_traded: 1,
            this_traded_price: 4000.0,
            error_code: 0,
            completed: false,
        }
    }

    #[test]
    fn decode_v1() {
        let bytes = fill().to_bytes();
        assert_eq!(bytes.len(), ORDER_RSP_LEN);
        assert_eq!(OrderResponse::decode(&bytes).unwrap(), fill());
    }

    #[test]
    fn rejection_flag() {
        let rsp = OrderResponse { error_code: -3, completed: true, ..fill() };
        let decoded = OrderResponse::decode(&rsp.to_bytes()).unwrap();
        assert!(decoded.is_rejected());
        assert!(decoded.completed);
    }

    #[test]
    fn bad_direction_is_decode_error() {
        let mut bytes = fill().to_bytes();
        bytes[20..24].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(OrderResponse::decode(&bytes), Err(QtError::Decode(_))));
    }

    #[test]
    fn short_payload_is_decode_error() {
        assert!(OrderResponse::decode(&fill().to_bytes()[..30]).is_err());
    }

    #[test]
    fn new_order_defaults() {
        let order = NewOrder::new("IF2309", Direction::Buy, Offset::Open, OrderType::Fak, 1, 4000.0);
        assert_eq!(order.user_order_id, 0);
        assert_eq!(order.with_user_order_id(5).user_order_id, 5);
    }
}
