//! Trader command wire format (strategy → execution service).
//!
//! Every command is a fixed 56-byte little-endian record published on
//! [`TRADER_CMD_TOPIC`]:
//!
//! | Offset | Size | Field         |
//! |--------|------|---------------|
//! | 0      | 4    | magic         |
//! | 4      | 4    | command       |
//! | 8      | 16   | strategy_id   |
//! | 24     | 4    | user_order_id |
//! | 28     | 4    | ticker_index  |
//! | 32     | 4    | direction     |
//! | 36     | 4    | offset        |
//! | 40     | 4    | order_type    |
//! | 44     | 4    | volume        |
//! | 48     | 8    | price         |

use crate::error::{QtError, Result};

use super::enums::{CommandType, Direction, Offset, OrderType};
use super::symbol::{STRATEGY_ID_LEN, strategy_id_from_bytes};
use super::wire::{WireWriter, read_f64_le, read_u32_le};

/// Protocol tag in the first word of every command.
pub const TRADER_CMD_MAGIC: u32 = 0x0170_9394;

/// The single channel all strategies publish commands on.
pub const TRADER_CMD_TOPIC: &str = "trader_cmd";

/// Encoded size of an [`OrderRequest`].
pub const ORDER_REQUEST_LEN: usize = 56;

/// A decoded NEW_ORDER command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderRequest {
    pub strategy_id: [u8; STRATEGY_ID_LEN],
    pub user_order_id: u32,
    pub ticker_index: u32,
    pub direction: Direction,
    pub offset: Offset,
    pub order_type: OrderType,
    pub volume: u32,
    pub price: f64,
}

impl OrderRequest {
    /// Serialize to the fixed wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        WireWriter::with_capacity(ORDER_REQUEST_LEN)
            .u32(TRADER_CMD_MAGIC)
            .u32(CommandType::NewOrder.code())
            .bytes(&self.strategy_id)
            .u32(self.user_order_id)
            .u32(self.ticker_index)
            .u32(self.direction.code())
            .u32(self.offset.code())
            .u32(self.order_type.code())
            .u32(self.volume)
            .f64(self.price)
            .finish()
    }

    /// Parse a command buffer, validating length, magic and enum codes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != ORDER_REQUEST_LEN {
            return Err(QtError::Decode(format!(
                "order request must be {ORDER_REQUEST_LEN} bytes, got {}",
                data.len()
            )));
        }

        let magic = read_u32_le(data, 0);
        if magic != TRADER_CMD_MAGIC {
            return Err(QtError::Decode(format!("bad command magic {magic:#x}")));
        }
        let command = read_u32_le(data, 4);
        if CommandType::from_code(command) != Some(CommandType::NewOrder) {
            return Err(QtError::Decode(format!("unsupported command {command}")));
        }

        let mut strategy_id = [0u8; STRATEGY_ID_LEN];
        strategy_id.copy_from_slice(&data[8..8 + STRATEGY_ID_LEN]);

        let direction = read_u32_le(data, 32);
        let offset = read_u32_le(data, 36);
        let order_type = read_u32_le(data, 40);

        Ok(Self {
            strategy_id,
            user_order_id: read_u32_le(data, 24),
            ticker_index: read_u32_le(data, 28),
            direction: Direction::from_code(direction)
                .ok_or_else(|| QtError::Decode(format!("bad direction {direction}")))?,
            offset: Offset::from_code(offset)
                .ok_or_else(|| QtError::Decode(format!("bad offset {offset}")))?,
            order_type: OrderType::from_code(order_type)
                .ok_or_else(|| QtError::Decode(format!("bad order type {order_type}")))?,
            volume: read_u32_le(data, 44),
            price: read_f64_le(data, 48),
        })
    }

    /// Strategy id as text (zero padding stripped).
    pub fn strategy_id_str(&self) -> String {
        strategy_id_from_bytes(&self.strategy_id)
    }
}
