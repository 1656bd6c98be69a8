//! Tick payload published on per-ticker market-data channels.
//!
//! # Schema v1 (80 bytes, little-endian)
//!
//! | Offset | Size | Field             |
//! |--------|------|-------------------|
//! | 0      | 4    | version (= 1)     |
//! | 4      | 4    | ticker_index      |
//! | 8      | 8    | timestamp_us      |
//! | 16     | 8    | last_price        |
//! | 24     | 8    | volume            |
//! | 32     | 8    | bid_price         |
//! | 40     | 8    | bid_volume        |
//! | 48     | 8    | ask_price         |
//! | 56     | 8    | ask_volume        |
//! | 64     | 8    | upper_limit_price |
//! | 72     | 8    | lower_limit_price |
//!
//! Bytes past the end of the schema are ignored so that publishers can append
//! fields without breaking older strategies.

use serde::{Deserialize, Serialize};

use crate::error::{QtError, Result};

use super::wire::{WireWriter, read_f64_le, read_u32_le, read_u64_le};

/// Schema version written by [`Tick::to_bytes`].
pub const TICK_SCHEMA_VERSION: u32 = 1;

/// Encoded size of a v1 tick.
pub const TICK_LEN: usize = 80;

/// Top-of-book market data snapshot for one contract.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tick {
    pub ticker_index: u32,
    /// Exchange timestamp (µs since epoch).
    pub timestamp_us: u64,
    pub last_price: f64,
    /// Cumulative traded volume.
    pub volume: u64,
    pub bid_price: f64,
    pub bid_volume: u64,
    pub ask_price: f64,
    pub ask_volume: u64,
    pub upper_limit_price: f64,
    pub lower_limit_price: f64,
}

impl Tick {
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(QtError::Decode(format!("tick too short: {} bytes", data.len())));
        }
        let version = read_u32_le(data, 0);
        if version != TICK_SCHEMA_VERSION {
            return Err(QtError::Decode(format!("unsupported tick schema version {version}")));
        }
        if data.len() < TICK_LEN {
            return Err(QtError::Decode(format!(
                "tick v{version} needs {TICK_LEN} bytes, got {}",
                data.len()
            )));
        }

        Ok(Self {
            ticker_index: read_u32_le(data, 4),
            timestamp_us: read_u64_le(data, 8),
            last_price: read_f64_le(data, 16),
            volume: read_u64_le(data, 24),
            bid_price: read_f64_le(data, 32),
            bid_volume: read_u64_le(data, 40),
            ask_price: read_f64_le(data, 48),
            ask_volume: read_u64_le(data, 56),
            upper_limit_price: read_f64_le(data, 64),
            lower_limit_price: read_f64_le(data, 72),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        WireWriter::with_capacity(TICK_LEN)
            .u32(TICK_SCHEMA_VERSION)
            .u32(self.ticker_index)
            .u64(self.timestamp_us)
            .f64(self.last_price)
            .u64(self.volume)
            .f64(self.bid_price)
            .u64(self.bid_volume)
            .f64(self.ask_price)
            .u64(self.ask_volume)
            .f64(self.upper_limit_price)
            .f64(self.lower_limit_price)
            .finish()
    }

    /// Mid price, or `None` when either side of the book is empty.
    pub fn mid_price(&self) -> Option<f64> {
        (self.bid_volume > 0 && self.ask_volume > 0).then(|| (self.bid_price + self.ask_price) / 2.0)
    }
}
