//! Core data types: wire enums, the trader command layout, and the versioned
//! tick / order-response payload schemas.
//!
//! All binary layouts are fixed-size and little-endian.

pub mod enums;
pub mod market_data;
pub mod protocol;
pub mod symbol;
pub mod trading;
mod wire;

pub use enums::*;
pub use market_data::*;
pub use protocol::*;
pub use symbol::*;
pub use trading::*;
