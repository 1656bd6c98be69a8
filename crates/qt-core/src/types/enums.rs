//! Enumerations shared by the order wire format and the payload schemas.
//!
//! Discriminants are the on-wire `u32` codes; they are fixed by the execution
//! service and must not be renumbered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QtError;

/// Implements `code()`, `from_code()`, `Display` and `FromStr` for a wire enum.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident = $code:literal => $text:literal),+ $(,)? }) => {
        impl $name {
            /// On-wire code.
            #[inline]
            pub fn code(self) -> u32 {
                self as u32
            }

            /// Parse an on-wire code.
            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($text),)+
                }
            }
        }

        impl FromStr for $name {
            type Err = QtError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(QtError::Config(format!(
                        "unknown {}: {other}",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

/// Command code carried in the second word of every trader command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CommandType {
    NewOrder = 1,
}

wire_enum!(CommandType { NewOrder = 1 => "new_order" });

// ---------------------------------------------------------------------------
// Order enums
// ---------------------------------------------------------------------------

/// Buy or sell direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum Direction {
    Buy = 1,
    Sell = 2,
}

wire_enum!(Direction {
    Buy = 1 => "buy",
    Sell = 2 => "sell",
});

/// Position effect of a futures order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum Offset {
    Open = 1,
    Close = 2,
    CloseToday = 4,
    CloseYesterday = 8,
}

wire_enum!(Offset {
    Open = 1 => "open",
    Close = 2 => "close",
    CloseToday = 4 => "close_today",
    CloseYesterday = 8 => "close_yesterday",
});

/// Order type / time-in-force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum OrderType {
    Limit = 1,
    Market = 2,
    Best = 3,
    /// Fill-and-kill.
    #[default]
    Fak = 4,
    /// Fill-or-kill.
    Fok = 5,
}

wire_enum!(OrderType {
    Limit = 1 => "limit",
    Market = 2 => "market",
    Best = 3 => "best",
    Fak = 4 => "fak",
    Fok = 5 => "fok",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_are_stable() {
        assert_eq!(CommandType::NewOrder.code(), 1);
        assert_eq!(Direction::Sell.code(), 2);
        assert_eq!(Offset::CloseToday.code(), 4);
        assert_eq!(Offset::CloseYesterday.code(), 8);
        assert_eq!(OrderType::Fak.code(), 4);
        assert_eq!(OrderType::Fok.code(), 5);
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(Offset::from_code(3), None);
        assert_eq!(Direction::from_code(0), None);
    }

    #[test]
    fn parse_from_cli_text() {
        assert_eq!("BUY".parse::<Direction>().unwrap(), Direction::Buy);
        assert_eq!("close_today".parse::<Offset>().unwrap(), Offset::CloseToday);
        assert_eq!("fok".parse::<OrderType>().unwrap(), OrderType::Fok);
        assert!("hold".parse::<Direction>().is_err());
    }
}
