//! Settlement Engine Module
//!
//! This module contains the settlement arithmetic and the records it works on:
//! - `rounding`: ceiling rounding at a token's decimal scale
//! - `calculator`: maker/taker cash flows of a trade
//! - `entry`: instruments, holdings, offers and the market service

pub mod calculator;
pub mod entry;
pub mod rounding;

pub use calculator::{calculate_trade_amounts, TradeAmounts};
pub use rounding::{checked_scale, ensure_fee_rate, round_to, MAX_SCALE};
