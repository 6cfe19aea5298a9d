//! Agent Runner Library
//!
//! Autonomous loop that asks the trading API to decide and trade for a
//! roster of agents, throttled per (agent, symbol).

pub mod client;
pub mod config;
pub mod cooldown;
pub mod runner;

// Re-export main types for convenience
pub use client::{SmartTradeCall, SmartTradeReply, TradeReply, TradingApiClient};
pub use crate::config::{AgentSpec, RosterConfig, RosterError};
pub use cooldown::CooldownGate;
pub use runner::{AgentRunner, CycleReport};
