//! Brain module - DNA-driven trading decision engine
//!
//! Maps five DNA traits plus a market snapshot and the agent's position into
//! BUY/SELL/HOLD with a size, stop-loss/take-profit levels and rationale.
//! Pure and synchronous; randomness comes from the caller.

pub mod basic;
pub mod config;
pub mod decision;
pub mod dna;
pub mod engine;
pub mod personality;
pub mod position;
pub mod random;
pub mod rationale;
pub mod resolver;
pub mod signals;
pub mod weighting;

// Re-export main types for convenience
pub use self::config::{EngineConfig, EngineMode, PersonalityConfig};
pub use decision::{TradeAction, TradingDecision};
pub use dna::{AgentDna, DnaTrait};
pub use engine::{decide, BrainEngine, DecisionMode, DecisionTrace, Evaluation};
pub use personality::{Personality, PersonalityAdjustment};
pub use position::{PositionPhase, PositionState};
pub use random::{RandomSource, SequenceRandom};
pub use signals::MarketSignals;
