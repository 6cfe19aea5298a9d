//! Position lookup collaborator

use async_trait::async_trait;

use crate::brain::PositionState;

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("Position lookup failed: {0}")]
    Unavailable(String),
}

/// Reports an agent's holdings of one symbol plus its cash.
///
/// Implementations set `has_position = token_amount > 0` and value the tokens
/// at `price`.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn position(
        &self,
        owner: &str,
        agent_id: &str,
        symbol: &str,
        price: f64,
    ) -> Result<PositionState, PositionError>;
}
