//! Per-agent, per-symbol call throttle

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Remembers when each (agent, symbol) was last invoked
pub struct CooldownGate {
    window: Duration,
    last_call: HashMap<(String, String), Instant>,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_call: HashMap::new(),
        }
    }

    /// Time left before the pair may be invoked again
    pub fn remaining(&self, agent_id: &str, symbol: &str, now: Instant) -> Option<Duration> {
        let last = self.last_call.get(&(agent_id.to_string(), symbol.to_string()))?;
        let elapsed = now.saturating_duration_since(*last);
        (elapsed < self.window).then(|| self.window - elapsed)
    }

    pub fn ready(&self, agent_id: &str, symbol: &str, now: Instant) -> bool {
        self.remaining(agent_id, symbol, now).is_none()
    }

    /// Check and claim in one step; false while cooling down
    pub fn try_claim(&mut self, agent_id: &str, symbol: &str, now: Instant) -> bool {
        if let Some(left) = self.remaining(agent_id, symbol, now) {
            debug!(agent_id, symbol, remaining_ms = left.as_millis() as u64, "Cooling down");
            return false;
        }
        self.last_call
            .insert((agent_id.to_string(), symbol.to_string()), now);
        true
    }

    /// Forget pairs whose window has passed
    pub fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.last_call
            .retain(|_, last| now.saturating_duration_since(*last) < window);
    }

    pub fn tracked(&self) -> usize {
        self.last_call.len()
    }
}
