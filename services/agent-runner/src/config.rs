//! Agent roster configuration
//!
//! Loaded from a YAML file named by `CLAWTRADER_ROSTER` (default
//! `roster.yaml`).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use trading_api::brain::{AgentDna, Personality};

pub const ROSTER_ENV: &str = "CLAWTRADER_ROSTER";
pub const DEFAULT_ROSTER_PATH: &str = "roster.yaml";

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse roster: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid roster: {0}")]
    Invalid(String),
}

/// Runner settings plus the agents it drives
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterConfig {
    /// Base URL of the trading API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Seconds between loop ticks
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Minimum seconds between calls for one (agent, symbol)
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub agents: Vec<AgentSpec>,
}

/// One autonomous agent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSpec {
    pub agent_id: String,
    pub owner_address: String,
    pub symbols: Vec<String>,
    #[serde(default)]
    pub dna: AgentDna,
    #[serde(default)]
    pub personality: Personality,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_tick_secs() -> u64 {
    60
}

fn default_cooldown_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl RosterConfig {
    /// Roster path from the environment, falling back to `roster.yaml`
    pub fn path_from_env() -> String {
        std::env::var(ROSTER_ENV).unwrap_or_else(|_| DEFAULT_ROSTER_PATH.to_string())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, RosterError> {
        let roster: RosterConfig = serde_yaml::from_str(content)?;
        roster.validate()?;
        Ok(roster)
    }

    fn validate(&self) -> Result<(), RosterError> {
        if self.tick_secs == 0 {
            return Err(RosterError::Invalid("tick_secs must be positive".to_string()));
        }
        if self.agents.is_empty() {
            return Err(RosterError::Invalid("no agents configured".to_string()));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.agent_id.trim().is_empty() {
                return Err(RosterError::Invalid("agent_id must not be empty".to_string()));
            }
            if !seen.insert(agent.agent_id.as_str()) {
                return Err(RosterError::Invalid(format!(
                    "duplicate agent_id {}",
                    agent.agent_id
                )));
            }
            if agent.symbols.is_empty() {
                return Err(RosterError::Invalid(format!(
                    "agent {} has no symbols",
                    agent.agent_id
                )));
            }
        }
        Ok(())
    }

    /// Total (agent, symbol) pairs per tick
    pub fn pair_count(&self) -> usize {
        self.agents.iter().map(|a| a.symbols.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROSTER: &str = r#"
api_url: http://trading-api:3000
agents:
  - agent_id: shark
    owner_address: "0x52908400098527886E0F7030069857D2E4169EE7"
    symbols: [BTC, ETH]
    personality: Aggressive
    dna:
      riskTolerance: 80
      aggression: 90
      contrarianBias: 10
  - agent_id: owl
    owner_address: So11111111111111111111111111111111111111112
    symbols: [SOL]
"#;

    #[test]
    fn test_roster_defaults_and_dna() {
        let roster = RosterConfig::from_yaml(ROSTER).unwrap();
        assert_eq!(roster.api_url, "http://trading-api:3000");
        assert_eq!(roster.tick_secs, 60);
        assert_eq!(roster.cooldown_secs, 30);
        assert_eq!(roster.pair_count(), 3);

        let shark = &roster.agents[0];
        assert_eq!(shark.personality, Personality::Aggressive);
        assert_eq!(shark.dna.aggression, 90.0);
        assert_eq!(shark.dna.timing_sensitivity, 50.0);

        let owl = &roster.agents[1];
        assert_eq!(owl.personality, Personality::Adaptive);
        assert_eq!(owl.dna, AgentDna::default());
    }

    #[test]
    fn test_roster_rejects_bad_shapes() {
        let dup = "agents:\n  - {agent_id: a, owner_address: x, symbols: [BTC]}\n  - {agent_id: a, owner_address: y, symbols: [ETH]}\n";
        assert!(matches!(RosterConfig::from_yaml(dup), Err(RosterError::Invalid(_))));

        let no_symbols = "agents:\n  - {agent_id: a, owner_address: x, symbols: []}\n";
        assert!(matches!(RosterConfig::from_yaml(no_symbols), Err(RosterError::Invalid(_))));

        assert!(matches!(RosterConfig::from_yaml("agents: []\n"), Err(RosterError::Invalid(_))));
        assert!(matches!(RosterConfig::from_yaml("agents: 12"), Err(RosterError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ROSTER.as_bytes()).unwrap();

        let roster = RosterConfig::load(file.path()).unwrap();
        assert_eq!(roster.agents.len(), 2);

        let missing = RosterConfig::load("/nonexistent/roster.yaml");
        assert!(matches!(missing, Err(RosterError::Io { .. })));
    }
}
