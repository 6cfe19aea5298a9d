//! Agent Runner - Main autonomous loop

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use trading_api::brain::TradeAction;

use crate::client::{SmartTradeCall, TradingApiClient};
use crate::config::RosterConfig;
use crate::cooldown::CooldownGate;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub invoked: usize,
    pub cooling_down: usize,
    pub executed: usize,
    pub holds: usize,
    pub failed: usize,
}

/// Drives every roster agent through smart-trade on a fixed tick
pub struct AgentRunner {
    client: Arc<TradingApiClient>,
    roster: RosterConfig,
    cooldown: CooldownGate,
    cycles: u64,
}

impl AgentRunner {
    pub fn new(client: Arc<TradingApiClient>, roster: RosterConfig) -> Self {
        let cooldown = CooldownGate::new(Duration::from_secs(roster.cooldown_secs));
        Self {
            client,
            roster,
            cooldown,
            cycles: 0,
        }
    }

    /// Run until Ctrl-C
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(
            agents = self.roster.agents.len(),
            pairs = self.roster.pair_count(),
            tick_secs = self.roster.tick_secs,
            cooldown_secs = self.roster.cooldown_secs,
            "Agent runner starting main loop..."
        );

        let mut ticker = interval(Duration::from_secs(self.roster.tick_secs));
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_cycle(Instant::now()).await;
                    info!(
                        cycle = self.cycles,
                        invoked = report.invoked,
                        executed = report.executed,
                        holds = report.holds,
                        cooling_down = report.cooling_down,
                        failed = report.failed,
                        "Cycle complete"
                    );
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("Shutdown signal error: {}", e);
                    }
                    info!("Shutdown signal received, stopping agent runner");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One pass over every (agent, symbol). Failures are logged and the pass
    /// moves on.
    pub async fn run_cycle(&mut self, now: Instant) -> CycleReport {
        self.cycles += 1;
        let mut report = CycleReport::default();

        for agent in &self.roster.agents {
            for symbol in &agent.symbols {
                if !self.cooldown.try_claim(&agent.agent_id, symbol, now) {
                    report.cooling_down += 1;
                    continue;
                }
                report.invoked += 1;

                let call = SmartTradeCall {
                    symbol: symbol.clone(),
                    agent_id: agent.agent_id.clone(),
                    user_address: agent.owner_address.clone(),
                    agent_dna: agent.dna,
                    personality: agent.personality,
                };

                match self.client.smart_trade(&call).await {
                    Ok(reply) => {
                        let decision = &reply.decision;
                        info!(
                            agent_id = %agent.agent_id,
                            symbol = %symbol,
                            action = %decision.action,
                            confidence = decision.confidence,
                            size_pct = decision.suggested_amount,
                            "Decision received"
                        );
                        if decision.action == TradeAction::Hold {
                            report.holds += 1;
                        }
                        if reply.trade.executed {
                            report.executed += 1;
                            info!(
                                agent_id = %agent.agent_id,
                                symbol = %symbol,
                                tx = reply.trade.tx_hash.as_deref().unwrap_or(""),
                                new_balance = ?reply.trade.new_balance,
                                "Trade executed"
                            );
                        } else if let Some(err) = &reply.trade.error {
                            warn!(agent_id = %agent.agent_id, symbol = %symbol, error = %err, "Trade not executed");
                        } else {
                            debug!(agent_id = %agent.agent_id, symbol = %symbol, "No trade this tick");
                        }
                    }
                    Err(e) => {
                        report.failed += 1;
                        error!(agent_id = %agent.agent_id, symbol = %symbol, "Smart-trade error: {}", e);
                    }
                }
            }
        }

        self.cooldown.prune(now);
        report
    }
}
