//! Paper trading ledger - in-memory balances per (owner, agent)
//!
//! Serves as both the position provider and the trade executor. Fills happen
//! at the request's reference price with no slippage.

use async_trait::async_trait;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::brain::{PositionState, TradeAction};
use crate::execution::{ExecutorError, TradeAmount, TradeExecutor, TradeReceipt, TradeRequest};
use crate::positions::{PositionError, PositionProvider};

const USDC_DP: u32 = 6;
const TOKEN_DP: u32 = 8;

/// Holding of one token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub quantity: Decimal,
    pub avg_entry_price: Decimal,
}

/// Cash and holdings for one agent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperAccount {
    pub usdc: Decimal,
    pub holdings: HashMap<String, Holding>,
}

impl PaperAccount {
    fn new(usdc: Decimal) -> Self {
        Self {
            usdc,
            holdings: HashMap::new(),
        }
    }

    pub fn quantity(&self, symbol: &str) -> Decimal {
        self.holdings
            .get(symbol)
            .map(|h| h.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    fn add_tokens(&mut self, symbol: &str, quantity: Decimal, price: Decimal) {
        match self.holdings.get_mut(symbol) {
            Some(holding) => {
                let total_qty = holding.quantity + quantity;
                if total_qty > Decimal::ZERO {
                    let total_cost = holding.quantity * holding.avg_entry_price + quantity * price;
                    holding.avg_entry_price = (total_cost / total_qty).round_dp(USDC_DP);
                }
                holding.quantity = total_qty;
            }
            None => {
                self.holdings.insert(
                    symbol.to_string(),
                    Holding {
                        quantity,
                        avg_entry_price: price,
                    },
                );
            }
        }
    }

    fn remove_tokens(&mut self, symbol: &str, quantity: Decimal) {
        if let Some(holding) = self.holdings.get_mut(symbol) {
            holding.quantity -= quantity;
            if holding.quantity <= Decimal::ZERO {
                self.holdings.remove(symbol);
            }
        }
    }
}

type AccountKey = (String, String);

/// In-memory paper ledger
pub struct PaperLedger {
    starting_usdc: Decimal,
    accounts: RwLock<HashMap<AccountKey, PaperAccount>>,
}

impl PaperLedger {
    /// Accounts are opened lazily with `starting_usdc`
    pub fn new(starting_usdc: Decimal) -> Self {
        Self {
            starting_usdc,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    fn key(owner: &str, agent_id: &str) -> AccountKey {
        (owner.to_lowercase(), agent_id.to_string())
    }

    /// Current account state (a fresh account if none exists yet)
    pub async fn account(&self, owner: &str, agent_id: &str) -> PaperAccount {
        self.accounts
            .read()
            .await
            .get(&Self::key(owner, agent_id))
            .cloned()
            .unwrap_or_else(|| PaperAccount::new(self.starting_usdc))
    }

    /// Overwrite an account's cash and a token balance
    pub async fn set_balances(
        &self,
        owner: &str,
        agent_id: &str,
        usdc: Decimal,
        symbol: &str,
        tokens: Decimal,
        entry_price: Decimal,
    ) {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(Self::key(owner, agent_id))
            .or_insert_with(|| PaperAccount::new(self.starting_usdc));
        account.usdc = usdc;
        account.holdings.remove(symbol);
        if tokens > Decimal::ZERO {
            account.add_tokens(symbol, tokens, entry_price);
        }
    }
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal, ExecutorError> {
    Decimal::from_f64(value).ok_or_else(|| ExecutorError::InvalidAmount(format!("{} {}", what, value)))
}

#[async_trait]
impl PositionProvider for PaperLedger {
    async fn position(
        &self,
        owner: &str,
        agent_id: &str,
        symbol: &str,
        price: f64,
    ) -> Result<PositionState, PositionError> {
        let account = self.account(owner, agent_id).await;
        let tokens = account.quantity(symbol).to_f64().unwrap_or(0.0);
        let usdc = account.usdc.to_f64().unwrap_or(0.0);
        Ok(PositionState::holding(tokens, price, usdc))
    }
}

#[async_trait]
impl TradeExecutor for PaperLedger {
    async fn execute(&self, request: &TradeRequest) -> Result<TradeReceipt, ExecutorError> {
        let price = request.price;
        if price <= Decimal::ZERO {
            return Err(ExecutorError::InvalidPrice(price));
        }
        if request.side == TradeAction::Hold {
            return Err(ExecutorError::Rejected("HOLD is not a trade".to_string()));
        }

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(Self::key(&request.owner, &request.agent_id))
            .or_insert_with(|| PaperAccount::new(self.starting_usdc));

        let tokens = match request.amount {
            TradeAmount::Usdc(notional) => (notional / price).round_dp(TOKEN_DP),
            TradeAmount::Tokens(quantity) => quantity.round_dp(TOKEN_DP),
        };
        if tokens <= Decimal::ZERO {
            return Err(ExecutorError::InvalidAmount(format!(
                "{} rounds to zero tokens",
                tokens
            )));
        }
        let notional = (tokens * price).round_dp(USDC_DP);

        if request.side == TradeAction::Buy {
            if notional > account.usdc {
                return Err(ExecutorError::InsufficientBalance {
                    needed: notional,
                    available: account.usdc,
                });
            }
            account.usdc -= notional;
            account.add_tokens(&request.symbol, tokens, price);
        } else {
            let held = account.quantity(&request.symbol);
            if tokens > held {
                return Err(ExecutorError::InsufficientBalance {
                    needed: tokens,
                    available: held,
                });
            }
            account.usdc += notional;
            account.remove_tokens(&request.symbol, tokens);
        }

        let receipt = TradeReceipt {
            tx_hash: format!("paper-{}", Uuid::new_v4()),
            new_usdc_balance: account.usdc,
            tokens_traded: tokens,
            executed_price: price,
        };

        info!(
            agent_id = %request.agent_id,
            symbol = %request.symbol,
            side = %request.side,
            tokens = %tokens,
            price = %price,
            "Paper trade filled"
        );
        debug!(tx = %receipt.tx_hash, usdc = %receipt.new_usdc_balance, "Paper balance updated");

        Ok(receipt)
    }

    fn name(&self) -> &str {
        "paper"
    }
}

/// Build a request amount from an f64 notional or quantity
pub fn usdc_amount(value: f64) -> Result<TradeAmount, ExecutorError> {
    Ok(TradeAmount::Usdc(to_decimal(value, "USDC amount")?.round_dp(USDC_DP)))
}

pub fn token_amount(value: f64) -> Result<TradeAmount, ExecutorError> {
    Ok(TradeAmount::Tokens(to_decimal(value, "token amount")?.round_dp(TOKEN_DP)))
}

pub fn price_decimal(value: f64) -> Result<Decimal, ExecutorError> {
    Decimal::from_f64(value)
        .filter(|p| *p > Decimal::ZERO)
        .ok_or(ExecutorError::InvalidPrice(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::PositionPhase;

    fn request(side: TradeAction, amount: TradeAmount, price: i64) -> TradeRequest {
        TradeRequest {
            agent_id: "agent-1".to_string(),
            owner: "0xAbC".to_string(),
            symbol: "BTC".to_string(),
            side,
            amount,
            price: Decimal::from(price),
        }
    }

    #[tokio::test]
    async fn test_buy_then_sell_round_trip() {
        let ledger = PaperLedger::new(Decimal::from(1000));

        let buy = ledger
            .execute(&request(TradeAction::Buy, TradeAmount::Usdc(Decimal::from(200)), 100))
            .await
            .unwrap();
        assert!(buy.tx_hash.starts_with("paper-"));
        assert_eq!(buy.tokens_traded, Decimal::from(2));
        assert_eq!(buy.new_usdc_balance, Decimal::from(800));

        let pos = ledger.position("0xabc", "agent-1", "BTC", 110.0).await.unwrap();
        assert_eq!(pos.phase(), PositionPhase::Holding);
        assert_eq!(pos.token_amount, 2.0);
        assert_eq!(pos.token_value_usd, 220.0);

        let sell = ledger
            .execute(&request(TradeAction::Sell, TradeAmount::Tokens(Decimal::from(1)), 110))
            .await
            .unwrap();
        assert_eq!(sell.new_usdc_balance, Decimal::from(910));
        assert_eq!(ledger.account("0xABC", "agent-1").await.quantity("BTC"), Decimal::from(1));
    }

    #[tokio::test]
    async fn test_refuses_overspend_and_oversell() {
        let ledger = PaperLedger::new(Decimal::from(100));

        let err = ledger
            .execute(&request(TradeAction::Buy, TradeAmount::Usdc(Decimal::from(101)), 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::InsufficientBalance { .. }));
        assert!(err.is_refusal());

        let err = ledger
            .execute(&request(TradeAction::Sell, TradeAmount::Tokens(Decimal::from(1)), 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::InsufficientBalance { .. }));

        // Nothing changed
        assert_eq!(ledger.account("0xabc", "agent-1").await.usdc, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_rejects_hold_and_bad_price() {
        let ledger = PaperLedger::new(Decimal::from(100));
        let err = ledger
            .execute(&request(TradeAction::Hold, TradeAmount::Usdc(Decimal::from(1)), 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::Rejected(_)));

        let err = ledger
            .execute(&request(TradeAction::Buy, TradeAmount::Usdc(Decimal::from(1)), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidPrice(_)));
    }

    #[tokio::test]
    async fn test_average_entry_on_add() {
        let ledger = PaperLedger::new(Decimal::from(1000));
        ledger
            .execute(&request(TradeAction::Buy, TradeAmount::Tokens(Decimal::from(1)), 100))
            .await
            .unwrap();
        ledger
            .execute(&request(TradeAction::Buy, TradeAmount::Tokens(Decimal::from(1)), 200))
            .await
            .unwrap();
        let account = ledger.account("0xabc", "agent-1").await;
        assert_eq!(account.holdings["BTC"].avg_entry_price, Decimal::from(150));
        assert_eq!(account.usdc, Decimal::from(700));
    }

    #[test]
    fn test_amount_helpers() {
        assert_eq!(usdc_amount(12.5).unwrap(), TradeAmount::Usdc(Decimal::new(125, 1)));
        assert!(usdc_amount(f64::NAN).is_err());
        assert!(price_decimal(0.0).is_err());
    }
}
