//! Supported trading symbols and their CoinGecko ids

/// Symbol -> CoinGecko coin id
pub static COINGECKO_IDS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "BTC" => "bitcoin",
    "ETH" => "ethereum",
    "SOL" => "solana",
    "BNB" => "binancecoin",
    "XRP" => "ripple",
    "ADA" => "cardano",
    "DOGE" => "dogecoin",
    "AVAX" => "avalanche-2",
    "LINK" => "chainlink",
    "DOT" => "polkadot",
    "MATIC" => "matic-network",
};

/// Canonical form of a user-supplied symbol: trimmed, upper-cased, quote
/// suffix ("/USD", "-USDT", ...) removed.
pub fn normalize(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    for quote in ["USDC", "USDT", "USD"] {
        for sep in ['/', '-'] {
            if let Some(base) = upper.strip_suffix(&format!("{}{}", sep, quote)) {
                return base.to_string();
            }
        }
    }
    upper
}

pub fn coingecko_id(symbol: &str) -> Option<&'static str> {
    COINGECKO_IDS.get(normalize(symbol).as_str()).copied()
}

pub fn is_supported(symbol: &str) -> bool {
    coingecko_id(symbol).is_some()
}

/// All supported symbols, sorted
pub fn supported_symbols() -> Vec<&'static str> {
    let mut symbols: Vec<&'static str> = COINGECKO_IDS.keys().copied().collect();
    symbols.sort_unstable();
    symbols
}
