// In crates/api-client/src/types.rs

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// The signed client for the Bybit v5 REST API.
#[derive(Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    pub api_key: String,
    pub api_secret: String,
    /// Mainnet, testnet or an explicit override, without a trailing slash.
    pub base_url: String,
    /// How long a signed request stays valid on the server side.
    pub recv_window_ms: u64,
}

/// The envelope every v5 endpoint answers with.
///
/// `result` is kept raw so that an error response (which often carries an empty
/// object) can be reported by `retCode` before the payload is interpreted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse {
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// `GET /v5/market/kline`. Rows are newest first:
/// `[startTime, open, high, low, close, volume, turnover]`, all strings.
#[derive(Debug, Deserialize)]
pub struct KlineResult {
    #[serde(default)]
    pub symbol: String,
    pub list: Vec<Vec<String>>,
}

/// `GET /v5/account/wallet-balance`.
#[derive(Debug, Deserialize)]
pub struct WalletBalanceResult {
    pub list: Vec<WalletAccount>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub account_type: String,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub total_equity: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub total_wallet_balance: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub total_available_balance: Decimal,
    #[serde(default)]
    pub coin: Vec<CoinBalance>,
}

/// A single coin's balance inside a wallet account.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub coin: String,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub wallet_balance: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub equity: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub unrealised_pnl: Decimal,
}

/// `GET /v5/position/list`.
#[derive(Debug, Deserialize)]
pub struct PositionListResult {
    pub list: Vec<PositionInfo>,
}

/// A linear position as reported by the exchange.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    pub symbol: String,
    /// "Buy", "Sell", or empty/"None" when flat.
    #[serde(default)]
    pub side: String,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub size: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub avg_price: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub mark_price: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub unrealised_pnl: Decimal,
}

impl PositionInfo {
    pub fn is_open(&self) -> bool {
        !self.size.is_zero()
    }
}

/// `POST /v5/order/create`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
}

/// Bybit encodes numbers as strings and uses "" for "not applicable".
fn decimal_or_zero<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    raw.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn wallet_balance_with_blank_fields() {
        let json = r#"{
            "list": [{
                "accountType": "UNIFIED",
                "totalEquity": "1520.5",
                "totalWalletBalance": "1500",
                "totalAvailableBalance": "",
                "coin": [
                    {"coin": "USDT", "walletBalance": "1500", "equity": "1520.5", "unrealisedPnl": "20.5"}
                ]
            }]
        }"#;
        let result: WalletBalanceResult = serde_json::from_str(json).unwrap();
        let account = &result.list[0];

        assert_eq!(account.total_equity, dec!(1520.5));
        assert_eq!(account.total_available_balance, Decimal::ZERO);
        assert_eq!(account.coin[0].unrealised_pnl, dec!(20.5));
    }

    #[test]
    fn flat_position_is_not_open() {
        let json = r#"{"symbol": "BTCUSDT", "side": "", "size": "0", "avgPrice": "", "markPrice": "64000", "unrealisedPnl": ""}"#;
        let position: PositionInfo = serde_json::from_str(json).unwrap();
        assert!(!position.is_open());
        assert_eq!(position.mark_price, dec!(64000));
    }

    #[test]
    fn error_envelope_without_result() {
        let json = r#"{"retCode": 10001, "retMsg": "params error"}"#;
        let response: BybitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.ret_code, 10001);
        assert!(response.result.is_null());
    }
}
