// In crates/api-client/src/lib.rs

use app_config::BybitSettings;
use chrono::Utc;
use core_types::{Side, Symbol};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sha2::Sha256;
use std::time::Duration;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

pub mod error;
pub mod market_data;
pub mod retry;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use market_data::{BybitMarketData, MarketData};
pub use retry::RetryPolicy;
pub use types::*;

/// Bybit v5 signature: hex HMAC-SHA256 of `timestamp + api_key + recv_window + payload`,
/// where the payload is the query string of a GET or the JSON body of a POST.
pub fn sign_payload(secret: &str, timestamp: i64, api_key: &str, recv_window_ms: u64, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{timestamp}{api_key}{recv_window_ms}{payload}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `retCode` and extracts the typed `result`.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let response: BybitResponse = serde_json::from_str(body)?;
    if response.ret_code != 0 {
        return Err(Error::ApiError {
            code: response.ret_code,
            msg: response.ret_msg,
        });
    }
    Ok(serde_json::from_value(response.result)?)
}

impl ApiClient {
    /// Constructs a new ApiClient from BybitSettings.
    pub fn new(settings: &BybitSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            base_url: settings.base_url().to_string(),
            recv_window_ms: settings.recv_window_ms,
        })
    }

    fn sign(&self, timestamp: i64, payload: &str) -> String {
        sign_payload(&self.api_secret, timestamp, &self.api_key, self.recv_window_ms, payload)
    }

    fn ensure_credentials(&self) -> Result<()> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(Error::ClientBuildError(
                "API key and secret are required for private endpoints".to_string(),
            ));
        }
        Ok(())
    }

    fn signed_request(&self, builder: reqwest::RequestBuilder, payload: &str) -> reqwest::RequestBuilder {
        let timestamp = Utc::now().timestamp_millis();
        builder
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", timestamp.to_string())
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", self.sign(timestamp, payload))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let body = request.send().await?.text().await?;
        parse_response(&body)
    }

    async fn public_get<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        let url = format!("{}{}?{}", self.base_url, path, query);
        self.send(self.http_client.get(&url)).await
    }

    async fn signed_get<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        self.ensure_credentials()?;
        let url = format!("{}{}?{}", self.base_url, path, query);
        let request = self.signed_request(self.http_client.get(&url), query);
        self.send(request).await
    }

    async fn signed_post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.ensure_credentials()?;
        let url = format!("{}{}", self.base_url, path);
        let payload = body.to_string();
        let request = self
            .signed_request(self.http_client.post(&url), &payload)
            .header("Content-Type", "application/json")
            .body(payload);
        self.send(request).await
    }

    /// Raw kline rows, newest first.
    ///
    /// This corresponds to the `GET /v5/market/kline` endpoint (linear category).
    pub async fn get_klines(&self, symbol: &Symbol, interval: &str, limit: u16) -> Result<Vec<Vec<String>>> {
        let query = format!("category=linear&symbol={}&interval={}&limit={}", symbol.0, interval, limit);
        let result: KlineResult = self.public_get("/v5/market/kline", &query).await?;
        Ok(result.list)
    }

    /// Fetches the unified account wallet, optionally narrowed to one coin.
    ///
    /// This corresponds to the `GET /v5/account/wallet-balance` endpoint.
    pub async fn get_wallet_balance(&self, coin: Option<&str>) -> Result<WalletAccount> {
        let mut query = "accountType=UNIFIED".to_string();
        if let Some(coin) = coin {
            query.push_str(&format!("&coin={coin}"));
        }
        let result: WalletBalanceResult = self.signed_get("/v5/account/wallet-balance", &query).await?;
        result
            .list
            .into_iter()
            .next()
            .ok_or_else(|| Error::Empty("wallet balance".to_string()))
    }

    /// The open linear position for `symbol`, if any.
    ///
    /// This corresponds to the `GET /v5/position/list` endpoint.
    pub async fn get_position(&self, symbol: &Symbol) -> Result<Option<PositionInfo>> {
        let query = format!("category=linear&symbol={}", symbol.0);
        let result: PositionListResult = self.signed_get("/v5/position/list", &query).await?;
        Ok(result.list.into_iter().find(PositionInfo::is_open))
    }

    /// Places a new market order.
    /// Corresponds to `POST /v5/order/create`.
    pub async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
        reduce_only: bool,
    ) -> Result<OrderResult> {
        let body = order_body(symbol, side, quantity, reduce_only);
        tracing::info!(%symbol, ?side, %quantity, reduce_only, "Placing market order.");
        self.signed_post("/v5/order/create", &body).await
    }
}

fn order_body(symbol: &Symbol, side: Side, quantity: Decimal, reduce_only: bool) -> Value {
    let side = match side {
        Side::Long => "Buy",
        Side::Short => "Sell",
    };
    json!({
        "category": "linear",
        "symbol": symbol.0,
        "side": side,
        "orderType": "Market",
        "qty": quantity.normalize().to_string(),
        "reduceOnly": reduce_only,
    })
}
