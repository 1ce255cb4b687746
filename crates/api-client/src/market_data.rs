// In crates/api-client/src/market_data.rs

use crate::retry::{RetryPolicy, retry_with_linear_backoff};
use crate::{ApiClient, Error, Result};
use app_config::MarketDataSettings;
use async_trait::async_trait;
use core_types::{Candle, Symbol, Timeframe};
use std::time::Duration;

/// A source of recent candles.
///
/// Implementations return candles oldest first. Retrying transient failures is
/// the implementation's job; callers see a single success or error.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn get_candles(&self, symbol: &Symbol, timeframe: Timeframe, limit: u16) -> Result<Vec<Candle>>;
}

/// The kline `interval` parameter for a timeframe.
pub fn interval_for(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::M1 => "1",
        Timeframe::M3 => "3",
        Timeframe::M5 => "5",
        Timeframe::M15 => "15",
        Timeframe::M30 => "30",
        Timeframe::H1 => "60",
        Timeframe::H2 => "120",
        Timeframe::H4 => "240",
        Timeframe::D1 => "D",
    }
}

/// Converts newest-first kline rows into oldest-first candles.
///
/// Each row needs at least `[start, open, high, low, close, volume]`; trailing
/// columns such as turnover are ignored. Any unparsable field fails the batch.
pub fn parse_kline_rows(rows: &[Vec<String>]) -> Result<Vec<Candle>> {
    if rows.is_empty() {
        return Err(Error::Empty("kline list".to_string()));
    }

    let mut candles = rows
        .iter()
        .map(|row| parse_kline_row(row))
        .collect::<Result<Vec<_>>>()?;
    candles.reverse();
    Ok(candles)
}

fn parse_kline_row(row: &[String]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(Error::Malformed(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let timestamp = row[0]
        .parse::<i64>()
        .map_err(|e| Error::Malformed(format!("kline start time {:?}: {e}", row[0])))?;
    let number = |index: usize, name: &str| -> Result<f64> {
        let value = row[index]
            .parse::<f64>()
            .map_err(|e| Error::Malformed(format!("kline {name} {:?}: {e}", row[index])))?;
        if !value.is_finite() {
            return Err(Error::Malformed(format!("kline {name} {:?} is not finite", row[index])));
        }
        Ok(value)
    };
    let price = |index: usize, name: &str| -> Result<f64> {
        let value = number(index, name)?;
        if value <= 0.0 {
            return Err(Error::Malformed(format!("kline {name} {value} is not positive")));
        }
        Ok(value)
    };

    let volume = number(5, "volume")?;
    if volume < 0.0 {
        return Err(Error::Malformed(format!("kline volume {volume} is negative")));
    }

    Ok(Candle::new(
        timestamp,
        price(1, "open")?,
        price(2, "high")?,
        price(3, "low")?,
        price(4, "close")?,
        volume,
    ))
}

/// Candles from Bybit's public kline endpoint, with retries and a per-attempt timeout.
#[derive(Clone)]
pub struct BybitMarketData {
    client: ApiClient,
    retry: RetryPolicy,
    timeout: Duration,
}

impl BybitMarketData {
    pub fn new(client: ApiClient, settings: &MarketDataSettings) -> Self {
        Self {
            client,
            retry: RetryPolicy::new(settings.max_attempts, Duration::from_secs(settings.backoff_secs)),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    async fn fetch_once(&self, symbol: &Symbol, timeframe: Timeframe, limit: u16) -> Result<Vec<Candle>> {
        let request = self.client.get_klines(symbol, interval_for(timeframe), limit);
        let rows = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;
        parse_kline_rows(&rows)
    }
}

#[async_trait]
impl MarketData for BybitMarketData {
    async fn get_candles(&self, symbol: &Symbol, timeframe: Timeframe, limit: u16) -> Result<Vec<Candle>> {
        retry_with_linear_backoff(&self.retry, "get_candles", || self.fetch_once(symbol, timeframe, limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rows_are_reversed_to_oldest_first() {
        let rows = vec![
            row(&["1700000600000", "101", "103", "100", "102", "12.5", "1275"]),
            row(&["1700000300000", "100", "102", "99", "101", "10", "1010"]),
        ];
        let candles = parse_kline_rows(&rows).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_700_000_300_000);
        assert_eq!(candles[1].timestamp, 1_700_000_600_000);
        assert_eq!(candles[1].close, 102.0);
        assert_eq!(candles[1].volume, 12.5);
    }

    #[test]
    fn turnover_column_is_optional() {
        let rows = vec![row(&["1700000300000", "100", "102", "99", "101", "10"])];
        assert_eq!(parse_kline_rows(&rows).unwrap()[0].high, 102.0);
    }

    #[test]
    fn bad_rows_fail_the_whole_batch() {
        let short = vec![row(&["1700000300000", "100", "102"])];
        assert!(matches!(parse_kline_rows(&short), Err(Error::Malformed(_))));

        let garbage = vec![
            row(&["1700000600000", "101", "103", "100", "102", "12.5"]),
            row(&["1700000300000", "100", "n/a", "99", "101", "10"]),
        ];
        assert!(matches!(parse_kline_rows(&garbage), Err(Error::Malformed(_))));
    }

    #[test]
    fn non_finite_and_non_positive_values_are_rejected() {
        for fields in [
            ["1700000300000", "100", "102", "99", "NaN", "10"],
            ["1700000300000", "100", "inf", "99", "101", "10"],
            ["1700000300000", "100", "102", "-inf", "101", "10"],
            ["1700000300000", "100", "102", "99", "101", "inf"],
            ["1700000300000", "0", "102", "99", "101", "10"],
            ["1700000300000", "100", "102", "-99", "101", "10"],
            ["1700000300000", "100", "102", "99", "101", "-1"],
        ] {
            let rows = vec![row(&fields)];
            assert!(
                matches!(parse_kline_rows(&rows), Err(Error::Malformed(_))),
                "accepted {fields:?}"
            );
        }
    }

    #[test]
    fn zero_volume_is_accepted() {
        let rows = vec![row(&["1700000300000", "100", "102", "99", "101", "0"])];
        assert_eq!(parse_kline_rows(&rows).unwrap()[0].volume, 0.0);
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(parse_kline_rows(&[]), Err(Error::Empty(_))));
    }

    #[test]
    fn intervals_match_bybit() {
        assert_eq!(interval_for(Timeframe::M1), "1");
        assert_eq!(interval_for(Timeframe::M5), "5");
        assert_eq!(interval_for(Timeframe::H1), "60");
        assert_eq!(interval_for(Timeframe::H4), "240");
        assert_eq!(interval_for(Timeframe::D1), "D");
    }
}
