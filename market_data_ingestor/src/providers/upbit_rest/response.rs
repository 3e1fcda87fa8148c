use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::models::bar::DailyBar;

/// One element of the `/v1/candles/days` response. Unused fields are ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct UpbitCandle {
    pub market: String,
    pub candle_date_time_utc: NaiveDateTime,
    pub candle_date_time_kst: NaiveDateTime,
    pub opening_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub trade_price: f64,
    pub candle_acc_trade_volume: f64,
}

impl UpbitCandle {
    /// Daily candles open at 09:00 KST, so the KST date names the trading day.
    pub fn into_bar(self) -> DailyBar {
        DailyBar {
            date: self.candle_date_time_kst.date(),
            open: self.opening_price,
            high: self.high_price,
            low: self.low_price,
            close: self.trade_price,
            volume: self.candle_acc_trade_volume,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct UpbitErrorBody {
    pub error: UpbitErrorDetail,
}

#[derive(Deserialize, Debug)]
pub struct UpbitErrorDetail {
    /// Upbit sends either a string code or a number here.
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Extracts a readable message from an error response body.
pub fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<UpbitErrorBody>(body) {
        Ok(UpbitErrorBody { error }) => {
            let name = match error.name {
                Some(serde_json::Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => "error".to_string(),
            };
            match error.message {
                Some(message) => format!("{name}: {message}"),
                None => name,
            }
        }
        Err(_) if body.trim().is_empty() => "Unknown API error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
