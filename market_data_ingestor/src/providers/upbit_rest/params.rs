use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{
    models::request_params::CandleRequest,
    providers::{ProviderError, ValidationSnafu},
};

/// Upbit caps every candle response at this many rows.
pub const MAX_CANDLES_PER_REQUEST: usize = 200;

/// Builds the query string for one page of daily candles.
///
/// `to` is Upbit's exclusive upper bound, formatted as an ISO 8601 UTC instant.
pub fn construct_params(market: &str, count: usize, to: Option<&str>) -> Vec<(String, String)> {
    let mut query = vec![
        ("market".to_string(), market.to_string()),
        ("count".to_string(), count.to_string()),
    ];
    if let Some(to) = to {
        query.push(("to".to_string(), to.to_string()));
    }
    query
}

/// Formats an exclusive page cursor from a UTC instant.
pub fn format_cursor(to: &DateTime<Utc>) -> String {
    to.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Formats an exclusive page cursor from a naive timestamp already expressed in UTC.
pub fn format_naive_cursor(to: &NaiveDateTime) -> String {
    to.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Rejects requests Upbit would refuse or misinterpret.
///
/// Market codes are `QUOTE-BASE` pairs such as `KRW-BTC` or `USDT-ETH`.
pub fn validate_request(request: &CandleRequest) -> Result<(), ProviderError> {
    if request.count == 0 {
        return ValidationSnafu {
            message: "count must be at least 1",
        }
        .fail();
    }
    let well_formed = request
        .market
        .split_once('-')
        .is_some_and(|(quote, base)| {
            !quote.is_empty()
                && !base.is_empty()
                && request
                    .market
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if !well_formed {
        return ValidationSnafu {
            message: format!("market {:?} is not a QUOTE-BASE pair", request.market),
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn query_without_cursor() {
        let q = construct_params("KRW-BTC", 200, None);
        assert_eq!(
            q,
            vec![
                ("market".to_string(), "KRW-BTC".to_string()),
                ("count".to_string(), "200".to_string()),
            ]
        );
    }

    #[test]
    fn query_with_cursor() {
        let to = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let q = construct_params("KRW-ETH", 5, Some(&format_cursor(&to)));
        assert_eq!(q[2], ("to".to_string(), "2025-02-01T00:00:00Z".to_string()));
    }

    #[test]
    fn rejects_zero_count() {
        let err = validate_request(&CandleRequest::latest("KRW-BTC", 0)).unwrap_err();
        assert!(err.to_string().contains("count must be at least 1"));
    }

    #[test]
    fn rejects_malformed_market() {
        for market in ["BTC", "KRW-", "-BTC", "KRW BTC", ""] {
            assert!(
                validate_request(&CandleRequest::latest(market, 10)).is_err(),
                "{market:?} should be rejected"
            );
        }
        assert!(validate_request(&CandleRequest::latest("USDT-ETH", 10)).is_ok());
    }
}
