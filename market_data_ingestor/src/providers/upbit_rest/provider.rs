use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use shared_utils::env::get_env_var_or;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{
        bar::{BarSeries, DailyBar},
        request_params::CandleRequest,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DataShapeSnafu, InvalidBaseUrlSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        upbit_rest::{
            params::{
                MAX_CANDLES_PER_REQUEST, construct_params, format_cursor, format_naive_cursor,
                validate_request,
            },
            response::{UpbitCandle, api_error_message},
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://api.upbit.com";

/// Environment variable that overrides [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "UPBIT_API_BASE_URL";

const CANDLES_PATH: &str = "/v1/candles/days";

pub struct UpbitProvider {
    client: Client,
    endpoint: String,
    // Upbit allows 10 quotation requests per second per IP.
    limiter: DefaultDirectRateLimiter,
}

impl UpbitProvider {
    /// Creates a provider against the public Upbit API.
    ///
    /// The host can be redirected with the `UPBIT_API_BASE_URL` environment variable.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_base_url(&get_env_var_or(BASE_URL_ENV, DEFAULT_BASE_URL))
    }

    /// Creates a provider against an explicit host, e.g. a local test server.
    pub fn with_base_url(base_url: &str) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("market_data_ingestor/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(ClientBuildSnafu)?;

        let endpoint = format!("{}{CANDLES_PATH}", base_url.trim_end_matches('/'));
        // Surface a bad host at construction time rather than on the first fetch.
        client
            .get(&endpoint)
            .build()
            .context(InvalidBaseUrlSnafu { url: base_url })?;

        Ok(Self {
            client,
            endpoint,
            limiter: RateLimiter::direct(Quota::per_second(nonzero!(10u32))),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_page(
        &self,
        market: &str,
        count: usize,
        cursor: Option<&str>,
    ) -> Result<Vec<UpbitCandle>, ProviderError> {
        let query = construct_params(market, count, cursor);

        self.limiter.until_ready().await;
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ApiSnafu {
                status: status.as_u16(),
                message: api_error_message(&body),
            }
            .fail();
        }

        let body = response.bytes().await.context(ReqwestSnafu)?;
        serde_json::from_slice(&body).map_err(|e| {
            DataShapeSnafu {
                message: format!("undecodable candle page for {market}: {e}"),
            }
            .build()
        })
    }
}

#[async_trait]
impl DataProvider for UpbitProvider {
    async fn fetch_daily_bars(&self, request: &CandleRequest) -> Result<BarSeries, ProviderError> {
        validate_request(request)?;

        let wanted = request.count as usize;
        let mut collected: Vec<UpbitCandle> = Vec::with_capacity(wanted);
        let mut cursor = request.to.as_ref().map(format_cursor);

        // Upbit answers newest-first; walk backwards with the exclusive `to` cursor.
        while collected.len() < wanted {
            let page_size = (wanted - collected.len()).min(MAX_CANDLES_PER_REQUEST);
            let page = self
                .fetch_page(&request.market, page_size, cursor.as_deref())
                .await?;
            debug!(
                market = %request.market,
                requested = page_size,
                received = page.len(),
                cursor = cursor.as_deref().unwrap_or("now"),
                "fetched candle page"
            );

            if let Some(candle) = page.iter().find(|c| c.market != request.market) {
                return DataShapeSnafu {
                    message: format!(
                        "asked for {} but received a {} candle",
                        request.market, candle.market
                    ),
                }
                .fail();
            }

            let Some(oldest) = page.iter().map(|c| c.candle_date_time_utc).min() else {
                break;
            };
            let exhausted = page.len() < page_size;
            cursor = Some(format_naive_cursor(&oldest));
            collected.extend(page);
            if exhausted {
                break;
            }
        }

        let mut bars: Vec<DailyBar> = collected.into_iter().map(UpbitCandle::into_bar).collect();
        bars.sort_by_key(|bar| bar.date);

        let series = BarSeries::new(request.market.clone(), bars);
        series
            .check_shape()
            .map_err(|message| DataShapeSnafu { message }.build())?;
        Ok(series)
    }
}
