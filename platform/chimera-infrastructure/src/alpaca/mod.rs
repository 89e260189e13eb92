pub mod dto;

use chimera_domain::repositories::brokerage::{BrokerageRepository, DailyBarsQuery};
use chimera_domain::value_objects::bar::Bar;
use chimera_domain::value_objects::order::ClosedOrder;
use chimera_domain::value_objects::position::OpenPosition;
use chrono::SecondsFormat;
use dto::{AccountDto, BarsPage, PositionDto};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

const HEADER_KEY_ID: &str = "APCA-API-KEY-ID";
const HEADER_SECRET_KEY: &str = "APCA-API-SECRET-KEY";
const BARS_TIMEFRAME: &str = "1Day";
const BARS_PAGE_LIMIT: &str = "1000";
/// Upper bound on followed `next_page_token`s for one bars request.
const MAX_BAR_PAGES: usize = 20;

fn record_call_metrics<T>(endpoint: &'static str, start: Instant, result: &Result<T, String>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "chimera.infra.broker.calls_total",
        "endpoint" => endpoint,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("chimera.infra.broker.call_ms", "endpoint" => endpoint, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

/// Alpaca reports a missing position either as 404 or as an error body that
/// names it.
pub fn is_position_not_found(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }
    let body = body.to_ascii_lowercase();
    body.contains("position does not exist") || body.contains("position not found")
}

fn error_snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map(|(idx, _)| idx)
        .unwrap_or(body.len());
    body[..end].trim()
}

/// Blocking client for the Alpaca trading and market data REST APIs.
pub struct AlpacaClient {
    trading_url: String,
    data_url: String,
    timeout_ms: u64,
    client: Client,
}

impl AlpacaClient {
    pub fn new(
        trading_url: String,
        data_url: String,
        api_key: &str,
        secret_key: &str,
        timeout_ms: u64,
    ) -> Result<Self, String> {
        let mut headers = HeaderMap::new();
        let key_value =
            HeaderValue::from_str(api_key).map_err(|_| format!("invalid header value for {HEADER_KEY_ID}"))?;
        let mut secret_value = HeaderValue::from_str(secret_key)
            .map_err(|_| format!("invalid header value for {HEADER_SECRET_KEY}"))?;
        secret_value.set_sensitive(true);
        headers.insert(HEADER_KEY_ID, key_value);
        headers.insert(HEADER_SECRET_KEY, secret_value);

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(headers)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;

        Ok(Self {
            trading_url: trading_url.trim_end_matches('/').to_string(),
            data_url: data_url.trim_end_matches('/').to_string(),
            timeout_ms,
            client,
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, String> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| format!("failed to read {endpoint} response: {err}"))?;
        if !status.is_success() {
            return Err(format!(
                "{endpoint} returned {}: {}",
                status.as_u16(),
                error_snippet(&body)
            ));
        }
        serde_json::from_str(&body).map_err(|err| format!("failed to parse {endpoint} response: {err}"))
    }

    fn fetch_account(&self) -> Result<AccountDto, String> {
        let url = format!("{}/v2/account", self.trading_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| format!("account request failed: {err}"))?;
        Self::decode("account", response)
    }

    fn fetch_position(&self, symbol: &str) -> Result<Option<PositionDto>, String> {
        let url = format!("{}/v2/positions/{symbol}", self.trading_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| format!("position request failed: {err}"))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| format!("failed to read position response: {err}"))?;
        if !status.is_success() {
            if is_position_not_found(status, &body) {
                return Ok(None);
            }
            return Err(format!(
                "position returned {}: {}",
                status.as_u16(),
                error_snippet(&body)
            ));
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|err| format!("failed to parse position response: {err}"))
    }

    fn fetch_bars_page(&self, query: &DailyBarsQuery, page_token: Option<&str>) -> Result<BarsPage, String> {
        let url = format!("{}/v1beta3/crypto/us/bars", self.data_url);
        let start = query.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = query.end.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut params: Vec<(&str, &str)> = vec![
            ("symbols", query.symbol.as_str()),
            ("timeframe", BARS_TIMEFRAME),
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("limit", BARS_PAGE_LIMIT),
            ("sort", "asc"),
        ];
        if let Some(token) = page_token {
            params.push(("page_token", token));
        }
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .map_err(|err| format!("bars request failed: {err}"))?;
        Self::decode("bars", response)
    }

    fn fetch_bars(&self, query: &DailyBarsQuery) -> Result<Vec<Bar>, String> {
        let mut bars = Vec::new();
        let mut token: Option<String> = None;
        for page_index in 0..MAX_BAR_PAGES {
            let mut page = self.fetch_bars_page(query, token.as_deref())?;
            bars.extend(page.take_bars(&query.symbol));
            match page.next_token() {
                Some(next) => token = Some(next.to_string()),
                None => return Ok(bars),
            }
            tracing::debug!(page = page_index + 1, bars = bars.len(), "following bars page token");
        }
        tracing::warn!(
            max_pages = MAX_BAR_PAGES,
            bars = bars.len(),
            symbol = %query.symbol,
            "bars pagination cap reached, returning partial history"
        );
        Ok(bars)
    }

    fn fetch_closed_orders(&self, limit: usize) -> Result<Vec<serde_json::Value>, String> {
        let url = format!("{}/v2/orders", self.trading_url);
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("status", "closed"), ("limit", limit.as_str()), ("direction", "desc")])
            .send()
            .map_err(|err| format!("orders request failed: {err}"))?;
        Self::decode("orders", response)
    }
}

impl BrokerageRepository for AlpacaClient {
    fn account_equity(&self) -> Result<f64, String> {
        let span = tracing::info_span!("infra.alpaca.account", base_url = %self.trading_url);
        let _enter = span.enter();
        let start = Instant::now();
        let result = self.fetch_account().map(|account| account.equity);
        record_call_metrics("account", start, &result);
        result
    }

    fn position(&self, symbol: &str) -> Result<Option<OpenPosition>, String> {
        let span = tracing::info_span!("infra.alpaca.position", symbol = %symbol);
        let _enter = span.enter();
        let start = Instant::now();
        let result = self
            .fetch_position(symbol)
            .map(|position| position.map(OpenPosition::from));
        record_call_metrics("position", start, &result);
        result
    }

    fn daily_bars(&self, query: &DailyBarsQuery) -> Result<Vec<Bar>, String> {
        let span = tracing::info_span!(
            "infra.alpaca.bars",
            base_url = %self.data_url,
            symbol = %query.symbol,
            start = %query.start,
            end = %query.end
        );
        let _enter = span.enter();
        let start = Instant::now();
        let result = self.fetch_bars(query);
        record_call_metrics("bars", start, &result);
        result
    }

    fn closed_orders(&self, limit: usize) -> Result<Vec<ClosedOrder>, String> {
        let span = tracing::info_span!("infra.alpaca.orders", limit = limit);
        let _enter = span.enter();
        let start = Instant::now();
        let result = self
            .fetch_closed_orders(limit)
            .map(dto::decode_orders);
        record_call_metrics("orders", start, &result);
        result
    }
}
