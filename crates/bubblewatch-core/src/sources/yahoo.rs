use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, ReqwestHttpClient};
use crate::quote_source::{FetchError, FetchFuture, QuoteSource};
use crate::{round_to_cents, QuoteOrigin, QuotePoint, TickerSpec, UtcDateTime};

const REFERER: &str = "https://finance.yahoo.com/";
const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Endpoints used by the Yahoo Finance handshake and quote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YahooEndpoints {
    pub cookie_url: String,
    pub crumb_url: String,
    pub quote_url: String,
}

impl Default for YahooEndpoints {
    fn default() -> Self {
        Self {
            cookie_url: String::from("https://fc.yahoo.com"),
            crumb_url: String::from("https://query1.finance.yahoo.com/v1/test/getcrumb"),
            quote_url: String::from("https://query1.finance.yahoo.com/v7/finance/quote"),
        }
    }
}

/// Cached crumb for Yahoo's cookie/crumb session scheme.
///
/// Yahoo's public quote API needs a session cookie from `fc.yahoo.com`
/// (kept in the transport's cookie jar) and a crumb token passed as a
/// query parameter. The crumb is fetched once and shared by every symbol
/// in the run; the mutex keeps concurrent fetches from racing the handshake.
#[derive(Debug, Default)]
struct YahooSession {
    crumb: Mutex<Option<String>>,
}

impl YahooSession {
    async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        endpoints: &YahooEndpoints,
        timeout_ms: u64,
    ) -> Result<String, FetchError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Any status is fine here; the point is the Set-Cookie header.
        let cookie_request = HttpRequest::get(endpoints.cookie_url.as_str())
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);
        http_client
            .execute(cookie_request)
            .await
            .map_err(|error| transport_error("yahoo cookie", &error))?;

        let crumb_request = HttpRequest::get(endpoints.crumb_url.as_str())
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);
        let response = http_client
            .execute(crumb_request)
            .await
            .map_err(|error| transport_error("yahoo crumb", &error))?;

        let body = response.body.trim();
        if response.status == 429 || body.to_ascii_lowercase().contains("too many requests") {
            return Err(FetchError::rate_limited(
                "yahoo rate limited while fetching crumb",
            ));
        }
        if !response.is_success() {
            return Err(FetchError::network(format!(
                "yahoo crumb endpoint returned status {}",
                response.status
            )));
        }
        if body.is_empty() || body.len() >= 100 || body.contains(' ') || body.contains('<') {
            return Err(FetchError::malformed("yahoo crumb response is not a token"));
        }

        let crumb = body.to_owned();
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

/// Live quote source backed by the Yahoo Finance v7 quote endpoint.
///
/// Every upstream failure is folded into a [`FetchError`]; the source never
/// retries on its own. A rejected crumb (401/403) is dropped so the next
/// symbol performs a fresh handshake.
#[derive(Clone)]
pub struct YahooSource {
    http_client: Arc<dyn HttpClient>,
    endpoints: YahooEndpoints,
    session: Arc<YahooSession>,
    timeout_ms: u64,
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()))
    }
}

impl YahooSource {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            endpoints: YahooEndpoints::default(),
            session: Arc::new(YahooSession::default()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_endpoints(mut self, endpoints: YahooEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Transport timeout applied to each upstream request.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_quote(
        &self,
        ticker: &TickerSpec,
        as_of: UtcDateTime,
    ) -> Result<QuotePoint, FetchError> {
        let crumb = self
            .session
            .crumb(self.http_client.as_ref(), &self.endpoints, self.timeout_ms)
            .await?;

        let endpoint = format!(
            "{}?symbols={}&fields=regularMarketPrice,regularMarketTime,marketCap&crumb={}",
            self.endpoints.quote_url,
            urlencoding::encode(ticker.symbol.as_str()),
            urlencoding::encode(&crumb)
        );
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error("yahoo quote", &error))?;

        match response.status {
            401 | 403 => {
                self.session.invalidate().await;
                return Err(FetchError::network(format!(
                    "yahoo rejected session with status {}",
                    response.status
                )));
            }
            429 => {
                return Err(FetchError::rate_limited("yahoo returned status 429"));
            }
            404 => {
                return Err(FetchError::unknown_symbol(format!(
                    "yahoo has no quote for '{}'",
                    ticker.symbol
                )));
            }
            status if !response.is_success() => {
                return Err(FetchError::network(format!(
                    "yahoo returned status {status}"
                )));
            }
            _ => {}
        }

        parse_quote_response(&response.body, ticker, as_of)
    }
}

impl QuoteSource for YahooSource {
    fn origin(&self) -> QuoteOrigin {
        QuoteOrigin::Live
    }

    fn fetch<'a>(&'a self, ticker: &'a TickerSpec, as_of: UtcDateTime) -> FetchFuture<'a> {
        Box::pin(self.fetch_quote(ticker, as_of))
    }
}

fn transport_error(stage: &str, error: &HttpError) -> FetchError {
    match error.kind() {
        HttpErrorKind::Timeout => {
            FetchError::timeout(format!("{stage} transport timeout: {}", error.message()))
        }
        HttpErrorKind::Connect | HttpErrorKind::Other => {
            FetchError::network(format!("{stage} transport error: {}", error.message()))
        }
    }
}

fn parse_quote_response(
    body: &str,
    ticker: &TickerSpec,
    as_of: UtcDateTime,
) -> Result<QuotePoint, FetchError> {
    let payload: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(format!("failed to parse yahoo response: {e}")))?;

    if let Some(error) = payload.quote_response.error.filter(|value| !value.is_null()) {
        return Err(FetchError::unknown_symbol(format!(
            "yahoo API error for '{}': {error}",
            ticker.symbol
        )));
    }

    let quote = payload
        .quote_response
        .result
        .into_iter()
        .find(|quote| quote.symbol.eq_ignore_ascii_case(ticker.symbol.as_str()))
        .ok_or_else(|| {
            FetchError::unknown_symbol(format!("yahoo returned no quote for '{}'", ticker.symbol))
        })?;

    let price = quote
        .regular_market_price
        .filter(|price| price.is_finite() && *price > 0.0)
        .map(round_to_cents)
        .ok_or_else(|| {
            FetchError::malformed(format!(
                "yahoo quote for '{}' has no usable price",
                ticker.symbol
            ))
        })?;

    let market_cap = quote
        .market_cap
        .filter(|cap| cap.is_finite() && *cap >= 0.0)
        .map(|cap| cap.round() as u64)
        .unwrap_or_else(|| ticker.market_cap_at(price));

    let timestamp = quote
        .regular_market_time
        .and_then(UtcDateTime::from_unix_timestamp)
        .unwrap_or(as_of);

    QuotePoint::new(
        ticker.symbol.clone(),
        price,
        market_cap,
        timestamp,
        QuoteOrigin::Live,
    )
    .map_err(|e| FetchError::malformed(e.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteData {
    symbol: String,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketTime")]
    regular_market_time: Option<i64>,
    #[serde(rename = "marketCap")]
    market_cap: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    fn nvda() -> TickerSpec {
        TickerSpec::for_symbol(Symbol::parse("NVDA").expect("valid"))
    }

    fn as_of() -> UtcDateTime {
        UtcDateTime::parse("2025-02-13T15:00:00Z").expect("valid")
    }

    #[test]
    fn parses_price_market_cap_and_time() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"NVDA","regularMarketPrice":131.14000701904297,"regularMarketTime":1739462400,"marketCap":3211500000000}],"error":null}}"#;

        let point = parse_quote_response(body, &nvda(), as_of()).expect("valid payload");
        assert_eq!(point.price, 131.14);
        assert_eq!(point.market_cap, 3_211_500_000_000);
        assert_eq!(point.timestamp.format_rfc3339(), "2025-02-13T16:00:00Z");
        assert_eq!(point.source, QuoteOrigin::Live);
    }

    #[test]
    fn derives_market_cap_and_time_when_missing() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"NVDA","regularMarketPrice":100.0}]}}"#;

        let point = parse_quote_response(body, &nvda(), as_of()).expect("valid payload");
        assert_eq!(point.market_cap, 2_450_000_000_000);
        assert_eq!(point.timestamp, as_of());
    }

    #[test]
    fn empty_result_is_unknown_symbol() {
        let body = r#"{"quoteResponse":{"result":[],"error":null}}"#;
        let error = parse_quote_response(body, &nvda(), as_of()).expect_err("must fail");
        assert_eq!(error.code(), "fetch.unknown_symbol");
    }

    #[test]
    fn zero_price_is_malformed() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"NVDA","regularMarketPrice":0.0}]}}"#;
        let error = parse_quote_response(body, &nvda(), as_of()).expect_err("must fail");
        assert_eq!(error.code(), "fetch.malformed_response");
    }

    #[test]
    fn non_json_body_is_malformed() {
        let error =
            parse_quote_response("<html>oops</html>", &nvda(), as_of()).expect_err("must fail");
        assert_eq!(error.code(), "fetch.malformed_response");
    }

    #[test]
    fn api_error_object_is_reported() {
        let body = r#"{"quoteResponse":{"result":[],"error":{"code":"Not Found"}}}"#;
        let error = parse_quote_response(body, &nvda(), as_of()).expect_err("must fail");
        assert_eq!(error.code(), "fetch.unknown_symbol");
    }
}
