//! Behavior tests for the Yahoo live source driven by a scripted transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bubblewatch_core::{
    FetchErrorKind, HttpClient, HttpError, HttpRequest, HttpResponse, QuoteOrigin, QuoteSource,
    Symbol, TickerSpec, UtcDateTime, YahooEndpoints, YahooSource,
};

/// Answers by URL and records every request it sees.
struct ScriptedHttpClient {
    crumb: HttpResponse,
    quotes: Mutex<Vec<HttpResponse>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    /// Quote responses are served in order; the last one repeats.
    fn new(crumb: HttpResponse, quotes: Vec<HttpResponse>) -> Self {
        Self {
            crumb,
            quotes: Mutex::new(quotes),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn count(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .filter(|url| url.contains(needle))
            .count()
    }

    fn quote_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .filter(|url| url.contains("v7/finance/quote"))
            .cloned()
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("lock")
                .push(request.url.clone());

            if request.url.contains("fc.yahoo.com") || request.url.contains("/cookie") {
                return Ok(HttpResponse::new(404, ""));
            }
            if request.url.contains("getcrumb") {
                return Ok(self.crumb.clone());
            }

            let mut quotes = self.quotes.lock().expect("lock");
            let response = if quotes.len() > 1 {
                quotes.remove(0)
            } else {
                quotes
                    .first()
                    .cloned()
                    .unwrap_or_else(|| HttpResponse::new(500, ""))
            };
            Ok(response)
        })
    }
}

fn ticker(raw: &str) -> TickerSpec {
    TickerSpec::for_symbol(Symbol::parse(raw).expect("valid symbol"))
}

fn as_of() -> UtcDateTime {
    UtcDateTime::parse("2025-02-13T15:00:00Z").expect("valid")
}

fn quote_body(symbol: &str, price: f64) -> String {
    format!(
        r#"{{"quoteResponse":{{"result":[{{"symbol":"{symbol}","regularMarketPrice":{price},"regularMarketTime":1739462400,"marketCap":3211500000000}}],"error":null}}}}"#
    )
}

#[tokio::test]
async fn handshake_then_quote_yields_a_live_point() {
    // Given: a provider that issues a crumb and a valid NVDA quote
    let client = Arc::new(ScriptedHttpClient::new(
        HttpResponse::ok_json("abc123"),
        vec![HttpResponse::ok_json(quote_body("NVDA", 131.14))],
    ));
    let source = YahooSource::with_http_client(client.clone());

    // When: NVDA is fetched
    let point = source.fetch(&ticker("NVDA"), as_of()).await.expect("live quote");

    // Then: the point is live with the provider's values
    assert_eq!(point.symbol.as_str(), "NVDA");
    assert_eq!(point.price, 131.14);
    assert_eq!(point.market_cap, 3_211_500_000_000);
    assert_eq!(point.source, QuoteOrigin::Live);

    // And: the crumb was passed to the quote endpoint
    let urls = client.quote_urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].contains("symbols=NVDA"));
    assert!(urls[0].contains("crumb=abc123"));
}

#[tokio::test]
async fn crumb_is_reused_across_symbols() {
    // Given: a provider that answers every quote request
    let client = Arc::new(ScriptedHttpClient::new(
        HttpResponse::ok_json("abc123"),
        vec![
            HttpResponse::ok_json(quote_body("NVDA", 131.14)),
            HttpResponse::ok_json(quote_body("MSFT", 409.04)),
        ],
    ));
    let source = YahooSource::with_http_client(client.clone());

    // When: two symbols are fetched
    source.fetch(&ticker("NVDA"), as_of()).await.expect("nvda");
    source.fetch(&ticker("MSFT"), as_of()).await.expect("msft");

    // Then: the handshake ran once
    assert_eq!(client.count("getcrumb"), 1);
    assert_eq!(client.count("fc.yahoo.com"), 1);
}

#[tokio::test]
async fn rejected_session_is_dropped_and_renegotiated() {
    // Given: the first quote is rejected with 401, later ones succeed
    let client = Arc::new(ScriptedHttpClient::new(
        HttpResponse::ok_json("abc123"),
        vec![
            HttpResponse::new(401, "Unauthorized"),
            HttpResponse::ok_json(quote_body("NVDA", 131.14)),
        ],
    ));
    let source = YahooSource::with_http_client(client.clone());

    // When: the first fetch fails
    let error = source
        .fetch(&ticker("NVDA"), as_of())
        .await
        .expect_err("401 must fail");
    assert_eq!(error.kind(), FetchErrorKind::Network);

    // Then: the next fetch performs a fresh handshake and succeeds
    source
        .fetch(&ticker("NVDA"), as_of())
        .await
        .expect("second attempt succeeds");
    assert_eq!(client.count("getcrumb"), 2);
}

#[tokio::test]
async fn quote_status_codes_map_to_fetch_errors() {
    let cases = [
        (429, FetchErrorKind::RateLimited),
        (404, FetchErrorKind::UnknownSymbol),
        (503, FetchErrorKind::Network),
    ];

    for (status, expected) in cases {
        // Given: the quote endpoint answers with `status`
        let client = Arc::new(ScriptedHttpClient::new(
            HttpResponse::ok_json("abc123"),
            vec![HttpResponse::new(status, "")],
        ));
        let source = YahooSource::with_http_client(client);

        // When/Then: the failure is classified
        let error = source
            .fetch(&ticker("NVDA"), as_of())
            .await
            .expect_err("non-2xx must fail");
        assert_eq!(error.kind(), expected, "status {status}");
    }
}

#[tokio::test]
async fn throttled_crumb_is_rate_limited() {
    // Given: the crumb endpoint is throttling
    let client = Arc::new(ScriptedHttpClient::new(
        HttpResponse::new(429, "Too Many Requests"),
        Vec::new(),
    ));
    let source = YahooSource::with_http_client(client.clone());

    // When: a fetch is attempted
    let error = source
        .fetch(&ticker("NVDA"), as_of())
        .await
        .expect_err("must fail");

    // Then: it is rate limited and the quote endpoint was never hit
    assert_eq!(error.code(), "fetch.rate_limited");
    assert!(client.quote_urls().is_empty());
}

#[tokio::test]
async fn custom_endpoints_are_honoured() {
    // Given: a source pointed at a mirror of the Yahoo endpoints
    let client = Arc::new(ScriptedHttpClient::new(
        HttpResponse::ok_json("mirror-crumb"),
        vec![HttpResponse::ok_json(quote_body("MSFT", 409.04))],
    ));
    let source = YahooSource::with_http_client(client.clone()).with_endpoints(YahooEndpoints {
        cookie_url: String::from("http://quotes.internal/cookie"),
        crumb_url: String::from("http://quotes.internal/v1/test/getcrumb"),
        quote_url: String::from("http://quotes.internal/v7/finance/quote"),
    });

    // When: MSFT is fetched
    let point = source.fetch(&ticker("MSFT"), as_of()).await.expect("live quote");

    // Then: every request went to the mirror
    assert_eq!(point.price, 409.04);
    assert_eq!(client.count("quotes.internal"), 3);
    assert_eq!(client.count("yahoo.com"), 0);
    assert!(client.quote_urls()[0].starts_with("http://quotes.internal/v7/finance/quote?"));
}
