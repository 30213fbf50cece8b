use std::sync::Arc;
use std::time::Duration;

use hrp_core::domain::portfolio::EnrichmentResult;
use hrp_core::enrich::polygon::PolygonBrandingClient;
use hrp_core::enrich::EnrichmentClient;
use hrp_core::optimize::error::BackendError;
use hrp_core::optimize::hrp::HrpBackendClient;
use hrp_core::optimize::OptimizationClient;
use hrp_core::orchestrator::{Phase, SubmissionOrchestrator};
use hrp_core::suggest::keyword::KeywordLookupClient;
use hrp_core::suggest::{SymbolLookup, SymbolSuggester};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn ten_slots(filled: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = filled.iter().map(|s| s.to_string()).collect();
    out.resize(10, String::new());
    out
}

#[tokio::test]
async fn optimizer_posts_all_slots_and_reads_weights() {
    let server = MockServer::start().await;
    let symbols = ten_slots(&["AAPL", "MSFT", "GOOG", "AMZN"]);
    Mock::given(method("POST"))
        .and(path("/double"))
        .and(body_json(json!({ "array": symbols })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hrp_weights": [0.4, 0.3, 0.2, 0.1],
            "images": ["HRP3_corr0.png", "HRP3_corr1.png"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HrpBackendClient::new(server.uri(), TIMEOUT).unwrap();
    let response = client.optimize(&symbols).await.unwrap();

    assert_eq!(response.weights, vec![0.4, 0.3, 0.2, 0.1]);
    assert_eq!(response.images, vec!["HRP3_corr0.png", "HRP3_corr1.png"]);
}

#[tokio::test]
async fn optimizer_maps_failures_to_backend_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/double"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/double"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "No valid data available"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/double"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = HrpBackendClient::new(server.uri(), TIMEOUT).unwrap();
    let symbols = ten_slots(&["AAPL", "MSFT", "GOOG", "AMZN"]);

    assert_eq!(
        client.optimize(&symbols).await.unwrap_err(),
        BackendError::Status {
            status: 503,
            body: "overloaded".to_string()
        }
    );
    assert_eq!(
        client.optimize(&symbols).await.unwrap_err(),
        BackendError::Reported("No valid data available".to_string())
    );
    assert!(matches!(
        client.optimize(&symbols).await.unwrap_err(),
        BackendError::Decode(_)
    ));
}

#[tokio::test]
async fn optimizer_transport_failure_is_a_backend_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = HrpBackendClient::new(uri, Duration::from_millis(500)).unwrap();
    let err = client
        .optimize(&ten_slots(&["AAPL", "MSFT", "GOOG", "AMZN"]))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn polygon_builds_displayable_logo_url() {
    let server = MockServer::start().await;
    let icon = format!("{}/v1/reference/company-branding/aapl/icon.png", server.uri());
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/AAPL"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {"ticker": "AAPL", "branding": {"icon_url": icon}}
        })))
        .mount(&server)
        .await;

    let client = PolygonBrandingClient::new(server.uri(), "test-key", TIMEOUT).unwrap();
    let result = client.enrich("AAPL").await;

    assert_eq!(
        result,
        EnrichmentResult::found("AAPL", format!("{icon}?apiKey=test-key"))
    );
}

#[tokio::test]
async fn polygon_failures_resolve_to_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"status": "NOT_FOUND"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/BARE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": {"ticker": "BARE"}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/JUNK"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{"))
        .mount(&server)
        .await;

    let client = PolygonBrandingClient::new(server.uri(), "k", TIMEOUT).unwrap();

    for symbol in ["NOPE", "BARE", "JUNK"] {
        assert_eq!(client.enrich(symbol).await, EnrichmentResult::absent(symbol));
    }
}

#[tokio::test]
async fn polygon_keeps_credential_in_query_for_odd_symbols() {
    let server = MockServer::start().await;
    let icon = format!("{}/icon.png", server.uri());
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/A%23B"))
        .and(query_param("apiKey", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {"branding": {"icon_url": icon}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PolygonBrandingClient::new(server.uri(), "k", TIMEOUT).unwrap();

    assert_eq!(
        client.enrich("A#B").await,
        EnrichmentResult::found("A#B", format!("{icon}?apiKey=k"))
    );
}

#[tokio::test]
async fn polygon_skips_blank_symbols() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = PolygonBrandingClient::new(server.uri(), "k", TIMEOUT).unwrap();

    assert_eq!(client.enrich("  ").await, EnrichmentResult::absent(""));
}

#[tokio::test]
async fn keyword_lookup_maps_symbols() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keyword/AA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"symbol": "AAPL", "name": "Apple Inc."},
            {"symbol": "AAL", "name": "American Airlines"},
            {"name": "no symbol"},
        ])))
        .mount(&server)
        .await;

    let client = KeywordLookupClient::new(server.uri(), TIMEOUT).unwrap();

    assert_eq!(client.lookup("AA").await.unwrap(), vec!["AAPL", "AAL"]);
}

#[tokio::test]
async fn suggester_swallows_lookup_service_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keyword/AA"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = KeywordLookupClient::new(server.uri(), TIMEOUT).unwrap();
    let suggester = SymbolSuggester::new(Arc::new(client));

    assert!(suggester.suggest("AA").await.symbols.is_empty());
    assert!(suggester.suggest("").await.symbols.is_empty());
}

#[tokio::test]
async fn full_cycle_against_mocked_services() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/double"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hrp_weights": [0.4, 0.3, 0.2, 0.1],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {"branding": {"icon_url": "https://cdn.example/aapl.svg"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/MSFT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/GOOG"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {"branding": {"icon_url": "https://cdn.example/goog.svg"}}
        })))
        .mount(&server)
        .await;
    // AMZN has no mock and falls through to wiremock's 404.

    let optimizer = Arc::new(HrpBackendClient::new(server.uri(), TIMEOUT).unwrap());
    let enricher = Arc::new(PolygonBrandingClient::new(server.uri(), "k", TIMEOUT).unwrap());
    let orchestrator = SubmissionOrchestrator::new(optimizer, enricher);
    for (i, s) in ["AAPL", "MSFT", "GOOG", "AMZN"].iter().enumerate() {
        orchestrator.set_slot(i, *s).await.unwrap();
    }

    let view = orchestrator.submit().await.unwrap();

    let logos: Vec<_> = view.rows.iter().map(|r| r.logo_url.as_deref()).collect();
    assert_eq!(
        logos,
        vec![
            Some("https://cdn.example/aapl.svg?apiKey=k"),
            None,
            Some("https://cdn.example/goog.svg?apiKey=k"),
            None,
        ]
    );
    assert_eq!(orchestrator.snapshot().await.phase, Phase::Ready);
}
