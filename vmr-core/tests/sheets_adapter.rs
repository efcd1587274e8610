//! Google Sheets adapter against a mock server.
//!
//! The adapter uses blocking reqwest, so each fetch runs on a blocking task
//! while the mock server lives on the tokio runtime.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vmr_core::data::{ServiceAccountKey, SheetsConfig, SheetsSource, StoreError, TableSource};
use vmr_core::domain::{SignalKind, SignalSchema, Table};

const TEST_KEY: &str = include_str!("fixtures/test_service_account.pem");
const SHEET_ID: &str = "sheet123";

fn source(base: &str, worksheet: Option<&str>) -> SheetsSource {
    let key = ServiceAccountKey {
        client_email: "vmr-reader@example.iam.gserviceaccount.com".into(),
        private_key: TEST_KEY.into(),
        token_uri: format!("{base}/token"),
    };
    let mut config = SheetsConfig::new(SHEET_ID);
    config.api_base = base.to_string();
    config.worksheet = worksheet.map(str::to_string);
    SheetsSource::new(config, key).expect("test key parses")
}

async fn fetch(base: String, worksheet: Option<&'static str>) -> Result<Table, StoreError> {
    tokio::task::spawn_blocking(move || source(&base, worksheet).fetch_all())
        .await
        .expect("blocking task panicked")
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn signal_values() -> serde_json::Value {
    json!({
        "range": "Signals!A1:I3",
        "majorDimension": "ROWS",
        "values": [
            ["TICKER", "TRADE_DATE", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME", "FIRST_SIGNAL", "FOLLOWING_SIGNAL"],
            [2330, "2024-01-01", 495, 502, 490, 500, 1000, 1, 0],
            [2330, "2024-01-02", 505, 512, 500, 510, 1200]
        ]
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn resolves_first_worksheet_and_parses_rows() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}")))
        .and(query_param("fields", "sheets.properties.title"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [
                {"properties": {"title": "Signals"}},
                {"properties": {"title": "Archive"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/Signals")))
        .and(query_param("valueRenderOption", "UNFORMATTED_VALUE"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(signal_values()))
        .expect(1)
        .mount(&server)
        .await;

    let table = fetch(server.uri(), None).await.unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.schema,
        SignalSchema::Tiered {
            following: true,
            generic: false
        }
    );
    assert_eq!(table.rows[0].ticker, "2330");
    assert!(table.rows[0].has_signal(SignalKind::First));
    // Short row padded with blanks: no flags.
    assert!(!table.rows[1].has_any_signal());
}

#[tokio::test(flavor = "multi_thread")]
async fn configured_worksheet_skips_lookup_and_reuses_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}")))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/VMR%20Daily")))
        .respond_with(ResponseTemplate::new(200).set_body_json(signal_values()))
        .expect(2)
        .mount(&server)
        .await;

    let base = server.uri();
    let (first, second) = tokio::task::spawn_blocking(move || {
        let source = source(&base, Some("VMR Daily"));
        (source.fetch_all(), source.fetch_all())
    })
    .await
    .unwrap();
    assert_eq!(first.unwrap().len(), 2);
    assert_eq!(second.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn forbidden_is_an_auth_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/Signals")))
        .respond_with(ResponseTemplate::new(403).set_body_string("caller lacks permission"))
        .mount(&server)
        .await;

    let err = fetch(server.uri(), Some("Signals")).await.unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)), "got {err:?}");
    assert!(err.is_connection_class());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_token_exchange_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let err = fetch(server.uri(), Some("Signals")).await.unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_sheet_is_an_empty_table() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/Signals")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Signals!A1:Z1000",
            "majorDimension": "ROWS"
        })))
        .mount(&server)
        .await;

    let table = fetch(server.uri(), Some("Signals")).await.unwrap();
    assert!(table.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_a_format_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SHEET_ID}/values/Signals")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = fetch(server.uri(), Some("Signals")).await.unwrap_err();
    assert!(matches!(err, StoreError::ResponseFormat(_)), "got {err:?}");
}

#[test]
fn unreachable_store_is_a_connection_error() {
    // Nothing listens on port 1.
    let err = source("http://127.0.0.1:1", Some("Signals"))
        .fetch_all()
        .unwrap_err();
    assert!(matches!(err, StoreError::Connection(_)), "got {err:?}");
}
