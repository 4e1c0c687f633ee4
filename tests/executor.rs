use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use ciberedev::{
    error::Error,
    route::{Method, Route},
    Client, RateLimitHandler,
};
use serde_json::json;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn client(server: &MockServer) -> Client {
    Client::builder()
        .api_url(server.uri())
        .retry_delay(Duration::from_millis(10))
        .build()
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

#[async_trait]
impl RateLimitHandler for Recorder {
    async fn on_ratelimit(&self, endpoint: &str) {
        self.0.lock().unwrap().push(endpoint.to_string());
    }
}

#[tokio::test]
async fn search_scenario_parses_results() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "cats"))
        .and(query_param("amount", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status_code": 200,
            "results": [{"title": "A", "description": "B", "url": "C"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let results = client.get_search_results("cats", 5).await?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title(), "A");
    assert_eq!(results[0].description(), "B");
    assert_eq!(results[0].url(), "C");
    assert_eq!(client.requests(), 1);
    Ok(())
}

#[tokio::test]
async fn requests_carry_the_library_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header(
            "user-agent",
            concat!("CiberedevClient/", env!("CARGO_PKG_VERSION")),
        ))
        .and(header("x-extra", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let route = Route::get(format!("{}/anything", server.uri())).header("x-extra", 1);
    let response = client.http().request(&route).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.json().is_empty());
    assert_eq!(response.endpoint(), "/anything");
}

#[tokio::test]
async fn ratelimits_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/random/word"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/random/word"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status_code": 200, "words": ["apple", "pear"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recorder = Recorder::default();
    let client = Client::builder()
        .api_url(server.uri())
        .retry_delay(Duration::from_millis(10))
        .ratelimit_handler(recorder.clone())
        .build();

    let words = client.get_random_words(2).await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(words, vec!["apple", "pear"]);
    assert_eq!(client.requests(), 3);
    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec!["/random/word".to_string(), "/random/word".to_string()]
    );
}

struct Sluggish;

#[async_trait]
impl RateLimitHandler for Sluggish {
    async fn on_ratelimit(&self, _endpoint: &str) {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
}

#[tokio::test]
async fn retries_do_not_wait_for_the_ratelimit_handler() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"words": ["w"]})))
        .mount(&server)
        .await;

    let client = Client::builder()
        .api_url(server.uri())
        .retry_delay(Duration::from_millis(10))
        .ratelimit_handler(Sluggish)
        .build();

    let started = Instant::now();
    let words = client.get_random_words(1).await.unwrap();

    assert_eq!(words, vec!["w"]);
    assert_eq!(client.requests(), 2);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"words": ["x"]})))
        .mount(&server)
        .await;

    let client = client(&server);
    let words = client.get_random_words(1).await.unwrap();

    assert_eq!(words, vec!["x"]);
    assert_eq!(client.requests(), 2);
}

#[tokio::test]
async fn bad_gateway_fails_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    // a retry would sleep for a full minute
    let client = Client::builder()
        .api_url(server.uri())
        .retry_delay(Duration::from_secs(60))
        .build();
    let err = client.get_random_words(1).await.unwrap_err();

    assert!(matches!(err, Error::ApiOffline(ref endpoint) if endpoint == "/random/word"));
    assert_eq!(client.requests(), 1);
}

#[tokio::test]
async fn unreachable_host_is_offline() {
    let client = Client::builder()
        .api_url("http://127.0.0.1:1")
        .retry_delay(Duration::from_secs(60))
        .build();
    let err = client.get_search_results("cats", 1).await.unwrap_err();

    assert!(matches!(err, Error::ApiOffline(ref endpoint) if endpoint == "/search"));
    assert_eq!(client.requests(), 1);
}

#[tokio::test]
async fn bad_requests_go_through_the_error_index() {
    let server = MockServer::start().await;
    Mock::given(path("/known"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Bad Thing"})))
        .mount(&server)
        .await;
    Mock::given(path("/unknown"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Other Thing"})))
        .mount(&server)
        .await;
    Mock::given(path("/bare"))
        .respond_with(ResponseTemplate::new(400).set_body_string("nope"))
        .mount(&server)
        .await;

    let client = client(&server);
    let route = |p: &str| {
        Route::new(Method::Post, format!("{}{p}", server.uri()))
            .on_error("Bad Thing", || Error::InvalidUrl("mapped".into()))
    };

    let err = client.http().request(&route("/known")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(ref u) if u == "mapped"));

    let err = client.http().request(&route("/unknown")).await.unwrap_err();
    assert!(matches!(err, Error::UnknownError(ref m) if m == "Other Thing"));

    let err = client.http().request(&route("/bare")).await.unwrap_err();
    assert!(matches!(err, Error::UnknownError(ref m) if m == "nope"));
}

#[tokio::test]
async fn in_band_errors_are_classified_like_http_ones() {
    let server = MockServer::start().await;
    Mock::given(path("/legacy"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status_code": 400, "error": "Bad Thing"})),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let route = Route::get(format!("{}/legacy", server.uri()))
        .on_error("Bad Thing", || Error::InvalidAuthorization);

    let err = client.http().request(&route).await.unwrap_err();
    assert!(matches!(err, Error::InvalidAuthorization));
}

#[tokio::test]
async fn unknown_status_codes_carry_the_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.get_search_results("cats", 1).await.unwrap_err();
    assert!(matches!(err, Error::UnknownStatusCode(404)));
}

#[tokio::test]
async fn missing_keys_are_unknown_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status_code": 200})))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.get_search_results("cats", 1).await.unwrap_err();
    assert!(matches!(err, Error::UnknownDataReturned(ref endpoint) if endpoint == "/search"));
}

#[tokio::test]
async fn same_route_twice_gives_independent_envelopes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let route = Route::get(format!("{}/n", server.uri()));
    let first = client.http().request(&route).await.unwrap();
    let second = client.http().request(&route).await.unwrap();

    assert_eq!(first.json(), second.json());
    assert_ne!(first.bytes().as_ptr(), second.bytes().as_ptr());
    assert_eq!(client.requests(), 2);
}

#[tokio::test]
async fn transport_is_created_lazily_and_reopened_after_close() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"words": []})))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(!client.http().is_open());

    client.get_random_words(0).await.unwrap();
    assert!(client.http().is_open());

    client.close();
    assert!(!client.http().is_open());

    client.get_random_words(0).await.unwrap();
    assert!(client.http().is_open());
    assert_eq!(client.requests(), 2);
}

#[tokio::test]
async fn concurrent_callers_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"words": ["w"]})))
        .expect(8)
        .mount(&server)
        .await;

    let client = Arc::new(client(&server));
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get_random_words(1).await })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), vec!["w"]);
    }

    assert_eq!(client.requests(), 8);
}

#[tokio::test]
async fn invalid_endpoints_fail_before_sending() {
    let client = Client::new();
    let err = client.http().request(&Route::get("relative/path")).await.unwrap_err();

    assert!(matches!(err, Error::InvalidEndpoint { .. }));
    assert_eq!(client.requests(), 0);
}
