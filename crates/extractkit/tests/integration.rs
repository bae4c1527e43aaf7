//! Integration tests for ExtractKit using wiremock

use extractkit::{
    to_csv_string, FieldSet, FieldSpec, Pipeline, StaticProvider, Strategy, FAILED_VALUE,
};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Ignored</title></head>
<body>
    <h1>Breaking News</h1>
    <span class="author">Jane Doe</span>
    <time datetime="2024-03-01">March 1st</time>
    <article>The full article body.</article>
</body>
</html>"#;

async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_extract_article_with_selectors() {
    let server = MockServer::start().await;
    mount_page(&server, "/post", ARTICLE_HTML).await;

    let pipeline = Pipeline::default();
    let result = pipeline.extract(&format!("{}/post", server.uri())).await;

    assert!(result.succeeded());
    assert_eq!(result.get("title").unwrap().as_str(), Some("Breaking News"));
    assert_eq!(result.get("author").unwrap().as_str(), Some("Jane Doe"));
    assert_eq!(result.get("date").unwrap().as_str(), Some("2024-03-01"));
    assert_eq!(
        result.get("content").unwrap().as_str(),
        Some("The full article body.")
    );

    let diagnostics = &result.diagnostics;
    assert!(diagnostics.success);
    assert!(diagnostics.errors.is_empty());
    assert!(diagnostics.content_length > 0);
    assert!(diagnostics.total_ms >= diagnostics.fetch_ms);
    assert!(chrono::DateTime::parse_from_rfc3339(&diagnostics.timestamp).is_ok());
}

#[tokio::test]
async fn test_selector_fallback_chain_is_used() {
    let server = MockServer::start().await;
    // No h1; the second candidate in the title chain must fire.
    mount_page(
        &server,
        "/fallback",
        r#"<html><body><div class="title">Fallback Title</div></body></html>"#,
    )
    .await;

    let pipeline = Pipeline::default();
    let result = pipeline.extract(&format!("{}/fallback", server.uri())).await;

    assert_eq!(
        result.get("title").unwrap().as_str(),
        Some("Fallback Title")
    );
}

#[tokio::test]
async fn test_optional_fields_absent_required_sentinel() {
    let server = MockServer::start().await;
    mount_page(&server, "/bare", "<html><body><p>nothing</p></body></html>").await;

    let pipeline = Pipeline::default();
    let result = pipeline.extract(&format!("{}/bare", server.uri())).await;

    // Bare page still succeeds; required fields carry the unknown sentinel,
    // optional fields are simply not there.
    assert!(result.succeeded());
    assert_eq!(result.get("title").unwrap().as_str(), Some("unknown"));
    assert!(result.get("author").is_none());
}

#[tokio::test]
async fn test_http_failure_becomes_failed_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pipeline = Pipeline::default();
    let result = pipeline.extract(&format!("{}/gone", server.uri())).await;

    assert!(!result.succeeded());
    assert_eq!(result.get("title").unwrap().as_str(), Some(FAILED_VALUE));
    assert!(result.get("author").is_none());
    assert!(result.diagnostics.errors[0].contains("404"));
    assert_eq!(result.diagnostics.content_length, 0);
}

#[tokio::test]
async fn test_fetch_timeout_becomes_failed_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let pipeline = Pipeline::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let result = pipeline.extract(&format!("{}/slow", server.uri())).await;

    assert!(!result.succeeded());
    assert!(result.diagnostics.errors[0].contains("timed out"));
}

#[tokio::test]
async fn test_batch_keeps_order_and_counts_failures() {
    let server = MockServer::start().await;
    mount_page(&server, "/one", "<html><body><h1>One</h1></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/three", "<html><body><h1>Three</h1></body></html>").await;

    let urls: Vec<String> = ["one", "two", "three"]
        .iter()
        .map(|route| format!("{}/{route}", server.uri()))
        .collect();

    let pipeline = Pipeline::default();
    let batch = pipeline.run_batch(&urls).await;

    assert_eq!(batch.len(), 3);
    let ordered: Vec<&str> = batch.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(ordered, urls.iter().map(String::as_str).collect::<Vec<_>>());

    assert!(batch.results()[0].succeeded());
    assert!(!batch.results()[1].succeeded());
    assert!(batch.results()[2].succeeded());

    let summary = batch.summary();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.total, 3);
}

#[tokio::test]
async fn test_parallel_batch_preserves_input_order() {
    let server = MockServer::start().await;
    for (route, delay_ms) in [("a", 300u64), ("b", 50), ("c", 150)] {
        Mock::given(method("GET"))
            .and(path(format!("/{route}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        format!("<html><body><h1>{route}</h1></body></html>"),
                        "text/html",
                    )
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&server)
            .await;
    }

    let urls: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|route| format!("{}/{route}", server.uri()))
        .collect();

    let pipeline = Pipeline::builder().concurrency(3).build();
    let batch = pipeline.run_batch(&urls).await;

    // "a" completes last but must still come first.
    let titles: Vec<&str> = batch
        .iter()
        .map(|r| r.get("title").and_then(|v| v.as_str()).unwrap())
        .collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
    assert_eq!(batch.summary().succeeded, 3);
}

#[tokio::test]
async fn test_custom_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "SurveyBot/2.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><h1>Agreed</h1></body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let pipeline = Pipeline::builder().user_agent("SurveyBot/2.0").build();
    let result = pipeline.extract(&format!("{}/ua", server.uri())).await;

    assert!(result.succeeded());
    assert_eq!(result.get("title").unwrap().as_str(), Some("Agreed"));
}

#[tokio::test]
async fn test_inference_strategy_enforces_schema() {
    let server = MockServer::start().await;
    mount_page(&server, "/inferred", ARTICLE_HTML).await;

    let provider = StaticProvider::new(serde_json::json!({
        "title": "Model Title",
        "summary": "Model summary",
        "extra_field": "fabricated"
    }));
    let schema = FieldSet::new()
        .field(FieldSpec::new("title").required())
        .field(FieldSpec::new("summary"));

    let pipeline = Pipeline::builder()
        .strategy(Strategy::Inference)
        .provider(provider)
        .schema(schema)
        .build();

    let result = pipeline.extract(&format!("{}/inferred", server.uri())).await;

    assert!(result.succeeded());
    assert_eq!(result.get("title").unwrap().as_str(), Some("Model Title"));
    assert_eq!(
        result.get("summary").unwrap().as_str(),
        Some("Model summary")
    );
    assert!(result.get("extra_field").is_none());
}

#[tokio::test]
async fn test_inference_truncation_is_noted_not_fatal() {
    let server = MockServer::start().await;
    let long_body = format!(
        "<html><body><h1>Big</h1><p>{}</p></body></html>",
        "x".repeat(2_000)
    );
    mount_page(&server, "/big", &long_body).await;

    let pipeline = Pipeline::builder()
        .strategy(Strategy::Inference)
        .provider(StaticProvider::new(serde_json::json!({"title": "Big"})))
        .schema(FieldSet::new().field(FieldSpec::new("title").required()))
        .content_budget(500)
        .build();

    let result = pipeline.extract(&format!("{}/big", server.uri())).await;

    assert!(result.succeeded());
    assert_eq!(result.diagnostics.errors.len(), 1);
    assert!(result.diagnostics.errors[0].contains("truncated"));
    assert!(result.diagnostics.errors[0].contains("500"));
}

#[tokio::test]
async fn test_locator_config_drives_extraction() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/product",
        r#"<html><body>
            <span class="name">Widget</span>
            <span class="unit-price">€1.50/kg</span>
            <img class="photo" src="/widget.png">
        </body></html>"#,
    )
    .await;

    let schema: FieldSet = serde_json::from_str(
        r#"{"fields": [
            {"name": "name", "required": true,
             "locator": [{"text": {"selector": ".name"}}]},
            {"name": "price",
             "locator": [{"text": {"selector": ".price"}},
                         {"text": {"selector": ".unit-price"}}]},
            {"name": "photo",
             "locator": [{"attr": {"selector": "img.photo", "attr": "src"}}]}
        ]}"#,
    )
    .unwrap();

    let pipeline = Pipeline::builder().schema(schema).build();
    let result = pipeline.extract(&format!("{}/product", server.uri())).await;

    assert!(result.succeeded());
    assert_eq!(result.get("name").unwrap().as_str(), Some("Widget"));
    assert_eq!(result.get("price").unwrap().as_str(), Some("€1.50/kg"));
    assert_eq!(result.get("photo").unwrap().as_str(), Some("/widget.png"));
}

#[tokio::test]
async fn test_batch_results_export_to_csv() {
    let server = MockServer::start().await;
    mount_page(&server, "/ok", ARTICLE_HTML).await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/ok", server.uri()),
        format!("{}/bad", server.uri()),
    ];
    let pipeline = Pipeline::default();
    let batch = pipeline.run_batch(&urls).await;

    let csv = to_csv_string(batch.results());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "url,title,content,author,date,success");
    assert!(lines[1].contains("Breaking News"));
    assert!(lines[1].ends_with("true"));
    assert!(lines[2].ends_with("false"));
}
