//! Example: extract article records from a few URLs
//!
//! Run with: cargo run -p extractkit --example extract_urls
//!
//! Demonstrates the default article pipeline and the batch summary.

use extractkit::{Pipeline, Value};

/// URLs worth trying the default article field set against
const URLS: &[&str] = &[
    "https://example.com",
    "https://httpbin.org/html",
    "https://www.rust-lang.org",
];

#[tokio::main]
async fn main() {
    let urls: Vec<String> = URLS.iter().map(|url| url.to_string()).collect();

    let pipeline = Pipeline::builder().concurrency(2).build();
    let batch = pipeline.run_batch(&urls).await;

    for result in batch.iter() {
        println!("{}", result.url);
        println!("  success: {}", result.succeeded());
        for (name, value) in result.fields.iter() {
            println!("  {name}: {}", preview(value));
        }
        println!(
            "  fetch {}ms, structure {}ms",
            result.diagnostics.fetch_ms, result.diagnostics.structure_ms
        );
        for error in &result.diagnostics.errors {
            println!("  error: {error}");
        }
        println!();
    }

    println!("{}", batch.summary());
}

fn preview(value: &Value) -> String {
    let text = match value.as_str() {
        Some(text) => text.to_string(),
        None => serde_json::to_string(value).unwrap_or_default(),
    };
    let short: String = text.chars().take(80).collect();
    if short.len() < text.len() {
        format!("{short}...")
    } else {
        short
    }
}
