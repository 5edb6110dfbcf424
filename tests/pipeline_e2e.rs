// tests/pipeline_e2e.rs
use std::sync::Arc;

use pricetrack::application::{JsonLinesSink, MemorySink, TrackingService};
use pricetrack::domain::alert::AlertType;
use pricetrack::shared::types::{Platform, TrendStatus};
use pricetrack::{RawProduct, TrackerConfig};

fn batch(json: &str) -> Vec<RawProduct> {
    serde_json::from_str(json).unwrap()
}

const FIRST_BATCH: &str = r#"[
    {"platform": "amazon", "asin": "B0IPHONE", "title": "SPONSORED iPhone 15 Pro 256GB",
     "price": "$999.00", "rating": "4.6", "reviews_count": "1,204", "availability": "In Stock",
     "url": "https://www.amazon.com/dp/B0IPHONE", "shipping": {"speed": "Prime delivery"}},
    {"platform": "ebay", "item_id": "3141", "title": "iPhone 15 Pro 256GB Natural",
     "price": "1,099.00", "currency": "eur", "availability": "Only 2 left - low stock",
     "sale_type": "buy_it_now", "seller": "phones4u"},
    {"platform": "walmart", "product_id": "W77", "title": "iPhone 15 Pro (Unlocked)",
     "price": 1049, "availability": "Out of stock"},
    {"platform": "etsy", "title": "N/A", "price": 5},
    {"title": "No platform at all", "price": 10}
]"#;

const SECOND_BATCH: &str = r#"[
    {"platform": "amazon", "asin": "B0IPHONE", "title": "iPhone 15 Pro 256GB",
     "price": "$899.00", "rating": 4.6, "reviews_count": 1300, "availability": "In Stock"},
    {"platform": "ebay", "item_id": "3141", "title": "iPhone 15 Pro 256GB Natural",
     "price": 1100.0, "currency": "EUR"}
]"#;

#[tokio::test]
async fn two_batches_flow_through_the_whole_pipeline() {
    let sink = Arc::new(MemorySink::new());
    let service = TrackingService::new(&TrackerConfig::default())
        .unwrap()
        .with_sink(sink.clone());
    service
        .create_alert("amazon_B0IPHONE", 950.0, AlertType::Below)
        .await;
    service
        .create_alert_from_str("ebay_3141:change:5")
        .await
        .unwrap();

    let first = service.process_batch(&batch(FIRST_BATCH)).await.unwrap();
    assert_eq!(first.products.len(), 3);

    let amazon = &first.products[0];
    assert_eq!(amazon.id, "amazon_B0IPHONE");
    assert_eq!(amazon.title, "iPhone 15 Pro 256GB");
    assert_eq!(amazon.price, 999.0);
    assert_eq!(amazon.currency, "USD");
    assert_eq!(amazon.reviews_count, 1204);
    assert_eq!(amazon.platform_specific["prime_eligible"], true);

    let ebay = &first.products[1];
    assert_eq!(ebay.price, 1099.0);
    assert_eq!(ebay.currency, "EUR");
    assert!(ebay.in_stock);

    let walmart = &first.products[2];
    assert!(!walmart.in_stock);

    let group = &first.comparison.product_comparisons[0];
    assert_eq!(group.cheapest.platform, Platform::Amazon);
    assert_eq!(group.most_expensive.platform, Platform::Ebay);
    assert_eq!(group.price_range, 100.0);
    assert!(first.triggered_alerts.is_empty());

    let second = service.process_batch(&batch(SECOND_BATCH)).await.unwrap();
    assert_eq!(second.price_changes.len(), 1);
    assert_eq!(second.price_changes[0].product_id, "amazon_B0IPHONE");
    assert_eq!(second.price_changes[0].percentage_change, -10.01);

    // ebay moved < 1%, so only the amazon alert fires
    assert_eq!(second.triggered_alerts.len(), 1);
    assert_eq!(second.triggered_alerts[0].product_id, "amazon_B0IPHONE");
    assert_eq!(service.pending_alerts().await.len(), 1);

    assert!(second.report.is_complete());
    assert_eq!(second.report.summary.total_products_analyzed, 5);
    assert_eq!(second.report.summary.total_platforms, 3);

    let trend = service.price_trend("amazon_B0IPHONE").await;
    assert_eq!(trend.trend, TrendStatus::Decreasing);

    assert_eq!(sink.products().await.len(), 5);
    assert_eq!(sink.reports().await.len(), 2);
}

#[tokio::test]
async fn config_file_and_json_lines_output() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("Config.toml");
    std::fs::write(
        &config_path,
        r#"
[filter]
platforms = ["ebay"]

[[alerts]]
product_id = "ebay_3141"
target_price = 1000.0
alert_type = "above"
"#,
    )
    .unwrap();

    let config = TrackerConfig::from_file(&config_path).unwrap();
    let output = dir.path().join("results.jsonl");
    let sink = JsonLinesSink::create(&output).await.unwrap();
    let service = TrackingService::new(&config)
        .unwrap()
        .with_sink(Arc::new(sink));

    let outcome = service.process_batch(&batch(FIRST_BATCH)).await.unwrap();
    assert_eq!(outcome.products.len(), 1);
    assert_eq!(outcome.products[0].platform, Platform::Ebay);
    assert_eq!(outcome.triggered_alerts.len(), 1);

    let written = std::fs::read_to_string(&output).unwrap();
    let kinds: Vec<String> = written
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["kind"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(kinds, vec!["product", "report"]);
}
