//! Output hooks for normalized products and trend reports

use std::path::Path;
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::product::Product;
use crate::domain::trend::TrendReport;
use crate::shared::errors::AppError;

/// Receives pipeline output; storage is up to the implementation
#[async_trait::async_trait]
pub trait DataSink: Send + Sync {
    async fn push_product(&self, product: &Product) -> Result<(), AppError>;

    async fn push_report(&self, report: &TrendReport) -> Result<(), AppError>;
}

#[derive(Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
enum SinkRecord<'a> {
    Product(&'a Product),
    Report(&'a TrendReport),
}

/// Appends one JSON document per line
pub struct JsonLinesSink {
    file: Mutex<File>,
}

impl JsonLinesSink {
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;
        debug!("JSON lines sink opened: {}", path.as_ref().display());
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    async fn write_record(&self, record: SinkRecord<'_>) -> Result<(), AppError> {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DataSink for JsonLinesSink {
    async fn push_product(&self, product: &Product) -> Result<(), AppError> {
        self.write_record(SinkRecord::Product(product)).await
    }

    async fn push_report(&self, report: &TrendReport) -> Result<(), AppError> {
        self.write_record(SinkRecord::Report(report)).await
    }
}

/// Keeps everything in memory
#[derive(Default)]
pub struct MemorySink {
    products: Mutex<Vec<Product>>,
    reports: Mutex<Vec<TrendReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.products.lock().await.clone()
    }

    pub async fn reports(&self) -> Vec<TrendReport> {
        self.reports.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl DataSink for MemorySink {
    async fn push_product(&self, product: &Product) -> Result<(), AppError> {
        self.products.lock().await.push(product.clone());
        Ok(())
    }

    async fn push_report(&self, report: &TrendReport) -> Result<(), AppError> {
        self.reports.lock().await.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{Normalizer, RawProduct};
    use crate::domain::trend::TrendEngine;

    fn product() -> Product {
        Normalizer::default()
            .normalize_one(
                &RawProduct::new()
                    .with("title", "Sink Product")
                    .with("platform", "etsy")
                    .with("listing_id", "42")
                    .with("price", 12.5),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_lines_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        let sink = JsonLinesSink::create(&path).await.unwrap();
        sink.push_product(&product()).await.unwrap();
        let report = TrendEngine::default().analyze(&[product()]);
        sink.push_report(&report).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "product");
        assert_eq!(lines[0]["data"]["id"], "etsy_42");
        assert_eq!(lines[1]["kind"], "report");
        assert_eq!(lines[1]["data"]["analysis_period_days"], 7);
    }

    #[tokio::test]
    async fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.push_product(&product()).await.unwrap();
        assert_eq!(sink.products().await.len(), 1);
        assert!(sink.reports().await.is_empty());
    }
}
