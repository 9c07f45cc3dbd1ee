//! Integration tests for bulk ingestion
//!
//! A scripted fetcher stands in for the network; documents go to an
//! in-memory SQLite pool.

use async_trait::async_trait;
use press_ingest::crawler::{FetchResponse, FetchedLinks, Fetcher, RawLink};
use press_ingest::storage::{
    DocumentStorage, DocumentStore, NewCrawlDocument, StorageError, StorageResult,
    StoredCrawlDocument,
};
use press_ingest::{BulkRunner, ConnectionPool, CrawlOrchestrator, IngestError, Table, ValidationError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fetcher with per-URL failures and delays that records every call
#[derive(Default)]
struct ScriptedFetcher {
    failures: HashMap<String, String>,
    delays_ms: HashMap<String, u64>,
    calls: AtomicUsize,
    order: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn failing(mut self, url: &str, message: &str) -> Self {
        self.failures.insert(url.to_string(), message.to_string());
        self
    }

    fn delayed(mut self, url: &str, ms: u64) -> Self {
        self.delays_ms.insert(url.to_string(), ms);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ms) = self.delays_ms.get(url) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        self.order.lock().unwrap().push(url.to_string());

        if let Some(message) = self.failures.get(url) {
            return FetchResponse::failure(url, message.clone());
        }

        FetchResponse {
            success: true,
            final_url: url.to_string(),
            error_message: None,
            raw_markdown: format!("# Release at {}", url),
            filtered_markdown: None,
            links: FetchedLinks {
                internal: vec![RawLink::new(format!("{}/release.pdf", url), "PDF", "")],
                external: vec![],
            },
        }
    }
}

/// Document store whose `save` fails on the given call
struct FailingStore {
    fail_on: usize,
    saves: AtomicUsize,
}

impl DocumentStorage for FailingStore {
    fn save(&self, _doc: NewCrawlDocument) -> StorageResult<i64> {
        let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(n as i64)
    }

    fn list_by_ticker(&self, _ticker: &str) -> StorageResult<Vec<StoredCrawlDocument>> {
        Ok(Vec::new())
    }

    fn get_by_id(&self, _id: i64) -> StorageResult<Option<StoredCrawlDocument>> {
        Ok(None)
    }
}

fn csv_table(data: &str) -> Table {
    Table::from_csv_reader(data.as_bytes()).unwrap()
}

const THREE_ROWS: &str = "\
url,ticker,title,date
https://a.com/1,ACME,First,2024-01-10
https://a.com/2,ACME,Second,2024-02-10
https://a.com/3,ACME,Third,2024-03-10T08:00:00Z
";

#[tokio::test]
async fn test_failed_fetch_does_not_stop_batch() {
    let fetcher = Arc::new(ScriptedFetcher::default().failing("https://a.com/2", "HTTP 500"));
    let orchestrator = CrawlOrchestrator::new(fetcher.clone());
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    let report = BulkRunner::new(&orchestrator, &documents)
        .run(&csv_table(THREE_ROWS))
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    let urls: Vec<_> = report.outcomes.iter().map(|o| o.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.com/1", "https://a.com/2", "https://a.com/3"]);

    assert!(report.outcomes[0].ok);
    assert!(!report.outcomes[1].ok);
    assert!(report.outcomes[1].error.as_deref().unwrap().contains("HTTP 500"));
    assert_eq!(report.outcomes[1].stored_id, None);
    assert!(report.outcomes[2].ok);

    assert_eq!(fetcher.calls(), 3);
    assert_eq!(report.stored(), 2);

    let listed = documents.list_by_ticker("acme").unwrap();
    let titles: Vec<_> = listed.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "First"]);
}

#[tokio::test]
async fn test_missing_title_column_fails_before_any_fetch() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let orchestrator = CrawlOrchestrator::new(fetcher.clone());
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    let table = csv_table("url,ticker,date\nhttps://a.com/1,ACME,2024-01-10\n");
    let err = BulkRunner::new(&orchestrator, &documents)
        .run(&table)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Validation(ValidationError::MissingColumn { field: "title", .. })
    ));
    assert_eq!(fetcher.calls(), 0);
    assert!(documents.list_by_ticker("ACME").unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_date_column_is_structural() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let orchestrator = CrawlOrchestrator::new(fetcher.clone());
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    let table = csv_table("Link,Symbol,Title\nhttps://a.com/1,ACME,First\n");
    let err = BulkRunner::new(&orchestrator, &documents)
        .run(&table)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Validation(ValidationError::MissingColumn { field: "date", .. })
    ));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_rows_run_one_at_a_time_by_default() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .delayed("https://a.com/1", 40)
            .delayed("https://a.com/2", 20),
    );
    let orchestrator = CrawlOrchestrator::new(fetcher.clone());
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    BulkRunner::new(&orchestrator, &documents)
        .run(&csv_table(THREE_ROWS))
        .await
        .unwrap();

    let order = fetcher.order.lock().unwrap().clone();
    assert_eq!(order, vec!["https://a.com/1", "https://a.com/2", "https://a.com/3"]);
}

#[tokio::test]
async fn test_concurrent_rows_keep_input_order() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .delayed("https://a.com/1", 80)
            .delayed("https://a.com/2", 40)
            .failing("https://a.com/2", "Request timeout"),
    );
    let orchestrator = CrawlOrchestrator::new(fetcher.clone());
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    let report = BulkRunner::new(&orchestrator, &documents)
        .with_max_concurrent_rows(3)
        .run(&csv_table(THREE_ROWS))
        .await
        .unwrap();

    let completed = fetcher.order.lock().unwrap().clone();
    assert_eq!(completed[0], "https://a.com/3");

    let rows: Vec<_> = report.outcomes.iter().map(|o| o.row).collect();
    assert_eq!(rows, vec![1, 2, 3]);
    assert!(report.outcomes[0].ok);
    assert!(!report.outcomes[1].ok);
    assert!(report.outcomes[2].ok);
}

#[tokio::test]
async fn test_skipped_rows_are_reported_separately() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let orchestrator = CrawlOrchestrator::new(fetcher.clone());
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    let table = csv_table(
        "url,symbol,title,press_ts\n\
         ,ACME,No url,2024-01-01\n\
         https://a.com/2,ACME,,2024-01-01\n\
         https://a.com/3,,Crawl only,\n\
         https://a.com/4,ACME,Undated,\n",
    );
    let report = BulkRunner::new(&orchestrator, &documents)
        .run(&table)
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.outcomes.len(), 2);

    let crawl_only = &report.outcomes[0];
    assert_eq!((crawl_only.row, crawl_only.ok, crawl_only.stored_id), (3, true, None));

    let undated = &report.outcomes[1];
    assert_eq!(undated.row, 4);
    assert!(!undated.ok);
    assert!(documents.list_by_ticker("ACME").unwrap().is_empty());
}

#[tokio::test]
async fn test_stored_document_carries_attachments() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let orchestrator = CrawlOrchestrator::new(fetcher);
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    let report = BulkRunner::new(&orchestrator, &documents)
        .run(&csv_table("url,ticker,title,date\nhttps://a.com/1,acme,First,2024-01-10\n"))
        .await
        .unwrap();

    let id = report.outcomes[0].stored_id.unwrap();
    let doc = documents.get_by_id(id).unwrap().unwrap();
    let raw = doc.raw_result.unwrap();

    assert_eq!(doc.source_url, "https://a.com/1");
    assert_eq!(raw.main_content, raw.markdown_content);
    assert_eq!(raw.attachment_links_by_url.len(), 1);
    assert_eq!(doc.metadata["selection_method"], "bulk");
}

#[tokio::test]
async fn test_storage_failure_aborts_batch() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let orchestrator = CrawlOrchestrator::new(fetcher.clone());
    let documents = FailingStore {
        fail_on: 2,
        saves: AtomicUsize::new(0),
    };

    let err = BulkRunner::new(&orchestrator, &documents)
        .run(&csv_table(THREE_ROWS))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Storage(StorageError::Io(_))));
    assert_eq!(documents.saves.load(Ordering::SeqCst), 2);
    assert_eq!(fetcher.calls(), 2);
    let fetched = fetcher.order.lock().unwrap().clone();
    assert_eq!(fetched, vec!["https://a.com/1", "https://a.com/2"]);
}

#[tokio::test]
async fn test_outcome_ticker_is_canonical() {
    let orchestrator = CrawlOrchestrator::new(Arc::new(ScriptedFetcher::default()));
    let documents = DocumentStore::new(Arc::new(ConnectionPool::in_memory()));

    let report = BulkRunner::new(&orchestrator, &documents)
        .run(&csv_table("url,ticker,title,date\nhttps://a.com/1, acme ,First,2024-01-10T14:30Z\n"))
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].ticker.as_deref(), Some("ACME"));
    assert!(report.outcomes[0].stored_id.is_some());
}
