//! Single-URL ingestion and crawl-only reports

use crate::crawler::{CrawlOrchestrator, PendingStatus};
use crate::ingest::date::parse_press_date;
use crate::ingest::link_metadata;
use crate::model::{CrawlResult, LinkDescriptor, SelectionMethod};
use crate::storage::{DocumentStorage, NewCrawlDocument};
use crate::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request to crawl and persist one press release
#[derive(Debug, Clone, Deserialize)]
pub struct SingleRequest {
    pub url: String,
    pub ticker: String,
    pub title: String,
    /// ISO-8601 timestamp of the release
    pub press_ts: String,
    #[serde(default = "default_selection_method")]
    pub selection_method: SelectionMethod,
}

fn default_selection_method() -> SelectionMethod {
    SelectionMethod::Ui
}

/// Result of a single ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleOutcome {
    pub ok: bool,
    pub id: i64,
    pub url: String,
}

/// Crawls and stores one press release
///
/// The date is checked before anything is fetched.
///
/// # Errors
///
/// * `ValidationError::InvalidPressDate` - `press_ts` is not a valid date
/// * `FetchError` - the crawl failed; nothing was stored
/// * `StorageError` - the document could not be saved
pub async fn ingest_single(
    orchestrator: &CrawlOrchestrator,
    documents: &dyn DocumentStorage,
    request: &SingleRequest,
) -> crate::Result<SingleOutcome> {
    let press_ts = parse_press_date(&request.press_ts)
        .ok_or_else(|| ValidationError::InvalidPressDate(request.press_ts.clone()))?;

    let link = LinkDescriptor::single(request.url.clone(), request.selection_method);
    let (result, _) = orchestrator.crawl_link(&link).await?;

    let id = documents.save(NewCrawlDocument {
        ticker: request.ticker.clone(),
        title: request.title.clone(),
        press_release_timestamp: press_ts,
        raw_result: result,
        metadata: link_metadata(&link),
    })?;

    tracing::info!("Stored {} as document {}", request.url, id);
    Ok(SingleOutcome {
        ok: true,
        id,
        url: request.url.clone(),
    })
}

/// Where and how to persist a crawl report's result
pub struct ReportSave<'a> {
    pub documents: &'a dyn DocumentStorage,
    pub ticker: &'a str,
    pub title: &'a str,
    pub press_ts: Option<DateTime<Utc>>,
}

/// A crawl result together with its pending work
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlReport {
    pub crawl_result: CrawlResult,
    pub pending: PendingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_id: Option<i64>,
}

/// Crawls a link and reports the result, optionally persisting it
///
/// # Errors
///
/// * `FetchError` - the crawl failed
/// * `ValidationError::MissingPressDate` - saving was requested without a date
/// * `StorageError` - the document could not be saved
pub async fn crawl_report(
    orchestrator: &CrawlOrchestrator,
    link: &LinkDescriptor,
    save: Option<ReportSave<'_>>,
) -> crate::Result<CrawlReport> {
    let (crawl_result, pending) = orchestrator.crawl_link(link).await?;

    let stored_id = match save {
        Some(save) => {
            let press_ts = save.press_ts.ok_or_else(|| ValidationError::MissingPressDate {
                url: link.url().to_string(),
            })?;
            let id = save.documents.save(NewCrawlDocument {
                ticker: save.ticker.to_string(),
                title: save.title.to_string(),
                press_release_timestamp: press_ts,
                raw_result: crawl_result.clone(),
                metadata: link_metadata(link),
            })?;
            Some(id)
        }
        None => None,
    };

    Ok(CrawlReport {
        crawl_result,
        pending,
        stored_id,
    })
}
