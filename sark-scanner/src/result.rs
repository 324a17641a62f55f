use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single fetched (or attempted) page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVisit {
    pub url: String,
    pub depth: usize,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub response_time: Duration,
    pub words_found: usize,
    pub links_found: usize,
    pub error: Option<String>,
}

impl PageVisit {
    pub fn new(url: String, depth: usize) -> Self {
        Self {
            url,
            depth,
            status_code: 0,
            content_type: None,
            response_time: Duration::from_secs(0),
            words_found: 0,
            links_found: 0,
            error: None,
        }
    }

    pub fn with_error(url: String, depth: usize, error: String) -> Self {
        Self {
            url,
            depth,
            status_code: 0,
            content_type: None,
            response_time: Duration::from_secs(0),
            words_found: 0,
            links_found: 0,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a crawl produced: the raw word stream, in fetch order,
/// plus one visit record per attempted page.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    pub words: Vec<String>,
    pub visits: Vec<PageVisit>,
}

impl CrawlOutcome {
    pub fn pages_ok(&self) -> usize {
        self.visits.iter().filter(|v| v.is_ok()).count()
    }

    pub fn pages_failed(&self) -> usize {
        self.visits.len() - self.pages_ok()
    }
}
