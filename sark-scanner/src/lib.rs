pub mod crawler;
pub mod error;
pub mod extract;
pub mod result;

pub use crawler::Crawler;
pub use error::ScanError;
pub use result::{CrawlOutcome, PageVisit};
