pub mod mutate;
pub mod rank;
pub mod report;

pub use mutate::mutate;
pub use rank::{RankedWord, rank_words};
pub use report::{CrawlSummary, render_wordlist};
