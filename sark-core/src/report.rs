use crate::mutate::mutate;
use crate::rank::RankedWord;
use chrono::{DateTime, Utc};
use sark_scanner::CrawlOutcome;
use serde::{Deserialize, Serialize};
use url::Url;

/// Render the output wordlist: for each of the top `limit` ranked words,
/// the word itself, then its mutations one per line in lexicographic
/// order, then a blank separator line. This is the whole output
/// contract; where the lines end up (console, file) is the caller's
/// business.
pub fn render_wordlist(ranked: &[RankedWord], limit: usize) -> String {
    let mut out = String::new();

    for entry in ranked.iter().take(limit) {
        out.push_str(&entry.word);
        out.push('\n');

        let mut mutations: Vec<String> = mutate(&entry.word).into_iter().collect();
        mutations.sort();
        for mutation in mutations {
            out.push_str(&mutation);
            out.push('\n');
        }

        out.push('\n');
    }

    out
}

/// Statistics for one harvest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub seed: String,
    pub target_host: Option<String>,
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub words_collected: usize,
    pub unique_words: usize,
    pub started_at: String,
    pub elapsed_ms: u64,
}

impl CrawlSummary {
    pub fn from_outcome(
        seed: &str,
        outcome: &CrawlOutcome,
        unique_words: usize,
        started_at: DateTime<Utc>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            seed: seed.to_string(),
            target_host: Url::parse(seed)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string)),
            pages_visited: outcome.pages_ok(),
            pages_failed: outcome.pages_failed(),
            words_collected: outcome.words.len(),
            unique_words,
            started_at: started_at.to_rfc3339(),
            elapsed_ms,
        }
    }
}
