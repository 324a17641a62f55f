use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sark_core::report::CrawlSummary;
use sark_core::{mutate, rank_words, render_wordlist};
use sark_scanner::Crawler;
use sark_scanner::crawler::ProgressCallback;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::info;
use url::Url;

pub fn print_banner() {
    eprintln!(
        "{}",
        r#"
                     _
     ___  __ _  _ __| | __
    / __|/ _` || '__| |/ /
    \__ \ (_| || |  |   <
    |___/\__,_||_|  |_|\_\
"#
        .bright_cyan()
        .bold()
    );
    eprintln!(
        "    {} {}",
        "wordlist harvester".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    eprintln!();
}

/// Normalize a seed argument: URLs pass through untouched, bare hosts get
/// an http:// scheme, anything else is rejected.
pub fn normalize_seed_url(raw: &str) -> Option<String> {
    if let Ok(url) = Url::parse(raw) {
        match url.scheme() {
            "http" | "https" => return url.host_str().is_some().then(|| raw.to_string()),
            // Parse fine but have nowhere to crawl.
            "mailto" | "tel" | "javascript" | "file" | "ftp" => return None,
            // Bare host:port parses as scheme:path; retry with a scheme.
            _ => {}
        }
    }

    let with_scheme = format!("http://{raw}");
    if let Ok(url) = Url::parse(&with_scheme)
        && url.host_str().is_some()
    {
        return Some(with_scheme);
    }

    None
}

pub async fn handle_harvest(sub_matches: &ArgMatches) -> Result<()> {
    let raw_url = sub_matches.get_one::<String>("url").unwrap();
    let min_length = *sub_matches.get_one::<usize>("min-length").unwrap();
    let depth = *sub_matches.get_one::<usize>("depth").unwrap();
    let limit = *sub_matches.get_one::<usize>("limit").unwrap();
    let threads = *sub_matches.get_one::<usize>("threads").unwrap();
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap();
    let output = sub_matches.get_one::<PathBuf>("output");
    let summary_json = sub_matches.get_one::<PathBuf>("summary-json");

    let seed_url = normalize_seed_url(raw_url)
        .ok_or_else(|| anyhow!("'{raw_url}' is not a crawlable URL"))?;

    if limit == 0 {
        bail!("--limit must be at least 1");
    }

    eprintln!(
        "{} {} (depth {}, {} workers)",
        "Harvesting".bright_cyan().bold(),
        seed_url,
        depth,
        threads
    );

    // Spinner fed by the crawler's progress callback, so reporting stays
    // out of the crawl loop itself.
    let spinner = Arc::new(ProgressBar::new_spinner());
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("Starting crawl...");

    let processed_count = Arc::new(AtomicUsize::new(0));
    let spinner_clone = spinner.clone();
    let count_clone = processed_count.clone();
    let progress_callback: ProgressCallback = Arc::new(move |_worker_id: usize, url: String| {
        let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
        spinner_clone.set_message(format!("Crawling... {count} pages fetched ({url})"));
        spinner_clone.tick();
    });

    let started_at = Utc::now();
    let start = Instant::now();

    let crawler = Crawler::with_timeout(timeout)
        .with_max_depth(depth)
        .with_progress_callback(progress_callback);

    let outcome = crawler.crawl(&seed_url, threads).await?;

    spinner.finish_and_clear();

    let ranked = rank_words(outcome.words.clone(), min_length);
    info!("ranked {} unique words", ranked.len());

    let summary = CrawlSummary::from_outcome(
        &seed_url,
        &outcome,
        ranked.len(),
        started_at,
        start.elapsed().as_millis() as u64,
    );

    let wordlist = render_wordlist(&ranked, limit);

    match output {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
            fs::write(Path::new(&expanded), &wordlist)
                .with_context(|| format!("failed to write wordlist to {expanded}"))?;
            eprintln!("{} Wordlist written to {}", "✓".green().bold(), expanded);
        }
        None => {
            print!("{wordlist}");
            io::stdout().flush()?;
        }
    }

    if let Some(path) = summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
    }

    print_summary(&summary);

    Ok(())
}

pub fn handle_mutate(sub_matches: &ArgMatches) {
    let word = sub_matches.get_one::<String>("word").unwrap();

    let mut mutations: Vec<String> = mutate(word).into_iter().collect();
    mutations.sort();
    for mutation in mutations {
        println!("{mutation}");
    }
}

fn print_summary(summary: &CrawlSummary) {
    eprintln!();
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
    eprintln!(
        "{} {} pages harvested, {} failed",
        "→".blue(),
        summary.pages_visited,
        summary.pages_failed
    );
    eprintln!(
        "{} {} words collected, {} unique after ranking",
        "→".blue(),
        summary.words_collected,
        summary.unique_words
    );
    eprintln!("{} finished in {} ms", "→".blue(), summary.elapsed_ms);
}
