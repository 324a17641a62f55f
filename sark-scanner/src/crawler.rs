use crate::error::{Result, ScanError};
use crate::extract::{PageContent, extract_page};
use crate::result::{CrawlOutcome, PageVisit};
use futures::future::join_all;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

const DEFAULT_USER_AGENT: &str = "Sark/0.2 (https://github.com/trapdoorsec/sark)";

/// Breadth-first, origin-scoped crawler that aggregates the visible words
/// of every page it reaches. Fetching stops at `max_depth` link-hops from
/// the seed; the seed itself is depth 0.
pub struct Crawler {
    client: Client,
    visited: Arc<Mutex<HashSet<String>>>,
    words: Arc<Mutex<Vec<String>>>,
    visits: Arc<Mutex<Vec<PageVisit>>>,
    max_depth: usize,
    progress_callback: Option<ProgressCallback>,
    timeout_secs: u64,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            client: Self::build_client(timeout_secs, DEFAULT_USER_AGENT),
            visited: Arc::new(Mutex::new(HashSet::new())),
            words: Arc::new(Mutex::new(Vec::new())),
            visits: Arc::new(Mutex::new(Vec::new())),
            max_depth: 0,
            progress_callback: None,
            timeout_secs,
        }
    }

    fn build_client(timeout_secs: u64, user_agent: &str) -> Client {
        Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client")
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.client = Self::build_client(self.timeout_secs, user_agent);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl outward from `seed_url` and return the aggregate word stream
    /// plus a visit record per attempted page. An unparseable seed is the
    /// only fatal error; per-page failures are recorded and skipped.
    pub async fn crawl(&self, seed_url: &str, workers: usize) -> Result<CrawlOutcome> {
        let workers = workers.max(1);
        info!(
            "Starting word harvest of {} with {} workers, max depth {}",
            seed_url, workers, self.max_depth
        );

        Url::parse(seed_url).map_err(|e| ScanError::InvalidSeed(format!("{seed_url}: {e}")))?;

        // Claimed-at-enqueue: membership here means the URL is queued or
        // already fetched, so no URL is ever fetched twice.
        {
            let mut visited = self.visited.lock().await;
            visited.insert(seed_url.to_string());
        }

        // Worker-owned queues, new links distributed round-robin.
        let worker_queues: Arc<Vec<Mutex<VecDeque<(String, usize)>>>> =
            Arc::new((0..workers).map(|_| Mutex::new(VecDeque::new())).collect());

        {
            let mut queue = worker_queues[0].lock().await;
            queue.push_back((seed_url.to_string(), 0));
        }

        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let client = self.client.clone();
            let progress_cb = self.progress_callback.clone();
            let max_depth = self.max_depth;
            let visited = self.visited.clone();
            let words = self.words.clone();
            let visits = self.visits.clone();
            let worker_queues = worker_queues.clone();
            let in_flight = in_flight.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);

                loop {
                    let work_item = {
                        let mut queue = worker_queues[worker_id].lock().await;
                        let item = queue.pop_front();
                        if item.is_some() {
                            in_flight.fetch_add(1, Ordering::SeqCst);
                        }
                        item
                    };

                    let Some((url, depth)) = work_item else {
                        if Self::pool_is_idle(&worker_queues, &in_flight).await {
                            debug!("Worker {} exiting, pool is idle", worker_id);
                            break;
                        }
                        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                        continue;
                    };

                    // Enqueue-time gating keeps depth within bounds already;
                    // this guard just enforces the invariant.
                    if depth <= max_depth {
                        if let Some(ref callback) = progress_cb {
                            callback(worker_id, url.clone());
                        }

                        match Self::fetch_page_static(&client, &url, depth).await {
                            Ok((visit, page)) => {
                                {
                                    let mut words_lock = words.lock().await;
                                    words_lock.extend(page.words);
                                }
                                {
                                    let mut visits_lock = visits.lock().await;
                                    visits_lock.push(visit);
                                }

                                if depth < max_depth {
                                    let mut target_worker = worker_id;
                                    for link in page.links {
                                        let newly_claimed = {
                                            let mut visited_lock = visited.lock().await;
                                            visited_lock.insert(link.clone())
                                        };

                                        if newly_claimed {
                                            debug!(
                                                "[Worker {}] queuing {} at depth {}",
                                                worker_id,
                                                link,
                                                depth + 1
                                            );
                                            let mut queue =
                                                worker_queues[target_worker].lock().await;
                                            queue.push_back((link, depth + 1));
                                            drop(queue);

                                            target_worker =
                                                (target_worker + 1) % worker_queues.len();
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                warn!("Failed to harvest {}: {}", url, e);
                                let mut visits_lock = visits.lock().await;
                                visits_lock.push(PageVisit::with_error(url, depth, e.to_string()));
                            }
                        }
                    }

                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        for joined in join_all(worker_handles).await {
            joined?;
        }

        // The token stream transfers ownership to the caller; the crawler
        // is clean for another run.
        let words = std::mem::take(&mut *self.words.lock().await);
        let visits = std::mem::take(&mut *self.visits.lock().await);

        info!(
            "Harvest complete: {} words across {} pages ({} failed)",
            words.len(),
            visits.len(),
            visits.iter().filter(|v| !v.is_ok()).count()
        );

        Ok(CrawlOutcome { words, visits })
    }

    /// The pool is idle only if every queue is empty and no fetch is in
    /// flight. An in-flight worker may still push tasks, so the queues
    /// must read empty again after the in-flight count reads zero.
    async fn pool_is_idle(
        worker_queues: &Arc<Vec<Mutex<VecDeque<(String, usize)>>>>,
        in_flight: &Arc<AtomicUsize>,
    ) -> bool {
        if !Self::all_queues_empty(worker_queues).await {
            return false;
        }
        if in_flight.load(Ordering::SeqCst) != 0 {
            return false;
        }
        Self::all_queues_empty(worker_queues).await
    }

    async fn all_queues_empty(worker_queues: &Arc<Vec<Mutex<VecDeque<(String, usize)>>>>) -> bool {
        for queue in worker_queues.iter() {
            if !queue.lock().await.is_empty() {
                return false;
            }
        }
        true
    }

    /// Fetch one page and run extraction. Any non-success status is a
    /// fetch failure, never content.
    async fn fetch_page_static(
        client: &Client,
        url: &str,
        depth: usize,
    ) -> Result<(PageVisit, PageContent)> {
        debug!("Fetching {} (depth {})", url, depth);

        let start = Instant::now();
        let response = client.get(url).send().await?;
        let response_time = start.elapsed();

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if !status.is_success() {
            return Err(ScanError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;

        let mut visit = PageVisit::new(url.to_string(), depth);
        visit.status_code = status.as_u16();
        visit.content_type = content_type.clone();
        visit.response_time = response_time;

        // Only HTML is worth tokenizing; everything else still counts as
        // a visit.
        let is_html = content_type
            .as_ref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let page = if is_html {
            extract_page(&body, url)
        } else {
            PageContent::default()
        };

        visit.words_found = page.words.len();
        visit.links_found = page.links.len();

        Ok((visit, page))
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn mount_html(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(body.into_bytes()),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn harvests_words_from_linked_pages() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/",
            format!(
                r#"<html><body>alpha
                    <a href="{0}/one">one</a>
                    <a href="{0}/two">two</a>
                </body></html>"#,
                server.uri()
            ),
        )
        .await;
        mount_html(&server, "/one", "<html><body>bravo</body></html>".into()).await;
        mount_html(&server, "/two", "<html><body>charlie</body></html>".into()).await;

        let crawler = Crawler::new().with_max_depth(1);
        let outcome = crawler.crawl(&server.uri(), 2).await.unwrap();

        assert_eq!(outcome.visits.len(), 3);
        for expected in ["alpha", "bravo", "charlie"] {
            assert!(
                outcome.words.iter().any(|w| w == expected),
                "missing word {expected:?} in {:?}",
                outcome.words
            );
        }
    }

    #[tokio::test]
    async fn depth_zero_visits_only_the_seed() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/",
            format!(
                r#"<html><body>root <a href="{}/deeper">deeper</a></body></html>"#,
                server.uri()
            ),
        )
        .await;
        mount_html(&server, "/deeper", "<html><body>unreached</body></html>".into()).await;

        let crawler = Crawler::new().with_max_depth(0);
        let outcome = crawler.crawl(&server.uri(), 4).await.unwrap();

        assert_eq!(outcome.visits.len(), 1);
        assert_eq!(outcome.words, vec!["root", "deeper"]);
    }

    #[tokio::test]
    async fn page_reachable_twice_is_fetched_once() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/",
            format!(
                r#"<html><body><a href="{0}/a">a</a><a href="{0}/b">b</a></body></html>"#,
                server.uri()
            ),
        )
        .await;
        mount_html(
            &server,
            "/a",
            format!(
                r#"<html><body><a href="{}/shared">shared</a></body></html>"#,
                server.uri()
            ),
        )
        .await;
        mount_html(
            &server,
            "/b",
            format!(
                r#"<html><body><a href="{}/shared">shared</a></body></html>"#,
                server.uri()
            ),
        )
        .await;
        mount_html(&server, "/shared", "<html><body>once</body></html>".into()).await;

        let crawler = Crawler::new().with_max_depth(2);
        let outcome = crawler.crawl(&server.uri(), 3).await.unwrap();

        let shared_visits = outcome
            .visits
            .iter()
            .filter(|v| v.url.ends_with("/shared"))
            .count();
        assert_eq!(shared_visits, 1);
        assert_eq!(outcome.words.iter().filter(|w| *w == "once").count(), 1);
    }

    #[tokio::test]
    async fn failed_page_is_skipped_not_fatal() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/",
            format!(
                r#"<html><body><a href="{0}/missing">x</a><a href="{0}/ok">y</a></body></html>"#,
                server.uri()
            ),
        )
        .await;
        // /missing has no mock, so the server answers 404.
        mount_html(&server, "/ok", "<html><body>survivor</body></html>".into()).await;

        let crawler = Crawler::new().with_max_depth(1);
        let outcome = crawler.crawl(&server.uri(), 2).await.unwrap();

        assert_eq!(outcome.pages_failed(), 1);
        assert!(outcome.words.iter().any(|w| w == "survivor"));

        let failed = outcome.visits.iter().find(|v| !v.is_ok()).unwrap();
        assert!(failed.url.ends_with("/missing"));
        assert!(failed.error.as_deref().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn cross_origin_links_are_never_followed() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/",
            r#"<html><body>home
                <a href="http://definitely-elsewhere.invalid/loot">out</a>
            </body></html>"#
                .into(),
        )
        .await;

        let crawler = Crawler::new().with_max_depth(3);
        let outcome = crawler.crawl(&server.uri(), 2).await.unwrap();

        assert_eq!(outcome.visits.len(), 1);
        assert!(outcome.visits[0].url.starts_with(&server.uri()));
    }

    #[tokio::test]
    async fn invalid_seed_is_fatal() {
        let crawler = Crawler::new();
        let err = crawler.crawl("not a url", 1).await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidSeed(_)));
    }

    #[tokio::test]
    async fn progress_callback_sees_every_page() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/",
            format!(
                r#"<html><body><a href="{}/next">next</a></body></html>"#,
                server.uri()
            ),
        )
        .await;
        mount_html(&server, "/next", "<html><body>end</body></html>".into()).await;

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let crawler = Crawler::new()
            .with_max_depth(1)
            .with_progress_callback(Arc::new(move |_worker_id, url| {
                seen_clone.lock().unwrap().push(url);
            }));

        crawler.crawl(&server.uri(), 2).await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
