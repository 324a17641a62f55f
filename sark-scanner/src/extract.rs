use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// What one page yields: its visible words in document order, and the
/// same-origin link targets it points at.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub words: Vec<String>,
    pub links: HashSet<String>,
}

/// Extract words and same-origin links from raw HTML. Never fails:
/// markup the parser cannot make sense of simply yields less.
pub fn extract_page(html: &str, page_url: &str) -> PageContent {
    let document = Html::parse_document(html);

    let words = visible_words(&document);
    let links = match Url::parse(page_url) {
        Ok(base) => same_origin_links(&document, &base),
        Err(_) => HashSet::new(),
    };

    PageContent { words, links }
}

/// Word-character runs from every text node, skipping text that only a
/// browser engine would see.
fn visible_words(document: &Html) -> Vec<String> {
    let mut words = Vec::new();

    for node in document.tree.nodes() {
        if let Some(text) = node.value().as_text()
            && let Some(parent) = node.parent()
            && let Some(element) = parent.value().as_element()
            && !matches!(element.name(), "script" | "style" | "noscript")
        {
            for m in WORD_RE.find_iter(text) {
                words.push(m.as_str().to_string());
            }
        }
    }

    words
}

fn same_origin_links(document: &Html, base: &Url) -> HashSet<String> {
    let link_selector = Selector::parse("a[href]").unwrap();
    let mut links = HashSet::new();

    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(resolved) = resolve_href(base, href)
        {
            if is_same_origin(&resolved, base) {
                links.insert(resolved.to_string());
            }
        }
    }

    links
}

/// Resolve an href against the page it appeared on. Non-navigational
/// targets and unparseable URLs resolve to nothing.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved)
}

/// Scheme + host + port equality. A wordlist for one target should not
/// ingest sibling subdomains.
pub fn is_same_origin(candidate: &Url, base: &Url) -> bool {
    candidate.scheme() == base.scheme()
        && candidate.host_str() == base.host_str()
        && candidate.port_or_known_default() == base.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_in_document_order() {
        let html = "<html><body><h1>Acme Widgets</h1><p>quality widgets since 1987</p></body></html>";
        let page = extract_page(html, "http://acme.test/");
        assert_eq!(
            page.words,
            vec!["Acme", "Widgets", "quality", "widgets", "since", "1987"]
        );
    }

    #[test]
    fn script_and_style_text_is_invisible() {
        let html = r#"<html><head>
            <style>body { color: hotpink; }</style>
            <script>var secret = "donotharvest";</script>
        </head><body>visible</body></html>"#;
        let page = extract_page(html, "http://acme.test/");
        assert_eq!(page.words, vec!["visible"]);
    }

    #[test]
    fn underscores_stay_inside_words() {
        let page = extract_page("<p>admin_panel v2</p>", "http://acme.test/");
        assert_eq!(page.words, vec!["admin_panel", "v2"]);
    }

    #[test]
    fn relative_links_resolve_against_page() {
        let html = r#"<a href="/about">About</a><a href="team.html">Team</a>"#;
        let page = extract_page(html, "http://acme.test/company/");
        assert!(page.links.contains("http://acme.test/about"));
        assert!(page.links.contains("http://acme.test/company/team.html"));
    }

    #[test]
    fn cross_origin_links_are_dropped() {
        let html = r#"
            <a href="http://acme.test/ok">in</a>
            <a href="http://elsewhere.test/">out</a>
            <a href="https://acme.test/tls">scheme mismatch</a>
            <a href="http://acme.test:8080/port">port mismatch</a>
        "#;
        let page = extract_page(html, "http://acme.test/");
        assert_eq!(page.links.len(), 1);
        assert!(page.links.contains("http://acme.test/ok"));
    }

    #[test]
    fn non_navigational_hrefs_are_skipped() {
        let html = r##"
            <a href="#top">top</a>
            <a href="mailto:root@acme.test">mail</a>
            <a href="tel:+15551234">call</a>
            <a href="javascript:void(0)">js</a>
            <a href="">empty</a>
        "##;
        let page = extract_page(html, "http://acme.test/");
        assert!(page.links.is_empty());
    }

    #[test]
    fn fragments_are_stripped_from_links() {
        let page = extract_page(
            r#"<a href="/docs#install">docs</a>"#,
            "http://acme.test/",
        );
        assert!(page.links.contains("http://acme.test/docs"));
    }

    #[test]
    fn garbage_input_yields_nothing_useful() {
        let page = extract_page("\u{0}\u{1}%%%not markup at all<<<", "http://acme.test/");
        // html5ever is lenient, so we only require it not to blow up and
        // not to invent links.
        assert!(page.links.is_empty());
    }

    #[test]
    fn same_origin_requires_exact_port() {
        let base = Url::parse("http://acme.test/").unwrap();
        let explicit_default = Url::parse("http://acme.test:80/x").unwrap();
        let other_port = Url::parse("http://acme.test:8081/x").unwrap();
        assert!(is_same_origin(&explicit_default, &base));
        assert!(!is_same_origin(&other_port, &base));
    }
}
