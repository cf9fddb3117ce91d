use nl_core::Article;
use scraper::{Html, Selector};
use url::Url;

/// Extraction stops once a source has yielded this many candidates.
pub const MAX_ARTICLES_PER_SOURCE: usize = 20;

/// Titles shorter than this after cleaning are navigation chrome, not
/// headlines.
const MIN_TITLE_LEN: usize = 20;

/// Href substrings that suggest a link points at an article page.
const ARTICLE_HREF_HINTS: [&str; 4] = ["article", "story", "post", "news"];

/// Pull candidate articles out of a page with two heuristics sharing one
/// accumulator: article-looking links first, then h1/h2/h3 headlines. Best
/// effort by design: malformed markup yields fewer articles, never an error.
pub fn extract_articles(html: &str, source_url: &str) -> Vec<Article> {
    let document = Html::parse_document(html);
    let source = hostname_of(source_url);
    let mut articles = Vec::new();

    let link_selector = Selector::parse("a[href]").unwrap();
    for element in document.select(&link_selector) {
        if articles.len() >= MAX_ARTICLES_PER_SOURCE {
            break;
        }
        let href = element.value().attr("href").unwrap_or_default();
        if !ARTICLE_HREF_HINTS.iter().any(|hint| href.contains(hint)) {
            continue;
        }
        let title = clean_text(&element.text().collect::<String>());
        if title.len() <= MIN_TITLE_LEN {
            continue;
        }
        let url = normalize_url(href, source_url);
        if articles.iter().any(|a: &Article| a.url == url) {
            continue;
        }
        articles.push(Article {
            title,
            url,
            source: source.clone(),
        });
    }

    let heading_selector = Selector::parse("h1, h2, h3").unwrap();
    let anchor_selector = Selector::parse("a[href]").unwrap();
    for element in document.select(&heading_selector) {
        if articles.len() >= MAX_ARTICLES_PER_SOURCE {
            break;
        }
        // A headline wrapping a link points at that link; a bare headline
        // points back at the source page itself.
        let url = element
            .select(&anchor_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| normalize_url(href, source_url))
            .unwrap_or_else(|| source_url.to_string());
        let title = clean_text(&element.text().collect::<String>());
        if title.len() <= MIN_TITLE_LEN {
            continue;
        }
        if articles.iter().any(|a| a.url == url || a.title == title) {
            continue;
        }
        articles.push(Article {
            title,
            url,
            source: source.clone(),
        });
    }

    articles
}

/// Strip tags, decode the common entities, collapse whitespace, trim.
pub fn clean_text(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a possibly-relative href against the page it came from. Hrefs
/// that refuse to resolve are kept verbatim.
fn normalize_url(href: &str, base: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

fn hostname_of(source_url: &str) -> String {
    Url::parse(source_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| source_url.to_string())
}
