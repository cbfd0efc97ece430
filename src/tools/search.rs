//! Web search tool backed by DuckDuckGo's HTML endpoint (no API key needed).

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::LazyLock;

use super::{Tool, ToolOutput};

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__a"[^>]*>(.*?)</a>"#).expect("valid title regex")
});
static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</a>"#).expect("valid snippet regex")
});
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__url"[^>]*>(.*?)</a>"#).expect("valid url regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]+);").expect("valid entity regex")
});

/// One parsed search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

pub struct WebSearchTool {
    http: reqwest::Client,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(http: reqwest::Client, max_results: usize) -> Self {
        Self { http, max_results }
    }
}

#[derive(Deserialize)]
struct SearchInput {
    query: String,
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns result titles, snippets and URLs."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput> {
        let input: SearchInput = serde_json::from_value(input)?;
        let query = input.query.trim();
        if query.is_empty() {
            return Ok(ToolOutput::error("Search query is empty".into()));
        }

        let url = format!(
            "{}?q={}",
            crate::constants::SEARCH_ENDPOINT,
            urlencoding::encode(query)
        );
        tracing::debug!(%url, "web search");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Search request failed")?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Search returned HTTP {}", status);
        }
        let html = response.text().await?;

        let hits = extract_results(&html, self.max_results);
        if hits.is_empty() {
            return Ok(ToolOutput::success(format!(
                "No results found for: {}",
                query
            )));
        }

        let formatted = hits
            .iter()
            .map(|h| format!("**{}**\n{}\nURL: {}", h.title, h.snippet, h.url))
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ToolOutput::success(formatted))
    }
}

/// Extract up to `limit` results from DuckDuckGo result HTML.
pub fn extract_results(html: &str, limit: usize) -> Vec<SearchHit> {
    html.split("class=\"result__body\"")
        .skip(1)
        .filter_map(|chunk| {
            let title = capture_text(&TITLE_RE, chunk)?;
            let snippet = capture_text(&SNIPPET_RE, chunk).unwrap_or_default();
            let url = capture_text(&URL_RE, chunk).unwrap_or_default();
            Some(SearchHit {
                title,
                snippet,
                url,
            })
        })
        .take(limit)
        .collect()
}

fn capture_text(re: &Regex, chunk: &str) -> Option<String> {
    let raw = re.captures(chunk)?.get(1)?.as_str();
    let text = html_decode(&TAG_RE.replace_all(raw, ""));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Single-pass HTML entity decoding: common named entities plus decimal
/// and hex character references. Unknown entities are left as written.
pub(crate) fn html_decode(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    let ch = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        char::from_u32(u32::from_str_radix(hex, 16).ok()?)?
    } else if let Some(dec) = name.strip_prefix('#') {
        char::from_u32(dec.parse().ok()?)?
    } else {
        match name {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => ' ',
            "hellip" => '\u{2026}',
            "mdash" => '\u{2014}',
            "ndash" => '\u{2013}',
            "lsquo" => '\u{2018}',
            "rsquo" => '\u{2019}',
            "ldquo" => '\u{201C}',
            "rdquo" => '\u{201D}',
            _ => return None,
        }
    };
    Some(ch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=x">Mount <b>Fuji</b> - Wikipedia</a>
    </h2>
    <a class="result__url" href="//duckduckgo.com/l/?uddg=x">
      en.wikipedia.org/wiki/Mount_Fuji
    </a>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Mount <b>Fuji</b> is Japan&#x27;s highest mountain &amp; an active volcano.</a>
  </div>
</div>
<div class="result results_links">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=y">Climbing Fuji</a>
    </h2>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=y">Trail guide.</a>
  </div>
</div>
"#;

    #[test]
    fn test_extract_results_strips_markup() {
        let hits = extract_results(PAGE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Mount Fuji - Wikipedia");
        assert_eq!(
            hits[0].snippet,
            "Mount Fuji is Japan's highest mountain & an active volcano."
        );
        assert_eq!(hits[0].url, "en.wikipedia.org/wiki/Mount_Fuji");
        assert_eq!(hits[1].url, "");
    }

    #[test]
    fn test_extract_results_respects_limit() {
        assert_eq!(extract_results(PAGE, 1).len(), 1);
        assert!(extract_results("<html>nothing here</html>", 5).is_empty());
    }

    #[test]
    fn test_html_decode_amp_last() {
        assert_eq!(html_decode("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_html_decode_numeric_references() {
        assert_eq!(html_decode("a&#x2F;b"), "a/b");
        assert_eq!(html_decode("Japan&#8217;s peak"), "Japan\u{2019}s peak");
        assert_eq!(html_decode("&#39;quoted&#X27;"), "'quoted'");
        assert_eq!(html_decode("&bogus; &#xD800; &#99999999;"), "&bogus; &#xD800; &#99999999;");
    }
}
