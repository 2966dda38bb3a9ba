use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::ProviderError;
use crate::models::{NewsDigest, MAX_NEWS_SNIPPETS};

/// Company name that asks for general market news instead of a ticker.
pub const GENERAL_MARKET: &str = "stock";

const GENERAL_MARKET_QUERY: &str = "top 10 recent stocks related news only";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/102.0.0.0 Safari/537.36";

/// Configuration for news service
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub provider: String,
    pub api_key: Option<String>,
}

impl NewsConfig {
    pub fn from_env() -> Self {
        Self {
            provider: std::env::var("NEWS_PROVIDER").unwrap_or_else(|_| "google".to_string()),
            api_key: std::env::var("NEWS_API_KEY").ok(),
        }
    }
}

/// Trait for news providers
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Up to [`MAX_NEWS_SNIPPETS`] short snippets for a search term, most
    /// relevant first.
    async fn fetch_news(&self, search_term: &str) -> Result<Vec<String>, ProviderError>;
}

/// Scrapes headline snippets from a Google search results page.
pub struct GoogleNewsScraper {
    client: Client,
    headline_re: Regex,
    snippet_re: Regex,
    tag_re: Regex,
    whitespace_re: Regex,
}

impl GoogleNewsScraper {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            client: Client::builder()
                .user_agent(BROWSER_USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            headline_re: Regex::new(
                r#"(?s)<div[^>]*\bclass="n0jPhd ynAwRc tNxQIb nDgy9d"[^>]*>(.*?)</div>"#,
            )?,
            snippet_re: Regex::new(r#"(?s)<div[^>]*\bclass="IJl0Z"[^>]*>(.*?)</div>"#)?,
            tag_re: Regex::new(r"<[^>]+>")?,
            whitespace_re: Regex::new(r"\s")?,
        })
    }

    /// Search URL for a term; whitespace becomes `+`.
    pub fn search_url(&self, search_term: &str) -> String {
        let url = format!("https://www.google.com/search?q={}&cr=countryUS", search_term);
        self.whitespace_re.replace_all(&url, "+").into_owned()
    }

    /// Headline blocks first, then snippet blocks, capped at ten.
    pub fn extract_snippets(&self, html: &str) -> Vec<String> {
        let mut news: Vec<String> = Vec::new();
        for re in [&self.headline_re, &self.snippet_re] {
            for caps in re.captures_iter(html) {
                let text = self.tag_re.replace_all(&caps[1], "");
                let text = decode_entities(text.trim());
                if !text.is_empty() {
                    news.push(text);
                }
            }
        }
        news.truncate(MAX_NEWS_SNIPPETS);
        news
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[async_trait]
impl NewsProvider for GoogleNewsScraper {
    async fn fetch_news(&self, search_term: &str) -> Result<Vec<String>, ProviderError> {
        let url = self.search_url(search_term);
        info!("Scraping news for '{}'", search_term);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("News search request failed: {}", e);
            ProviderError::Network(e.to_string())
        })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(ProviderError::BadResponse(format!("HTTP {}", response.status())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let news = self.extract_snippets(&html);
        info!("Scraped {} news snippets for '{}'", news.len(), search_term);
        Ok(news)
    }
}

/// Serper API provider (uses Google's news search)
pub struct SerperProvider {
    api_key: String,
    client: Client,
}

impl SerperProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    news: Option<Vec<SerperNewsItem>>,
}

#[derive(Debug, Deserialize)]
struct SerperNewsItem {
    title: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    snippet: String,
}

impl SerperNewsItem {
    fn into_snippet(self) -> String {
        match (self.source.is_empty(), self.snippet.is_empty()) {
            (true, true) => self.title,
            (true, false) => format!("{}: {}", self.title, self.snippet),
            (false, true) => format!("{} ({})", self.title, self.source),
            (false, false) => format!("{} ({}): {}", self.title, self.source, self.snippet),
        }
    }
}

#[async_trait]
impl NewsProvider for SerperProvider {
    async fn fetch_news(&self, search_term: &str) -> Result<Vec<String>, ProviderError> {
        info!("Fetching news from Serper for query: {}", search_term);

        let request_body = serde_json::json!({
            "q": search_term,
            "type": "news",
            "num": MAX_NEWS_SNIPPETS,
        });

        let response = self
            .client
            .post("https://google.serper.dev/news")
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!("Serper API request failed: {}", e);
                ProviderError::Network(e.to_string())
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Serper API error {}: {}", status, error_text);
            return Err(ProviderError::BadResponse(format!(
                "News API returned error {}: {}",
                status, error_text
            )));
        }

        let serper_response: SerperResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Serper response: {}", e);
            ProviderError::Parse(e.to_string())
        })?;

        let news: Vec<String> = serper_response
            .news
            .unwrap_or_default()
            .into_iter()
            .take(MAX_NEWS_SNIPPETS)
            .map(SerperNewsItem::into_snippet)
            .collect();

        info!("Fetched {} news articles from Serper", news.len());
        Ok(news)
    }
}

/// Search term for a company name: general market news for
/// [`GENERAL_MARKET`], otherwise `"<name> stock news"` unless the name
/// already mentions news.
pub fn search_term(company_name: &str) -> String {
    let term = if company_name == GENERAL_MARKET {
        GENERAL_MARKET_QUERY
    } else {
        company_name
    };

    if term.contains("news") {
        term.to_string()
    } else {
        format!("{} stock news", term)
    }
}

/// Main news service
pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
}

impl NewsService {
    pub fn new(config: NewsConfig) -> Result<Self, regex::Error> {
        let provider: Arc<dyn NewsProvider> = match (config.provider.as_str(), config.api_key) {
            ("serper", Some(api_key)) if !api_key.is_empty() => {
                info!("Initializing Serper news provider");
                Arc::new(SerperProvider::new(api_key))
            }
            ("serper", _) => {
                warn!("Serper selected but NEWS_API_KEY is missing, falling back to Google scraping");
                Arc::new(GoogleNewsScraper::new()?)
            }
            ("google", _) => {
                info!("Initializing Google news scraper");
                Arc::new(GoogleNewsScraper::new()?)
            }
            (other, _) => {
                warn!("Unknown news provider: {}, using Google scraping", other);
                Arc::new(GoogleNewsScraper::new()?)
            }
        };

        Ok(Self { provider })
    }

    pub fn with_provider(provider: Arc<dyn NewsProvider>) -> Self {
        Self { provider }
    }

    /// Recent news for a company name or ticker, or general market news for
    /// [`GENERAL_MARKET`].
    pub async fn recent_news(&self, company_name: &str) -> Result<NewsDigest, ProviderError> {
        let term = search_term(company_name);
        let snippets = self.provider.fetch_news(&term).await?;
        Ok(NewsDigest::new(company_name, snippets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_appends_stock_news() {
        assert_eq!(search_term("MSFT"), "MSFT stock news");
        assert_eq!(search_term("tesla news"), "tesla news");
    }

    #[test]
    fn test_search_term_general_market() {
        assert_eq!(search_term(GENERAL_MARKET), "top 10 recent stocks related news only");
    }

    #[test]
    fn test_search_url_replaces_whitespace() {
        let scraper = GoogleNewsScraper::new().unwrap();
        assert_eq!(
            scraper.search_url("MSFT stock news"),
            "https://www.google.com/search?q=MSFT+stock+news&cr=countryUS"
        );
    }

    #[test]
    fn test_extract_snippets_orders_headlines_first() {
        let scraper = GoogleNewsScraper::new().unwrap();
        let html = r#"
            <div class="IJl0Z">Snippet one</div>
            <div class="n0jPhd ynAwRc tNxQIb nDgy9d">Microsoft beats <b>estimates</b></div>
            <div class="other">ignored</div>
            <div class="n0jPhd ynAwRc tNxQIb nDgy9d">Azure growth &amp; AI</div>
        "#;
        let news = scraper.extract_snippets(html);
        assert_eq!(
            news,
            vec![
                "Microsoft beats estimates".to_string(),
                "Azure growth & AI".to_string(),
                "Snippet one".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_snippets_caps_at_ten() {
        let scraper = GoogleNewsScraper::new().unwrap();
        let html: String = (0..15)
            .map(|i| format!(r#"<div class="IJl0Z">item {}</div>"#, i))
            .collect();
        let news = scraper.extract_snippets(&html);
        assert_eq!(news.len(), 10);
        assert_eq!(news[0], "item 0");
    }

    #[test]
    fn test_serper_item_formatting() {
        let item = SerperNewsItem {
            title: "Fed holds rates".into(),
            source: "Reuters".into(),
            snippet: "Policy unchanged".into(),
        };
        assert_eq!(item.into_snippet(), "Fed holds rates (Reuters): Policy unchanged");
    }

    struct FixedNews;

    #[async_trait]
    impl NewsProvider for FixedNews {
        async fn fetch_news(&self, search_term: &str) -> Result<Vec<String>, ProviderError> {
            Ok(vec![format!("searched: {}", search_term)])
        }
    }

    #[tokio::test]
    async fn test_recent_news_uses_search_term() {
        let service = NewsService::with_provider(Arc::new(FixedNews));
        let digest = service.recent_news("AAPL").await.unwrap();
        assert_eq!(digest.snippets, vec!["searched: AAPL stock news".to_string()]);
        assert_eq!(digest.to_string(), "Recent News:\n\n1. searched: AAPL stock news\n");
    }
}
