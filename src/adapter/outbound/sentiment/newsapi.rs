//! NewsAPI `everything` search. Needs `NEWS_API_KEY`.

use serde::Deserialize;

use crate::domain::sentiment::NewsArticle;
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "newsapi";

#[derive(Debug, Clone)]
pub struct NewsApi {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct Everything {
    articles: Option<Vec<Article>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
    source: Option<ArticleSource>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl NewsApi {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Latest twenty Bitcoin articles.
    pub async fn bitcoin_articles(&self) -> Result<Vec<NewsArticle>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(Error::Config(ConfigError::MissingField {
                field: "NEWS_API_KEY",
            }))?;
        let url = build_url(
            &self.base_url,
            "/everything",
            &[
                ("q", "bitcoin"),
                ("sortBy", "publishedAt"),
                ("pageSize", "20"),
                ("apiKey", key),
            ],
        )?;
        let body: Everything = self.http.get_json(SOURCE, &url).await?;
        let articles = body
            .articles
            .ok_or_else(|| Error::invalid(SOURCE, "missing articles"))?;

        Ok(articles
            .into_iter()
            .filter_map(|a| {
                Some(NewsArticle {
                    title: a.title?,
                    description: a.description.unwrap_or_default(),
                    published_at: a.published_at.unwrap_or_default(),
                    source: a.source.and_then(|s| s.name).unwrap_or_default(),
                    url: a.url.unwrap_or_default(),
                })
            })
            .collect())
    }
}
