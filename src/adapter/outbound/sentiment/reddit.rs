//! Reddit r/Bitcoin hot listing.

use serde::Deserialize;

use crate::domain::sentiment::SocialPost;
use crate::error::{Error, Result};
use crate::infrastructure::http::{build_url, HttpFetcher};

const SOURCE: &str = "reddit";

#[derive(Debug, Clone)]
pub struct Reddit {
    http: HttpFetcher,
    base_url: String,
}

#[derive(Deserialize)]
struct Listing {
    data: Option<ListingData>,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: PostData,
}

#[derive(Deserialize)]
struct PostData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    upvote_ratio: f64,
}

impl Reddit {
    #[must_use]
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Top 25 hot posts; an empty listing is an error.
    pub async fn hot_posts(&self) -> Result<Vec<SocialPost>> {
        let url = build_url(&self.base_url, "/r/Bitcoin/hot.json", &[("limit", "25")])?;
        let listing: Listing = self.http.get_json(SOURCE, &url).await?;
        let posts: Vec<SocialPost> = listing
            .data
            .map(|d| d.children)
            .unwrap_or_default()
            .into_iter()
            .map(|c| SocialPost {
                title: c.data.title,
                score: c.data.score,
                upvote_ratio: c.data.upvote_ratio,
            })
            .collect();
        if posts.is_empty() {
            return Err(Error::invalid(SOURCE, "empty listing"));
        }
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::HttpConfig;
    use mockito::Server;

    #[tokio::test]
    async fn reads_children() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/r/Bitcoin/hot.json?limit=25")
            .with_body(
                r#"{"kind":"Listing","data":{"children":[
                {"kind":"t3","data":{"title":"HODL","score":420,"upvote_ratio":0.93}}]}}"#,
            )
            .create_async()
            .await;

        let reddit = Reddit::new(HttpFetcher::from_config(&HttpConfig::default()), server.url());
        let posts = reddit.hot_posts().await.unwrap();
        assert_eq!(posts[0].score, 420);
        assert_eq!(posts[0].title, "HODL");
    }
}
