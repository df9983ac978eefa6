//! CoinDesk RSS feed.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::domain::sentiment::NewsArticle;
use crate::error::{Error, Result};
use crate::infrastructure::http::HttpFetcher;

const SOURCE: &str = "coindesk";
const MAX_ITEMS: usize = 10;

#[derive(Debug, Clone)]
pub struct CoinDeskRss {
    http: HttpFetcher,
    url: String,
}

impl CoinDeskRss {
    #[must_use]
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Up to ten headlines; an empty feed is an error.
    pub async fn articles(&self) -> Result<Vec<NewsArticle>> {
        let url = url::Url::parse(&self.url)?;
        let body = self.http.get_text(SOURCE, &url).await?;
        let articles = parse_feed(&body);
        if articles.is_empty() {
            return Err(Error::invalid(SOURCE, "no items in feed"));
        }
        Ok(articles)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    PubDate,
}

#[derive(Default)]
struct Item {
    title: String,
    link: String,
    pub_date: String,
}

impl Item {
    fn push(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title.push_str(text),
            Field::Link => self.link.push_str(text),
            Field::PubDate => self.pub_date.push_str(text),
        }
    }

    fn into_article(self) -> Option<NewsArticle> {
        let title = self.title.trim();
        let link = self.link.trim();
        let date = self.pub_date.trim();
        if title.is_empty() || link.is_empty() || date.is_empty() {
            return None;
        }
        Some(NewsArticle {
            title: title.to_string(),
            description: "Bitcoin news from CoinDesk".into(),
            published_at: date.to_string(),
            source: "CoinDesk".into(),
            url: link.to_string(),
        })
    }
}

/// Extract `<item>` entries that have a title, link and date.
///
/// Elements are matched by local name, so namespaced or attributed items
/// count. A malformed document yields the items read before the error.
fn parse_feed(xml: &str) -> Vec<NewsArticle> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut articles = Vec::new();
    let mut item: Option<Item> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" => item = Some(Item::default()),
                b"title" => field = Some(Field::Title),
                b"link" => field = Some(Field::Link),
                b"pubDate" => field = Some(Field::PubDate),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(field)) = (item.as_mut(), field) {
                    let text = e.unescape().unwrap_or_default();
                    item.push(field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(field)) = (item.as_mut(), field) {
                    item.push(field, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" => {
                    if let Some(article) = item.take().and_then(Item::into_article) {
                        articles.push(article);
                        if articles.len() == MAX_ITEMS {
                            break;
                        }
                    }
                }
                b"title" | b"link" | b"pubDate" => field = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(source = SOURCE, error = %e, "Malformed RSS feed");
                break;
            }
            _ => {}
        }
        buf.clear();
    }
    articles
}
