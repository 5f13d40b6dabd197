use std::collections::HashSet;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use reqwest::Client;
use url::Url;

use crate::config::{PropertyNames, SyncConfig};
use crate::notion_rs::database::query_database;
use crate::notion_rs::NOTION_API_BASE;
use crate::notion_rs::error::NotionError;
use crate::notion_rs::pages::create_page;
use crate::ports::notion::{RowId, RowPayload, RowStore};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Notion allows an average of three requests per second per integration.
const REQUESTS_PER_SECOND: NonZeroU32 = NonZeroU32::new(3).unwrap();
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct NotionHttpAdapter {
    client: Client,
    base_url: Url,
    token: String,
    properties: PropertyNames,
    limiter: DirectRateLimiter,
    backoff: ExponentialBuilder,
}

impl NotionHttpAdapter {
    pub fn new(config: &SyncConfig) -> color_eyre::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(NOTION_API_BASE)?,
            token: config.notion_token.clone(),
            properties: config.properties.clone(),
            limiter: RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND)),
            backoff: ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(500))
                .with_max_delay(Duration::from_secs(30))
                .with_max_times(config.max_retries)
                .with_jitter(),
        })
    }

    /// Points the adapter at another API root, e.g. a local server. Keep the trailing slash.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Runs a request behind the rate limiter, retrying errors accepted by `retry_when`
    /// with exponential backoff. A `Retry-After` from Notion stretches the delay.
    async fn send<T, F, Fut>(
        &self,
        what: &str,
        retry_when: fn(&NotionError) -> bool,
        mut request: F,
    ) -> Result<T, NotionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, NotionError>>,
    {
        let limiter = &self.limiter;
        (|| {
            let fut = request();
            async move {
                limiter.until_ready().await;
                fut.await
            }
        })
        .retry(self.backoff)
        .when(retry_when)
        .adjust(|err: &NotionError, delay: Option<Duration>| match err.retry_after() {
            Some(after) => delay.map(|d| d.max(after)),
            None => delay,
        })
        .notify(|err: &NotionError, delay: Duration| {
            if err.is_rate_limited() {
                log::warn!("{} was rate limited, retrying in {:?}", what, delay);
            } else {
                log::warn!("{} failed, retrying in {:?}: {}", what, delay, err);
            }
        })
        .await
    }
}

#[async_trait::async_trait]
impl RowStore for NotionHttpAdapter {
    async fn query_existing_urls(&self, database_id: &str) -> Result<HashSet<String>, NotionError> {
        let mut urls = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            let response = self
                .send("Query Notion database", NotionError::is_retryable, || {
                    query_database(
                        &self.client,
                        &self.base_url,
                        &self.token,
                        database_id,
                        &self.properties.url,
                        cursor.as_deref(),
                    )
                })
                .await?;
            pages += 1;

            urls.extend(
                response
                    .results
                    .iter()
                    .filter_map(|page| page.url_property(&self.properties.url))
                    .map(String::from),
            );

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        log::debug!("Read {} result pages from database {}", pages, database_id);
        log::info!("Found {} existing entries in Notion", urls.len());
        Ok(urls)
    }

    async fn create_row(&self, database_id: &str, row: &RowPayload) -> Result<RowId, NotionError> {
        // Only rate limits: a timed out or 5xx create may already have written the page.
        let page = self
            .send("Create Notion page", NotionError::is_rate_limited, || {
                create_page(
                    &self.client,
                    &self.base_url,
                    &self.token,
                    database_id,
                    row,
                    &self.properties,
                )
            })
            .await?;
        if let Some(url) = &page.url {
            log::debug!("Created page {}", url);
        }
        Ok(RowId(page.id))
    }
}
