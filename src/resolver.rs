use eyre::Result;
use futures::stream::{self, StreamExt};
use log::debug;

use crate::{ResolvedChannel, extract_channel_id};

/// One blocking page fetch; implementations report any non-success outcome
/// (network failure, error status) as `Err`.
pub trait PageFetcher: Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

impl PageFetcher for reqwest::Client {
    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

/// Resolve channel IDs by scraping each watch page, up to `concurrency` pages
/// in flight at once.
///
/// Best effort: a pair whose fetch fails or whose page carries no channel-ID
/// marker is simply dropped. No retries; output order is unspecified.
pub async fn resolve_channel_ids<F: PageFetcher>(
    fetcher: &F,
    pairs: &[(String, String)],
    concurrency: usize,
) -> Vec<ResolvedChannel> {
    stream::iter(pairs)
        .map(|(url, name)| resolve_one(fetcher, url, name))
        .buffer_unordered(concurrency.max(1))
        .filter_map(|resolved| async move { resolved })
        .collect()
        .await
}

async fn resolve_one<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    name: &str,
) -> Option<ResolvedChannel> {
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            debug!("Fetch failed for {url}: {e}");
            return None;
        }
    };

    match extract_channel_id(&html) {
        Some(channel_id) => Some(ResolvedChannel {
            channel_name: name.to_string(),
            channel_id,
        }),
        None => {
            debug!("No channel ID marker in page body of {url}");
            None
        }
    }
}
