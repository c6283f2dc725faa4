use eyre::Result;
use futures::stream::{self, StreamExt};
use log::{debug, info};

use crate::{Caption, Comment, Statistics, VideoPage, VideoRecord, VideoRef};

/// Number of top-liked comments kept alongside the full list
pub const TOP_COMMENTS: usize = 5;

/// Outcome of a comment listing: either the flattened thread list, or the
/// distinguished "comments disabled" signal (HTTP 403 upstream)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentsOutcome {
    Listed(Vec<Comment>),
    Disabled,
}

/// Everything the collector needs from the outside world. Implemented by
/// [`crate::api::YouTubeApi`]; tests substitute a scripted source.
pub trait VideoSource: Sync {
    /// Resolve a channel ID to its uploads playlist ID
    async fn resolve_uploads(&self, channel_id: &str) -> Result<String>;

    /// Fetch one page of the playlist; `page_token` is absent on the first call
    async fn list_page(&self, playlist_id: &str, page_token: Option<&str>) -> Result<VideoPage>;

    async fn video_statistics(&self, video_id: &str) -> Result<Statistics>;

    async fn list_comments(&self, video_id: &str) -> Result<CommentsOutcome>;

    async fn fetch_caption(&self, video_id: &str) -> Result<Caption>;
}

/// Walk every page of the channel's uploads playlist, enriching all videos of
/// a page concurrently before advancing to the next.
///
/// Pages are strictly sequential (each request needs the prior page's
/// continuation token); a failed root resolution or page fetch aborts the
/// whole run. Per-video enrichment failures degrade to partial records.
pub async fn collect<S: VideoSource>(
    source: &S,
    channel_id: &str,
    concurrency: usize,
) -> Result<Vec<VideoRecord>> {
    let playlist_id = source.resolve_uploads(channel_id).await?;
    info!("Channel {channel_id}: uploads playlist {playlist_id}");

    let mut records = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = source.list_page(&playlist_id, page_token.as_deref()).await?;
        debug!("Fetched page with {} items", page.items.len());

        // In-page fan-out: all enrichment calls for this page run under a
        // bounded pool and must complete before the next page is requested.
        let page_records: Vec<VideoRecord> = stream::iter(page.items)
            .map(|item| enrich(source, item))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;
        records.extend(page_records);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!("Collected {} video records from {channel_id}", records.len());
    Ok(records)
}

/// Enrich one playlist entry with statistics, comments, and a caption.
///
/// The three sub-fetches are isolated: each is attempted exactly once, and a
/// failure in one leaves the others' results intact.
pub async fn enrich<S: VideoSource>(source: &S, item: VideoRef) -> VideoRecord {
    let stats = match source.video_statistics(&item.video_id).await {
        Ok(stats) => stats,
        Err(e) => {
            debug!("Statistics fetch failed for {}: {e}", item.video_id);
            Statistics::default()
        }
    };

    let (comments, top_comments) = match source.list_comments(&item.video_id).await {
        Ok(CommentsOutcome::Listed(list)) => rank_comments(list, TOP_COMMENTS),
        Ok(CommentsOutcome::Disabled) => {
            debug!("Comments disabled for {}", item.video_id);
            (Vec::new(), Vec::new())
        }
        Err(e) => {
            debug!("Comment fetch failed for {}: {e}", item.video_id);
            (Vec::new(), Vec::new())
        }
    };

    let caption = match source.fetch_caption(&item.video_id).await {
        Ok(caption) => caption,
        Err(e) => {
            debug!("Caption fetch failed for {}: {e}", item.video_id);
            Caption::Unavailable
        }
    };

    VideoRecord {
        video_id: item.video_id,
        title: item.title,
        description: item.description,
        views: stats.views,
        likes: stats.likes,
        dislikes: stats.dislikes,
        upload_date: stats.upload_date,
        comments,
        top_comments,
        caption,
    }
}

/// Sort comments by like-count descending (stable: upstream order breaks
/// ties) and take the top `k` as a separate list.
pub fn rank_comments(mut comments: Vec<Comment>, k: usize) -> (Vec<Comment>, Vec<Comment>) {
    comments.sort_by(|a, b| b.likes.cmp(&a.likes));
    let top = comments[..k.min(comments.len())].to_vec();
    (comments, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn video_ref(id: &str) -> VideoRef {
        VideoRef {
            video_id: id.to_string(),
            title: format!("title-{id}"),
            description: String::new(),
        }
    }

    fn comment(author: &str, likes: u64) -> Comment {
        Comment {
            author: author.to_string(),
            text: format!("text by {author}"),
            likes,
        }
    }

    /// Scripted source: serves a fixed page sequence and counts requests.
    struct ScriptedSource {
        pages: Vec<VideoPage>,
        page_requests: AtomicUsize,
        fail_stats: bool,
        comments_disabled: bool,
        fail_captions: bool,
    }

    impl ScriptedSource {
        fn new(pages: Vec<VideoPage>) -> Self {
            Self {
                pages,
                page_requests: AtomicUsize::new(0),
                fail_stats: false,
                comments_disabled: false,
                fail_captions: false,
            }
        }

        fn two_pages() -> Self {
            Self::new(vec![
                VideoPage {
                    items: vec![video_ref("v1"), video_ref("v2")],
                    next_page_token: Some("page2".to_string()),
                },
                VideoPage {
                    items: vec![video_ref("v3"), video_ref("v4")],
                    next_page_token: None,
                },
            ])
        }
    }

    impl VideoSource for ScriptedSource {
        async fn resolve_uploads(&self, channel_id: &str) -> Result<String> {
            if channel_id == "UC123" {
                Ok("UU123".to_string())
            } else {
                bail!("channel {channel_id} not found")
            }
        }

        async fn list_page(
            &self,
            playlist_id: &str,
            page_token: Option<&str>,
        ) -> Result<VideoPage> {
            assert_eq!(playlist_id, "UU123");
            let n = self.page_requests.fetch_add(1, Ordering::SeqCst);
            match n {
                0 => assert_eq!(page_token, None),
                _ => assert_eq!(page_token, Some(format!("page{}", n + 1).as_str())),
            }
            match self.pages.get(n) {
                Some(page) => Ok(page.clone()),
                None => bail!("page fetch failed"),
            }
        }

        async fn video_statistics(&self, video_id: &str) -> Result<Statistics> {
            if self.fail_stats {
                bail!("quota exceeded");
            }
            Ok(Statistics {
                views: Some(100),
                likes: Some(10),
                dislikes: Some(1),
                upload_date: Some(format!("2024-01-01T00:00:00Z+{video_id}")),
            })
        }

        async fn list_comments(&self, _video_id: &str) -> Result<CommentsOutcome> {
            if self.comments_disabled {
                return Ok(CommentsOutcome::Disabled);
            }
            Ok(CommentsOutcome::Listed(vec![
                comment("a", 1),
                comment("b", 7),
                comment("c", 3),
            ]))
        }

        async fn fetch_caption(&self, _video_id: &str) -> Result<Caption> {
            if self.fail_captions {
                bail!("timedtext unreachable");
            }
            Ok(Caption::Manual("hello world".to_string()))
        }
    }

    #[tokio::test]
    async fn test_collect_two_pages_yields_four_records() {
        let source = ScriptedSource::two_pages();
        let records = collect(&source, "UC123", 4).await.unwrap();

        assert_eq!(records.len(), 4);
        let mut ids: Vec<&str> = records.iter().map(|r| r.video_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["v1", "v2", "v3", "v4"]);
        // Exactly one request per page, then stop
        assert_eq!(source.page_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_collect_count_unaffected_by_enrichment_failures() {
        let mut source = ScriptedSource::two_pages();
        source.fail_stats = true;
        source.fail_captions = true;
        source.comments_disabled = true;

        let records = collect(&source, "UC123", 2).await.unwrap();
        assert_eq!(records.len(), 4);
        for record in &records {
            assert_eq!(record.views, None);
            assert_eq!(record.upload_date, None);
            assert!(record.comments.is_empty());
            assert!(record.top_comments.is_empty());
            assert_eq!(record.caption, Caption::Unavailable);
        }
    }

    #[tokio::test]
    async fn test_collect_single_page_issues_one_request() {
        let source = ScriptedSource::new(vec![VideoPage {
            items: vec![video_ref("only")],
            next_page_token: None,
        }]);
        let records = collect(&source, "UC123", 8).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(source.page_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_collect_unknown_channel_is_fatal() {
        let source = ScriptedSource::two_pages();
        assert!(collect(&source, "UCnope", 4).await.is_err());
    }

    #[tokio::test]
    async fn test_collect_page_failure_is_fatal() {
        // Second page advertised via token but not scripted: the fetch fails
        // and the whole run aborts.
        let source = ScriptedSource::new(vec![VideoPage {
            items: vec![video_ref("v1")],
            next_page_token: Some("page2".to_string()),
        }]);
        assert!(collect(&source, "UC123", 4).await.is_err());
    }

    #[tokio::test]
    async fn test_enrich_partial_on_stats_failure() {
        let mut source = ScriptedSource::two_pages();
        source.fail_stats = true;

        let record = enrich(&source, video_ref("v1")).await;
        assert_eq!(record.views, None);
        assert_eq!(record.likes, None);
        assert_eq!(record.dislikes, None);
        assert_eq!(record.upload_date, None);
        // The other sub-fetches are unaffected
        assert_eq!(record.comments.len(), 3);
        assert_eq!(record.caption, Caption::Manual("hello world".to_string()));
    }

    #[tokio::test]
    async fn test_enrich_sorts_comments() {
        let source = ScriptedSource::two_pages();
        let record = enrich(&source, video_ref("v1")).await;
        let likes: Vec<u64> = record.comments.iter().map(|c| c.likes).collect();
        assert_eq!(likes, vec![7, 3, 1]);
        assert_eq!(record.top_comments, record.comments);
    }

    #[test]
    fn test_rank_comments_stable_descending() {
        let input = vec![
            comment("first-tie", 5),
            comment("low", 1),
            comment("second-tie", 5),
            comment("high", 9),
        ];
        let (all, top) = rank_comments(input, 3);

        let order: Vec<&str> = all.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(order, vec!["high", "first-tie", "second-tie", "low"]);
        // top-K is a prefix of the sorted list
        assert_eq!(top.as_slice(), &all[..3]);
    }

    #[test]
    fn test_rank_comments_top_k_clamped() {
        let input = vec![comment("a", 2), comment("b", 4)];
        let (all, top) = rank_comments(input, 5);
        assert_eq!(all.len(), 2);
        assert_eq!(top.len(), 2);

        let (_, empty_top) = rank_comments(Vec::new(), 5);
        assert!(empty_top.is_empty());
    }
}
