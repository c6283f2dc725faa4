use eyre::{Result, bail};
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::collector::{CommentsOutcome, VideoSource};
use crate::{Caption, Comment, Statistics, VideoPage, VideoRef};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3 client. One instance per collection run; the key and
/// HTTP client are injected rather than read from ambient state.
pub struct YouTubeApi {
    client: reqwest::Client,
    api_key: String,
    page_size: u32,
    lang: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    items: Option<Vec<ChannelItem>>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    #[serde(rename = "contentDetails")]
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    items: Option<Vec<PlaylistItem>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemSnippet {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "resourceId")]
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
struct ResourceId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    items: Option<Vec<VideoItem>>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    statistics: Option<VideoStatistics>,
    snippet: Option<VideoSnippet>,
}

// Count fields arrive as decimal strings, not numbers
#[derive(Debug, Deserialize)]
struct VideoStatistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "dislikeCount")]
    dislike_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThreadsResponse {
    items: Option<Vec<CommentThread>>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: Option<CommentThreadSnippet>,
    replies: Option<Replies>,
}

#[derive(Debug, Deserialize)]
struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: Option<CommentItem>,
}

#[derive(Debug, Deserialize)]
struct Replies {
    comments: Option<Vec<CommentItem>>,
}

#[derive(Debug, Deserialize)]
struct CommentItem {
    snippet: Option<CommentSnippet>,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "authorDisplayName")]
    author_display_name: Option<String>,
    #[serde(rename = "textDisplay")]
    text_display: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<u64>,
}

impl YouTubeApi {
    pub fn new(client: reqwest::Client, api_key: String, page_size: u32, lang: String) -> Self {
        Self {
            client,
            api_key,
            page_size,
            lang,
        }
    }

    async fn get_uploads_playlist(&self, channel_id: &str) -> Result<String> {
        let resp: ChannelListResponse = self
            .client
            .get(format!("{API_BASE}/channels"))
            .query(&[
                ("part", "contentDetails"),
                ("id", channel_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let uploads = resp
            .items
            .and_then(|items| items.into_iter().next())
            .and_then(|item| item.content_details)
            .and_then(|cd| cd.related_playlists)
            .and_then(|rp| rp.uploads);

        match uploads {
            Some(playlist_id) => Ok(playlist_id),
            None => bail!("channel {channel_id} has no uploads playlist"),
        }
    }

    async fn get_playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<VideoPage> {
        let page_size = self.page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", &page_size),
            ("key", &self.api_key),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let resp: PlaylistItemsResponse = self
            .client
            .get(format!("{API_BASE}/playlistItems"))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = resp
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let snippet = item.snippet?;
                let video_id = snippet.resource_id?.video_id?;
                Some(VideoRef {
                    video_id,
                    title: snippet.title.unwrap_or_default(),
                    description: snippet.description.unwrap_or_default(),
                })
            })
            .collect();

        Ok(VideoPage {
            items,
            next_page_token: resp.next_page_token,
        })
    }

    async fn get_video_statistics(&self, video_id: &str) -> Result<Statistics> {
        let resp: VideoListResponse = self
            .client
            .get(format!("{API_BASE}/videos"))
            .query(&[
                ("part", "statistics,snippet"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(item) = resp.items.and_then(|items| items.into_iter().next()) else {
            bail!("video {video_id} not found");
        };

        let stats = item.statistics.unwrap_or(VideoStatistics {
            view_count: None,
            like_count: None,
            dislike_count: None,
        });

        Ok(Statistics {
            views: parse_count(stats.view_count),
            likes: parse_count(stats.like_count),
            dislikes: parse_count(stats.dislike_count),
            upload_date: item.snippet.and_then(|s| s.published_at),
        })
    }

    async fn get_comment_threads(&self, video_id: &str) -> Result<CommentsOutcome> {
        let resp = self
            .client
            .get(format!("{API_BASE}/commentThreads"))
            .query(&[
                ("part", "snippet,replies"),
                ("videoId", video_id),
                ("maxResults", "50"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        // Comments disabled by the channel owner come back as 403
        if resp.status() == StatusCode::FORBIDDEN {
            debug!("commentThreads returned 403 for {video_id}");
            return Ok(CommentsOutcome::Disabled);
        }

        let resp: CommentThreadsResponse = resp.error_for_status()?.json().await?;
        Ok(CommentsOutcome::Listed(flatten_threads(resp)))
    }
}

/// Flatten comment threads into a single list, upstream order preserved;
/// replies follow their parent with a `Reply: ` text prefix.
fn flatten_threads(resp: CommentThreadsResponse) -> Vec<Comment> {
    let mut comments = Vec::new();
    for thread in resp.items.unwrap_or_default() {
        if let Some(top) = thread.snippet.and_then(|s| s.top_level_comment) {
            if let Some(comment) = read_comment(top, false) {
                comments.push(comment);
            }
        }
        for reply in thread
            .replies
            .and_then(|r| r.comments)
            .unwrap_or_default()
        {
            if let Some(comment) = read_comment(reply, true) {
                comments.push(comment);
            }
        }
    }
    comments
}

fn read_comment(item: CommentItem, is_reply: bool) -> Option<Comment> {
    let snippet = item.snippet?;
    let text = snippet.text_display.unwrap_or_default();
    Some(Comment {
        author: snippet.author_display_name.unwrap_or_default(),
        text: if is_reply { format!("Reply: {text}") } else { text },
        likes: snippet.like_count.unwrap_or(0),
    })
}

fn parse_count(value: Option<String>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}

impl VideoSource for YouTubeApi {
    async fn resolve_uploads(&self, channel_id: &str) -> Result<String> {
        self.get_uploads_playlist(channel_id).await
    }

    async fn list_page(&self, playlist_id: &str, page_token: Option<&str>) -> Result<VideoPage> {
        self.get_playlist_page(playlist_id, page_token).await
    }

    async fn video_statistics(&self, video_id: &str) -> Result<Statistics> {
        self.get_video_statistics(video_id).await
    }

    async fn list_comments(&self, video_id: &str) -> Result<CommentsOutcome> {
        self.get_comment_threads(video_id).await
    }

    async fn fetch_caption(&self, video_id: &str) -> Result<Caption> {
        crate::captions::fetch_caption(&self.client, video_id, &self.lang).await
    }
}
