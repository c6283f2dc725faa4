pub mod api;
pub mod captions;
pub mod collector;
pub mod config;
pub mod output;
pub mod resolver;

use serde::Serialize;

/// A single comment (top-level or flattened reply)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub likes: u64,
}

/// Caption text for a video, tagged with how it was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Caption {
    Manual(String),
    Generated(String),
    Translated(String),
    Unavailable,
}

impl Caption {
    pub fn text(&self) -> Option<&str> {
        match self {
            Caption::Manual(t) | Caption::Generated(t) | Caption::Translated(t) => Some(t),
            Caption::Unavailable => None,
        }
    }
}

impl std::fmt::Display for Caption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caption::Manual(_) => write!(f, "manual"),
            Caption::Generated(_) => write!(f, "generated"),
            Caption::Translated(_) => write!(f, "translated"),
            Caption::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// One playlist entry as listed by the uploads playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRef {
    pub video_id: String,
    pub title: String,
    pub description: String,
}

/// One page of playlist entries plus the cursor for the next page
#[derive(Debug, Clone, Default)]
pub struct VideoPage {
    pub items: Vec<VideoRef>,
    pub next_page_token: Option<String>,
}

/// Numeric statistics and upload timestamp for a video
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub upload_date: Option<String>,
}

/// Fully enriched row for one video
#[derive(Debug, Clone, Serialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub upload_date: Option<String>,
    pub comments: Vec<Comment>,
    pub top_comments: Vec<Comment>,
    pub caption: Caption,
}

/// A (label, channel ID) pair produced by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedChannel {
    pub channel_name: String,
    pub channel_id: String,
}

/// Extract the embedded channel ID from watch-page HTML (first occurrence)
pub fn extract_channel_id(html: &str) -> Option<String> {
    let re = regex::Regex::new(r#""channelId":"(.*?)""#).unwrap();
    re.captures(html).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_channel_id() {
        let html = r#"<script>var ytInitialData = {"channelId":"UC38IQsAvIsxxjztdMZQtwHA","title":"x"};</script>"#;
        assert_eq!(
            extract_channel_id(html),
            Some("UC38IQsAvIsxxjztdMZQtwHA".to_string())
        );
    }

    #[test]
    fn test_extract_channel_id_first_occurrence() {
        let html = r#""channelId":"UCfirst" ... "channelId":"UCsecond""#;
        assert_eq!(extract_channel_id(html), Some("UCfirst".to_string()));
    }

    #[test]
    fn test_extract_channel_id_missing() {
        assert_eq!(extract_channel_id("<html><body>nothing</body></html>"), None);
    }

    #[test]
    fn test_extract_channel_id_empty_value() {
        // The marker with an empty value still matches; the scrape is
        // intentionally literal about what the page embeds.
        assert_eq!(extract_channel_id(r#""channelId":"""#), Some(String::new()));
    }

    #[test]
    fn test_caption_text() {
        assert_eq!(Caption::Manual("hi".into()).text(), Some("hi"));
        assert_eq!(Caption::Unavailable.text(), None);
    }

    #[test]
    fn test_caption_display() {
        assert_eq!(Caption::Generated("x".into()).to_string(), "generated");
        assert_eq!(Caption::Unavailable.to_string(), "unavailable");
    }
}
