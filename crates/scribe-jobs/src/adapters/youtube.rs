//! YouTube transcript and comment acquisition.
//!
//! Transcripts come from the timed-text endpoint as WebVTT; comments come
//! from the Data API v3 `commentThreads` listing, paginated with
//! `nextPageToken`.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use scribe_core::{
    defaults, Comment, CommentSource, Error, Result, Transcript, TranscriptSource,
};

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{6,})",
    )
    .unwrap()
});

static VTT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Extract the video id from any common YouTube link shape.
///
/// A bare 11-character id is accepted as-is.
pub fn extract_video_id(link: &str) -> Option<String> {
    let link = link.trim();
    if let Some(caps) = VIDEO_ID.captures(link) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    let bare = link.len() == 11
        && link
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    bare.then(|| link.to_string())
}

/// Flatten a WebVTT document into plain caption text.
///
/// Header, NOTE and STYLE blocks are dropped along with cue identifiers,
/// timing lines and inline markup. Auto-generated captions repeat each line
/// across consecutive cues, so consecutive duplicate lines are collapsed.
pub fn parse_webvtt(body: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for block in body.replace("\r\n", "\n").split("\n\n") {
        let mut block_lines = block.lines();
        // Only cue blocks carry a timing line; everything before it is the cue id.
        if !block_lines.any(|l| l.contains("-->")) {
            continue;
        }
        for raw in block_lines {
            let text = decode_entities(VTT_TAG.replace_all(raw, "").trim());
            if text.is_empty() {
                continue;
            }
            if lines.last().map(|l| l == &text).unwrap_or(false) {
                continue;
            }
            lines.push(text);
        }
    }

    lines.join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Configuration for the YouTube client.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `YT_GOOGLE_API_KEY` | (none) | Data API key, required for comments |
/// | `YOUTUBE_API_URL` | `https://www.googleapis.com/youtube/v3` | Data API base |
/// | `YOUTUBE_TIMEDTEXT_URL` | `https://www.youtube.com/api/timedtext` | Captions endpoint |
/// | `TRANSCRIPT_LANGUAGE` | `en` | Caption language |
/// | `COMMENTS_MAX` | `2000` | Stop paginating after this many comments |
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub api_url: String,
    pub timedtext_url: String,
    pub api_key: Option<String>,
    pub language: String,
    pub comments_max: usize,
    pub page_size: u32,
    pub timeout_seconds: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::YOUTUBE_API_URL.to_string(),
            timedtext_url: defaults::YOUTUBE_TIMEDTEXT_URL.to_string(),
            api_key: None,
            language: defaults::TRANSCRIPT_LANGUAGE.to_string(),
            comments_max: defaults::COMMENTS_MAX,
            page_size: defaults::COMMENTS_PAGE_SIZE,
            timeout_seconds: 30,
        }
    }
}

impl YoutubeConfig {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            api_url: std::env::var("YOUTUBE_API_URL").unwrap_or(base.api_url),
            timedtext_url: std::env::var("YOUTUBE_TIMEDTEXT_URL").unwrap_or(base.timedtext_url),
            api_key: std::env::var("YT_GOOGLE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            language: std::env::var("TRANSCRIPT_LANGUAGE").unwrap_or(base.language),
            comments_max: std::env::var("COMMENTS_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.comments_max),
            ..base
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadList {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_original: Option<String>,
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    author_display_name: String,
}

/// HTTP client for YouTube captions and comments.
pub struct YoutubeClient {
    client: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(YoutubeConfig::from_env())
    }

    pub fn config(&self) -> &YoutubeConfig {
        &self.config
    }

    async fn fetch_page(
        &self,
        api_key: &str,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<Option<CommentThreadList>> {
        let url = format!(
            "{}/commentThreads",
            self.config.api_url.trim_end_matches('/')
        );
        let page_size = self.config.page_size.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", page_size.as_str()),
            ("textFormat", "plainText"),
            ("key", api_key),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            if body.contains("commentsDisabled") {
                return Ok(None);
            }
            return Err(Error::Request(format!("YouTube API returned 403: {}", body)));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("video {}", video_id)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "YouTube API returned {}: {}",
                status, body
            )));
        }

        let page: CommentThreadList = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Invalid commentThreads response: {}", e)))?;
        Ok(Some(page))
    }
}

#[async_trait]
impl TranscriptSource for YoutubeClient {
    async fn fetch(&self, link: &str) -> Result<Transcript> {
        let video_id = extract_video_id(link)
            .ok_or_else(|| Error::InvalidInput(format!("Not a YouTube link: {}", link)))?;

        let response = self
            .client
            .get(&self.config.timedtext_url)
            .query(&[
                ("v", video_id.as_str()),
                ("lang", self.config.language.as_str()),
                ("fmt", "vtt"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::TranscriptUnavailable(format!(
                "captions for {} returned {}",
                video_id,
                response.status()
            )));
        }

        let body = response.text().await?;
        let text = parse_webvtt(&body);
        if text.is_empty() {
            return Err(Error::TranscriptUnavailable(format!(
                "no captions for {}",
                video_id
            )));
        }

        info!(
            subsystem = "jobs",
            component = "youtube",
            op = "transcript",
            video_id = %video_id,
            chars = text.len(),
            "Fetched transcript"
        );
        Ok(Transcript {
            text,
            method: "captions".to_string(),
        })
    }
}

#[async_trait]
impl CommentSource for YoutubeClient {
    async fn fetch_all(&self, video_id: &str) -> Result<Vec<Comment>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("YT_GOOGLE_API_KEY is not set".to_string()))?;

        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let Some(page) = self
                .fetch_page(api_key, video_id, page_token.as_deref())
                .await?
            else {
                warn!(
                    subsystem = "jobs",
                    component = "youtube",
                    op = "comments",
                    video_id,
                    "Comments are disabled for this video"
                );
                break;
            };
            pages += 1;

            comments.extend(page.items.into_iter().filter_map(|thread| {
                let s = thread.snippet.top_level_comment.snippet;
                let text = s.text_original.unwrap_or(s.text_display);
                let text = text.trim().to_string();
                (!text.is_empty()).then(|| Comment {
                    text,
                    author: s.author_display_name,
                })
            }));

            if comments.len() >= self.config.comments_max {
                comments.truncate(self.config.comments_max);
                break;
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            subsystem = "jobs",
            component = "youtube",
            op = "comments",
            video_id,
            pages,
            comment_count = comments.len(),
            "Fetched comments"
        );
        Ok(comments)
    }
}
