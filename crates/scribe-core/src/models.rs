//! Domain models for scribe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// CONTENT SOURCE
// =============================================================================

/// One ingested item: a link, its extracted text, and the artifacts derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentSource {
    pub id: Uuid,
    pub user_id: String,
    pub link: String,
    pub title: String,
    /// Whitespace-normalized transcript. Always set before any job for this
    /// source exists.
    pub raw_text: Option<String>,
    pub blog_ids: Vec<Uuid>,
    pub social_ids: Vec<Uuid>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a content source.
#[derive(Debug, Clone)]
pub struct NewContentSource {
    pub user_id: String,
    pub link: String,
    pub title: String,
    pub raw_text: String,
    pub tags: Vec<String>,
}

/// Which artifact id list an append targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSlot {
    Blog,
    Social,
}

/// A content source together with every job created for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentWithJobs {
    #[serde(flatten)]
    pub content: ContentSource,
    pub jobs: Vec<Job>,
}

/// Request for listing a user's content sources.
#[derive(Debug, Clone)]
pub struct ListContentsRequest {
    pub user_id: String,
    pub limit: i64,
    pub offset: i64,
}

/// Response for listing content sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListContentsResponse {
    pub items: Vec<ContentWithJobs>,
    pub total: i64,
}

// =============================================================================
// JOBS
// =============================================================================

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    /// Set only by administrative action outside the scheduler.
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition may leave this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(Error::Serialization(format!("unknown job status: {}", other))),
        }
    }
}

/// Which transformation a job requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobContext {
    Blog,
    TwitterPost,
    RedditPost,
    LinkedInPost,
    FacebookPost,
    CommentSentimentAnalysis,
    CommentIdeaGeneration,
}

impl JobContext {
    /// Every context, in the order ingestion creates jobs.
    pub const ALL: [JobContext; 7] = [
        JobContext::Blog,
        JobContext::TwitterPost,
        JobContext::RedditPost,
        JobContext::LinkedInPost,
        JobContext::FacebookPost,
        JobContext::CommentSentimentAnalysis,
        JobContext::CommentIdeaGeneration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobContext::Blog => "blog",
            JobContext::TwitterPost => "twitter_post",
            JobContext::RedditPost => "reddit_post",
            JobContext::LinkedInPost => "linked_in_post",
            JobContext::FacebookPost => "facebook_post",
            JobContext::CommentSentimentAnalysis => "comment_sentiment_analysis",
            JobContext::CommentIdeaGeneration => "comment_idea_generation",
        }
    }

    /// The social platform this context produces posts for, if any.
    pub fn platform(&self) -> Option<SocialPlatform> {
        match self {
            JobContext::TwitterPost => Some(SocialPlatform::Twitter),
            JobContext::RedditPost => Some(SocialPlatform::Reddit),
            JobContext::LinkedInPost => Some(SocialPlatform::LinkedIn),
            JobContext::FacebookPost => Some(SocialPlatform::Facebook),
            _ => None,
        }
    }
}

impl fmt::Display for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobContext {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobContext::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::Serialization(format!("unknown job context: {}", s)))
    }
}

/// One requested transformation and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub content_id: Uuid,
    pub user_id: String,
    pub status: JobStatus,
    pub context: JobContext,
    /// Claim predicate; true only once the job has completed.
    pub completed: bool,
    /// Open JSON object: `count`, `processed_at`, routine outputs.
    pub metadata: JsonValue,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Requested post count for social contexts, clamped to at least one.
    pub fn requested_count(&self) -> u32 {
        self.metadata
            .get("count")
            .and_then(JsonValue::as_u64)
            .map(|n| u32::try_from(n.max(1)).unwrap_or(u32::MAX))
            .unwrap_or(crate::defaults::SOCIAL_POST_COUNT)
    }
}

/// Fields required to create a job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub content_id: Uuid,
    pub user_id: String,
    pub context: JobContext,
    pub metadata: JsonValue,
}

/// Terminal outcome handed to the ledger by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Metadata object merged into the job's existing metadata.
    Success(JsonValue),
    Failure(String),
}

// =============================================================================
// COMMENTS
// =============================================================================

/// A single viewer comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub author: String,
}

/// Cached comments for one content source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentSet {
    pub id: Uuid,
    pub content_id: Uuid,
    pub job_id: Option<Uuid>,
    pub comments: Vec<Comment>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// ARTIFACTS
// =============================================================================

/// A derived artifact, persisted as its own record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub id: Uuid,
    pub content_id: Uuid,
    pub job_id: Option<Uuid>,
    pub body: ArtifactBody,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artifact {
    /// Discriminant used for storage and per-type lookup.
    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }
}

/// Payload of an artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactBody {
    Blog(BlogPost),
    Social(SocialArtifact),
    Sentiment(SentimentReport),
    Ideas(VideoIdeas),
}

impl ArtifactBody {
    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactBody::Blog(_) => "blog",
            ArtifactBody::Social(s) => s.platform.context().as_str(),
            ArtifactBody::Sentiment(_) => "sentiment",
            ArtifactBody::Ideas(_) => "ideas",
        }
    }
}

/// A structured blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<BlogSection>,
}

fn default_heading_level() -> u8 {
    2
}

/// One block of a blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlogSection {
    Heading {
        #[serde(default = "default_heading_level")]
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Blockquote {
        text: String,
    },
    List {
        #[serde(default)]
        ordered: bool,
        items: Vec<String>,
    },
    Code {
        #[serde(default)]
        language: String,
        code: String,
    },
    Table {
        headers: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<String>>,
    },
    Image {
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        caption: Option<String>,
    },
    /// Section type the renderer does not know; kept so one odd block does
    /// not reject the whole post.
    #[serde(other)]
    Unknown,
}

/// Platforms served by the social routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Twitter,
    Reddit,
    #[serde(rename = "linked_in")]
    LinkedIn,
    Facebook,
}

impl SocialPlatform {
    pub fn context(&self) -> JobContext {
        match self {
            SocialPlatform::Twitter => JobContext::TwitterPost,
            SocialPlatform::Reddit => JobContext::RedditPost,
            SocialPlatform::LinkedIn => JobContext::LinkedInPost,
            SocialPlatform::Facebook => JobContext::FacebookPost,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Reddit => "Reddit",
            SocialPlatform::LinkedIn => "LinkedIn",
            SocialPlatform::Facebook => "Facebook",
        }
    }
}

/// A single generated social post as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialPost {
    pub content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A social post bound to its platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialArtifact {
    pub platform: SocialPlatform,
    #[serde(flatten)]
    pub post: SocialPost,
}

/// Percentage split of comment sentiment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub negative: f64,
}

impl SentimentDistribution {
    /// Combine per-batch distributions weighted by batch comment count.
    ///
    /// The result is in whole percentages summing to exactly 100, using the
    /// largest-remainder method. Batches with zero weight are ignored; with no
    /// usable signal the result is all neutral.
    pub fn combine(parts: &[(SentimentDistribution, usize)]) -> SentimentDistribution {
        let mut totals = [0.0f64; 3];
        for (dist, weight) in parts {
            let w = *weight as f64;
            totals[0] += dist.positive.max(0.0) * w;
            totals[1] += dist.neutral.max(0.0) * w;
            totals[2] += dist.negative.max(0.0) * w;
        }

        let sum: f64 = totals.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return SentimentDistribution {
                positive: 0.0,
                neutral: 100.0,
                negative: 0.0,
            };
        }

        let exact: Vec<f64> = totals.iter().map(|t| t * 100.0 / sum).collect();
        let mut floors: Vec<u32> = exact.iter().map(|e| e.floor() as u32).collect();
        let mut leftover = 100u32.saturating_sub(floors.iter().sum::<u32>());

        let mut order: Vec<usize> = (0..3).collect();
        order.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
        });
        for idx in order {
            if leftover == 0 {
                break;
            }
            floors[idx] += 1;
            leftover -= 1;
        }

        SentimentDistribution {
            positive: floors[0] as f64,
            neutral: floors[1] as f64,
            negative: floors[2] as f64,
        }
    }

    pub fn total(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }
}

/// Comment sentiment analysis result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentReport {
    pub summary: String,
    pub distribution: SentimentDistribution,
    #[serde(default)]
    pub top_positive: Vec<String>,
    #[serde(default)]
    pub top_negative: Vec<String>,
}

/// Video ideas derived from comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoIdeas {
    pub ideas: Vec<String>,
    pub count: usize,
}

impl VideoIdeas {
    pub fn new(ideas: Vec<String>) -> Self {
        let count = ideas.len();
        Self { ideas, count }
    }
}

/// Fields required to persist an artifact.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub content_id: Uuid,
    pub job_id: Option<Uuid>,
    pub body: ArtifactBody,
}

// =============================================================================
// INGESTION
// =============================================================================

/// Social platform options in an ingestion request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialRequest {
    #[serde(default = "default_true")]
    pub include: bool,
    #[serde(default = "default_social_count")]
    pub count: u32,
}

fn default_true() -> bool {
    true
}

fn default_social_count() -> u32 {
    crate::defaults::SOCIAL_POST_COUNT
}

/// Request to ingest a link and derive artifacts from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    pub link: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub blog: bool,
    #[serde(default)]
    pub twitter: Option<SocialRequest>,
    #[serde(default)]
    pub reddit: Option<SocialRequest>,
    #[serde(default)]
    pub linked_in: Option<SocialRequest>,
    #[serde(default)]
    pub facebook: Option<SocialRequest>,
    #[serde(default)]
    pub comment_sentiment_analysis: bool,
    #[serde(default)]
    pub comment_idea_generation: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IngestRequest {
    /// Social options for a platform, if that platform was requested.
    pub fn social(&self, platform: SocialPlatform) -> Option<SocialRequest> {
        let opt = match platform {
            SocialPlatform::Twitter => self.twitter,
            SocialPlatform::Reddit => self.reddit,
            SocialPlatform::LinkedIn => self.linked_in,
            SocialPlatform::Facebook => self.facebook,
        };
        opt.filter(|s| s.include)
    }

    /// Requested contexts with their initial job metadata, in creation order.
    pub fn requested_jobs(&self) -> Vec<(JobContext, JsonValue)> {
        JobContext::ALL
            .into_iter()
            .filter_map(|ctx| match ctx {
                JobContext::Blog => self.blog.then(|| (ctx, serde_json::json!({}))),
                JobContext::CommentSentimentAnalysis => self
                    .comment_sentiment_analysis
                    .then(|| (ctx, serde_json::json!({}))),
                JobContext::CommentIdeaGeneration => self
                    .comment_idea_generation
                    .then(|| (ctx, serde_json::json!({}))),
                social => {
                    let platform = social.platform()?;
                    self.social(platform)
                        .map(|s| (ctx, serde_json::json!({ "count": s.count })))
                }
            })
            .collect()
    }
}

/// Result of an ingestion call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestResponse {
    pub message: String,
    pub content_id: Uuid,
    pub job_ids: Vec<Uuid>,
}

/// Transcript text as acquired from a source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub text: String,
    /// How the text was obtained, e.g. "captions".
    pub method: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_status_round_trip_strings() {
        for status in [
            JobStatus::Pending,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("running".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_status_serde_snake_case() {
        let s = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(s, "\"in_progress\"");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_job_context_strings() {
        assert_eq!(JobContext::LinkedInPost.as_str(), "linked_in_post");
        assert_eq!(
            "comment_idea_generation".parse::<JobContext>().unwrap(),
            JobContext::CommentIdeaGeneration
        );
        assert!("podcast".parse::<JobContext>().is_err());
        let s = serde_json::to_string(&JobContext::LinkedInPost).unwrap();
        assert_eq!(s, "\"linked_in_post\"");
    }

    #[test]
    fn test_context_platform_mapping() {
        assert_eq!(
            JobContext::RedditPost.platform(),
            Some(SocialPlatform::Reddit)
        );
        assert_eq!(JobContext::Blog.platform(), None);
        for platform in [
            SocialPlatform::Twitter,
            SocialPlatform::Reddit,
            SocialPlatform::LinkedIn,
            SocialPlatform::Facebook,
        ] {
            assert_eq!(platform.context().platform(), Some(platform));
        }
    }

    fn job_with_metadata(metadata: JsonValue) -> Job {
        Job {
            id: Uuid::nil(),
            content_id: Uuid::nil(),
            user_id: "u".into(),
            status: JobStatus::Pending,
            context: JobContext::TwitterPost,
            completed: false,
            metadata,
            error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_requested_count() {
        assert_eq!(job_with_metadata(json!({"count": 3})).requested_count(), 3);
        assert_eq!(job_with_metadata(json!({})).requested_count(), 1);
        assert_eq!(job_with_metadata(json!({"count": 0})).requested_count(), 1);
        assert_eq!(
            job_with_metadata(json!({"count": 4_294_967_296u64})).requested_count(),
            u32::MAX
        );
        assert_eq!(
            job_with_metadata(json!({"count": u64::MAX})).requested_count(),
            u32::MAX
        );
        assert_eq!(
            job_with_metadata(json!({"count": "x"})).requested_count(),
            1
        );
    }

    #[test]
    fn test_blog_section_parsing() {
        let post: BlogPost = serde_json::from_value(json!({
            "title": "T",
            "sections": [
                {"type": "heading", "text": "Intro"},
                {"type": "list", "items": ["a", "b"]},
                {"type": "image", "src": "x.png"},
                {"type": "carousel", "items": []}
            ]
        }))
        .unwrap();

        assert_eq!(
            post.sections[0],
            BlogSection::Heading {
                level: 2,
                text: "Intro".into()
            }
        );
        assert_eq!(
            post.sections[1],
            BlogSection::List {
                ordered: false,
                items: vec!["a".into(), "b".into()]
            }
        );
        assert!(matches!(post.sections[2], BlogSection::Image { .. }));
        assert_eq!(post.sections[3], BlogSection::Unknown);
    }

    #[test]
    fn test_artifact_kind() {
        let social = ArtifactBody::Social(SocialArtifact {
            platform: SocialPlatform::Twitter,
            post: SocialPost {
                content: "hi".into(),
                hashtags: vec![],
                tone: None,
                title: None,
            },
        });
        assert_eq!(social.kind(), "twitter_post");
        assert_eq!(ArtifactBody::Ideas(VideoIdeas::new(vec![])).kind(), "ideas");
    }

    #[test]
    fn test_artifact_body_serde_tagged() {
        let body = ArtifactBody::Ideas(VideoIdeas::new(vec!["one".into()]));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "ideas");
        assert_eq!(value["count"], 1);
        let back: ArtifactBody = serde_json::from_value(value).unwrap();
        assert_eq!(back, body);
    }

    #[test]
    fn test_combine_equal_weights() {
        let a = SentimentDistribution {
            positive: 70.0,
            neutral: 20.0,
            negative: 10.0,
        };
        let b = SentimentDistribution {
            positive: 50.0,
            neutral: 30.0,
            negative: 20.0,
        };
        let combined = SentimentDistribution::combine(&[(a, 10), (b, 10)]);
        assert_eq!(combined.positive, 60.0);
        assert_eq!(combined.neutral, 25.0);
        assert_eq!(combined.negative, 15.0);
        assert_eq!(combined.total(), 100.0);
    }

    #[test]
    fn test_combine_weighted_sums_to_100() {
        let a = SentimentDistribution {
            positive: 33.3,
            neutral: 33.3,
            negative: 33.3,
        };
        let b = SentimentDistribution {
            positive: 10.0,
            neutral: 0.0,
            negative: 95.0,
        };
        let combined = SentimentDistribution::combine(&[(a, 7), (b, 3)]);
        assert_eq!(combined.total(), 100.0);
        assert!(combined.negative > combined.neutral);
    }

    #[test]
    fn test_combine_no_signal_is_neutral() {
        let combined = SentimentDistribution::combine(&[]);
        assert_eq!(combined.neutral, 100.0);
        let zero = SentimentDistribution::default();
        let combined = SentimentDistribution::combine(&[(zero, 5)]);
        assert_eq!(combined.total(), 100.0);
    }

    #[test]
    fn test_requested_jobs_order_and_metadata() {
        let req = IngestRequest {
            link: "https://youtu.be/abc".into(),
            blog: true,
            reddit: Some(SocialRequest {
                include: true,
                count: 2,
            }),
            twitter: Some(SocialRequest {
                include: true,
                count: 3,
            }),
            facebook: Some(SocialRequest {
                include: false,
                count: 5,
            }),
            comment_idea_generation: true,
            ..Default::default()
        };

        let jobs = req.requested_jobs();
        let contexts: Vec<_> = jobs.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            contexts,
            vec![
                JobContext::Blog,
                JobContext::TwitterPost,
                JobContext::RedditPost,
                JobContext::CommentIdeaGeneration
            ]
        );
        assert_eq!(jobs[1].1, json!({"count": 3}));
        assert_eq!(jobs[2].1, json!({"count": 2}));
        assert_eq!(jobs[0].1, json!({}));
    }

    #[test]
    fn test_ingest_request_deserialize_defaults() {
        let req: IngestRequest = serde_json::from_value(json!({
            "link": "https://youtu.be/abc",
            "twitter": {"count": 2}
        }))
        .unwrap();
        assert!(!req.blog);
        assert_eq!(
            req.social(SocialPlatform::Twitter),
            Some(SocialRequest {
                include: true,
                count: 2
            })
        );
        assert_eq!(req.social(SocialPlatform::Reddit), None);
    }
}
