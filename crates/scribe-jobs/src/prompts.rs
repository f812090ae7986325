//! Prompt templates for the transformation routines.

use scribe_core::{Comment, SentimentReport, SocialPlatform};

pub const SUMMARY_SYSTEM: &str = "You are an expert at summarizing long-form spoken content. \
Keep every key point, claim and example. Omit filler.";

pub const BLOG_SYSTEM: &str = "You are a professional blog writer who turns video content into \
well-structured articles. Respond with raw JSON only.";

pub const SOCIAL_SYSTEM: &str = "You are a social media strategist writing posts from long-form \
content. Respond with raw JSON only.";

pub const COMMENTS_SYSTEM: &str = "You analyze YouTube comments for a creator. \
Respond with raw JSON only.";

const JSON_ONLY: &str = "Only return raw, valid JSON. Do not wrap it in markdown. Do not explain anything.";

pub fn summary(text: &str) -> String {
    format!(
        "Summarize the following text concisely, keeping the main points and key details.\n\
         ***********************\n{}\n***********************",
        text
    )
}

pub fn blog_outline(summary: &str) -> String {
    format!(
        "Create a detailed outline for a blog post based on this content summary.\n\
         List a title, an introduction, 4 to 7 section headings with the points each covers, \
         and a conclusion.\n\nSummary:\n{}",
        summary
    )
}

pub fn blog_post(summary: &str, outline: &str) -> String {
    format!(
        r#"Write a complete blog post following the outline, using the summary for substance.

Summary:
{summary}

Outline:
{outline}

Output a JSON object of this shape:
{{
  "title": "Post title",
  "sections": [
    {{"type": "heading", "level": 2, "text": "..."}},
    {{"type": "paragraph", "text": "..."}},
    {{"type": "blockquote", "text": "..."}},
    {{"type": "list", "ordered": false, "items": ["..."]}},
    {{"type": "code", "language": "rust", "code": "..."}},
    {{"type": "table", "headers": ["..."], "rows": [["..."]]}}
  ]
}}

{JSON_ONLY}"#
    )
}

fn platform_guidance(platform: SocialPlatform) -> &'static str {
    match platform {
        SocialPlatform::Twitter => {
            "Each post must fit Twitter's 280-character limit. Use at most two relevant hashtags. \
             Vary the tone: informative, witty, bold, inspirational."
        }
        SocialPlatform::Reddit => {
            "Each post needs a descriptive title and a conversational body that invites \
             discussion. Avoid marketing language. Hashtags are usually empty."
        }
        SocialPlatform::LinkedIn => {
            "Write in a professional, insight-driven voice with a strong opening line and \
             short paragraphs. Use up to three hashtags."
        }
        SocialPlatform::Facebook => {
            "Write friendly, approachable posts that encourage comments and shares. \
             Use one or two hashtags at most."
        }
    }
}

pub fn social_posts(platform: SocialPlatform, summary: &str, count: u32) -> String {
    format!(
        r##"Generate exactly {count} unique {name} posts from the content below.
{guidance}
Do not mention "this video" or "this content"; write as the original author.

Content:
"""
{summary}
"""

Output a JSON object of this shape:
{{
  "posts": [
    {{"content": "Post text", "hashtags": ["#example"], "tone": "informative", "title": null}}
  ],
  "count": {count}
}}

{JSON_ONLY}"##,
        name = platform.display_name(),
        guidance = platform_guidance(platform),
    )
}

fn render_comments(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(|c| format!("- {}", c.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn sentiment_batch(comments: &[Comment]) -> String {
    format!(
        r#"Here are the comments:
{comments}

1. Classify each comment as positive, neutral or negative.
2. Return the sentiment distribution as percentages.
3. Write a short summary of the overall sentiment.
4. Pick 3 especially positive comments.
5. Pick up to 10 negative or concerning comments.

Return JSON in exactly this format:
{{
  "summary": "Short summary of trends and tone",
  "distribution": {{"positive": 64.7, "neutral": 23.5, "negative": 11.8}},
  "top_positive": ["..."],
  "top_negative": ["..."]
}}

{JSON_ONLY}"#,
        comments = render_comments(comments)
    )
}

pub fn sentiment_aggregate(partials: &[SentimentReport]) -> String {
    let mut summaries = String::new();
    let mut positive = String::new();
    let mut negative = String::new();
    for (i, report) in partials.iter().enumerate() {
        summaries.push_str(&format!("Batch {}: {}\n", i + 1, report.summary));
        for c in &report.top_positive {
            positive.push_str(&format!("- {}\n", c));
        }
        for c in &report.top_negative {
            negative.push_str(&format!("- {}\n", c));
        }
    }

    format!(
        r#"The comments of one video were analyzed in batches.

Batch summaries:
{summaries}
Candidate positive comments:
{positive}
Candidate negative comments:
{negative}
Write one overall summary, pick the 3 best positive comments and up to 10 of the most
important negative comments from the candidates.

Return JSON in exactly this format:
{{
  "summary": "Overall summary",
  "top_positive": ["..."],
  "top_negative": ["..."]
}}

{JSON_ONLY}"#
    )
}

pub fn ideas_batch(comments: &[Comment]) -> String {
    format!(
        r#"Here are viewer comments on a video:
{comments}

Suggest 5 to 10 ideas for future videos based on what viewers ask for, struggle with or
want to see next. Each idea is one sentence.

Return JSON in exactly this format:
{{"ideas": ["..."]}}

{JSON_ONLY}"#,
        comments = render_comments(comments)
    )
}

pub fn ideas_aggregate(candidates: &[String]) -> String {
    let list = candidates
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"These video ideas were collected from several batches of viewer comments:
{list}

Merge duplicates and near-duplicates, then return the 10 to 20 strongest ideas.

Return JSON in exactly this format:
{{"ideas": ["..."]}}

{JSON_ONLY}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_prompt_names_count_and_platform() {
        let p = social_posts(SocialPlatform::Reddit, "sum", 3);
        assert!(p.contains("exactly 3 unique Reddit posts"));
        assert!(p.contains("\"count\": 3"));
    }

    #[test]
    fn test_social_prompt_keeps_hashtag_example_and_tail() {
        let p = social_posts(SocialPlatform::Twitter, "sum", 2);
        assert!(p.contains(r##""hashtags": ["#example"]"##));
        assert!(p.contains("\"tone\": \"informative\""));
        assert!(p.trim_end().ends_with(JSON_ONLY.trim_end()));
    }

    #[test]
    fn test_comment_prompts_list_comments() {
        let comments = vec![Comment {
            text: "great video".into(),
            author: "a".into(),
        }];
        assert!(sentiment_batch(&comments).contains("- great video"));
        assert!(ideas_batch(&comments).contains("- great video"));
    }

    #[test]
    fn test_blog_prompt_carries_outline() {
        let p = blog_post("the summary", "the outline");
        assert!(p.contains("the summary"));
        assert!(p.contains("the outline"));
        assert!(p.contains("\"sections\""));
    }
}
