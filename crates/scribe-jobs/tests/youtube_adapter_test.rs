use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scribe_jobs::{CommentSource, Error, TranscriptSource, YoutubeClient, YoutubeConfig};

const VTT: &str = "WEBVTT\nKind: captions\nLanguage: en\n\n\
00:00:00.000 --> 00:00:02.000\nHello <c>and</c> welcome\n\n\
00:00:02.000 --> 00:00:04.000\nHello <c>and</c> welcome\n\n\
00:00:04.000 --> 00:00:06.000\ntoday we talk about Rust &amp; memory\n";

fn client(server: &MockServer, api_key: Option<&str>) -> YoutubeClient {
    YoutubeClient::new(YoutubeConfig {
        api_url: server.uri(),
        timedtext_url: format!("{}/timedtext", server.uri()),
        api_key: api_key.map(str::to_string),
        page_size: 2,
        ..Default::default()
    })
    .unwrap()
}

fn thread(text: &str, author: &str) -> serde_json::Value {
    json!({
        "snippet": {
            "topLevelComment": {
                "snippet": {
                    "textOriginal": text,
                    "textDisplay": text,
                    "authorDisplayName": author
                }
            }
        }
    })
}

#[tokio::test]
async fn test_fetch_transcript_from_captions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("v", "dQw4w9WgXcQ"))
        .and(query_param("lang", "en"))
        .and(query_param("fmt", "vtt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VTT))
        .expect(1)
        .mount(&server)
        .await;

    let transcript = client(&server, None)
        .fetch("https://youtu.be/dQw4w9WgXcQ")
        .await
        .unwrap();

    assert_eq!(transcript.method, "captions");
    assert_eq!(
        transcript.text,
        "Hello and welcome today we talk about Rust & memory"
    );
}

#[tokio::test]
async fn test_missing_captions_is_transcript_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TranscriptUnavailable(_)));
}

#[tokio::test]
async fn test_comments_follow_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [thread("third", "carol")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "dQw4w9WgXcQ"))
        .and(query_param("key", "test-key"))
        .and(query_param("maxResults", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [thread("first", "alice"), thread("  ", "nobody"), thread("second", "bob")],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let comments = client(&server, Some("test-key"))
        .fetch_all("dQw4w9WgXcQ")
        .await
        .unwrap();

    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(comments[0].author, "alice");
}

#[tokio::test]
async fn test_comments_disabled_yields_empty_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "errors": [{"reason": "commentsDisabled"}]
            }
        })))
        .mount(&server)
        .await;

    let comments = client(&server, Some("test-key"))
        .fetch_all("dQw4w9WgXcQ")
        .await
        .unwrap();
    assert!(comments.is_empty());
}

#[tokio::test]
async fn test_quota_error_is_infrastructure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
        .mount(&server)
        .await;

    let err = client(&server, Some("test-key"))
        .fetch_all("dQw4w9WgXcQ")
        .await
        .unwrap_err();
    assert!(err.is_infrastructure());
}

#[tokio::test]
async fn test_comments_without_api_key_is_config_error() {
    let server = MockServer::start().await;

    let err = client(&server, None)
        .fetch_all("dQw4w9WgXcQ")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
