//! End-to-end pipeline runs against mocked feeds and a mocked LLM.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use vidforge_core::{SourcesFile, TrendSource};
use vidforge_ideas::{
    ChatClient, DedupEntry, DedupLog, HttpSettings, IdeaOptimizer, IdeaPipeline, MemoryDedupLog,
    SourceClient, SourceEndpoints,
};
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
}

fn pipeline(server: &MockServer, chat: Option<ChatClient>, batch_size: usize) -> IdeaPipeline {
    let settings = HttpSettings {
        timeout_secs: 5,
        max_retries: 0,
        retry_backoff_ms: 0,
        user_agent: "vidforge-test".to_owned(),
    };
    let sources = SourceClient::with_endpoints(&settings, &SourceEndpoints::all_at(&server.uri()))
        .expect("client construction should not fail");
    IdeaPipeline::new(sources, IdeaOptimizer::new(chat, 10), SourcesFile::default())
        .with_batch_size(batch_size)
}

fn chat(server: &MockServer, timeout_secs: u64) -> ChatClient {
    ChatClient::with_base_url("test-key", "test-model", timeout_secs, &server.uri())
        .expect("client construction should not fail")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    })
}

/// Every topic listed in a scoring prompt, as `(index, title)`.
fn prompt_topics(request: &Request) -> Vec<(usize, String)> {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    prompt
        .lines()
        .filter_map(|line| {
            let (index, rest) = line.split_once(". [")?;
            let index: usize = index.trim().parse().ok()?;
            let (_, title) = rest.split_once("] ")?;
            Some((index, title.split(" | ").next()?.to_owned()))
        })
        .collect()
}

/// Replies with a fixed viral score per original topic title, whatever order
/// the prompt lists them in.
struct ScoreByTitle(Vec<(&'static str, u8)>);

impl Respond for ScoreByTitle {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let ideas: Vec<_> = prompt_topics(request)
            .into_iter()
            .filter_map(|(index, title)| {
                let (_, score) = self.0.iter().find(|(t, _)| *t == title)?;
                Some(serde_json::json!({
                    "index": index,
                    "title": format!("{title}: 5 things nobody tells you"),
                    "hook": format!("Stop ignoring {title}"),
                    "keywords": [title.to_lowercase()],
                    "viral_score": score
                }))
            })
            .collect();
        let content = format!("```json\n{}\n```", serde_json::json!({ "ideas": ideas }));
        ResponseTemplate::new(200).set_body_json(completion(&content))
    }
}

/// Rewrites every topic differently on each call, as a sampling LLM would.
/// Docker Tips always scores highest.
#[derive(Default)]
struct RewriteEachCall(AtomicUsize);

impl Respond for RewriteEachCall {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let call = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        let ideas: Vec<_> = prompt_topics(request)
            .into_iter()
            .map(|(index, title)| {
                let score = if title == "Docker Tips" { 97 } else { 90 };
                serde_json::json!({
                    "index": index,
                    "title": format!("{title} variant {call}"),
                    "hook": format!("Hook {call}"),
                    "keywords": [format!("kw{call}")],
                    "viral_score": score
                })
            })
            .collect();
        let content = format!("```json\n{}\n```", serde_json::json!({ "ideas": ideas }));
        ResponseTemplate::new(200).set_body_json(completion(&content))
    }
}

/// Three feeds with one story each: Python Tricks (Dev.to, 50 reactions),
/// Python Hacks (Reddit, 40 upvotes), Docker Tips (Hacker News, 90 points).
async fn mount_three_sources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "title": "Python Tricks", "public_reactions_count": 50 }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/programming/top.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "children": [ { "data": { "title": "Python Hacks", "score": 40, "is_self": true } } ] }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([7])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/item/7.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "story", "title": "Docker Tips", "score": 90
        })))
        .mount(server)
        .await;
}

async fn mount_scoring_llm(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(bearer_token("test-key"))
        .respond_with(ScoreByTitle(vec![
            ("Python Tricks", 91),
            ("Python Hacks", 88),
            ("Docker Tips", 97),
        ]))
        .mount(server)
        .await;
}

#[tokio::test]
async fn optimizer_scores_pick_docker_tips() {
    let feeds = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_three_sources(&feeds).await;
    mount_scoring_llm(&llm).await;

    let mut log = MemoryDedupLog::new();
    let report = pipeline(&feeds, Some(chat(&llm, 5)), 1)
        .run(&mut log, now())
        .await;

    assert!(report.optimized);
    assert!(!report.used_static_fallback);
    assert_eq!(report.fetched, 3);
    assert_eq!(report.unavailable_sources.len(), 3);

    let chosen = &report.selection.chosen;
    assert!(chosen.title.starts_with("Docker Tips"), "{}", chosen.title);
    assert_eq!(chosen.viral_score, 97);
    assert!(chosen.optimized);
    assert_eq!(chosen.source(), Some(TrendSource::HackerNews));

    let alternates: Vec<_> = report
        .selection
        .alternates
        .iter()
        .map(|i| i.viral_score)
        .collect();
    assert_eq!(alternates, vec![91, 88]);

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].viral_score, 97);
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn optimizer_timeout_falls_back_below_the_optimized_band() {
    let feeds = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_three_sources(&feeds).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("{\"ideas\": []}"))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&llm)
        .await;

    let client = chat(&llm, 1).with_retries(3, 0);
    let mut log = MemoryDedupLog::new();
    let report = pipeline(&feeds, Some(client), 1).run(&mut log, now()).await;

    assert!(!report.optimized);
    let chosen = &report.selection.chosen;
    assert!(!chosen.optimized);
    assert!(chosen.viral_score < 85, "score {}", chosen.viral_score);
    assert!(chosen.hook.starts_with("Breaking: "));
    assert!(report.selection.picks().all(|i| !i.optimized && i.viral_score < 85));
}

#[tokio::test]
async fn llm_auth_failure_falls_back() {
    let feeds = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_three_sources(&feeds).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&llm)
        .await;

    let report = pipeline(&feeds, Some(chat(&llm, 5)), 1)
        .preview(&MemoryDedupLog::new(), now())
        .await;

    assert!(!report.optimized);
    assert!(!report.selection.chosen.optimized);
}

#[tokio::test]
async fn no_sources_select_a_builtin_idea() {
    let feeds = MockServer::start().await;

    let mut log = MemoryDedupLog::new();
    let report = pipeline(&feeds, None, 1).run(&mut log, now()).await;

    assert!(report.used_static_fallback);
    assert_eq!(report.unavailable_sources.len(), 6);
    assert_eq!(
        report.selection.chosen.title,
        "Database Optimization Will Change Everything"
    );
    assert!(report.selection.chosen.source_candidate.is_none());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].source, None);
}

#[tokio::test]
async fn empty_feeds_select_a_builtin_idea() {
    let feeds = MockServer::start().await;
    for (route, body) in [
        ("/search/repositories", serde_json::json!({ "items": [] })),
        ("/v0/topstories.json", serde_json::json!([])),
        ("/api/articles", serde_json::json!([])),
        ("/r/programming/top.json", serde_json::json!({ "data": { "children": [] } })),
        ("/2.3/tags", serde_json::json!({ "items": [] })),
        ("/hottest.json", serde_json::json!([])),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&feeds)
            .await;
    }

    let report = pipeline(&feeds, None, 1)
        .preview(&MemoryDedupLog::new(), now())
        .await;

    assert!(report.used_static_fallback);
    assert!(report.unavailable_sources.is_empty());
    assert_eq!(report.fetched, 0);
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn fully_used_log_relaxes_the_filter() {
    let feeds = MockServer::start().await;

    let entries = vidforge_ideas::static_ideas()
        .iter()
        .map(|idea| DedupEntry::for_idea(idea, now()))
        .collect();
    let mut log = MemoryDedupLog::with_entries(entries);

    let report = pipeline(&feeds, None, 1).run(&mut log, now()).await;

    assert!(report.selection.relaxed);
    assert!(!report.selection.chosen.title.is_empty());
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn second_run_does_not_repeat_the_first_choice() {
    let feeds = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_three_sources(&feeds).await;
    mount_scoring_llm(&llm).await;

    let pipeline = pipeline(&feeds, Some(chat(&llm, 5)), 1);
    let mut log = MemoryDedupLog::new();
    let first = pipeline.run(&mut log, now()).await;
    let second = pipeline.run(&mut log, now()).await;

    assert_eq!(first.selection.chosen.viral_score, 97);
    assert_eq!(second.selection.chosen.viral_score, 91);
    assert!(!second.selection.relaxed);
    assert_eq!(log.snapshot().unwrap().len(), 2);
}

#[tokio::test]
async fn changed_rewrite_of_a_chosen_topic_is_not_picked_again() {
    let feeds = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_three_sources(&feeds).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(RewriteEachCall::default())
        .mount(&llm)
        .await;

    let pipeline = pipeline(&feeds, Some(chat(&llm, 5)), 1);
    let mut log = MemoryDedupLog::new();
    let first = pipeline.run(&mut log, now()).await;
    let second = pipeline.run(&mut log, now()).await;

    assert_eq!(first.selection.chosen.title, "Docker Tips variant 1");
    let second_source = second.selection.chosen.source_candidate.as_ref().unwrap();
    assert_ne!(second_source.title, "Docker Tips");
    assert_ne!(second.selection.chosen.source(), Some(TrendSource::HackerNews));
    assert!(second.selection.chosen.title.ends_with("variant 2"));
    assert!(!second.selection.relaxed);
}

#[tokio::test]
async fn batch_runs_emit_multiple_records() {
    let feeds = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_three_sources(&feeds).await;
    mount_scoring_llm(&llm).await;

    let mut log = MemoryDedupLog::new();
    let report = pipeline(&feeds, Some(chat(&llm, 5)), 2)
        .run(&mut log, now())
        .await;

    let scores: Vec<_> = report.records.iter().map(|r| r.viral_score).collect();
    assert_eq!(scores, vec![97, 91]);
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn identical_inputs_give_identical_selections() {
    let feeds = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_three_sources(&feeds).await;
    mount_scoring_llm(&llm).await;

    let pipeline = pipeline(&feeds, Some(chat(&llm, 5)), 1);
    let log = MemoryDedupLog::new();
    let first = pipeline.preview(&log, now()).await;
    let second = pipeline.preview(&log, now()).await;

    assert_eq!(first.selection, second.selection);
    assert_eq!(first.records, second.records);
    assert!(log.is_empty(), "preview must not write the log");
}
