//! End-to-end sweeps against a scripted GraphQL server.
//!
//! These tests run the real gateway, driver, and CSV sink together, with
//! wiremock playing the API: range counts over the cap force bisections,
//! cursors chain pages, and persistent server errors exercise failure
//! isolation.

use std::time::Duration;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pullsheet::github::rate_limit::ThrottlePolicy;
use pullsheet::github::retry::RetryPolicy;
use pullsheet::{
    ApiEndpoint, CancelFlag, CsvSink, GraphqlGateway, NoopProgressSink, PersonalAccessToken,
    RangeSweep, RepositoryId, SweepSummary, TimeRange,
};

const JAN_1: i64 = 1_577_836_800;
const DAY: i64 = 86_400;

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).expect("timestamp should be valid")
}

fn window(start: i64, end: i64) -> TimeRange {
    TimeRange::new(at(start), at(end)).expect("range should be valid")
}

fn gateway_for(server: &MockServer) -> GraphqlGateway {
    let endpoint = ApiEndpoint::parse(&format!("{}/graphql", server.uri()))
        .expect("endpoint should be valid");
    let token = PersonalAccessToken::new("test-token").expect("token should be valid");
    let repository = RepositoryId::new("owner", "repo").expect("repository id should be valid");
    let retry = RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        max_jitter: Duration::ZERO,
    };
    GraphqlGateway::with_policies(
        token,
        repository,
        endpoint,
        CancelFlag::new(),
        retry,
        ThrottlePolicy::default(),
    )
    .expect("gateway should build")
}

fn node(number: u64) -> Value {
    json!({
        "number": number,
        "title": format!("change {number}"),
        "createdAt": "2020-01-01T10:00:00Z",
        "mergedAt": null,
        "author": { "__typename": "User" },
        "baseRefName": "main",
        "comments": { "totalCount": 1 },
        "additions": 3,
        "deletions": 1,
    })
}

fn search_response(total: u64, numbers: &[u64], cursor: Option<&str>) -> Value {
    json!({
        "data": {
            "rateLimit": {
                "limit": 5000,
                "cost": 1,
                "remaining": 4900,
                "resetAt": "2020-01-01T00:00:00Z",
            },
            "search": {
                "issueCount": total,
                "pageInfo": {
                    "hasNextPage": cursor.is_some(),
                    "endCursor": cursor,
                },
                "nodes": numbers.iter().copied().map(node).collect::<Vec<_>>(),
            },
        },
    })
}

async fn mount_page(
    server: &MockServer,
    filter: &str,
    after: Value,
    response: Value,
) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": {
                "searchQuery": format!("repo:owner/repo is:pr created:{filter}"),
                "after": after,
            },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

async fn run_to_file(server: &MockServer, sweep_window: TimeRange) -> (SweepSummary, String) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let output = Utf8PathBuf::from_path_buf(dir.path().join("pulls.csv"))
        .expect("temp path should be UTF-8");
    let gateway = gateway_for(server);
    let mut sink = CsvSink::create(&output).expect("sink should build");
    let sweep = RangeSweep::new(&gateway, &NoopProgressSink, CancelFlag::new());
    let summary = sweep
        .run(sweep_window, &mut sink)
        .await
        .expect("sweep should run");
    drop(sink);
    let csv = std::fs::read_to_string(&output).expect("output file should be readable");
    (summary, csv)
}

fn row_numbers(csv: &str) -> Vec<String> {
    csv.lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap_or_default().to_owned())
        .collect()
}

#[tokio::test]
async fn two_day_window_bisects_once_and_writes_every_page() {
    let server = MockServer::start().await;

    // Whole window over the cap: bisect into two days.
    mount_page(
        &server,
        "2020-01-01T00:00:00Z..2020-01-02T23:59:59Z",
        Value::Null,
        search_response(1700, &[0], None),
    )
    .await;
    // Day one still over the cap: bisect into half-days.
    mount_page(
        &server,
        "2020-01-01T00:00:00Z..2020-01-01T23:59:59Z",
        Value::Null,
        search_response(1200, &[0], None),
    )
    .await;
    mount_page(
        &server,
        "2020-01-01T00:00:00Z..2020-01-01T11:59:59Z",
        Value::Null,
        search_response(600, &[1, 2, 3], None),
    )
    .await;
    mount_page(
        &server,
        "2020-01-01T12:00:00Z..2020-01-01T23:59:59Z",
        Value::Null,
        search_response(600, &[4, 5, 6], None),
    )
    .await;
    // Day two fits and pages twice.
    mount_page(
        &server,
        "2020-01-02T00:00:00Z..2020-01-02T23:59:59Z",
        Value::Null,
        search_response(500, &[7, 8], Some("d2c1")),
    )
    .await;
    mount_page(
        &server,
        "2020-01-02T00:00:00Z..2020-01-02T23:59:59Z",
        json!("d2c1"),
        search_response(500, &[9], None),
    )
    .await;

    let (summary, csv) = run_to_file(&server, window(JAN_1, JAN_1 + 2 * DAY)).await;

    assert!(summary.failed.is_empty());
    assert!(!summary.interrupted);
    assert_eq!(summary.ranges_completed, 3);
    assert_eq!(summary.records_written, 9);
    assert_eq!(
        csv.lines().next(),
        Some("number,title,created_at,merged_at,user.type,base.ref,comments,additions,deletions")
    );
    assert_eq!(
        row_numbers(&csv),
        vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]
    );
}

#[tokio::test]
async fn persistent_failures_in_one_range_do_not_abort_the_others() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "2020-01-01T00:00:00Z..2020-01-02T23:59:59Z",
        Value::Null,
        search_response(1500, &[0], None),
    )
    .await;
    // First half: the server keeps failing until the budget runs out.
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": {
                "searchQuery":
                    "repo:owner/repo is:pr created:2020-01-01T00:00:00Z..2020-01-01T23:59:59Z",
            },
        })))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(5)
        .mount(&server)
        .await;
    // Second half succeeds.
    mount_page(
        &server,
        "2020-01-02T00:00:00Z..2020-01-02T23:59:59Z",
        Value::Null,
        search_response(10, &[41, 42], None),
    )
    .await;

    let (summary, csv) = run_to_file(&server, window(JAN_1, JAN_1 + 2 * DAY)).await;

    assert!(!summary.is_complete());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.records_written, 2);
    let failure = summary.failed.first().expect("failure should be recorded");
    assert!(failure.reason.contains("giving up after 5 attempts"));
    assert_eq!(row_numbers(&csv), vec!["41", "42"]);
}

#[tokio::test]
async fn rerunning_the_same_window_yields_the_same_row_set() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "2020-01-01T00:00:00Z..2020-01-01T23:59:59Z",
        Value::Null,
        search_response(3, &[5, 6], Some("c1")),
    )
    .await;
    mount_page(
        &server,
        "2020-01-01T00:00:00Z..2020-01-01T23:59:59Z",
        json!("c1"),
        search_response(3, &[7], None),
    )
    .await;

    let (first_summary, first_csv) = run_to_file(&server, window(JAN_1, JAN_1 + DAY)).await;
    let (second_summary, second_csv) = run_to_file(&server, window(JAN_1, JAN_1 + DAY)).await;

    assert!(first_summary.is_complete());
    assert!(second_summary.is_complete());
    let mut first_rows = row_numbers(&first_csv);
    let mut second_rows = row_numbers(&second_csv);
    first_rows.sort();
    second_rows.sort();
    assert_eq!(first_rows, second_rows);
}
