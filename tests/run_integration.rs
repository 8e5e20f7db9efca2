use httpmock::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use wlm::config::RunSettings;
use wlm::error::{ErrorCode, ErrorKind, Result, WlmError};
use wlm::fetch::{Fetcher, HttpFetcher, Timing};
use wlm::measure::{MeasureRequest, WebsiteMeasure};
use wlm::notify::Notifier;
use wlm::output::Logger;
use wlm::report::RESULT_OUTPUT_FILENAME;

/// Fetcher that answers with fixed load times and records every requested URL in order.
struct ScriptedFetcher {
    base: Instant,
    millis: HashMap<String, u64>,
    requested: RefCell<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(entries: &[(&str, u64)]) -> Self {
        Self {
            base: Instant::now(),
            millis: entries.iter().map(|(u, ms)| (u.to_string(), *ms)).collect(),
            requested: RefCell::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, url: &str) -> Result<Timing> {
        self.requested.borrow_mut().push(url.to_string());
        match self.millis.get(url) {
            Some(ms) => Ok(Timing {
                start: self.base,
                end: self.base + Duration::from_millis(*ms),
            }),
            None => Err(WlmError::fetch(ErrorCode::E403, format!("{} refused the connection", url))),
        }
    }
}

/// Notifier that records every call, optionally failing each one.
struct RecordingNotifier {
    channel: &'static str,
    fail: bool,
    calls: RefCell<Vec<(usize, usize, Option<String>)>>,
}

impl RecordingNotifier {
    fn new(channel: &'static str) -> Self {
        Self { channel, fail: false, calls: RefCell::new(Vec::new()) }
    }

    fn failing(channel: &'static str) -> Self {
        Self { fail: true, ..Self::new(channel) }
    }
}

impl Notifier for RecordingNotifier {
    fn channel(&self) -> &'static str {
        self.channel
    }

    fn send(&self, place: usize, total: usize, recipient: Option<&str>) -> Result<String> {
        self.calls.borrow_mut().push((place, total, recipient.map(str::to_string)));
        if self.fail {
            return Err(WlmError::transport(ErrorCode::E701, "relay unavailable".to_string()));
        }
        Ok(recipient.unwrap_or("default").to_string())
    }
}

fn settings(dir: &Path) -> RunSettings {
    RunSettings {
        output_dir: dir.to_path_buf(),
        timeout: Duration::from_secs(5),
        sms_factor: 2,
    }
}

fn request(benchmark: &str, competitors: &[&str]) -> MeasureRequest {
    MeasureRequest {
        benchmark: benchmark.to_string(),
        competitors: competitors.iter().map(|c| c.to_string()).collect(),
        mail: None,
        phone_number: None,
    }
}

const MINE: &str = "https://mine.example.com";
const RIVAL_A: &str = "https://rival-a.example.com";
const RIVAL_B: &str = "https://rival-b.example.com";

#[test]
fn test_slow_benchmark_gets_mail_and_sms() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 4000), (RIVAL_A, 1000), (RIVAL_B, 3900)]);
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let outcome = app.run(&request(MINE, &[RIVAL_A, RIVAL_B])).unwrap();

    assert_eq!(fetcher.requested(), [MINE, RIVAL_A, RIVAL_B]);
    assert_eq!(outcome.ranked.benchmark_rank(), 3);
    assert!(outcome.decision.email);
    assert!(outcome.decision.sms);
    assert_eq!(mail.calls.borrow().as_slice(), &[(3, 3, None)]);
    assert_eq!(sms.calls.borrow().as_slice(), &[(3, 3, None)]);
    assert_eq!(outcome.sent.len(), 2);
    assert!(outcome.notification_errors.is_empty());
    assert_eq!(outcome.report.comparison_result, "Your page is 3 of 3 tested pages");
}

#[test]
fn test_fastest_benchmark_notifies_nobody() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 2000), (RIVAL_A, 2500), (RIVAL_B, 3000)]);
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let outcome = app.run(&request(MINE, &[RIVAL_A, RIVAL_B])).unwrap();

    assert_eq!(outcome.ranked.benchmark_rank(), 1);
    assert!(!outcome.decision.notifies());
    assert!(mail.calls.borrow().is_empty());
    assert!(sms.calls.borrow().is_empty());
}

#[test]
fn test_mail_only_and_recipient_overrides_pass_through() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 1500), (RIVAL_A, 1000)]);
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");

    let mut req = request(MINE, &[RIVAL_A]);
    req.mail = Some("me@example.com".to_string());
    req.phone_number = Some("123-456-789".to_string());

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let outcome = app.run(&req).unwrap();

    assert!(outcome.decision.email);
    assert!(!outcome.decision.sms);
    assert_eq!(mail.calls.borrow().as_slice(), &[(2, 2, Some("me@example.com".to_string()))]);
    assert!(sms.calls.borrow().is_empty());
    assert_eq!(outcome.sent, vec![("mail", "me@example.com".to_string())]);
}

#[test]
fn test_result_file_holds_ranked_lines_then_result_data() {
    let dir = TempDir::new().unwrap();
    let stale = dir.path().join(RESULT_OUTPUT_FILENAME);
    fs::write(&stale, "1. | time: 9.999 | url: https://old.example.com\n").unwrap();

    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 300), (RIVAL_A, 100), (RIVAL_B, 200)]);
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let outcome = app.run(&request(MINE, &[RIVAL_A, RIVAL_B])).unwrap();

    assert_eq!(outcome.result_file, stale);
    let content = fs::read_to_string(&stale).unwrap();
    assert!(!content.contains("old.example.com"));

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3 + 2);
    assert_eq!(lines[0], format!("1. | time: 0.100 | url: {}", RIVAL_A));
    assert_eq!(lines[1], format!("2. | time: 0.200 | url: {}", RIVAL_B));
    assert_eq!(lines[2], format!("3. | time: 0.300 | url: {}", MINE));
    assert_eq!(lines[3], "comparison_result:\t\tYour page is 3 of 3 tested pages");
    assert!(lines[4].starts_with("comparison_date:\t\t"));
}

#[test]
fn test_transport_failures_do_not_abort() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 4000), (RIVAL_A, 1000)]);
    let mail = RecordingNotifier::failing("mail");
    let sms = RecordingNotifier::new("sms");

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let outcome = app.run(&request(MINE, &[RIVAL_A])).unwrap();

    assert_eq!(outcome.notification_errors.len(), 1);
    assert_eq!(outcome.notification_errors[0].kind, ErrorKind::Transport);
    assert_eq!(sms.calls.borrow().len(), 1);
    assert_eq!(outcome.sent, vec![("sms", "default".to_string())]);
    assert!(dir.path().join(RESULT_OUTPUT_FILENAME).exists());
}

#[test]
fn test_fetch_failure_aborts_without_notifying() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 4000), (RIVAL_A, 1000)]);
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let err = app
        .run(&request(MINE, &[RIVAL_A, "https://down.example.com", RIVAL_B]))
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::E403);
    assert!(err.is_fatal());
    assert_eq!(fetcher.requested(), [MINE, RIVAL_A, "https://down.example.com"]);
    assert!(mail.calls.borrow().is_empty());
    assert!(sms.calls.borrow().is_empty());
}

#[test]
fn test_invalid_url_aborts_before_fetching() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 100)]);
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let err = app.run(&request("not a url", &[MINE])).unwrap_err();

    assert_eq!(err.code, ErrorCode::E601);
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(fetcher.requested().is_empty());
}

#[test]
fn test_invalid_overrides_are_rejected_first() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = ScriptedFetcher::new(&[(MINE, 100), (RIVAL_A, 50)]);
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");
    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();

    let mut req = request(MINE, &[RIVAL_A]);
    req.mail = Some("not-an-address".to_string());
    assert_eq!(app.run(&req).unwrap_err().code, ErrorCode::E602);

    let mut req = request(MINE, &[RIVAL_A]);
    req.phone_number = Some("12-34".to_string());
    assert_eq!(app.run(&req).unwrap_err().code, ErrorCode::E603);

    assert!(fetcher.requested().is_empty());
}

#[test]
fn test_http_fetcher_against_local_server() {
    let server = MockServer::start();
    let slow = server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body>slow</body></html>")
            .delay(Duration::from_millis(400));
    });
    let fast = server.mock(|when, then| {
        when.method(GET).path("/fast");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><body>fast</body></html>");
    });

    let dir = TempDir::new().unwrap();
    let logger = Logger::new(true, false);
    let fetcher = HttpFetcher::new(Duration::from_secs(10)).unwrap();
    let mail = RecordingNotifier::new("mail");
    let sms = RecordingNotifier::new("sms");

    let app = WebsiteMeasure::new(&fetcher, &mail, &sms, &settings(dir.path()), &logger).unwrap();
    let outcome = app
        .run(&request(&server.url("/slow"), &[&server.url("/fast")]))
        .unwrap();

    slow.assert();
    fast.assert();
    assert_eq!(outcome.ranked.benchmark_rank(), 2);
    assert!(outcome.ranked.benchmark().duration() >= Duration::from_millis(400));
    assert!(outcome.decision.email);
    assert!(outcome.decision.sms);
    assert_eq!(mail.calls.borrow().len(), 1);
}

#[test]
fn test_http_fetcher_rejects_error_status_and_binary_bodies() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("nope");
    });
    server.mock(|when, then| {
        when.method(GET).path("/broken");
        then.status(503).body("later");
    });
    server.mock(|when, then| {
        when.method(GET).path("/logo.png");
        then.status(200).header("content-type", "image/png").body(vec![0x89, b'P', b'N', b'G']);
    });

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    assert_eq!(fetcher.fetch(&server.url("/missing")).unwrap_err().code, ErrorCode::E202);
    assert_eq!(fetcher.fetch(&server.url("/broken")).unwrap_err().code, ErrorCode::E203);
    assert_eq!(fetcher.fetch(&server.url("/logo.png")).unwrap_err().code, ErrorCode::E206);
    assert_eq!(fetcher.fetch("www.example.com").unwrap_err().code, ErrorCode::E204);
}
