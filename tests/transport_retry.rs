//! Transport Tests
//!
//! Request behaviour against an in-memory transport:
//! - Transient statuses are retried with doubling waits
//! - Exhausted retries report the last status and body
//! - 204 never reaches the decoder
//! - Strict bodies obey the same key-set rules as documents

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use strictjson::strict_record;
use strictjson::transport::{
    Method, PreparedRequest, RawResponse, Request, RetryPolicy, Transport, TransportError,
    TransportResult,
};
use strictjson::DecodeError;

// =============================================================================
// Helper Types
// =============================================================================

#[derive(Default)]
struct MockTransport {
    responses: RefCell<VecDeque<RawResponse>>,
    requests: RefCell<Vec<PreparedRequest>>,
    waits: RefCell<Vec<Duration>>,
}

impl MockTransport {
    fn replying(responses: impl IntoIterator<Item = (u16, &'static str)>) -> Self {
        let transport = Self::default();
        transport.responses.borrow_mut().extend(
            responses
                .into_iter()
                .map(|(status, body)| RawResponse::new(status, body)),
        );
        transport
    }

    fn attempts(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &PreparedRequest) -> TransportResult<RawResponse> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| TransportError::Connection("connection refused".into()))
    }

    fn pause(&self, wait: Duration) {
        self.waits.borrow_mut().push(wait);
    }
}

strict_record! {
    #[derive(Debug, PartialEq)]
    struct Item {
        #[key = "id"]
        id: u64,
        #[key = "name"]
        name: String,
    }
}

strict_record! {
    #[derive(Debug)]
    struct Page {
        #[key = "items"]
        items: Vec<Item>,
        #[key = "next"]
        next: serde_json::Value,
    }
}

// =============================================================================
// Retry Tests
// =============================================================================

#[test]
fn test_every_transient_status_is_retried() {
    for status in [408, 429, 500, 502, 503, 504] {
        let transport = MockTransport::replying([(status, "retry me"), (200, "ok")]);
        let body = Request::get("https://api.example.com").retries(1).text(&transport).unwrap();

        assert_eq!(body.as_deref(), Some("ok"), "status {}", status);
        assert_eq!(transport.attempts(), 2);
    }
}

#[test]
fn test_waits_double_per_attempt() {
    let transport = MockTransport::replying([(500, ""), (500, ""), (500, ""), (200, "ok")]);
    Request::get("https://api.example.com").retries(3).text(&transport).unwrap();

    assert_eq!(
        *transport.waits.borrow(),
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8)
        ]
    );
}

#[test]
fn test_custom_policy_timing() {
    let policy = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(30));
    let transport = MockTransport::replying([(503, ""), (503, ""), (503, "down")]);

    let err = Request::get("https://api.example.com")
        .retry_policy(policy)
        .text(&transport)
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(
        *transport.waits.borrow(),
        vec![Duration::from_millis(20), Duration::from_millis(30)]
    );
}

#[test]
fn test_no_retries_by_default() {
    let transport = MockTransport::replying([(503, "down")]);
    let err = Request::get("https://api.example.com").text(&transport).unwrap_err();

    assert!(matches!(err, TransportError::Status { status: 503, ref body } if body == "down"));
    assert_eq!(transport.attempts(), 1);
}

#[test]
fn test_connection_error_propagates() {
    let transport = MockTransport::default();
    let err = Request::get("https://api.example.com").retries(3).text(&transport).unwrap_err();
    assert!(matches!(err, TransportError::Connection(_)));
}

// =============================================================================
// Request Shape Tests
// =============================================================================

#[test]
fn test_request_carries_method_token_and_query() {
    let transport = MockTransport::replying([(200, "")]);
    Request::patch("https://api.example.com/items/1")
        .bearer("secret")
        .query_pairs([("dry_run", "true"), ("fields", "name")])
        .text(&transport)
        .unwrap();

    let sent = &transport.requests.borrow()[0];
    assert_eq!(sent.method, Method::Patch);
    assert_eq!(sent.url, "https://api.example.com/items/1");
    assert_eq!(sent.header("Authorization"), Some("Bearer secret"));
    assert_eq!(sent.query.len(), 2);
}

// =============================================================================
// Strict Body Tests
// =============================================================================

#[test]
fn test_strict_page_decodes() {
    let transport = MockTransport::replying([(
        200,
        r#"{"items": [{"id": 1, "name": "one"}, {"id": 2, "name": "two"}], "next": null}"#,
    )]);

    let page: Page = Request::get("https://api.example.com/items")
        .expect_strict()
        .strict(&transport)
        .unwrap()
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1], Item { id: 2, name: "two".into() });
    assert!(page.next.is_null());
}

#[test]
fn test_strict_page_element_mismatch() {
    let transport = MockTransport::replying([(
        200,
        r#"{"items": [{"id": 1, "name": "one"}, {"id": 2}], "next": null}"#,
    )]);

    let err = Request::get("https://api.example.com/items")
        .expect_strict()
        .strict::<Page, _>(&transport)
        .unwrap_err();

    match err {
        TransportError::Decode(decode) => {
            assert_eq!(decode.path(), "items[1].name");
            assert!(matches!(decode.root_cause(), DecodeError::MissingField { .. }));
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_no_content_is_none() {
    let transport = MockTransport::replying([(204, "")]);
    let page = Request::delete("https://api.example.com/items/1")
        .expect_strict()
        .strict::<Page, _>(&transport)
        .unwrap();
    assert!(page.is_none());
}

#[test]
fn test_retry_then_strict_decode() {
    let transport = MockTransport::replying([(429, "slow down"), (200, r#"{"id": 9, "name": "nine"}"#)]);
    let item: Option<Item> = Request::get("https://api.example.com/items/9")
        .retries(2)
        .expect_strict()
        .strict(&transport)
        .unwrap();

    assert_eq!(item, Some(Item { id: 9, name: "nine".into() }));
}
